use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use shared_models::auth::{AuthContext, JwtClaims};

type HmacSha256 = Hmac<Sha256>;

/// Validate a session token (HS256 JWT) and extract the caller's identity.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<AuthContext, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let signing_input = format!("{}.{}", header_b64, claims_b64);

    let mut mac = match HmacSha256::new_from_slice(jwt_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return Err("Failed to create HMAC".to_string()),
    };

    mac.update(signing_input.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_json = match URL_SAFE_NO_PAD.decode(claims_b64) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err("Invalid claims encoding".to_string()),
        },
        Err(_) => return Err("Invalid claims encoding".to_string()),
    };

    let claims: JwtClaims = match serde_json::from_str(&claims_json) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            return Err("Invalid claims format".to_string());
        }
    };

    if let Some(exp) = claims.exp {
        let now = chrono::Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    let ctx = AuthContext {
        user_id: claims.sub,
        role: claims.role,
        doctor_id: claims.doctor_id,
    };

    debug!("Token validated successfully for user: {}", ctx.user_id);
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{JwtTestUtils, TestUser};

    const SECRET: &str = "test-secret-key-for-jwt-validation-must-be-long-enough";

    #[test]
    fn validates_a_well_formed_token() {
        let user = TestUser::doctor(7);
        let token = JwtTestUtils::create_test_token(&user, SECRET, None);

        let ctx = validate_token(&token, SECRET).expect("token should validate");
        assert_eq!(ctx.user_id, user.id);
        assert_eq!(ctx.role.as_deref(), Some("doctor"));
        assert_eq!(ctx.doctor_id, Some(7));
    }

    #[test]
    fn rejects_bad_signature() {
        let user = TestUser::admin();
        let token = JwtTestUtils::create_test_token(&user, "wrong-secret", None);
        assert!(validate_token(&token, SECRET).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let user = TestUser::admin();
        let token = JwtTestUtils::create_test_token(&user, SECRET, Some(-1));
        assert_eq!(validate_token(&token, SECRET).unwrap_err(), "Token expired");
    }

    #[test]
    fn rejects_garbage() {
        assert!(validate_token("invalid.token.format", SECRET).is_err());
        assert!(validate_token("not-even-a-jwt", SECRET).is_err());
    }
}
