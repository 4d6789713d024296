use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub role: Option<String>,
    pub doctor_id: Option<i64>,
    pub iat: Option<u64>,
}

/// Authenticated session identity, injected by the auth middleware.
///
/// Doctor sessions carry the doctor record they are bound to so that
/// reporting views can be scoped to the caller's own workload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: String,
    pub role: Option<String>,
    pub doctor_id: Option<i64>,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }

    pub fn is_doctor(&self) -> bool {
        self.role.as_deref() == Some("doctor")
    }

    /// The doctor id this session is restricted to, if any.
    pub fn doctor_scope(&self) -> Option<i64> {
        if self.is_doctor() {
            self.doctor_id
        } else {
            None
        }
    }
}
