use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// REST client for the Ledger Store (PostgREST-style relational service).
///
/// The ledger owns transactions, uniqueness constraints and referential
/// integrity; this client only speaks its filter dialect
/// (`?id=eq.5&status=eq.Confirmed`). Writes that violate a uniqueness
/// constraint come back as HTTP 409 and surface as [`LedgerError::Conflict`],
/// which is how the confirmed-slot invariant is enforced without a
/// check-then-act window.
pub struct LedgerClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("conflicting write: {0}")]
    Conflict(String),

    #[error("resource not found")]
    NotFound,

    #[error("ledger api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("ledger transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode ledger response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl LedgerClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.ledger_url.clone(),
            api_key: config.ledger_api_key.clone(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(key) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", key);
        }
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, bearer);
        }
        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, LedgerError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, LedgerError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.headers();
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);
        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Ledger error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                409 => LedgerError::Conflict(error_text),
                404 => LedgerError::NotFound,
                code => LedgerError::Api {
                    status: code,
                    message: error_text,
                },
            });
        }

        // PostgREST answers 204 with an empty body when nothing is returned
        let text = response.text().await?;
        let data = if text.trim().is_empty() {
            serde_json::from_str("[]")?
        } else {
            serde_json::from_str(&text)?
        };
        Ok(data)
    }

    /// Fetch all rows of `table` matching the given filter string.
    pub async fn fetch<T>(&self, table: &str, filters: &str) -> Result<Vec<T>, LedgerError>
    where
        T: DeserializeOwned,
    {
        let path = if filters.is_empty() {
            format!("/rest/v1/{}", table)
        } else {
            format!("/rest/v1/{}?{}", table, filters)
        };
        self.request(Method::GET, &path, None).await
    }

    /// Fetch at most one row; `Ok(None)` when no row matches.
    pub async fn fetch_one<T>(&self, table: &str, filters: &str) -> Result<Option<T>, LedgerError>
    where
        T: DeserializeOwned,
    {
        let mut rows: Vec<T> = self.fetch(table, filters).await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }

    /// Insert a row and return the stored representation.
    pub async fn insert<T>(&self, table: &str, row: Value) -> Result<T, LedgerError>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}", table);
        let mut rows: Vec<T> = self
            .request_with_headers(Method::POST, &path, Some(row), Some(Self::representation()))
            .await?;
        if rows.is_empty() {
            return Err(LedgerError::Api {
                status: 500,
                message: format!("insert into {} returned no representation", table),
            });
        }
        Ok(rows.remove(0))
    }

    /// Patch all rows matching `filters` in a single conditional statement
    /// and return the updated representations. The ledger serializes this
    /// write against its own constraints, so a competing update that would
    /// break a uniqueness guarantee fails here with [`LedgerError::Conflict`].
    pub async fn update<T>(
        &self,
        table: &str,
        filters: &str,
        patch: Value,
    ) -> Result<Vec<T>, LedgerError>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}?{}", table, filters);
        self.request_with_headers(Method::PATCH, &path, Some(patch), Some(Self::representation()))
            .await
    }

    pub async fn delete(&self, table: &str, filters: &str) -> Result<(), LedgerError> {
        let path = format!("/rest/v1/{}?{}", table, filters);
        let _: Vec<Value> = self.request(Method::DELETE, &path, None).await?;
        Ok(())
    }

    fn representation() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
