//! Access tokens for authenticated spreadsheet writes.

use crate::error::SheetsError;
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::{debug, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// OAuth scope granting spreadsheet read/write.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
/// Lifetime requested for signed assertions, in seconds.
const ASSERTION_TTL_SECS: i64 = 3600;
/// Tokens are refreshed this many seconds before they expire.
const REFRESH_MARGIN_SECS: i64 = 60;

#[async_trait]
/// Source of bearer tokens for write calls.
pub trait TokenSource: Send + Sync {
    /// Return a currently valid access token.
    async fn access_token(&self) -> Result<String, SheetsError>;
}

/// Fixed bearer token.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, SheetsError> {
        Ok(self.0.clone())
    }
}

/// Fields of a service-account JSON key used for the JWT bearer flow.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    /// Parse a key from its JSON text.
    pub fn from_json(input: &str) -> Result<Self, SheetsError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read and parse a key file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SheetsError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: i64,
}

/// Exchanges signed service-account assertions for access tokens.
pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    /// Create a token source, validating the private key up front.
    pub fn new(key: ServiceAccountKey, http: reqwest::Client) -> Result<Self, SheetsError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|err| SheetsError::Credentials(format!("invalid private key: {err}")))?;
        info!(
            "loaded service account credentials (client_email={})",
            key.client_email
        );
        Ok(Self {
            key,
            encoding_key,
            http,
            cached: Mutex::new(None),
        })
    }

    /// Load a token source from a key file.
    pub fn from_file(path: impl AsRef<Path>, http: reqwest::Client) -> Result<Self, SheetsError> {
        Self::new(ServiceAccountKey::from_file(path)?, http)
    }

    fn cached_token(&self, now: i64) -> Option<String> {
        self.cached
            .lock()
            .as_ref()
            .filter(|token| token.expires_at - REFRESH_MARGIN_SECS > now)
            .map(|token| token.value.clone())
    }

    fn sign_assertion(&self, now: i64) -> Result<String, SheetsError> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_TTL_SECS,
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?)
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, SheetsError> {
        let now = Utc::now().timestamp();
        if let Some(token) = self.cached_token(now) {
            return Ok(token);
        }
        let assertion = self.sign_assertion(now)?;
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let token: TokenResponse = response.json().await?;
        let expires_at = now + token.expires_in.unwrap_or(ASSERTION_TTL_SECS);
        debug!("exchanged service account assertion (expires_at={expires_at})");
        *self.cached.lock() = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at,
        });
        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::{ServiceAccountKey, ServiceAccountTokenSource, TokenSource};
    use crate::SheetsError;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const KEY_JSON: &str = include_str!("../tests/fixtures/service_account.json");

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        format!("http://{addr}")
    }

    #[test]
    fn parses_service_account_key() {
        let key = ServiceAccountKey::from_json(KEY_JSON).expect("key");
        assert_eq!(
            key.client_email,
            "relay-writer@relay-test.iam.gserviceaccount.com"
        );
        assert_eq!(key.token_uri, "https://oauth2.googleapis.com/token");
    }

    #[test]
    fn rejects_invalid_private_key() {
        let key = ServiceAccountKey {
            client_email: "a@b".to_string(),
            private_key: "not a pem".to_string(),
            token_uri: "http://127.0.0.1:1/token".to_string(),
        };
        let err = ServiceAccountTokenSource::new(key, reqwest::Client::new())
            .err()
            .expect("error");
        assert!(matches!(err, SheetsError::Credentials(_)));
    }

    #[tokio::test]
    async fn exchanges_and_caches_token() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/token",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    axum::Json(serde_json::json!({
                        "access_token": "ya29.test",
                        "expires_in": 3599,
                        "token_type": "Bearer"
                    }))
                }
            }),
        );
        let base = serve(router).await;
        let mut key = ServiceAccountKey::from_json(KEY_JSON).expect("key");
        key.token_uri = format!("{base}/token");
        let source = ServiceAccountTokenSource::new(key, reqwest::Client::new()).expect("source");

        assert_eq!(source.access_token().await.expect("token"), "ya29.test");
        assert_eq!(source.access_token().await.expect("token"), "ya29.test");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn token_endpoint_failure_is_an_error() {
        let router = Router::new().route(
            "/token",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid_grant") }),
        );
        let base = serve(router).await;
        let mut key = ServiceAccountKey::from_json(KEY_JSON).expect("key");
        key.token_uri = format!("{base}/token");
        let source = ServiceAccountTokenSource::new(key, reqwest::Client::new()).expect("source");

        let err = source.access_token().await.unwrap_err();
        assert!(matches!(err, SheetsError::Status { status: 401, .. }));
    }
}
