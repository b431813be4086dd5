//! Google Sheets client implementing the message log store.

use crate::auth::{ServiceAccountTokenSource, TokenSource};
use crate::csv::parse_csv;
use crate::error::SheetsError;
use crate::model::{AppendConfirmation, AppendOutcome, SheetRow};
use crate::store::SheetStore;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use relay_rs_config::SheetsConfig;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    #[serde(default)]
    updates: Option<AppendUpdates>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    #[serde(default)]
    updated_range: Option<String>,
    #[serde(default)]
    updated_rows: Option<u64>,
}

/// Sheets API client for a single spreadsheet.
#[derive(Clone)]
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    spreadsheet_id: Option<String>,
    read_range: String,
    append_range: String,
    api_key: Option<String>,
    api_base_url: String,
    export_base_url: String,
    token_source: Option<Arc<dyn TokenSource>>,
}

impl GoogleSheetsClient {
    /// Build a client from config, loading service-account credentials if set.
    pub fn new(config: &SheetsConfig) -> Result<Self, SheetsError> {
        let http = reqwest::Client::new();
        let token_source: Option<Arc<dyn TokenSource>> = match config.credentials_file.as_ref() {
            Some(path) => {
                let source: Arc<dyn TokenSource> =
                    Arc::new(ServiceAccountTokenSource::from_file(path, http.clone())?);
                Some(source)
            }
            None => {
                warn!("sheet write credentials not configured; rows will only be prepared locally");
                None
            }
        };
        Ok(Self::with_http(config, http).with_token_source(token_source))
    }

    /// Build a client without write credentials using the given HTTP client.
    pub fn with_http(config: &SheetsConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            spreadsheet_id: config.spreadsheet_id.clone(),
            read_range: config.range.clone(),
            append_range: config.append_range.clone(),
            api_key: config.api_key.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            export_base_url: config.export_base_url.trim_end_matches('/').to_string(),
            token_source: None,
        }
    }

    /// Replace the token source used for writes.
    pub fn with_token_source(mut self, token_source: Option<Arc<dyn TokenSource>>) -> Self {
        self.token_source = token_source;
        self
    }

    /// Whether authenticated writes are possible.
    pub fn has_write_credentials(&self) -> bool {
        self.token_source.is_some()
    }

    fn spreadsheet_id(&self) -> Result<&str, SheetsError> {
        self.spreadsheet_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(SheetsError::MissingSpreadsheet)
    }

    /// `{api}/v4/spreadsheets/{id}/values/{range}` with the range encoded as one segment.
    fn values_url(&self, range_segment: &str) -> Result<Url, SheetsError> {
        let id = self.spreadsheet_id()?;
        let mut url = Url::parse(&self.api_base_url)
            .map_err(|err| SheetsError::Url(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Url(self.api_base_url.clone()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", id, "values", range_segment]);
        Ok(url)
    }

    fn export_url(&self) -> Result<Url, SheetsError> {
        let id = self.spreadsheet_id()?;
        let mut url = Url::parse(&self.export_base_url)
            .map_err(|err| SheetsError::Url(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Url(self.export_base_url.clone()))?
            .pop_if_empty()
            .extend(["spreadsheets", "d", id, "export"]);
        url.query_pairs_mut()
            .append_pair("format", "csv")
            .append_pair("gid", "0");
        Ok(url)
    }

    /// Read the configured range through the values API.
    async fn read_values(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        let mut url = self.values_url(&self.read_range)?;
        if let Some(key) = self.api_key.as_deref() {
            url.query_pairs_mut().append_pair("key", key);
        }
        let response = self.http.get(url).send().await?;
        let response = ensure_success(response).await?;
        let range: ValueRange = response.json().await?;
        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    /// Read the whole first sheet through the public CSV export.
    async fn read_export(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.export_url()?;
        let response = self.http.get(url).send().await?;
        let response = ensure_success(response).await?;
        let text = response.text().await?;
        Ok(parse_csv(&text))
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn append(&self, row: SheetRow) -> Result<AppendOutcome, SheetsError> {
        let Some(token_source) = self.token_source.as_ref() else {
            warn!(
                "sheet row prepared without remote write (user_id={}, mode=prepared, message_len={})",
                row.user_id,
                row.message.len()
            );
            return Ok(AppendOutcome::Prepared(row));
        };
        let mut url = self.values_url(&format!("{}:append", self.append_range))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        let token = token_source.access_token().await?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "values": [row.values()] }))
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: AppendResponse = response.json().await?;
        let confirmation = body
            .updates
            .map(|updates| AppendConfirmation {
                updated_range: updates.updated_range,
                updated_rows: updates.updated_rows,
            })
            .unwrap_or_default();
        info!(
            "stored row (user_id={}, mode=authenticated, range={})",
            row.user_id,
            confirmation.updated_range.as_deref().unwrap_or("-")
        );
        Ok(AppendOutcome::Appended(confirmation))
    }

    async fn read(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        let err = match self.read_values().await {
            Ok(rows) => {
                debug!("read sheet rows (source=api, rows={})", rows.len());
                return Ok(rows);
            }
            Err(err) => err,
        };
        warn!("sheet api read failed, trying csv export (error={err})");
        match self.read_export().await {
            Ok(rows) => {
                debug!("read sheet rows (source=csv, rows={})", rows.len());
                Ok(rows)
            }
            Err(fallback_err) => {
                error!("sheet csv export failed (error={fallback_err})");
                Err(err)
            }
        }
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SheetsError::Status {
        status: status.as_u16(),
        body,
    })
}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::GoogleSheetsClient;
    use crate::{AppendOutcome, SheetRow, SheetStore, SheetsError, StaticToken, TokenSource};
    use axum::Router;
    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode, Uri};
    use axum::response::{IntoResponse, Response};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use relay_rs_config::SheetsConfig;
    use std::sync::Arc;

    /// Canned behaviour and request log for the fake Sheets host.
    #[derive(Default)]
    struct FakeSheets {
        values_status: Option<StatusCode>,
        values_body: String,
        export_status: Option<StatusCode>,
        export_body: String,
        append_status: Option<StatusCode>,
        requests: Mutex<Vec<(String, Option<String>, String)>>,
    }

    async fn fake_handler(
        State(fake): State<Arc<FakeSheets>>,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        let path = uri.path().to_string();
        let auth = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        fake.requests.lock().push((
            uri.to_string(),
            auth,
            String::from_utf8_lossy(&body).to_string(),
        ));
        if path.ends_with(":append") {
            let status = fake.append_status.unwrap_or(StatusCode::OK);
            let body = serde_json::json!({
                "spreadsheetId": "sheet-1",
                "updates": { "updatedRange": "Sheet1!A5:B5", "updatedRows": 1 }
            });
            return (status, axum::Json(body)).into_response();
        }
        if path.contains("/export") {
            let status = fake.export_status.unwrap_or(StatusCode::OK);
            return (status, fake.export_body.clone()).into_response();
        }
        let status = fake.values_status.unwrap_or(StatusCode::OK);
        (
            status,
            [("content-type", "application/json")],
            fake.values_body.clone(),
        )
            .into_response()
    }

    async fn serve(fake: Arc<FakeSheets>) -> String {
        let router = Router::new().fallback(fake_handler).with_state(fake);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        format!("http://{addr}")
    }

    fn config(base: &str) -> SheetsConfig {
        SheetsConfig {
            spreadsheet_id: Some("sheet-1".to_string()),
            api_key: Some("api-key".to_string()),
            api_base_url: base.to_string(),
            export_base_url: base.to_string(),
            ..SheetsConfig::default()
        }
    }

    #[tokio::test]
    async fn append_without_credentials_never_calls_remote() {
        let fake = Arc::new(FakeSheets::default());
        let base = serve(fake.clone()).await;
        let client = GoogleSheetsClient::with_http(&config(&base), reqwest::Client::new());

        let outcome = client
            .append(SheetRow::new(42, "TEXTO: hola"))
            .await
            .expect("append");

        assert_eq!(
            outcome,
            AppendOutcome::Prepared(SheetRow::new(42, "TEXTO: hola"))
        );
        assert!(!outcome.is_remote());
        assert!(fake.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn append_with_credentials_posts_row() {
        let fake = Arc::new(FakeSheets::default());
        let base = serve(fake.clone()).await;
        let token: Arc<dyn TokenSource> = Arc::new(StaticToken("secret".to_string()));
        let client = GoogleSheetsClient::with_http(&config(&base), reqwest::Client::new())
            .with_token_source(Some(token));

        let outcome = client
            .append(SheetRow::new(42, "TEXTO: hola"))
            .await
            .expect("append");

        match outcome {
            AppendOutcome::Appended(confirmation) => {
                assert_eq!(confirmation.updated_range.as_deref(), Some("Sheet1!A5:B5"));
                assert_eq!(confirmation.updated_rows, Some(1));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        let requests = fake.requests.lock();
        assert_eq!(requests.len(), 1);
        let (uri, auth, body) = &requests[0];
        assert!(uri.starts_with("/v4/spreadsheets/sheet-1/values/Sheet1!A:B:append"));
        assert!(uri.contains("valueInputOption=RAW"));
        assert!(uri.contains("insertDataOption=INSERT_ROWS"));
        assert_eq!(auth.as_deref(), Some("Bearer secret"));
        let body: serde_json::Value = serde_json::from_str(body).expect("json body");
        assert_eq!(body, serde_json::json!({ "values": [["42", "TEXTO: hola"]] }));
    }

    #[tokio::test]
    async fn append_with_credentials_propagates_remote_failure() {
        let fake = Arc::new(FakeSheets {
            append_status: Some(StatusCode::INTERNAL_SERVER_ERROR),
            ..FakeSheets::default()
        });
        let base = serve(fake.clone()).await;
        let token: Arc<dyn TokenSource> = Arc::new(StaticToken("secret".to_string()));
        let client = GoogleSheetsClient::with_http(&config(&base), reqwest::Client::new())
            .with_token_source(Some(token));

        let err = client
            .append(SheetRow::new(42, "TEXTO: hola"))
            .await
            .unwrap_err();
        assert!(matches!(err, SheetsError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn read_uses_values_api_with_key() {
        let fake = Arc::new(FakeSheets {
            values_body: r#"{"range":"Sheet1!A1:Z100","majorDimension":"ROWS","values":[["42","TEXTO: hola"],["7","IMAGEN: x"]]}"#.to_string(),
            ..FakeSheets::default()
        });
        let base = serve(fake.clone()).await;
        let client = GoogleSheetsClient::with_http(&config(&base), reqwest::Client::new());

        let rows = client.read().await.expect("read");

        assert_eq!(
            rows,
            vec![
                vec!["42".to_string(), "TEXTO: hola".to_string()],
                vec!["7".to_string(), "IMAGEN: x".to_string()],
            ]
        );
        let requests = fake.requests.lock();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].0.contains("key=api-key"));
    }

    #[tokio::test]
    async fn read_treats_missing_values_as_empty() {
        let fake = Arc::new(FakeSheets {
            values_body: r#"{"range":"Sheet1!A1:Z100","majorDimension":"ROWS"}"#.to_string(),
            ..FakeSheets::default()
        });
        let base = serve(fake).await;
        let client = GoogleSheetsClient::with_http(&config(&base), reqwest::Client::new());
        assert!(client.read().await.expect("read").is_empty());
    }

    #[tokio::test]
    async fn read_falls_back_to_csv_export() {
        let fake = Arc::new(FakeSheets {
            values_status: Some(StatusCode::FORBIDDEN),
            export_body: "42,TEXTO: hola\n7,TEXTO: hi, there".to_string(),
            ..FakeSheets::default()
        });
        let base = serve(fake.clone()).await;
        let client = GoogleSheetsClient::with_http(&config(&base), reqwest::Client::new());

        let rows = client.read().await.expect("read");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["42".to_string(), "TEXTO: hola".to_string()]);
        assert_eq!(
            rows[1],
            vec![
                "7".to_string(),
                "TEXTO: hi".to_string(),
                " there".to_string()
            ]
        );
        let requests = fake.requests.lock();
        assert!(requests[1].0.starts_with("/spreadsheets/d/sheet-1/export"));
        assert!(requests[1].0.contains("format=csv"));
    }

    #[tokio::test]
    async fn read_surfaces_api_error_when_both_paths_fail() {
        let fake = Arc::new(FakeSheets {
            values_status: Some(StatusCode::FORBIDDEN),
            values_body: "denied".to_string(),
            export_status: Some(StatusCode::NOT_FOUND),
            ..FakeSheets::default()
        });
        let base = serve(fake).await;
        let client = GoogleSheetsClient::with_http(&config(&base), reqwest::Client::new());

        let err = client.read().await.unwrap_err();
        match err {
            SheetsError::Status { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn read_without_spreadsheet_id_fails() {
        let client =
            GoogleSheetsClient::with_http(&SheetsConfig::default(), reqwest::Client::new());
        let err = client.read().await.unwrap_err();
        assert!(matches!(err, SheetsError::MissingSpreadsheet));
    }
}
