//! HTTP client for the job-tracker API.
//!
//! Direct JSON over reqwest against a fixed base origin. One module per
//! endpoint group:
//! - tracker: metrics, agenda, pipeline, sources, opportunities
//! - sacred_work: progress log + stats
//! - scraped_jobs: scored listings + summary
//!
//! The tracker has two failure shapes: a non-2xx status, and (on the older
//! read endpoints) a 200 carrying `{"error": "..."}` instead of the payload.
//! Both surface as [`ApiError::Api`] with the server-reported reason.

pub mod sacred_work;
pub mod scraped_jobs;
pub mod tracker;

use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// True for transport-level failures (connect, DNS, timeout).
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Http(_))
    }

    /// Short reason suitable for a toast or an error row.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http(_) => "Could not reach the tracker server".to_string(),
            ApiError::Api { message, .. } => message.clone(),
            ApiError::Json(_) => "The server sent an unexpected response".to_string(),
        }
    }
}

/// Client for the tracker's HTTP JSON API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get_json_query(path, &[]).await
    }

    pub(crate) async fn get_json_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let resp = self.client.get(self.url(path)).query(query).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        decode_body(status, &body)
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, ApiError> {
        let resp = self
            .client
            .post(self.url(path))
            .json(payload)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        decode_body(status, &body)
    }

    pub(crate) async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> Result<T, ApiError> {
        let resp = self
            .client
            .patch(self.url(path))
            .json(payload)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        decode_body(status, &body)
    }
}

/// Decode a response body, mapping both failure shapes to [`ApiError::Api`].
pub(crate) fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    if !(200..300).contains(&status) {
        return Err(ApiError::Api {
            status,
            message: error_reason(body)
                .unwrap_or_else(|| format!("request failed with status {status}")),
        });
    }

    if let Some(reason) = error_reason(body) {
        return Err(ApiError::Api {
            status,
            message: reason,
        });
    }

    Ok(serde_json::from_str(body)?)
}

/// Extract the `error` field from an `{"error": "..."}` body, if that is what
/// this body is.
fn error_reason(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .as_object()?
        .get("error")?
        .as_str()
        .map(str::to_string)
}

/// Creation acknowledgement from the POST endpoints.
#[derive(Debug, Clone, serde::Deserialize)]
pub(crate) struct CreatedResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metrics;

    #[test]
    fn test_decode_success() {
        let body = r#"{"active_count": 8, "interview_count": 3, "remote_count": 6, "priority_count": 4}"#;
        let metrics: Metrics = decode_body(200, body).unwrap();
        assert_eq!(metrics.active_count, 8);
        assert_eq!(metrics.priority_count, 4);
    }

    #[test]
    fn test_decode_error_body_with_success_status() {
        // The tracker's older read endpoints answer 200 + {"error": ...}
        let err = decode_body::<Metrics>(200, r#"{"error": "no such table: opportunities"}"#)
            .unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 200);
                assert_eq!(message, "no such table: opportunities");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_error_status_with_reason() {
        let err =
            decode_body::<CreatedResponse>(409, r#"{"error": "Stone number already exists"}"#)
                .unwrap_err();
        assert_eq!(err.user_message(), "Stone number already exists");
    }

    #[test]
    fn test_decode_error_status_without_reason() {
        let err = decode_body::<CreatedResponse>(502, "Bad Gateway").unwrap_err();
        match err {
            ApiError::Api { status, .. } => assert_eq!(status, 502),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_malformed_payload() {
        let err = decode_body::<Metrics>(200, "<html>proxy error</html>").unwrap_err();
        assert!(matches!(err, ApiError::Json(_)));
        assert_eq!(
            err.user_message(),
            "The server sent an unexpected response"
        );
    }

    #[test]
    fn test_created_response_parse() {
        let body = r#"{"success": true, "message": "Opportunity added successfully", "id": 17}"#;
        let created: CreatedResponse = decode_body(200, body).unwrap();
        assert!(created.success);
        assert_eq!(created.id, 17);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8081/");
        assert_eq!(client.base_url(), "http://localhost:8081");
        assert_eq!(client.url("/api/metrics"), "http://localhost:8081/api/metrics");
    }
}
