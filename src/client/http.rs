//! The one HTTP client every operation goes through.
//!
//! Owns status handling and error-detail extraction so the per-operation
//! modules only describe paths and bodies.

use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::ClientError;
use crate::config::ClientConfig;

/// Longest service detail kept in an error message.
const MAX_DETAIL_CHARS: usize = 500;

/// HTTP client for the prediction service.
pub struct ServiceClient {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl ServiceClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ClientError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Join `path` (always starting with `/api/`) onto the base URL and
    /// append `segments` percent-encoded.
    pub(crate) fn url(&self, path: &str, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ClientError::HttpClient(format!("Invalid URL: {e}")))?;
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| ClientError::HttpClient("Base URL cannot take a path".into()))?
                .pop_if_empty()
                .extend(segments);
        }
        Ok(url)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        tracing::debug!(method = "GET", path = url.path(), "Sending request");
        let response = self.send(self.client.get(url).query(query)).await?;
        read_json(response).await
    }

    pub(crate) async fn post_json<B, T>(&self, url: Url, body: Option<&B>) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(method = "POST", path = url.path(), "Sending request");
        let mut builder = self.client.post(url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = self.send(builder).await?;
        read_json(response).await
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        url: Url,
        form: Form,
    ) -> Result<T, ClientError> {
        tracing::debug!(method = "POST", path = url.path(), "Sending multipart request");
        let response = self.send(self.client.post(url).multipart(form)).await?;
        read_json(response).await
    }

    /// Send and turn any non-2xx response into `ClientError::Service`.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);
        tracing::warn!(status = status.as_u16(), path = %path, ?detail, "Service returned error");
        Err(ClientError::Service {
            status: status.as_u16(),
            detail,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_connect() {
            ClientError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else {
            ClientError::HttpClient(e.to_string())
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ClientError::HttpClient(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::ResponseParsing(e.to_string()))
}

/// Pull the human-readable message out of an error body.
///
/// Understands `{"detail": "..."}`, validation lists
/// `{"detail": [{"msg": "..."}]}` and `{"message": "..."}`. Anything else
/// (HTML error pages, empty bodies) yields `None`.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let detail = match value.get("detail") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
    }?;

    let detail = detail.trim();
    if detail.is_empty() {
        return None;
    }
    Some(detail.chars().take(MAX_DETAIL_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ServiceClient {
        ServiceClient::new(&ClientConfig::new(base)).unwrap()
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let client = client("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.timeout_secs(), 120);
    }

    #[test]
    fn url_joins_path() {
        let client = client("http://localhost:8000");
        let url = client.url("/api/diagnosis/predict", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/diagnosis/predict");
    }

    #[test]
    fn url_encodes_segments() {
        let client = client("http://localhost:8000");
        let url = client.url("/api/patients", &["PT 7/a"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/patients/PT%207%2Fa");
    }

    #[test]
    fn url_keeps_base_path_prefix() {
        let client = client("https://example.org/dx");
        let url = client.url("/api/health", &[]).unwrap();
        assert_eq!(url.as_str(), "https://example.org/dx/api/health");
    }

    #[test]
    fn detail_string() {
        assert_eq!(
            extract_detail(r#"{"detail":"No file provided"}"#).as_deref(),
            Some("No file provided")
        );
    }

    #[test]
    fn detail_validation_list() {
        let body = r#"{"detail":[{"loc":["body","age"],"msg":"field required","type":"missing"},
                                  {"loc":["body","gender"],"msg":"field required","type":"missing"}]}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("field required; field required")
        );
    }

    #[test]
    fn detail_message_key() {
        assert_eq!(
            extract_detail(r#"{"message":"Database already seeded"}"#).as_deref(),
            Some("Database already seeded")
        );
    }

    #[test]
    fn non_json_or_empty_detail_is_none() {
        assert_eq!(extract_detail("<html>Bad Gateway</html>"), None);
        assert_eq!(extract_detail(""), None);
        assert_eq!(extract_detail(r#"{"detail":""}"#), None);
        assert_eq!(extract_detail(r#"{"detail":[]}"#), None);
    }

    #[test]
    fn long_detail_is_truncated() {
        let body = format!(r#"{{"detail":"{}"}}"#, "x".repeat(2_000));
        assert_eq!(extract_detail(&body).unwrap().len(), MAX_DETAIL_CHARS);
    }
}
