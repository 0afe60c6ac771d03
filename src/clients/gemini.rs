//! Thin HTTP plumbing shared by the Gemini file store and model service.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
};

pub const API_VERSION: &str = "v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone, Debug)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

/// Error body returned by the Gemini REST API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
    status: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(config.remote_call_timeout())
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("lessongenie-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.gemini_api_base_url.trim_end_matches('/').to_string(),
            api_key: config.gemini_api_key.clone(),
            model: sanitize_model(&config.gemini_model),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// `{base}/v1beta/{path}`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, API_VERSION, path.trim_start_matches('/'))
    }

    /// `{base}/upload/v1beta/files`
    pub fn upload_endpoint(&self) -> String {
        format!("{}/upload/{}/files", self.base_url, API_VERSION)
    }

    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
    }
}

pub fn sanitize_model(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

/// Status plus the most useful message the API gave us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
}

impl ApiFailure {
    /// The file service answers 403 rather than 404 for files that are gone.
    pub fn is_missing_file(&self) -> bool {
        self.status == StatusCode::NOT_FOUND || self.status == StatusCode::FORBIDDEN
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}: {}", self.status.as_u16(), self.message)
    }
}

/// Passes successful responses through and turns the rest into `ApiFailure`.
pub async fn check_status(response: Response) -> AppResult<Result<Response, ApiFailure>> {
    let status = response.status();
    if status.is_success() {
        return Ok(Ok(response));
    }

    let body = response.text().await?;
    Ok(Err(ApiFailure {
        status,
        message: friendly_message(status, &body),
    }))
}

fn friendly_message(status: StatusCode, body: &str) -> String {
    if let Ok(ApiErrorResponse { error: Some(detail) }) = serde_json::from_str(body) {
        if let Some(message) = detail.message.or(detail.status) {
            return message;
        }
    }

    match status.as_u16() {
        400 => "Invalid request".to_string(),
        401 => "Authentication failed - check your API key".to_string(),
        403 => "Access denied".to_string(),
        404 => "Not found".to_string(),
        429 => "Rate limit exceeded - please wait before retrying".to_string(),
        502..=504 => "Service temporarily unavailable - please try again".to_string(),
        _ => format!("HTTP error {}", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_model() {
        assert_eq!(sanitize_model("gemini-1.5-flash-latest"), "models/gemini-1.5-flash-latest");
        assert_eq!(sanitize_model("models/gemini-pro"), "models/gemini-pro");
    }

    #[test]
    fn test_endpoints() {
        let mut config = Config::test_config();
        config.gemini_api_base_url = "https://example.test/".to_string();
        let client = GeminiClient::new(&config).unwrap();

        assert_eq!(client.endpoint("files/abc"), "https://example.test/v1beta/files/abc");
        assert_eq!(client.upload_endpoint(), "https://example.test/upload/v1beta/files");
        assert_eq!(client.model(), "models/gemini-1.5-flash-latest");
    }

    #[test]
    fn test_friendly_message_prefers_api_body() {
        let body = r#"{"error":{"code":403,"message":"You do not have permission to access the File abc or it may not exist.","status":"PERMISSION_DENIED"}}"#;
        let message = friendly_message(StatusCode::FORBIDDEN, body);

        assert!(message.contains("may not exist"));
    }

    #[test]
    fn test_friendly_message_falls_back_to_status() {
        assert_eq!(
            friendly_message(StatusCode::TOO_MANY_REQUESTS, "<html>"),
            "Rate limit exceeded - please wait before retrying"
        );
    }

    #[test]
    fn test_missing_file_statuses() {
        let failure = |status| ApiFailure {
            status,
            message: String::new(),
        };
        assert!(failure(StatusCode::NOT_FOUND).is_missing_file());
        assert!(failure(StatusCode::FORBIDDEN).is_missing_file());
        assert!(!failure(StatusCode::INTERNAL_SERVER_ERROR).is_missing_file());
    }
}
