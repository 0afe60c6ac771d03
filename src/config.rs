use std::{env, time::Duration};

use secrecy::SecretString;

pub const DEFAULT_GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

#[derive(Clone, Debug)]
pub struct Config {
    pub gemini_api_key: SecretString,
    pub gemini_api_base_url: String,
    pub gemini_model: String,
    pub remote_call_timeout_secs: u64,
    pub generation_attempts: u32,
    pub temp_upload_dir: String,
    pub max_upload_bytes: usize,
    pub web_server_host: String,
    pub web_server_port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: SecretString::from(env::var("GEMINI_API_KEY").unwrap_or_default()),
            gemini_api_base_url: env::var("GEMINI_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE_URL.to_string()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            remote_call_timeout_secs: env::var("REMOTE_CALL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(600),
            generation_attempts: env::var("GENERATION_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|attempts| *attempts > 0)
                .unwrap_or(1),
            temp_upload_dir: env::var("TEMP_UPLOAD_DIR")
                .unwrap_or_else(|_| "temp_uploads".to_string()),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20 * 1024 * 1024),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }

    pub fn remote_call_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_call_timeout_secs)
    }

    /// Validate that production-critical configuration is set
    pub fn validate_for_production(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.gemini_api_key.expose_secret().trim().is_empty() {
            return Err(
                "GEMINI_API_KEY environment variable not set. Set it to a valid Gemini API key."
                    .to_string(),
            );
        }

        if self.remote_call_timeout_secs == 0 {
            return Err("REMOTE_CALL_TIMEOUT_SECS must be greater than zero.".to_string());
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            gemini_api_key: SecretString::from("test_gemini_key".to_string()),
            gemini_api_base_url: "http://127.0.0.1:9".to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            remote_call_timeout_secs: 5,
            generation_attempts: 1,
            temp_upload_dir: env::temp_dir().to_string_lossy().into_owned(),
            max_upload_bytes: 1024 * 1024,
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
        }
    }
}
