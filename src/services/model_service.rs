use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    clients::gemini::{check_status, GeminiClient},
    errors::{AppError, AppResult},
    models::{domain::RemoteFileHandle, schema::ModelResponse},
    services::response_validator::parse_and_validate,
};

/// A generative model that reads a remote file and answers with JSON text.
///
/// The returned text is whatever the model produced; nothing guarantees it
/// matches `response_schema`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate_json(
        &self,
        file: &RemoteFileHandle,
        prompt: &str,
        response_schema: &Value,
    ) -> AppResult<String>;
}

/// Asks `model` for a `T` and validates the reply.
///
/// Up to `attempts` calls are made while the reply is malformed or fails
/// validation. Transport and service errors end the loop immediately.
pub async fn generate_validated<T: ModelResponse>(
    model: &dyn GenerativeModel,
    file: &RemoteFileHandle,
    prompt: &str,
    attempts: u32,
) -> AppResult<T> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        log::info!(
            "Requesting {} from model for file {} (attempt {}/{})",
            T::KIND,
            file.id,
            attempt,
            attempts
        );
        let raw = model.generate_json(file, prompt, T::generation_schema()).await?;

        match parse_and_validate::<T>(&raw) {
            Ok(parsed) => return Ok(parsed),
            Err(err) => {
                log::error!("{} for file {} rejected: {}", T::KIND, file.id, err);
                log::error!("Raw model response that failed validation: {}", raw);
                if !err.is_invalid_model_output() || attempt >= attempts {
                    return Err(err);
                }
                attempt += 1;
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPart<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData<'a> {
    mime_type: &'a str,
    file_uri: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_json_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> AppResult<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AppError::RemoteCallFailed(format!(
                "Model blocked the request: {}",
                reason
            )));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::RemoteCallFailed("Model response missing candidate".to_string()))?;

        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::RemoteCallFailed(format!(
                "Model response contained no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

pub struct GeminiModelService {
    client: GeminiClient,
}

impl GeminiModelService {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GenerativeModel for GeminiModelService {
    async fn generate_json(
        &self,
        file: &RemoteFileHandle,
        prompt: &str,
        response_schema: &Value,
    ) -> AppResult<String> {
        // file first, then the instruction describing the task
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    RequestPart {
                        text: None,
                        file_data: Some(FileData {
                            mime_type: &file.media_type,
                            file_uri: &file.uri,
                        }),
                    },
                    RequestPart {
                        text: Some(prompt),
                        file_data: None,
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_json_schema: response_schema,
            },
        };

        let url = self
            .client
            .endpoint(&format!("{}:generateContent", self.client.model()));
        let response = self
            .client
            .request(Method::POST, &url)
            .json(&request)
            .send()
            .await?;

        let response = check_status(response).await?.map_err(|failure| {
            AppError::RemoteCallFailed(format!("Content generation failed: {}", failure))
        })?;

        let body: GenerateContentResponse = response.json().await?;
        body.into_text()
    }
}
