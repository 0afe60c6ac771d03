use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    clients::gemini::{check_status, GeminiClient},
    errors::{AppError, AppResult},
    models::domain::{remote_file::is_file_resource_id, RemoteFileHandle},
};

/// Remote storage for uploaded documents.
#[async_trait]
pub trait RemoteFileStore: Send + Sync {
    async fn upload(
        &self,
        path: &Path,
        display_name: &str,
        media_type: &str,
    ) -> AppResult<RemoteFileHandle>;

    /// `Ok(None)` when the id is unknown or has expired.
    async fn get(&self, id: &str) -> AppResult<Option<RemoteFileHandle>>;

    /// `Ok(false)` when there was nothing left to delete.
    async fn delete(&self, id: &str) -> AppResult<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum FileState {
    Processing,
    Active,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiFile {
    name: String,
    #[serde(default)]
    display_name: String,
    mime_type: String,
    #[serde(default)]
    uri: String,
    #[serde(default)]
    expiration_time: Option<DateTime<Utc>>,
    state: Option<FileState>,
}

impl From<GeminiFile> for RemoteFileHandle {
    fn from(file: GeminiFile) -> Self {
        RemoteFileHandle {
            id: file.name,
            display_name: file.display_name,
            media_type: file.mime_type,
            uri: file.uri,
            expires_at: file.expiration_time,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadFileResponse {
    file: GeminiFile,
}

pub struct GeminiFileStore {
    client: GeminiClient,
}

impl GeminiFileStore {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

/// Body for the Files API `multipart` upload protocol: JSON metadata part
/// followed by the raw file part.
fn multipart_related_body(boundary: &str, display_name: &str, media_type: &str, data: &[u8]) -> Vec<u8> {
    let metadata = json!({ "file": { "displayName": display_name } }).to_string();

    let mut body = Vec::with_capacity(data.len() + metadata.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.as_bytes());
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", media_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

#[async_trait]
impl RemoteFileStore for GeminiFileStore {
    async fn upload(
        &self,
        path: &Path,
        display_name: &str,
        media_type: &str,
    ) -> AppResult<RemoteFileHandle> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            AppError::UploadFailed(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        let boundary = format!("lessongenie-{}", Uuid::new_v4().simple());
        let body = multipart_related_body(&boundary, display_name, media_type, &data);

        let response = self
            .client
            .request(Method::POST, &self.client.upload_endpoint())
            .header("X-Goog-Upload-Protocol", "multipart")
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await?;

        let response = check_status(response)
            .await?
            .map_err(|failure| AppError::UploadFailed(failure.to_string()))?;

        let uploaded: UploadFileResponse = response
            .json()
            .await
            .map_err(|e| AppError::UploadFailed(format!("Unexpected upload response: {}", e)))?;

        match uploaded.file.state {
            Some(FileState::Failed) => {
                return Err(AppError::UploadFailed(format!(
                    "File service could not process '{}'",
                    uploaded.file.name
                )));
            }
            Some(FileState::Processing) => {
                log::debug!("Remote file {} is still processing", uploaded.file.name);
            }
            Some(FileState::Active) | Some(FileState::Unknown) | None => {}
        }

        Ok(uploaded.file.into())
    }

    async fn get(&self, id: &str) -> AppResult<Option<RemoteFileHandle>> {
        if !is_file_resource_id(id) {
            return Ok(None);
        }
        let response = self
            .client
            .request(Method::GET, &self.client.endpoint(id))
            .send()
            .await?;

        match check_status(response).await? {
            Ok(response) => {
                let file: GeminiFile = response.json().await?;
                if matches!(file.state, Some(FileState::Failed) | Some(FileState::Unknown)) {
                    log::warn!("Remote file {} is in an unusable state", file.name);
                    return Ok(None);
                }
                Ok(Some(file.into()))
            }
            Err(failure) if failure.is_missing_file() => Ok(None),
            Err(failure) => Err(AppError::RemoteCallFailed(format!(
                "Failed to look up file '{}': {}",
                id, failure
            ))),
        }
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        if !is_file_resource_id(id) {
            return Ok(false);
        }
        let response = self
            .client
            .request(Method::DELETE, &self.client.endpoint(id))
            .send()
            .await?;

        match check_status(response).await? {
            Ok(_) => Ok(true),
            Err(failure) if failure.is_missing_file() => Ok(false),
            Err(failure) => Err(AppError::RemoteCallFailed(format!(
                "Failed to delete file '{}': {}",
                id, failure
            ))),
        }
    }
}
