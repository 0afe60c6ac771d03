use std::{future::Future, path::Path, sync::Arc, time::Duration};

use chrono::Utc;
use tokio::io::AsyncReadExt;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{
        remote_file::{is_file_resource_id, PDF_MEDIA_TYPE},
        RemoteFileHandle,
    },
    repositories::RemoteFileStore,
};

pub const PDF_MAGIC: &[u8] = b"%PDF-";

pub const DEFAULT_DISPLAY_NAME: &str = "uploaded_exam.pdf";

/// When a scoped phase deletes the remote file it works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Delete on every exit path.
    Always,
    /// Delete only when the phase fails, times out or is cancelled.
    OnFailure,
}

/// Owns upload, re-resolution and deletion of remote files.
pub struct FileLifecycleService {
    store: Arc<dyn RemoteFileStore>,
    cleanup_timeout: Duration,
}

impl FileLifecycleService {
    pub fn new(store: Arc<dyn RemoteFileStore>, cleanup_timeout: Duration) -> Self {
        Self {
            store,
            cleanup_timeout,
        }
    }

    pub async fn upload(&self, local_path: &Path, display_name: &str) -> AppResult<RemoteFileHandle> {
        let metadata = tokio::fs::metadata(local_path).await.map_err(|_| {
            AppError::InputInvalid(format!("File not found at path: {}", local_path.display()))
        })?;
        if !metadata.is_file() {
            return Err(AppError::InputInvalid(format!(
                "{} is not a regular file",
                local_path.display()
            )));
        }
        if metadata.len() == 0 {
            return Err(AppError::InputInvalid("PDF file is empty.".to_string()));
        }
        if !has_pdf_header(local_path).await? {
            return Err(AppError::InputInvalid("Uploaded file is not a PDF.".to_string()));
        }

        let display_name = display_name_for(Some(display_name));

        log::info!(
            "Uploading '{}' ({} bytes) as '{}'",
            local_path.display(),
            metadata.len(),
            display_name
        );

        match self.store.upload(local_path, &display_name, PDF_MEDIA_TYPE).await {
            Ok(handle) => {
                log::info!("Uploaded {} ({})", handle.id, handle.display_name);
                Ok(handle)
            }
            Err(err @ (AppError::UploadFailed(_) | AppError::Timeout(_))) => {
                log::error!("Upload of '{}' failed: {}", display_name, err);
                Err(err)
            }
            Err(err) => {
                log::error!("Upload of '{}' failed: {}", display_name, err);
                Err(AppError::UploadFailed(err.to_string()))
            }
        }
    }

    /// Looks up a previously issued id; unknown and expired ids are `FileExpired`.
    pub async fn resolve(&self, id: &str) -> AppResult<RemoteFileHandle> {
        if !is_file_resource_id(id) {
            log::warn!("Refusing to resolve '{}': not a file resource name", id);
            return Err(AppError::FileExpired(id.to_string()));
        }
        match self.store.get(id).await? {
            Some(handle) if !handle.is_expired_at(Utc::now()) => {
                log::info!("Resolved {} ({})", handle.id, handle.display_name);
                Ok(handle)
            }
            Some(_) | None => {
                log::warn!("Remote file {} not found; it may have expired", id);
                Err(AppError::FileExpired(id.to_string()))
            }
        }
    }

    /// Best-effort delete. Failures are logged and swallowed.
    pub async fn delete(&self, id: &str) {
        delete_best_effort(self.store.as_ref(), id, self.cleanup_timeout).await;
    }

    /// Runs `phase` under `deadline` and applies `policy` to the remote file
    /// `id` afterwards.
    ///
    /// If the returned future is dropped before completion, the delete is
    /// handed to the runtime instead.
    pub async fn run_scoped<T, F>(
        &self,
        id: &str,
        policy: CleanupPolicy,
        deadline: Duration,
        phase: F,
    ) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let mut guard = DeleteOnDrop::new(self.store.clone(), id, self.cleanup_timeout);

        let outcome = with_deadline(deadline, "remote phase", phase).await;

        guard.disarm();
        let should_delete = match policy {
            CleanupPolicy::Always => true,
            CleanupPolicy::OnFailure => outcome.is_err(),
        };
        if should_delete {
            self.delete(id).await;
        }

        outcome
    }
}

/// Bounds `future` by `deadline`, turning expiry into `AppError::Timeout`.
pub async fn with_deadline<T, F>(deadline: Duration, what: &str, future: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(outcome) => outcome,
        Err(_) => Err(AppError::Timeout(format!(
            "{} did not finish within {:?}",
            what, deadline
        ))),
    }
}

/// Last path component of the client-supplied name, or the default.
pub fn display_name_for(filename: Option<&str>) -> String {
    filename
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .filter(|name| !name.chars().any(char::is_control))
        .unwrap_or(DEFAULT_DISPLAY_NAME)
        .to_string()
}

async fn has_pdf_header(path: &Path) -> AppResult<bool> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut header = [0u8; 5];
    let mut filled = 0;
    while filled < header.len() {
        let read = file.read(&mut header[filled..]).await?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(&header[..filled] == PDF_MAGIC)
}

async fn delete_best_effort(store: &dyn RemoteFileStore, id: &str, timeout: Duration) {
    if !is_file_resource_id(id) {
        log::warn!("Refusing to delete '{}': not a file resource name", id);
        return;
    }
    log::info!("Attempting to delete remote file {}", id);
    match tokio::time::timeout(timeout, store.delete(id)).await {
        Ok(Ok(true)) => log::info!("Remote file {} deleted", id),
        Ok(Ok(false)) => log::debug!("Remote file {} was already gone", id),
        Ok(Err(err)) => log::warn!("Failed to delete remote file {}: {}", id, err),
        Err(_) => log::warn!("Timed out deleting remote file {}", id),
    }
}

/// Deletes the remote file from a spawned task if dropped while armed.
struct DeleteOnDrop {
    store: Arc<dyn RemoteFileStore>,
    id: String,
    timeout: Duration,
    armed: bool,
}

impl DeleteOnDrop {
    fn new(store: Arc<dyn RemoteFileStore>, id: &str, timeout: Duration) -> Self {
        Self {
            store,
            id: id.to_string(),
            timeout,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for DeleteOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let store = self.store.clone();
        let id = std::mem::take(&mut self.id);
        let timeout = self.timeout;
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                log::warn!("Phase for remote file {} was cancelled; scheduling delete", id);
                runtime.spawn(async move {
                    delete_best_effort(store.as_ref(), &id, timeout).await;
                });
            }
            Err(_) => log::warn!("No runtime to delete remote file {}; it will expire on its own", id),
        }
    }
}
