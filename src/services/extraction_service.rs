use std::{path::Path, sync::Arc};

use tempfile::TempDir;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::QuestionList,
    services::{
        file_lifecycle_service::{with_deadline, CleanupPolicy, FileLifecycleService, PDF_MAGIC},
        model_service::{generate_validated, GenerativeModel},
        prompt_builder::{build_prompt, PromptTask},
    },
};

/// Name of the staged copy inside the per-request directory.
const STAGED_FILE_NAME: &str = "upload.pdf";

/// Phase (a): upload a PDF and list the questions in it.
///
/// On success the remote file is left in place for a later lesson request.
pub struct QuestionExtractionService {
    files: Arc<FileLifecycleService>,
    model: Arc<dyn GenerativeModel>,
    config: Arc<Config>,
}

impl QuestionExtractionService {
    pub fn new(
        files: Arc<FileLifecycleService>,
        model: Arc<dyn GenerativeModel>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            files,
            model,
            config,
        }
    }

    pub async fn extract_questions(
        &self,
        data: &[u8],
        filename: Option<&str>,
    ) -> AppResult<QuestionList> {
        check_pdf_bytes(data, self.config.max_upload_bytes)?;

        let staging = self.stage_upload(data).await?;
        let local_path = staging.path().join(STAGED_FILE_NAME);

        let outcome = self
            .upload_and_extract(&local_path, filename.unwrap_or_default())
            .await;

        if let Err(e) = staging.close() {
            log::warn!("Failed to remove temporary upload directory: {}", e);
        }
        outcome
    }

    async fn stage_upload(&self, data: &[u8]) -> AppResult<TempDir> {
        let root = Path::new(&self.config.temp_upload_dir);
        tokio::fs::create_dir_all(root).await?;

        let staging = tempfile::Builder::new().prefix("upload-").tempdir_in(root)?;
        let local_path = staging.path().join(STAGED_FILE_NAME);
        tokio::fs::write(&local_path, data).await?;

        log::info!("Staged {} bytes at {}", data.len(), local_path.display());
        Ok(staging)
    }

    async fn upload_and_extract(&self, local_path: &Path, display_name: &str) -> AppResult<QuestionList> {
        let deadline = self.config.remote_call_timeout();

        let handle = with_deadline(
            deadline,
            "PDF upload",
            self.files.upload(local_path, display_name),
        )
        .await?;

        let prompt = build_prompt(PromptTask::ExtractQuestions, &handle.display_name, &handle.id);
        let mut list = self
            .files
            .run_scoped(
                &handle.id,
                CleanupPolicy::OnFailure,
                deadline,
                generate_validated::<QuestionList>(
                    self.model.as_ref(),
                    &handle,
                    &prompt,
                    self.config.generation_attempts,
                ),
            )
            .await?;

        if !list.pdf_file_id.is_empty() && list.pdf_file_id != handle.id {
            log::warn!(
                "Model echoed file id '{}' instead of '{}'; using the uploaded id",
                list.pdf_file_id,
                handle.id
            );
        }
        list.pdf_file_id = handle.id;

        log::info!(
            "Extracted {} question(s) from '{}' ({})",
            list.questions.len(),
            handle.display_name,
            list.pdf_file_id
        );
        Ok(list)
    }
}

/// Rejects bodies that cannot be a PDF before anything leaves the process.
pub fn check_pdf_bytes(data: &[u8], max_bytes: usize) -> AppResult<()> {
    if data.is_empty() {
        return Err(AppError::InputInvalid("Uploaded PDF is empty.".to_string()));
    }
    if data.len() > max_bytes {
        return Err(AppError::InputInvalid(format!(
            "Uploaded PDF is {} bytes; the limit is {} bytes.",
            data.len(),
            max_bytes
        )));
    }
    if !data.starts_with(PDF_MAGIC) {
        return Err(AppError::InputInvalid(
            "Uploaded file is not a PDF.".to_string(),
        ));
    }
    Ok(())
}
