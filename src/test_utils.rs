#[cfg(test)]
pub mod fixtures {
    use serde_json::json;

    /// Smallest byte string that passes the PDF header check.
    pub fn pdf_bytes() -> Vec<u8> {
        b"%PDF-1.7\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n".to_vec()
    }

    pub fn question_list_json() -> String {
        json!({
            "pdfFileId": "files/ignored-by-server",
            "questions": [
                { "questionId": "q1", "questionText": "Define photosynthesis." },
                { "questionId": "q2a", "questionText": "Solve 2x + 3 = 7." }
            ]
        })
        .to_string()
    }

    pub fn lesson_json(question_id: &str) -> String {
        json!({
            "lessonData": {
                "questionId": question_id,
                "questionText": "Solve 2x + 3 = 7.",
                "subject": "Mathematics",
                "topic": "Linear equations",
                "coreConceptHtml": "<p>Isolate the variable.</p>",
                "steps": [
                    { "stepNumber": 1, "title": "Subtract 3", "descriptionHtml": "<p>2x = 4</p>" },
                    { "stepNumber": 2, "title": "Divide by 2", "descriptionHtml": "<p>x = 2</p>" }
                ],
                "visualAid": { "isPresent": false, "imageUrl": null },
                "hints": ["Undo addition first."]
            }
        })
        .to_string()
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod in_memory {
    use std::{
        collections::HashMap,
        path::Path,
        sync::{
            atomic::{AtomicBool, AtomicUsize, Ordering},
            Mutex,
        },
    };

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use crate::{
        errors::{AppError, AppResult},
        models::domain::RemoteFileHandle,
        repositories::RemoteFileStore,
    };

    /// File service double that keeps handles in memory and counts calls.
    #[derive(Default)]
    pub struct InMemoryRemoteFileStore {
        files: Mutex<HashMap<String, RemoteFileHandle>>,
        delete_calls: Mutex<HashMap<String, usize>>,
        uploads: AtomicUsize,
        gets: AtomicUsize,
        fail_uploads: AtomicBool,
        fail_deletes: AtomicBool,
    }

    impl InMemoryRemoteFileStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert_pdf(&self, display_name: &str) -> RemoteFileHandle {
            let id = format!("files/{}", Uuid::new_v4().simple());
            let handle = RemoteFileHandle::new_pdf(
                id.clone(),
                display_name,
                format!("https://files.test/v1beta/{}", id),
            );
            self.files.lock().unwrap().insert(id, handle.clone());
            handle
        }

        /// Drops the file as the remote service would after its retention window.
        pub fn expire(&self, id: &str) {
            self.files.lock().unwrap().remove(id);
        }

        pub fn set_expiry(&self, id: &str, expires_at: DateTime<Utc>) {
            if let Some(handle) = self.files.lock().unwrap().get_mut(id) {
                handle.expires_at = Some(expires_at);
            }
        }

        pub fn fail_uploads(&self) {
            self.fail_uploads.store(true, Ordering::SeqCst);
        }

        pub fn fail_deletes(&self) {
            self.fail_deletes.store(true, Ordering::SeqCst);
        }

        pub fn contains(&self, id: &str) -> bool {
            self.files.lock().unwrap().contains_key(id)
        }

        pub fn len(&self) -> usize {
            self.files.lock().unwrap().len()
        }

        pub fn upload_count(&self) -> usize {
            self.uploads.load(Ordering::SeqCst)
        }

        pub fn get_count(&self) -> usize {
            self.gets.load(Ordering::SeqCst)
        }

        pub fn display_name_of(&self, id: &str) -> Option<String> {
            self.files.lock().unwrap().get(id).map(|h| h.display_name.clone())
        }

        pub fn delete_calls(&self, id: &str) -> usize {
            self.delete_calls.lock().unwrap().get(id).copied().unwrap_or(0)
        }

        pub fn total_delete_calls(&self) -> usize {
            self.delete_calls.lock().unwrap().values().sum()
        }
    }

    #[async_trait]
    impl RemoteFileStore for InMemoryRemoteFileStore {
        async fn upload(
            &self,
            path: &Path,
            display_name: &str,
            media_type: &str,
        ) -> AppResult<RemoteFileHandle> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            if self.fail_uploads.load(Ordering::SeqCst) {
                return Err(AppError::UploadFailed(format!(
                    "simulated rejection of {}",
                    path.display()
                )));
            }
            let mut handle = self.insert_pdf(display_name);
            handle.media_type = media_type.to_string();
            Ok(handle)
        }

        async fn get(&self, id: &str) -> AppResult<Option<RemoteFileHandle>> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            Ok(self.files.lock().unwrap().get(id).cloned())
        }

        async fn delete(&self, id: &str) -> AppResult<bool> {
            *self
                .delete_calls
                .lock()
                .unwrap()
                .entry(id.to_string())
                .or_insert(0) += 1;
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(AppError::RemoteCallFailed("simulated delete failure".to_string()));
            }
            Ok(self.files.lock().unwrap().remove(id).is_some())
        }
    }
}

#[cfg(test)]
pub use in_memory::InMemoryRemoteFileStore;

#[cfg(test)]
mod tests {
    use super::{fixtures::*, InMemoryRemoteFileStore};
    use crate::{
        models::domain::{LessonEnvelope, QuestionList},
        repositories::RemoteFileStore,
        services::{file_lifecycle_service::PDF_MAGIC, response_validator::parse_and_validate},
    };

    #[test]
    fn test_fixtures_are_valid_model_output() {
        assert!(pdf_bytes().starts_with(PDF_MAGIC));
        assert!(parse_and_validate::<QuestionList>(&question_list_json()).is_ok());
        assert!(parse_and_validate::<LessonEnvelope>(&lesson_json("q1")).is_ok());
    }

    #[tokio::test]
    async fn test_in_memory_store_delete_is_idempotent() {
        let store = InMemoryRemoteFileStore::new();
        let handle = store.insert_pdf("exam.pdf");

        assert!(store.delete(&handle.id).await.unwrap());
        assert!(!store.delete(&handle.id).await.unwrap());
        assert_eq!(store.delete_calls(&handle.id), 2);
        assert_eq!(store.len(), 0);
    }
}
