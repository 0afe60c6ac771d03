use std::sync::Arc;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::{remote_file::is_file_resource_id, LessonEnvelope},
        dto::request::GenerateLessonRequest,
    },
    services::{
        file_lifecycle_service::{CleanupPolicy, FileLifecycleService},
        model_service::{generate_validated, GenerativeModel},
        prompt_builder::{build_prompt, PromptTask},
    },
};

/// Phase (b): explain one previously extracted question.
///
/// The remote file is deleted once this phase ends, whatever the outcome.
pub struct LessonService {
    files: Arc<FileLifecycleService>,
    model: Arc<dyn GenerativeModel>,
    config: Arc<Config>,
}

impl LessonService {
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

    pub async fn generate_lesson(&self, request: &GenerateLessonRequest) -> AppResult<LessonEnvelope> {
        let file_id = request.pdf_file_id.trim();
        let question_id = request.selected_question_id.trim();
        if file_id.is_empty() || question_id.is_empty() {
            return Err(AppError::InputInvalid(
                "pdfFileId and selectedQuestionId must not be blank".to_string(),
            ));
        }
        if !is_file_resource_id(file_id) {
            log::warn!("Refusing lesson request for non-file resource '{}'", file_id);
            return Err(AppError::FileExpired(file_id.to_string()));
        }

        log::info!("Generating lesson for question '{}' in {}", question_id, file_id);

        let mut envelope = self
            .files
            .run_scoped(
                file_id,
                CleanupPolicy::Always,
                self.config.remote_call_timeout(),
                async {
                    let handle = self.files.resolve(file_id).await?;
                    let prompt = build_prompt(
                        PromptTask::GenerateLesson {
                            question_id,
                            question_text: request.selected_question_text.as_deref(),
                        },
                        &handle.display_name,
                        &handle.id,
                    );
                    generate_validated::<LessonEnvelope>(
                        self.model.as_ref(),
                        &handle,
                        &prompt,
                        self.config.generation_attempts,
                    )
                    .await
                },
            )
            .await?;

        let lesson = &mut envelope.lesson_data;
        if lesson.question_id != question_id {
            log::warn!(
                "Model labelled the lesson '{}' but '{}' was requested; keeping the requested id",
                lesson.question_id,
                question_id
            );
            lesson.question_id = question_id.to_string();
        }

        log::info!(
            "Lesson for '{}' ready with {} step(s)",
            question_id,
            lesson.steps.len()
        );
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        services::model_service::MockGenerativeModel,
        test_utils::{fixtures, InMemoryRemoteFileStore},
    };
    use std::time::Duration;

    fn service(store: &Arc<InMemoryRemoteFileStore>, model: MockGenerativeModel) -> LessonService {
        let files = Arc::new(FileLifecycleService::new(store.clone(), Duration::from_secs(1)));
        LessonService::new(files, Arc::new(model), Arc::new(Config::test_config()))
    }

    fn request(file_id: &str, question_id: &str) -> GenerateLessonRequest {
        GenerateLessonRequest {
            pdf_file_id: file_id.to_string(),
            selected_question_id: question_id.to_string(),
            selected_question_text: Some("Solve 2x + 3 = 7.".to_string()),
        }
    }

    #[tokio::test]
    async fn lesson_is_returned_and_file_deleted() {
        let store = Arc::new(InMemoryRemoteFileStore::new());
        let handle = store.insert_pdf("algebra.pdf");
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate_json()
            .withf(|_, prompt, _| {
                prompt.contains("question ID 'q2a'") && prompt.contains("'Solve 2x + 3 = 7....'")
            })
            .times(1)
            .returning(|_, _, _| Ok(fixtures::lesson_json("q2a")));

        let envelope = service(&store, model)
            .generate_lesson(&request(&handle.id, "q2a"))
            .await
            .unwrap();

        assert_eq!(envelope.lesson_data.question_id, "q2a");
        assert_eq!(envelope.lesson_data.steps.len(), 2);
        assert!(envelope.lesson_data.visual_aid.is_none());
        assert!(!store.contains(&handle.id));
    }

    #[tokio::test]
    async fn missing_steps_is_schema_violation_and_file_deleted() {
        let store = Arc::new(InMemoryRemoteFileStore::new());
        let handle = store.insert_pdf("algebra.pdf");
        let mut model = MockGenerativeModel::new();
        model.expect_generate_json().times(1).returning(|_, _, _| {
            let mut lesson: serde_json::Value =
                serde_json::from_str(&fixtures::lesson_json("q1")).unwrap();
            lesson["lessonData"].as_object_mut().unwrap().remove("steps");
            Ok(lesson.to_string())
        });

        let err = service(&store, model)
            .generate_lesson(&request(&handle.id, "q1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::SchemaViolation(_)));
        assert!(!store.contains(&handle.id));
    }

    #[tokio::test]
    async fn expired_file_is_reported_without_calling_model() {
        let store = Arc::new(InMemoryRemoteFileStore::new());
        let handle = store.insert_pdf("algebra.pdf");
        store.expire(&handle.id);
        let mut model = MockGenerativeModel::new();
        model.expect_generate_json().never();

        let err = service(&store, model)
            .generate_lesson(&request(&handle.id, "q1"))
            .await
            .unwrap_err();

        assert_eq!(err, AppError::FileExpired(handle.id.clone()));
    }

    #[tokio::test]
    async fn requested_question_id_wins() {
        let store = Arc::new(InMemoryRemoteFileStore::new());
        let handle = store.insert_pdf("algebra.pdf");
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate_json()
            .returning(|_, _, _| Ok(fixtures::lesson_json("question-1")));

        let envelope = service(&store, model)
            .generate_lesson(&request(&handle.id, "q1"))
            .await
            .unwrap();

        assert_eq!(envelope.lesson_data.question_id, "q1");
    }

    #[tokio::test]
    async fn second_lesson_for_same_file_is_expired() {
        let store = Arc::new(InMemoryRemoteFileStore::new());
        let handle = store.insert_pdf("algebra.pdf");
        let mut model = MockGenerativeModel::new();
        model
            .expect_generate_json()
            .times(1)
            .returning(|_, _, _| Ok(fixtures::lesson_json("q1")));
        let lessons = service(&store, model);

        lessons.generate_lesson(&request(&handle.id, "q1")).await.unwrap();
        let err = lessons
            .generate_lesson(&request(&handle.id, "q2a"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::FileExpired(_)));
    }

    #[tokio::test]
    async fn blank_ids_are_rejected_before_any_remote_call() {
        let store = Arc::new(InMemoryRemoteFileStore::new());
        let mut model = MockGenerativeModel::new();
        model.expect_generate_json().never();

        let err = service(&store, model)
            .generate_lesson(&request("   ", "q1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InputInvalid(_)));
        assert_eq!(store.total_delete_calls(), 0);
    }

    #[tokio::test]
    async fn foreign_resource_ids_are_expired_without_store_calls() {
        let store = Arc::new(InMemoryRemoteFileStore::new());
        let mut model = MockGenerativeModel::new();
        model.expect_generate_json().never();
        let service = service(&store, model);

        for id in ["tunedModels/prod", "files/../x"] {
            let err = service.generate_lesson(&request(id, "q1")).await.unwrap_err();
            assert!(matches!(err, AppError::FileExpired(ref got) if got == id));
        }
        assert_eq!(store.get_count(), 0);
        assert_eq!(store.total_delete_calls(), 0);
    }
}
