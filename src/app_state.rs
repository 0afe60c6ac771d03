use std::sync::Arc;

use crate::{
    clients::gemini::GeminiClient,
    config::Config,
    errors::AppResult,
    repositories::{GeminiFileStore, RemoteFileStore},
    services::{
        extraction_service::QuestionExtractionService,
        file_lifecycle_service::FileLifecycleService,
        lesson_service::LessonService,
        model_service::{GeminiModelService, GenerativeModel},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub extraction_service: Arc<QuestionExtractionService>,
    pub lesson_service: Arc<LessonService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        let client = GeminiClient::new(&config)?;
        log::info!("Using model '{}' at {}", client.model(), config.gemini_api_base_url);

        let store = Arc::new(GeminiFileStore::new(client.clone()));
        let model = Arc::new(GeminiModelService::new(client));

        Ok(Self::from_parts(config, store, model))
    }

    /// Wires the services around any file store and model.
    pub fn from_parts(
        config: Config,
        store: Arc<dyn RemoteFileStore>,
        model: Arc<dyn GenerativeModel>,
    ) -> Self {
        let config = Arc::new(config);
        let files = Arc::new(FileLifecycleService::new(store, config.remote_call_timeout()));

        let extraction_service = Arc::new(QuestionExtractionService::new(
            files.clone(),
            model.clone(),
            config.clone(),
        ));
        let lesson_service = Arc::new(LessonService::new(files, model, config.clone()));

        Self {
            extraction_service,
            lesson_service,
            config,
        }
    }
}
