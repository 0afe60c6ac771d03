pub mod extraction_service;
pub mod file_lifecycle_service;
pub mod lesson_service;
pub mod model_service;
pub mod prompt_builder;
pub mod response_validator;
