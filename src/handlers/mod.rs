pub mod lesson_handler;

pub use lesson_handler::{
    extract_questions, generate_specific_lesson, health_check, json_config,
};
