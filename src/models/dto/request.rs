use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of a lesson request for one question chosen from an extracted list.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateLessonRequest {
    #[validate(length(min = 1, max = 256))]
    pub pdf_file_id: String,

    #[validate(length(min = 1, max = 128))]
    pub selected_question_id: String,

    pub selected_question_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractQuestionsParams {
    pub filename: Option<String>,
}
