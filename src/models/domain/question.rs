use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A single question identified in the PDF.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedQuestion {
    /// A unique identifier you assign to this question (e.g., 'q1', 'q2a').
    #[validate(length(min = 1))]
    pub question_id: String,
    /// The full text of the extracted question.
    #[validate(length(min = 1))]
    pub question_text: String,
}

/// The questions extracted from one uploaded PDF.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_question_list"))]
pub struct QuestionList {
    /// The unique name/ID of the PDF file provided in the input.
    #[serde(default)]
    pub pdf_file_id: String,
    /// An array of all questions identified in the document.
    #[validate(nested)]
    pub questions: Vec<ExtractedQuestion>,
}

impl QuestionList {
    pub fn find(&self, question_id: &str) -> Option<&ExtractedQuestion> {
        self.questions.iter().find(|q| q.question_id == question_id)
    }
}

fn validate_question_list(list: &QuestionList) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for question in &list.questions {
        if question.question_text.trim().is_empty() {
            let mut err = ValidationError::new("blank_question_text");
            err.message = Some(format!("question '{}' has blank text", question.question_id).into());
            return Err(err);
        }
        if !seen.insert(question.question_id.as_str()) {
            let mut err = ValidationError::new("duplicate_question_id");
            err.message = Some(format!("questionId '{}' appears more than once", question.question_id).into());
            return Err(err);
        }
    }
    Ok(())
}
