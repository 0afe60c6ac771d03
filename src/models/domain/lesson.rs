use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A single step in the lesson's step-by-step guide.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// The sequential number of the step, starting at 1.
    pub step_number: u32,
    /// The concise title displayed in the header of the step.
    pub title: String,
    /// Detailed HTML content for the step's explanation.
    pub description_html: String,
}

/// Information about a visual aid (graph or image) tied to the question.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisualAid {
    /// Whether a relevant graph or image is associated with the question.
    #[serde(default)]
    pub is_present: bool,
    /// Placeholder; currently expected to be null.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl VisualAid {
    /// `isPresent=false` with no image carries no information.
    pub fn is_empty(&self) -> bool {
        !self.is_present && self.image_url.is_none()
    }
}

/// The detailed lesson for one selected question.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_step_order"))]
pub struct Lesson {
    /// Identifier of the specific question being explained.
    pub question_id: String,
    /// The exact text of the question being explained.
    pub question_text: String,
    /// Inferred subject area.
    pub subject: String,
    /// Inferred specific topic.
    pub topic: String,
    /// HTML content explaining the core concept.
    pub core_concept_html: String,
    /// Ordered list of steps to solve the question.
    #[validate(length(min = 1))]
    pub steps: Vec<Step>,
    /// Optional visual aid information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_aid: Option<VisualAid>,
    /// Helpful hints, may contain simple HTML.
    pub hints: Vec<String>,
}

impl Lesson {
    pub fn has_visual_aid(&self) -> bool {
        self.visual_aid.as_ref().is_some_and(|aid| aid.is_present)
    }

    /// Collapses the two "no visual aid" encodings into one.
    pub fn normalize_visual_aid(&mut self) {
        if self.visual_aid.as_ref().is_some_and(VisualAid::is_empty) {
            self.visual_aid = None;
        }
    }
}

/// Top-level envelope returned by the lesson generation call.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonEnvelope {
    #[validate(nested)]
    pub lesson_data: Lesson,
}

fn validate_step_order(lesson: &Lesson) -> Result<(), ValidationError> {
    let mut previous = 0u32;
    for step in &lesson.steps {
        if step.step_number <= previous {
            let mut err = ValidationError::new("step_order");
            err.message = Some(
                format!(
                    "stepNumber {} must be positive and greater than the previous step ({})",
                    step.step_number, previous
                )
                .into(),
            );
            return Err(err);
        }
        previous = step.step_number;
    }
    Ok(())
}
