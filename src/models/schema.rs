//! Generation-constraint schemas handed to the model.
//!
//! The schemas are derived from the application data model, so the shape the
//! model is told to emit and the shape the validator accepts come from the
//! same type definitions.

use once_cell::sync::Lazy;
use schemars::{generate::SchemaSettings, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use crate::models::domain::{LessonEnvelope, QuestionList};

/// Keywords the generation endpoint has no use for.
const STRIPPED_KEYWORDS: &[&str] = &["$schema", "$defs", "default"];

pub static QUESTION_LIST_SCHEMA: Lazy<Value> = Lazy::new(generation_schema::<QuestionList>);
pub static LESSON_ENVELOPE_SCHEMA: Lazy<Value> = Lazy::new(generation_schema::<LessonEnvelope>);

/// A response shape the model can be asked to produce.
pub trait ModelResponse: DeserializeOwned + Validate + JsonSchema + Send {
    /// Human-readable name used in logs and error details.
    const KIND: &'static str;

    fn generation_schema() -> &'static Value;

    /// Post-validation canonicalization.
    fn normalize(&mut self) {}
}

impl ModelResponse for QuestionList {
    const KIND: &'static str = "question list";

    fn generation_schema() -> &'static Value {
        &QUESTION_LIST_SCHEMA
    }
}

impl ModelResponse for LessonEnvelope {
    const KIND: &'static str = "lesson";

    fn generation_schema() -> &'static Value {
        &LESSON_ENVELOPE_SCHEMA
    }

    fn normalize(&mut self) {
        self.lesson_data.normalize_visual_aid();
    }
}

/// Builds a self-contained JSON schema for `T` with every subschema inlined.
pub fn generation_schema<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft2020_12()
        .with(|settings| settings.inline_subschemas = true)
        .into_generator();
    let mut schema = Value::from(generator.into_root_schema_for::<T>());

    if let Value::Object(root) = &mut schema {
        root.remove("title");
    }
    strip_keywords(&mut schema);
    schema
}

fn strip_keywords(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for keyword in STRIPPED_KEYWORDS {
                map.remove(*keyword);
            }
            for (key, child) in map.iter_mut() {
                // property names are data, not keywords
                if key == "properties" {
                    if let Value::Object(properties) = child {
                        properties.values_mut().for_each(strip_keywords);
                    }
                } else {
                    strip_keywords(child);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(strip_keywords),
        _ => {}
    }
}

/// Names listed in the schema's `required` array.
pub fn required_fields(schema: &Value) -> Vec<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|fields| fields.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}
