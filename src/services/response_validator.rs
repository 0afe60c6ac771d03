use serde_json::Value;

use crate::{
    errors::{AppError, AppResult},
    models::schema::ModelResponse,
};

/// Parses raw model text and checks it against the application model for `T`.
///
/// Text that is not JSON at all is `MalformedJson`; JSON that does not fit the
/// expected structure (missing fields, wrong types, failed validation rules)
/// is `SchemaViolation`. The caller keeps `raw` for logging.
pub fn parse_and_validate<T: ModelResponse>(raw: &str) -> AppResult<T> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::MalformedJson(format!("{} response is not valid JSON: {}", T::KIND, e)))?;

    let mut parsed: T = serde_json::from_value(value)
        .map_err(|e| AppError::SchemaViolation(format!("{} response: {}", T::KIND, e)))?;

    parsed.validate().map_err(|e| {
        AppError::SchemaViolation(format!("{} response failed validation: {}", T::KIND, e))
    })?;

    parsed.normalize();
    Ok(parsed)
}
