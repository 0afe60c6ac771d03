use actix_web::{error::JsonPayloadError, get, post, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::get_request_id,
    models::dto::request::{ExtractQuestionsParams, GenerateLessonRequest},
};

#[post("/extract-questions")]
pub async fn extract_questions(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ExtractQuestionsParams>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let request_id = get_request_id(&req);
    log::info!(
        "[{}] Question extraction requested ({} bytes, filename {:?})",
        request_id,
        body.len(),
        query.filename
    );

    match state
        .extraction_service
        .extract_questions(&body, query.filename.as_deref())
        .await
    {
        Ok(list) => {
            log::info!(
                "[{}] Returning {} question(s) for {}",
                request_id,
                list.questions.len(),
                list.pdf_file_id
            );
            Ok(HttpResponse::Ok().json(list))
        }
        Err(e) => {
            log::error!("[{}] Question extraction failed ({}): {}", request_id, e.error_code(), e);
            Err(e)
        }
    }
}

#[post("/generate-specific-lesson")]
pub async fn generate_specific_lesson(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<GenerateLessonRequest>,
) -> Result<HttpResponse, AppError> {
    let request_id = get_request_id(&req);
    let request = request.into_inner();
    request.validate()?;

    log::info!(
        "[{}] Lesson requested for question '{}' in {}",
        request_id,
        request.selected_question_id,
        request.pdf_file_id
    );

    match state.lesson_service.generate_lesson(&request).await {
        Ok(envelope) => Ok(HttpResponse::Ok().json(envelope)),
        Err(e) => {
            log::error!("[{}] Lesson generation failed ({}): {}", request_id, e.error_code(), e);
            Err(e)
        }
    }
}

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// JSON extractor settings that report body errors in the `{detail}` shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let detail = match &err {
            JsonPayloadError::ContentType => "Expected a JSON request body".to_string(),
            other => format!("Invalid request body: {}", other),
        };
        AppError::InputInvalid(detail).into()
    })
}
