use actix_web::{error::InternalError, HttpRequest, HttpResponse};
use serde_json::json;

use crate::error::InvalidInputError;

pub const AI_UNAVAILABLE: &str = "Our AI is temporarily unavailable. Please try again in a few minutes.";

pub fn validation_failed(err: &InvalidInputError) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "success": false,
        "error": "Validation failed",
        "details": err.details,
    }))
}

pub fn not_found(error: &str) -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "success": false,
        "error": error,
    }))
}

/// 500 with a generic message; callers log the cause.
pub fn ai_failure(error: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({
        "success": false,
        "error": error,
        "message": AI_UNAVAILABLE,
    }))
}

/// Body/query deserialization failures render like validation failures.
pub fn payload_error<E>(err: E, _req: &HttpRequest) -> actix_web::Error
where
    E: std::fmt::Display + std::fmt::Debug + 'static,
{
    let response = validation_failed(&InvalidInputError::single(err.to_string()));
    InternalError::from_response(err, response).into()
}

pub fn server_error(error: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({
        "success": false,
        "error": error,
    }))
}
