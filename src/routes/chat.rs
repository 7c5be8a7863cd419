use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::error::ChatError;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::chat::ChatInput;
use crate::routes::responses::{ai_failure, validation_failed};
use crate::state::AppState;

/*
    POST /api/ai/chat
*/
pub async fn chat(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    input: web::Json<ChatInput>,
) -> impl Responder {
    let query = match input.into_inner().validate(&user.user_id) {
        Ok(query) => query,
        Err(err) => return validation_failed(&err),
    };

    match state.chat_guide.respond(query).await {
        Ok(exchange) => HttpResponse::Ok().json(json!({
            "success": true,
            "response": exchange.response,
            "suggestions": exchange.suggestions,
            "timestamp": exchange.timestamp,
        })),
        Err(ChatError::InvalidInput(err)) => validation_failed(&err),
        Err(err) => {
            log::error!("AI chat error for user {}: {}", user.user_id, err);
            ai_failure("Failed to process chat message")
        }
    }
}
