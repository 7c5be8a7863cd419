use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::review::ReviewSummaryInput;
use crate::routes::responses::{ai_failure, validation_failed};
use crate::state::AppState;

/*
    POST /api/ai/summarize/reviews
*/
pub async fn summarize_reviews(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    input: web::Json<ReviewSummaryInput>,
) -> impl Responder {
    let query = match input.into_inner().validate() {
        Ok(query) => query,
        Err(err) => return validation_failed(&err),
    };

    match state.review_summaries.summarize(&query).await {
        Ok(summary) => HttpResponse::Ok().json(json!({
            "success": true,
            "summary": summary,
            "generatedAt": Utc::now(),
        })),
        Err(err) => {
            log::error!(
                "Review summary error for POI {} (user {}): {}",
                query.poi_id,
                user.user_id,
                err
            );
            ai_failure("Failed to summarize reviews")
        }
    }
}
