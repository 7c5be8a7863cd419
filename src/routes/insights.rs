use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::insights::InsightsParams;
use crate::routes::responses::{ai_failure, validation_failed};
use crate::state::AppState;

/*
    GET /api/ai/insights/{destinationId}?aspects=a,b&timeframe=current
*/
pub async fn destination_insights(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<InsightsParams>,
) -> impl Responder {
    let query = match params.into_inner().validate(path.into_inner()) {
        Ok(query) => query,
        Err(err) => return validation_failed(&err),
    };

    match state.insights.generate(&query).await {
        Ok(insights) => HttpResponse::Ok().json(json!({
            "success": true,
            "insights": insights,
            "generatedAt": Utc::now(),
        })),
        Err(err) => {
            log::error!(
                "AI insights error for {} (user {}): {}",
                query.destination,
                user.user_id,
                err
            );
            ai_failure("Failed to generate destination insights")
        }
    }
}
