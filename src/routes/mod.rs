use actix_web::web;

use crate::middleware::auth::AuthMiddleware;
use crate::middleware::rate_limit::RateLimit;

pub mod chat;
pub mod health;
pub mod insights;
pub mod plan;
pub mod responses;
pub mod reviews;

/// Middleware shared by every worker. Build once, clone into each `App`.
#[derive(Clone)]
pub struct ApiGuards {
    pub jwt_secret: String,
    pub generation_limit: RateLimit,
    pub general_limit: RateLimit,
}

impl ApiGuards {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            jwt_secret: jwt_secret.to_string(),
            generation_limit: RateLimit::ai_generation(),
            general_limit: RateLimit::general(),
        }
    }
}

/// Mounts `/api/ai/*`. Auth runs before rate limiting.
pub fn configure(cfg: &mut web::ServiceConfig, guards: &ApiGuards) {
    cfg.app_data(web::JsonConfig::default().error_handler(responses::payload_error))
        .app_data(web::QueryConfig::default().error_handler(responses::payload_error))
        .service(
            web::scope("/api/ai")
                .service(
                    web::scope("/plan")
                        .wrap(guards.generation_limit.clone())
                        .route("", web::post().to(plan::plan_itinerary))
                        .route("/{trip_id}", web::patch().to(plan::replan_itinerary)),
                )
                .service(
                    web::scope("")
                        .wrap(guards.general_limit.clone())
                        .route("/chat", web::post().to(chat::chat))
                        .route(
                            "/insights/{destination_id}",
                            web::get().to(insights::destination_insights),
                        )
                        .route(
                            "/summarize/reviews",
                            web::post().to(reviews::summarize_reviews),
                        ),
                )
                .wrap(AuthMiddleware::new(guards.jwt_secret.clone())),
        );
}
