use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

/*
    GET /health
*/
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: state.environment.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let store = check_trip_store(&state).await;
    health.services.insert("trip_store".to_string(), store.clone());

    // Provider reachability is not checked.
    health.services.insert(
        "ai_provider".to_string(),
        ServiceStatus {
            status: "ok".to_string(),
            details: Some(format!("{} ({})", state.provider_name, state.model)),
        },
    );

    if store.status != "ok" {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

async fn check_trip_store(state: &AppState) -> ServiceStatus {
    match state.trips.ping().await {
        Ok(()) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("Trip store reachable".to_string()),
        },
        Err(e) => {
            log::error!("Trip store health check failed: {}", e);
            ServiceStatus {
                status: "error".to_string(),
                details: Some(format!("Failed to connect: {}", e)),
            }
        }
    }
}
