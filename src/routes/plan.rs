use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::replan::{ReplanInput, ReplanRequest};
use crate::models::trip::{PlanItineraryInput, Trip, TripStatus};
use crate::routes::responses::{ai_failure, not_found, server_error, validation_failed};
use crate::state::AppState;

/*
    POST /api/ai/plan
*/
pub async fn plan_itinerary(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    input: web::Json<PlanItineraryInput>,
) -> impl Responder {
    let mut request = match input.into_inner().validate() {
        Ok(request) => request,
        Err(err) => return validation_failed(&err),
    };

    let trip = match state.trips.create_trip(Trip::draft(&user.user_id, &request)).await {
        Ok(trip) => trip,
        Err(err) => {
            log::error!("Failed to create draft trip for user {}: {}", user.user_id, err);
            return server_error("Failed to create trip");
        }
    };
    request.trip_id = Some(trip.id.clone());

    let variants = match state.orchestrator.generate_itinerary(&request).await {
        Ok(variants) => variants,
        Err(err) => {
            log::error!("AI itinerary planning error for trip {}: {}", trip.id, err);
            return ai_failure("Failed to generate itinerary");
        }
    };

    // The balanced variant becomes the working itinerary.
    match serde_json::to_value(&variants[1]) {
        Ok(working) => {
            if let Err(err) = state
                .trips
                .update_itinerary(&trip.id, &user.user_id, working, TripStatus::Planned)
                .await
            {
                log::error!("Failed to store working itinerary for trip {}: {}", trip.id, err);
            }
        }
        Err(err) => log::error!("Failed to serialize working itinerary for trip {}: {}", trip.id, err),
    }

    HttpResponse::Ok().json(json!({
        "success": true,
        "tripId": trip.id,
        "variants": variants,
        "generatedAt": Utc::now(),
    }))
}

/*
    PATCH /api/ai/plan/{tripId}
*/
pub async fn replan_itinerary(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: web::Json<ReplanInput>,
) -> impl Responder {
    let trip_id = path.into_inner();
    let changes = match input.into_inner().validate() {
        Ok(changes) => changes,
        Err(err) => return validation_failed(&err),
    };

    let trip = match state.trips.get_trip(&trip_id, &user.user_id).await {
        Ok(Some(trip)) => trip,
        Ok(None) => return not_found("Trip not found"),
        Err(err) => {
            log::error!("Failed to load trip {}: {}", trip_id, err);
            return server_error("Failed to load trip");
        }
    };

    let request = ReplanRequest {
        trip_id: trip.id.clone(),
        destination: Some(trip.destination.clone()),
        existing_itinerary: trip.itinerary.clone().unwrap_or_else(|| json!({})),
        locked_items: changes.locked_items,
        constraints: changes.constraints,
        modifications: changes.modifications,
    };

    let itinerary = match state.replanner.replan(&request).await {
        Ok(itinerary) => itinerary,
        Err(err) => {
            log::error!("AI re-planning error for trip {}: {}", trip.id, err);
            return ai_failure("Failed to replan itinerary");
        }
    };

    if let Err(err) = state
        .trips
        .update_itinerary(&trip.id, &user.user_id, itinerary.clone(), TripStatus::Planned)
        .await
    {
        log::error!("Failed to store replanned itinerary for trip {}: {}", trip.id, err);
        return server_error("Failed to save itinerary");
    }

    HttpResponse::Ok().json(json!({
        "success": true,
        "itinerary": itinerary,
        "updatedAt": Utc::now(),
    }))
}
