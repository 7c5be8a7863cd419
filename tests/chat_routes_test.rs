mod common;

use actix_web::{http::StatusCode, test, App};
use serde_json::{json, Value};

use common::{bearer, ScriptedProvider, TestApp};
use travista_api::error::ProviderError;
use travista_api::models::trip::{PlanItineraryInput, Trip};
use travista_api::services::trip_service::TripStore;

const GUIDE_REPLY: &str = "Try the fish thali at a shack near Colva, about 400 INR.";

#[actix_rt::test]
async fn test_message_length_bounds() {
    let ctx = TestApp::new(ScriptedProvider::with_text(GUIDE_REPLY));
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let cases = [
        (String::new(), StatusCode::BAD_REQUEST),
        ("é".repeat(1000), StatusCode::OK),
        ("a".repeat(1001), StatusCode::BAD_REQUEST),
    ];
    for (message, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/api/ai/chat")
            .insert_header(bearer("alice"))
            .set_json(json!({ "message": message }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "message of {} chars", message.chars().count());
    }

    assert_eq!(ctx.provider.call_count(), 1);
}

#[actix_rt::test]
async fn test_chat_reply_has_suggestions() {
    let ctx = TestApp::new(ScriptedProvider::with_text(GUIDE_REPLY));
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    for message in ["Where can I find good food?", "ok", "Is the beach safe at night when it rains?"] {
        let req = test::TestRequest::post()
            .uri("/api/ai/chat")
            .insert_header(bearer("alice"))
            .set_json(json!({ "message": message }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["response"], GUIDE_REPLY);
        assert!(body["timestamp"].is_string());
        let count = body["suggestions"].as_array().unwrap().len();
        assert!((2..=5).contains(&count), "{} suggestions for {:?}", count, message);
    }

    let call = ctx.provider.calls().pop().unwrap();
    assert_eq!(call.temperature, 0.7);
}

#[actix_rt::test]
async fn test_chat_context_includes_trip_then_location() {
    let ctx = TestApp::new(ScriptedProvider::with_text(GUIDE_REPLY));
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let request: PlanItineraryInput = serde_json::from_value(json!({
        "destination": "Goa",
        "startDate": "2024-12-15",
        "endDate": "2024-12-18",
        "travelers": 2,
        "budget": { "min": 20000, "max": 40000, "currency": "INR" }
    }))
    .unwrap();
    let trip = ctx
        .trips
        .create_trip(Trip::draft("alice", &request.validate().unwrap()))
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/api/ai/chat")
        .insert_header(bearer("alice"))
        .set_json(json!({
            "message": "What should I do this evening?",
            "tripId": trip.id,
            "location": { "lat": 15.5, "lng": 73.8 }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let prompt = ctx.provider.calls().pop().unwrap().prompt;
    let trip_line = "Current Trip Context: User is planning/on a trip to Goa (2024-12-15 to 2024-12-18).";
    let location_line = "Current Location: 15.5, 73.8";
    let trip_at = prompt.find(trip_line).expect("trip line in prompt");
    let location_at = prompt.find(location_line).expect("location line in prompt");
    assert!(trip_at < location_at);
    assert!(prompt.contains("User Question: What should I do this evening?"));
}

#[actix_rt::test]
async fn test_chat_rejects_bad_trip_id_and_location() {
    let ctx = TestApp::new(ScriptedProvider::with_text(GUIDE_REPLY));
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/ai/chat")
        .insert_header(bearer("alice"))
        .set_json(json!({
            "message": "hi",
            "tripId": "trip-1",
            "location": { "lat": 123.0, "lng": 73.8 }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"].as_array().unwrap().len(), 2);
    assert_eq!(ctx.provider.call_count(), 0);
}

#[actix_rt::test]
async fn test_provider_failure_is_generic_500() {
    let ctx = TestApp::new(ScriptedProvider::replying(|_| Err(ProviderError::RateLimited)));
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/api/ai/chat")
        .insert_header(bearer("alice"))
        .set_json(json!({ "message": "Any festivals this week?" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Our AI is temporarily unavailable. Please try again in a few minutes."
    );
    assert!(!body.to_string().contains("rate limit"));
}
