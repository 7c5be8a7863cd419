//! Prompt templates sent to the LLM provider.
//!
//! The wording here is the only contract with the model about output shape.
//! Any change that can affect what the model returns must bump
//! [`PROMPT_VERSION`] and update the golden fixtures under `tests/fixtures/`.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::InvalidDateRangeError;
use crate::models::insights::Timeframe;
use crate::models::itinerary::VariantTier;
use crate::models::review::Review;
use crate::models::trip::TripRequest;

pub const PROMPT_VERSION: &str = "itinerary-v2";

pub const ITINERARY_SYSTEM_PROMPT: &str =
    "You are an expert travel planner. Create detailed, realistic itineraries with accurate timing and costs.";
pub const CHAT_SYSTEM_PROMPT: &str =
    "You are a helpful travel guide with deep local knowledge. Provide specific, practical advice.";
pub const REPLAN_SYSTEM_PROMPT: &str =
    "You are an expert travel planner. Modify itineraries while respecting constraints and locked items.";
pub const INSIGHTS_SYSTEM_PROMPT: &str =
    "You are a destination analyst. Summarize what travelers need to know, honestly and concisely.";
pub const REVIEWS_SYSTEM_PROMPT: &str =
    "You summarize traveler reviews faithfully. Only report what the reviews support.";

pub const VARIANT_TEMPERATURE: f32 = 0.4;
pub const CHAT_TEMPERATURE: f32 = 0.7;
pub const REPLAN_TEMPERATURE: f32 = 0.3;
pub const INSIGHTS_TEMPERATURE: f32 = 0.5;
pub const REVIEWS_TEMPERATURE: f32 = 0.3;

const NO_CONTEXT: &str = "No additional destination context available.";
const NO_INTERESTS: &str = "no specific preferences";
const ITINERARY_SHAPE: &str = r#"{"name": string, "totalCost": number, "pace": string, "highlights": [string], "days": [{"date": "YYYY-MM-DD", "activities": [{"id": string, "time": "HH:MM", "title": string, "description": string, "cost": number, "transport": string}]}]}"#;
const INSIGHTS_SHAPE: &str = r#"{"bestTime": string, "crowdLevel": string, "highlights": [string], "concerns": [string], "budgetTips": [string]}"#;
const REVIEWS_SHAPE: &str = r#"{"highlights": [string], "concerns": [string], "bestTime": string, "crowdLevel": string, "aspectScores": {aspect: number}}"#;
const MAX_REVIEW_CHARS: usize = 500;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Whole days between two instants, rounded up.
pub fn trip_duration_days(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, InvalidDateRangeError> {
    let millis = (end - start).num_milliseconds();
    if millis < 0 {
        return Err(InvalidDateRangeError);
    }
    Ok((millis + DAY_MILLIS - 1) / DAY_MILLIS)
}

pub fn build_itinerary_prompt(request: &TripRequest, context: &str) -> Result<String, InvalidDateRangeError> {
    let duration = trip_duration_days(request.start_date, request.end_date)?;

    let travelers = if request.travelers == 1 {
        "1 person".to_string()
    } else {
        format!("{} people", request.travelers)
    };
    let interests = if request.interests.is_empty() {
        NO_INTERESTS.to_string()
    } else {
        request.interests.join(", ")
    };

    let mut lines = vec![
        format!("Create a detailed {}-day itinerary for {}.", duration, request.destination),
        String::new(),
        "Trip Details:".to_string(),
        format!(
            "- Dates: {} to {}",
            request.start_date.format("%Y-%m-%d"),
            request.end_date.format("%Y-%m-%d")
        ),
        format!("- Travelers: {}", travelers),
        format!(
            "- Budget: {}-{} {}",
            request.budget.min, request.budget.max, request.budget.currency
        ),
        format!("- Travel style: {}", request.travel_style),
        format!("- Interests: {}", interests),
    ];
    if let Some(constraints) = non_empty_json(&request.constraints) {
        lines.push(format!("- Additional constraints: {}", constraints));
    }

    lines.extend([
        String::new(),
        "Context:".to_string(),
        context_block(context),
        String::new(),
        "Return a JSON object with day-by-day activities, timing, costs, and travel routes.".to_string(),
        format!("Use exactly this shape: {}", ITINERARY_SHAPE),
        "Give every activity an id that is unique within the itinerary, such as \"d1-breakfast\".".to_string(),
        "Include breakfast, lunch, dinner, and transportation between activities.".to_string(),
        "Ensure activities match the travel style and budget constraints.".to_string(),
    ]);

    Ok(lines.join("\n"))
}

pub fn build_variant_prompt(base_prompt: &str, tier: VariantTier) -> String {
    format!(
        "{}\n\nCreate a {} variant focusing on {}.",
        base_prompt,
        tier,
        tier.focus()
    )
}

pub fn build_chat_prompt(message: &str, context: &str) -> String {
    let context = if context.trim().is_empty() {
        "No trip or location context provided."
    } else {
        context.trim_end()
    };

    [
        "You are a knowledgeable local travel guide. Answer this question based on the context:".to_string(),
        String::new(),
        format!("User Question: {}", message),
        String::new(),
        "Context:".to_string(),
        context.to_string(),
        String::new(),
        "Provide practical, actionable advice. Include specific recommendations with timing, costs, and logistics."
            .to_string(),
    ]
    .join("\n")
}

pub fn build_replan_prompt(
    current_itinerary: &Value,
    locked_items: &[Value],
    constraints: &Value,
    modifications: &[Value],
    context: &str,
) -> String {
    let locked = serde_json::to_string(locked_items).unwrap_or_else(|_| "[]".to_string());
    let modifications = serde_json::to_string(modifications).unwrap_or_else(|_| "[]".to_string());

    [
        "Replan this itinerary with the following constraints:".to_string(),
        format!("- Locked items: {}", locked),
        format!("- New constraints: {}", constraints),
        format!("- Requested modifications: {}", modifications),
        format!("- Current itinerary: {}", current_itinerary),
        String::new(),
        "Context:".to_string(),
        context_block(context),
        String::new(),
        "Maintain the locked items exactly as they are, field for field, and work around them.".to_string(),
        "Replan only the remaining items so they satisfy the new constraints.".to_string(),
        "Return the complete updated itinerary as a single JSON object.".to_string(),
    ]
    .join("\n")
}

pub fn build_insights_prompt(destination: &str, aspects: &[String], timeframe: Timeframe, context: &str) -> String {
    let aspects = if aspects.is_empty() {
        "overall experience".to_string()
    } else {
        aspects.join(", ")
    };

    [
        format!("Give {} travel insights for {}.", timeframe, destination),
        format!("Focus on: {}", aspects),
        String::new(),
        "Context:".to_string(),
        context_block(context),
        String::new(),
        format!("Respond with JSON only, using exactly this shape: {}", INSIGHTS_SHAPE),
    ]
    .join("\n")
}

pub fn build_review_summary_prompt(reviews: &[Review], aspects: &[String]) -> String {
    let aspects = if aspects.is_empty() {
        "cleanliness, service, value, atmosphere".to_string()
    } else {
        aspects.join(", ")
    };

    let mut lines = vec![
        format!("Summarize these {} traveler reviews.", reviews.len()),
        format!("Score these aspects from 0 to 5: {}", aspects),
        String::new(),
        "Reviews:".to_string(),
    ];
    lines.extend(reviews.iter().map(|review| {
        let text: String = review.text.chars().take(MAX_REVIEW_CHARS).collect();
        format!("- ({:.1}/5) {}", review.rating, text.replace('\n', " "))
    }));
    lines.extend([
        String::new(),
        format!("Respond with JSON only, using exactly this shape: {}", REVIEWS_SHAPE),
    ]);

    lines.join("\n")
}

fn context_block(context: &str) -> String {
    let context = context.trim();
    if context.is_empty() {
        NO_CONTEXT.to_string()
    } else {
        context.to_string()
    }
}

fn non_empty_json(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        other => Some(other.to_string()),
    }
}
