use chrono::Utc;
use std::sync::Arc;

use crate::error::{ChatError, InvalidInputError, ProviderError};
use crate::models::chat::{check_message_length, ChatExchange, ChatQuery, GeoPoint};
use crate::services::ai_provider::{CompletionProvider, CompletionRequest};
use crate::services::prompt_builder::{build_chat_prompt, CHAT_SYSTEM_PROMPT, CHAT_TEMPERATURE};
use crate::services::trip_service::TripStore;

pub const MIN_SUGGESTIONS: usize = 2;
pub const MAX_SUGGESTIONS: usize = 5;
const PADDED_SUGGESTIONS: usize = 4;

const SUGGESTION_RULES: &[(&[&str], &str)] = &[
    (
        &["hungry", "food", "restaurant", "dinner", "lunch", "breakfast", "cuisine", "dish"],
        "Show me nearby restaurants",
    ),
    (
        &["get to", "reach", "transport", "taxi", "bus", "train", "metro", "directions", "route"],
        "How to get to the next attraction",
    ),
    (
        &["rain", "weather", "monsoon", "storm", "forecast"],
        "What to do if it rains",
    ),
    (
        &["culture", "temple", "church", "custom", "etiquette", "festival", "museum"],
        "Local cultural tips",
    ),
    (
        &["cost", "price", "cheap", "budget", "expensive", "money", "afford"],
        "How can I save money here?",
    ),
    (
        &["night", "bar", "club", "party"],
        "Best nightlife spots nearby",
    ),
    (
        &["beach", "swim", "surf", "snorkel"],
        "Which beaches are least crowded?",
    ),
    (
        &["safe", "scam", "danger"],
        "Safety tips for this area",
    ),
];

const DEFAULT_SUGGESTIONS: [&str; 4] = [
    "Show me nearby restaurants",
    "How to get to the next attraction",
    "What to do if it rains",
    "Local cultural tips",
];

/// Follow-up questions derived from the message alone.
///
/// Always returns between [`MIN_SUGGESTIONS`] and [`MAX_SUGGESTIONS`] entries.
pub fn generate_suggestions(message: &str) -> Vec<String> {
    let message = message.to_lowercase();

    let mut suggestions: Vec<String> = SUGGESTION_RULES
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| message.contains(k)))
        .map(|(_, suggestion)| suggestion.to_string())
        .take(MAX_SUGGESTIONS)
        .collect();

    for default in DEFAULT_SUGGESTIONS {
        if suggestions.len() >= PADDED_SUGGESTIONS {
            break;
        }
        if !suggestions.iter().any(|s| s == default) {
            suggestions.push(default.to_string());
        }
    }

    suggestions
}

/// Context lines in fixed order: trip first, then location.
pub fn assemble_chat_context(trip_line: Option<String>, location: Option<GeoPoint>) -> String {
    let mut context = String::new();
    if let Some(line) = trip_line {
        context.push_str(&line);
        context.push('\n');
    }
    if let Some(location) = location {
        context.push_str(&format!("Current Location: {}, {}\n", location.lat, location.lng));
    }
    context
}

#[derive(Clone)]
pub struct ChatGuideService {
    provider: Arc<dyn CompletionProvider>,
    trips: Arc<dyn TripStore>,
}

impl ChatGuideService {
    pub fn new(provider: Arc<dyn CompletionProvider>, trips: Arc<dyn TripStore>) -> Self {
        Self { provider, trips }
    }

    pub async fn respond(&self, query: ChatQuery) -> Result<ChatExchange, ChatError> {
        check_message_length(&query.message).map_err(InvalidInputError::single)?;

        log::info!(
            "Processing AI chat for user {} (message length {})",
            query.user_id,
            query.message.chars().count()
        );

        let suggestions = generate_suggestions(&query.message);

        let trip_line = match &query.trip_id {
            Some(trip_id) => Some(self.trip_context_line(trip_id, &query.user_id).await),
            None => None,
        };
        let context = assemble_chat_context(trip_line, query.location);

        let request = CompletionRequest::new(
            CHAT_SYSTEM_PROMPT,
            build_chat_prompt(&query.message, &context),
            CHAT_TEMPERATURE,
        );
        let completion = self.provider.complete(request).await?;

        let response = completion.content.trim().to_string();
        if response.is_empty() {
            return Err(ProviderError::MalformedResponse("empty chat response".to_string()).into());
        }

        Ok(ChatExchange {
            message: query.message,
            trip_id: query.trip_id,
            location: query.location,
            response,
            suggestions,
            timestamp: Utc::now(),
        })
    }

    async fn trip_context_line(&self, trip_id: &str, user_id: &str) -> String {
        match self.trips.get_trip(trip_id, user_id).await {
            Ok(Some(trip)) => format!(
                "Current Trip Context: User is planning/on a trip to {} ({} to {}).",
                trip.destination,
                trip.start_date.format("%Y-%m-%d"),
                trip.end_date.format("%Y-%m-%d")
            ),
            Ok(None) => "Current Trip Context: User is planning/on a trip.".to_string(),
            Err(err) => {
                log::warn!("Failed to load trip {} for chat context: {}", trip_id, err);
                "Current Trip Context: User is planning/on a trip.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestions_always_within_bounds() {
        let messages = [
            "a",
            "Where can I eat cheap seafood near the beach after the rain stops, and is the night market safe? Any temple etiquette? How do I get to the bus stand?",
            "What is this?",
            "food",
        ];
        for message in messages {
            let suggestions = generate_suggestions(message);
            assert!(
                (MIN_SUGGESTIONS..=MAX_SUGGESTIONS).contains(&suggestions.len()),
                "{} suggestions for {:?}",
                suggestions.len(),
                message
            );
        }
    }

    #[test]
    fn test_suggestions_follow_message_topic() {
        let suggestions = generate_suggestions("Is it going to rain tomorrow?");
        assert_eq!(suggestions[0], "What to do if it rains");
        let unique: std::collections::HashSet<_> = suggestions.iter().collect();
        assert_eq!(unique.len(), suggestions.len());
    }

    #[test]
    fn test_generic_message_gets_defaults() {
        assert_eq!(generate_suggestions("hello"), DEFAULT_SUGGESTIONS.to_vec());
    }

    #[test]
    fn test_context_line_order() {
        let location = GeoPoint { lat: 15.5, lng: 73.8 };
        assert_eq!(assemble_chat_context(None, None), "");
        assert_eq!(
            assemble_chat_context(None, Some(location)),
            "Current Location: 15.5, 73.8\n"
        );
        assert_eq!(
            assemble_chat_context(Some("Trip line".to_string()), Some(location)),
            "Trip line\nCurrent Location: 15.5, 73.8\n"
        );
    }
}
