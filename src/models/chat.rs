use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InvalidInputError;

pub const MIN_MESSAGE_CHARS: usize = 1;
pub const MAX_MESSAGE_CHARS: usize = 1000;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Body of `POST /api/ai/chat` as received
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatInput {
    pub message: Option<String>,
    pub trip_id: Option<String>,
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone)]
pub struct ChatQuery {
    pub user_id: String,
    pub message: String,
    pub trip_id: Option<String>,
    pub location: Option<GeoPoint>,
}

impl ChatInput {
    pub fn validate(self, user_id: &str) -> Result<ChatQuery, InvalidInputError> {
        let mut details = Vec::new();

        let message = self.message.unwrap_or_default();
        if let Err(detail) = check_message_length(&message) {
            details.push(detail);
        }

        if let Some(trip_id) = &self.trip_id {
            if uuid::Uuid::parse_str(trip_id).is_err() {
                details.push("tripId must be a UUID".to_string());
            }
        }

        if let Some(location) = &self.location {
            if !location.is_valid() {
                details.push("location must have lat in [-90, 90] and lng in [-180, 180]".to_string());
            }
        }

        if !details.is_empty() {
            return Err(InvalidInputError::new(details));
        }

        Ok(ChatQuery {
            user_id: user_id.to_string(),
            message,
            trip_id: self.trip_id,
            location: self.location,
        })
    }
}

/// Length is counted in characters, not bytes.
pub fn check_message_length(message: &str) -> Result<(), String> {
    let len = message.chars().count();
    if (MIN_MESSAGE_CHARS..=MAX_MESSAGE_CHARS).contains(&len) {
        Ok(())
    } else {
        Err(format!(
            "message must be between {} and {} characters",
            MIN_MESSAGE_CHARS, MAX_MESSAGE_CHARS
        ))
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChatExchange {
    pub message: String,
    pub trip_id: Option<String>,
    pub location: Option<GeoPoint>,
    pub response: String,
    pub suggestions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
