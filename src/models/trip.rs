use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::InvalidInputError;

const MIN_DESTINATION_LEN: usize = 2;
const MAX_DESTINATION_LEN: usize = 100;
const MIN_TRAVELERS: i64 = 1;
const MAX_TRAVELERS: i64 = 20;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TravelStyle {
    Relaxed,
    #[default]
    Balanced,
    Packed,
}

impl TravelStyle {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "relaxed" => Some(TravelStyle::Relaxed),
            "balanced" => Some(TravelStyle::Balanced),
            "packed" => Some(TravelStyle::Packed),
            _ => None,
        }
    }
}

impl fmt::Display for TravelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TravelStyle::Relaxed => "relaxed",
            TravelStyle::Balanced => "balanced",
            TravelStyle::Packed => "packed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BudgetBand {
    pub min: f64,
    pub max: f64,
    pub currency: String,
}

/// Validated input for one itinerary generation run.
#[derive(Debug, Clone)]
pub struct TripRequest {
    pub trip_id: Option<String>,
    pub destination: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub travelers: u32,
    pub budget: BudgetBand,
    pub interests: Vec<String>,
    pub travel_style: TravelStyle,
    pub constraints: Value,
}

#[derive(Debug, Deserialize, Default)]
pub struct BudgetInput {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<String>,
}

/// Body of `POST /api/ai/plan` as received
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlanItineraryInput {
    pub destination: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub travelers: Option<i64>,
    pub budget: Option<BudgetInput>,
    pub interests: Option<Vec<String>>,
    pub travel_style: Option<String>,
    pub constraints: Option<Value>,
}

impl PlanItineraryInput {
    /// Checks every field and reports all violations at once.
    pub fn validate(self) -> Result<TripRequest, InvalidInputError> {
        let mut details = Vec::new();

        let destination = match self.destination.as_deref().map(str::trim) {
            Some(d) => {
                let len = d.chars().count();
                if !(MIN_DESTINATION_LEN..=MAX_DESTINATION_LEN).contains(&len) {
                    details.push(format!(
                        "destination must be between {} and {} characters",
                        MIN_DESTINATION_LEN, MAX_DESTINATION_LEN
                    ));
                }
                d.to_string()
            }
            None => {
                details.push("destination is required".to_string());
                String::new()
            }
        };

        let start_date = parse_required_date("startDate", self.start_date.as_deref(), &mut details);
        let end_date = parse_required_date("endDate", self.end_date.as_deref(), &mut details);
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                details.push("endDate must not be before startDate".to_string());
            }
        }

        let travelers = match self.travelers {
            Some(n) if (MIN_TRAVELERS..=MAX_TRAVELERS).contains(&n) => n as u32,
            Some(_) => {
                details.push(format!(
                    "travelers must be between {} and {}",
                    MIN_TRAVELERS, MAX_TRAVELERS
                ));
                0
            }
            None => {
                details.push("travelers is required".to_string());
                0
            }
        };

        let budget = match self.budget {
            Some(budget) => validate_budget(budget, &mut details),
            None => {
                details.push("budget is required".to_string());
                None
            }
        };

        let mut interests: Vec<String> = Vec::new();
        for interest in self.interests.unwrap_or_default() {
            let interest = interest.trim().to_string();
            if !interest.is_empty() && !interests.contains(&interest) {
                interests.push(interest);
            }
        }

        let travel_style = match self.travel_style.as_deref() {
            None => TravelStyle::default(),
            Some(style) => TravelStyle::parse(style).unwrap_or_else(|| {
                details.push("travelStyle must be one of relaxed, balanced, packed".to_string());
                TravelStyle::default()
            }),
        };

        let constraints = match self.constraints {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(value @ Value::Object(_)) => value,
            Some(_) => {
                details.push("constraints must be an object".to_string());
                Value::Null
            }
        };

        match (start_date, end_date, budget) {
            (Some(start_date), Some(end_date), Some(budget)) if details.is_empty() => Ok(TripRequest {
                trip_id: None,
                destination,
                start_date,
                end_date,
                travelers,
                budget,
                interests,
                travel_style,
                constraints,
            }),
            _ => Err(InvalidInputError::new(details)),
        }
    }
}

fn validate_budget(budget: BudgetInput, details: &mut Vec<String>) -> Option<BudgetBand> {
    let before = details.len();

    let min = budget.min.unwrap_or_else(|| {
        details.push("budget.min is required".to_string());
        0.0
    });
    let max = budget.max.unwrap_or_else(|| {
        details.push("budget.max is required".to_string());
        0.0
    });
    if !min.is_finite() || !max.is_finite() || min < 0.0 {
        details.push("budget values must be non-negative numbers".to_string());
    } else if min > max {
        details.push("budget.min must not exceed budget.max".to_string());
    }

    let currency = match budget.currency.as_deref().map(str::trim) {
        Some(c) if c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic()) => c.to_ascii_uppercase(),
        Some(_) => {
            details.push("budget.currency must be a 3-letter currency code".to_string());
            String::new()
        }
        None => {
            details.push("budget.currency is required".to_string());
            String::new()
        }
    };

    if details.len() == before {
        Some(BudgetBand { min, max, currency })
    } else {
        None
    }
}

fn parse_required_date(field: &str, value: Option<&str>, details: &mut Vec<String>) -> Option<DateTime<Utc>> {
    match value {
        Some(raw) => {
            let parsed = parse_iso_date(raw);
            if parsed.is_none() {
                details.push(format!("{} must be an ISO-8601 date", field));
            }
            parsed
        }
        None => {
            details.push(format!("{} is required", field));
            None
        }
    }
}

/// Accepts `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
pub fn parse_iso_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Draft,
    Planned,
}

/// Persisted trip record owned by one user
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Trip {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub destination: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub party_size: u32,
    pub budget: BudgetBand,
    pub status: TripStatus,
    pub itinerary: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn draft(user_id: &str, request: &TripRequest) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: format!("Trip to {}", request.destination),
            destination: request.destination.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            party_size: request.travelers,
            budget: request.budget.clone(),
            status: TripStatus::Draft,
            itinerary: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_input() -> PlanItineraryInput {
        serde_json::from_value(json!({
            "destination": "Goa",
            "startDate": "2024-12-15",
            "endDate": "2024-12-18",
            "travelers": 2,
            "budget": { "min": 20000, "max": 40000, "currency": "inr" },
            "interests": ["beaches", "food", "beaches"],
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_input_produces_trip_request() {
        let request = valid_input().validate().unwrap();
        assert_eq!(request.destination, "Goa");
        assert_eq!(request.travelers, 2);
        assert_eq!(request.budget.currency, "INR");
        assert_eq!(request.interests, vec!["beaches", "food"]);
        assert_eq!(request.travel_style, TravelStyle::Balanced);
        assert!(request.constraints.is_object());
    }

    #[test]
    fn test_reports_every_violation() {
        let input: PlanItineraryInput = serde_json::from_value(json!({
            "destination": "G",
            "startDate": "not a date",
            "endDate": "2024-12-18",
            "travelers": 25,
            "budget": { "min": 500, "max": 100, "currency": "INR" },
            "travelStyle": "frantic",
        }))
        .unwrap();

        let err = input.validate().unwrap_err();
        assert_eq!(err.details.len(), 5, "{:?}", err.details);
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut input = valid_input();
        input.end_date = Some("2024-12-10".to_string());
        let err = input.validate().unwrap_err();
        assert!(err.details.iter().any(|d| d.contains("endDate")));
    }

    #[test]
    fn test_parse_iso_date_formats() {
        assert!(parse_iso_date("2024-12-15").is_some());
        assert!(parse_iso_date("2024-12-15T10:30:00Z").is_some());
        assert!(parse_iso_date("2024-12-15T10:30:00+05:30").is_some());
        assert!(parse_iso_date("15/12/2024").is_none());
    }
}
