use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::InvalidInputError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Review {
    pub poi_id: String,
    pub rating: f64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/ai/summarize/reviews` as received
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummaryInput {
    pub poi_id: Option<String>,
    pub aspects: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct ReviewSummaryQuery {
    pub poi_id: String,
    pub aspects: Vec<String>,
}

impl ReviewSummaryInput {
    pub fn validate(self) -> Result<ReviewSummaryQuery, InvalidInputError> {
        let poi_id = match self.poi_id {
            Some(id) if uuid::Uuid::parse_str(&id).is_ok() => id,
            Some(_) => return Err(InvalidInputError::single("poiId must be a UUID")),
            None => return Err(InvalidInputError::single("poiId is required")),
        };

        let aspects = self
            .aspects
            .unwrap_or_default()
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();

        Ok(ReviewSummaryQuery { poi_id, aspects })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub overall_rating: f64,
    pub total_reviews: usize,
    pub highlights: Vec<String>,
    pub concerns: Vec<String>,
    pub best_time: Option<String>,
    pub crowd_level: Option<String>,
    pub aspect_scores: BTreeMap<String, f64>,
}

impl ReviewSummary {
    pub fn empty() -> Self {
        Self {
            overall_rating: 0.0,
            total_reviews: 0,
            highlights: Vec::new(),
            concerns: Vec::new(),
            best_time: None,
            crowd_level: None,
            aspect_scores: BTreeMap::new(),
        }
    }
}
