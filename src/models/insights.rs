use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InvalidInputError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    Current,
    Seasonal,
    Historical,
}

impl Timeframe {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "current" => Some(Timeframe::Current),
            "seasonal" => Some(Timeframe::Seasonal),
            "historical" => Some(Timeframe::Historical),
            _ => None,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::Current => "current",
            Timeframe::Seasonal => "seasonal",
            Timeframe::Historical => "historical",
        };
        f.write_str(s)
    }
}

/// Query string of `GET /api/ai/insights/{destinationId}`
#[derive(Debug, Deserialize, Default)]
pub struct InsightsParams {
    pub aspects: Option<String>,
    pub timeframe: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InsightsQuery {
    pub destination: String,
    pub aspects: Vec<String>,
    pub timeframe: Timeframe,
}

impl InsightsParams {
    pub fn validate(self, destination: String) -> Result<InsightsQuery, InvalidInputError> {
        let mut details = Vec::new();

        if destination.trim().is_empty() {
            details.push("destinationId is required".to_string());
        }

        let timeframe = match self.timeframe.as_deref() {
            None => Timeframe::default(),
            Some(raw) => Timeframe::parse(raw).unwrap_or_else(|| {
                details.push("timeframe must be one of current, seasonal, historical".to_string());
                Timeframe::default()
            }),
        };

        if !details.is_empty() {
            return Err(InvalidInputError::new(details));
        }

        let aspects = self
            .aspects
            .unwrap_or_default()
            .split(',')
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();

        Ok(InsightsQuery {
            destination: destination.trim().to_string(),
            aspects,
            timeframe,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DestinationInsights {
    pub best_time: String,
    pub crowd_level: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub budget_tips: Vec<String>,
    #[serde(default)]
    pub timeframe: Timeframe,
    #[serde(default)]
    pub aspects: Vec<String>,
}
