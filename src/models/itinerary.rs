use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VariantTier {
    Budget,
    Balanced,
    Luxury,
}

impl VariantTier {
    /// Order in which variants are returned to callers.
    pub const ALL: [VariantTier; 3] = [VariantTier::Budget, VariantTier::Balanced, VariantTier::Luxury];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariantTier::Budget => "budget",
            VariantTier::Balanced => "balanced",
            VariantTier::Luxury => "luxury",
        }
    }

    /// Bias clause appended to the base prompt for this tier
    pub fn focus(&self) -> &'static str {
        match self {
            VariantTier::Budget => "cost-effective options",
            VariantTier::Balanced => "balanced mix of experiences",
            VariantTier::Luxury => "premium experiences",
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            VariantTier::Budget => "Budget Explorer".to_string(),
            VariantTier::Balanced => "Balanced Explorer".to_string(),
            VariantTier::Luxury => "Luxury Explorer".to_string(),
        }
    }

    /// Cost estimate used when the model output carries no usable figure
    pub fn fallback_cost(&self) -> f64 {
        match self {
            VariantTier::Budget => 18500.0,
            VariantTier::Balanced => 32000.0,
            VariantTier::Luxury => 55000.0,
        }
    }

    pub fn fallback_pace(&self) -> &'static str {
        match self {
            VariantTier::Budget => "Relaxed",
            VariantTier::Balanced => "Moderate",
            VariantTier::Luxury => "Curated",
        }
    }

    pub fn fallback_highlights(&self) -> Vec<String> {
        match self {
            VariantTier::Budget => vec![
                "Budget accommodations".to_string(),
                "Local experiences".to_string(),
                "Street food tours".to_string(),
            ],
            VariantTier::Balanced => vec![
                "Balanced accommodations".to_string(),
                "Local experiences".to_string(),
                "Local restaurant tours".to_string(),
            ],
            VariantTier::Luxury => vec![
                "Luxury accommodations".to_string(),
                "Local premium experiences".to_string(),
                "Fine dining tours".to_string(),
            ],
        }
    }
}

impl fmt::Display for VariantTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduled stop. `id` is unique within a variant and is what replan
/// locks refer to.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannedActivity {
    pub id: String,
    pub time: String,
    pub title: String,
    pub description: String,
    pub cost: f64,
    pub transport: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DayPlan {
    pub date: String,
    pub activities: Vec<PlannedActivity>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryVariant {
    pub id: VariantTier,
    pub name: String,
    pub total_cost: f64,
    pub currency: String,
    pub pace: String,
    pub highlights: Vec<String>,
    pub days: Vec<DayPlan>,
}

impl ItineraryVariant {
    /// Best-effort shape for a tier when the model output cannot be used
    pub fn fallback(tier: VariantTier, currency: &str) -> Self {
        Self {
            id: tier,
            name: tier.display_name(),
            total_cost: tier.fallback_cost(),
            currency: currency.to_string(),
            pace: tier.fallback_pace().to_string(),
            highlights: tier.fallback_highlights(),
            days: Vec::new(),
        }
    }
}
