use serde::Deserialize;
use serde_json::Value;

use crate::error::InvalidInputError;

/// Body of `PATCH /api/ai/plan/{tripId}` as received
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReplanInput {
    pub constraints: Option<Value>,
    pub locked_items: Option<Value>,
    pub modifications: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ReplanRequest {
    pub trip_id: String,
    pub destination: Option<String>,
    pub existing_itinerary: Value,
    pub locked_items: Vec<Value>,
    pub constraints: Value,
    pub modifications: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct ReplanChanges {
    pub locked_items: Vec<Value>,
    pub constraints: Value,
    pub modifications: Vec<Value>,
}

impl ReplanInput {
    pub fn validate(self) -> Result<ReplanChanges, InvalidInputError> {
        let mut details = Vec::new();

        let constraints = match self.constraints {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(value @ Value::Object(_)) => value,
            Some(_) => {
                details.push("constraints must be an object".to_string());
                Value::Null
            }
        };

        let locked_items = expect_array("lockedItems", self.locked_items, &mut details);
        let modifications = expect_array("modifications", self.modifications, &mut details);

        if !details.is_empty() {
            return Err(InvalidInputError::new(details));
        }

        Ok(ReplanChanges {
            locked_items,
            constraints,
            modifications,
        })
    }
}

fn expect_array(field: &str, value: Option<Value>, details: &mut Vec<String>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            details.push(format!("{} must be an array", field));
            Vec::new()
        }
    }
}
