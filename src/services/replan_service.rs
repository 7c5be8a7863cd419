use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::ReplanError;
use crate::models::replan::ReplanRequest;
use crate::services::ai_provider::{CompletionProvider, CompletionRequest};
use crate::services::destination_context_service::DestinationContextProvider;
use crate::services::prompt_builder::{build_replan_prompt, REPLAN_SYSTEM_PROMPT, REPLAN_TEMPERATURE};
use crate::services::response_parsing::extract_json_object;

#[derive(Debug, Default, PartialEq)]
pub struct LockReport {
    pub restored: usize,
    pub missing: Vec<String>,
    pub unkeyed: usize,
}

#[derive(Clone)]
pub struct ReplanService {
    provider: Arc<dyn CompletionProvider>,
    context: DestinationContextProvider,
}

impl ReplanService {
    pub fn new(provider: Arc<dyn CompletionProvider>, context: DestinationContextProvider) -> Self {
        Self { provider, context }
    }

    /// Replan the unlocked part of an itinerary.
    ///
    /// After generation every locked item carrying an `id` is checked against
    /// the output: drifted copies are overwritten with the locked original,
    /// and a locked item the model dropped fails the replan.
    pub async fn replan(&self, request: &ReplanRequest) -> Result<Value, ReplanError> {
        log::info!(
            "Re-planning itinerary for trip {} ({} locked items)",
            request.trip_id,
            request.locked_items.len()
        );

        let context = match &request.destination {
            Some(destination) => self.context.get_context(destination).await,
            None => String::new(),
        };

        let prompt = build_replan_prompt(
            &request.existing_itinerary,
            &request.locked_items,
            &request.constraints,
            &request.modifications,
            &context,
        );
        let completion = self
            .provider
            .complete(CompletionRequest::new(REPLAN_SYSTEM_PROMPT, prompt, REPLAN_TEMPERATURE))
            .await?;

        let mut itinerary = extract_json_object(&completion.content)
            .ok_or_else(|| ReplanError::Malformed("model output is not a JSON object".to_string()))?;

        let report = enforce_locked_items(&mut itinerary, &request.locked_items);
        if report.unkeyed > 0 {
            log::warn!(
                "{} locked item(s) for trip {} have no id and could not be verified",
                report.unkeyed,
                request.trip_id
            );
        }
        if !report.missing.is_empty() {
            return Err(ReplanError::LockedItemsMissing(report.missing));
        }
        if report.restored > 0 {
            log::warn!(
                "Restored {} drifted locked item(s) for trip {}",
                report.restored,
                request.trip_id
            );
        }

        Ok(itinerary)
    }
}

fn item_key(item: &Value) -> Option<String> {
    match item.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Overwrite every object in `itinerary` whose `id` matches a locked item with that item.
pub fn enforce_locked_items(itinerary: &mut Value, locked_items: &[Value]) -> LockReport {
    let mut report = LockReport::default();
    let mut locked: HashMap<String, &Value> = HashMap::new();
    for item in locked_items {
        match item_key(item) {
            Some(key) => {
                locked.insert(key, item);
            }
            None => report.unkeyed += 1,
        }
    }
    if locked.is_empty() {
        return report;
    }

    let mut found = HashSet::new();
    restore(itinerary, &locked, &mut found, &mut report.restored);

    let mut missing: Vec<String> = locked.keys().filter(|k| !found.contains(*k)).cloned().collect();
    missing.sort();
    report.missing = missing;
    report
}

fn restore(value: &mut Value, locked: &HashMap<String, &Value>, found: &mut HashSet<String>, restored: &mut usize) {
    if let Some(key) = item_key(value) {
        if let Some(original) = locked.get(&key) {
            if value != *original {
                *value = (*original).clone();
                *restored += 1;
            }
            found.insert(key);
            return;
        }
    }

    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                restore(child, locked, found, restored);
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                restore(child, locked, found, restored);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn itinerary() -> Value {
        json!({
            "days": [
                {"date": "2024-12-15", "items": [
                    {"id": "d1-breakfast", "title": "Cafe Bodega", "time": "08:30"},
                    {"id": "d1-fort", "title": "Fort Aguada", "time": "10:00"}
                ]},
                {"date": "2024-12-16", "items": [
                    {"id": 42, "title": "Dudhsagar Falls", "time": "07:00"}
                ]}
            ]
        })
    }

    #[test]
    fn test_untouched_locked_items_pass() {
        let mut output = itinerary();
        let locked = vec![json!({"id": "d1-breakfast", "title": "Cafe Bodega", "time": "08:30"})];
        let report = enforce_locked_items(&mut output, &locked);
        assert_eq!(report, LockReport::default());
        assert_eq!(output, itinerary());
    }

    #[test]
    fn test_drifted_locked_item_is_restored_field_for_field() {
        let locked = json!({"id": 42, "title": "Dudhsagar Falls", "time": "06:00", "note": "jeep booked"});
        let mut output = itinerary();
        let report = enforce_locked_items(&mut output, &[locked.clone()]);
        assert_eq!(report.restored, 1);
        assert!(report.missing.is_empty());
        assert_eq!(output["days"][1]["items"][0], locked);
        assert_eq!(output["days"][0]["items"][1]["title"], "Fort Aguada");
    }

    #[test]
    fn test_dropped_and_unkeyed_items_reported() {
        let locked = vec![
            json!({"id": "d3-spa", "title": "Spa"}),
            json!({"title": "no id here"}),
        ];
        let mut output = itinerary();
        let report = enforce_locked_items(&mut output, &locked);
        assert_eq!(report.missing, vec!["d3-spa".to_string()]);
        assert_eq!(report.unkeyed, 1);
    }
}
