use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::VariantGenerationError;
use crate::models::itinerary::{DayPlan, ItineraryVariant, PlannedActivity, VariantTier};
use crate::models::trip::BudgetBand;
use crate::services::ai_provider::{CompletionProvider, CompletionRequest};
use crate::services::prompt_builder::{build_variant_prompt, ITINERARY_SYSTEM_PROMPT, VARIANT_TEMPERATURE};
use crate::services::response_parsing::{
    extract_json_object, lenient_number, non_empty_str, string_list, text_or_empty,
};

#[derive(Clone)]
pub struct VariantGenerator {
    provider: Arc<dyn CompletionProvider>,
}

impl VariantGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// One generation request for `tier`, shaped into a complete variant.
    pub async fn generate_variant(
        &self,
        base_prompt: &str,
        tier: VariantTier,
        budget: &BudgetBand,
    ) -> Result<ItineraryVariant, VariantGenerationError> {
        let request = CompletionRequest::new(
            ITINERARY_SYSTEM_PROMPT,
            build_variant_prompt(base_prompt, tier),
            VARIANT_TEMPERATURE,
        );

        let completion = self.provider.complete(request).await.map_err(|source| {
            log::error!("Failed to generate {} variant: {}", tier, source);
            VariantGenerationError { tier, source }
        })?;

        Ok(shape_variant(&completion.content, tier, &budget.currency))
    }
}

/// Turn raw model output into a variant, filling unusable fields from the tier fallback.
pub fn shape_variant(content: &str, tier: VariantTier, currency: &str) -> ItineraryVariant {
    let fallback = ItineraryVariant::fallback(tier, currency);

    let Some(value) = extract_json_object(content) else {
        log::warn!("Unparseable {} variant output, using fallback shape", tier);
        return fallback;
    };

    let ItineraryVariant {
        name: fallback_name,
        total_cost: fallback_cost,
        pace: fallback_pace,
        highlights: fallback_highlights,
        ..
    } = fallback;

    let total_cost = value
        .get("totalCost")
        .or_else(|| value.get("total_cost"))
        .and_then(Value::as_f64)
        .filter(|cost| cost.is_finite() && *cost >= 0.0)
        .unwrap_or(fallback_cost);

    let highlights = string_list(value.get("highlights"));
    let highlights = if highlights.is_empty() {
        fallback_highlights
    } else {
        highlights
    };

    let days = shape_days(value.get("days"), tier);

    ItineraryVariant {
        id: tier,
        name: non_empty_str(value.get("name")).unwrap_or(fallback_name),
        total_cost,
        currency: currency.to_string(),
        pace: non_empty_str(value.get("pace")).unwrap_or(fallback_pace),
        highlights,
        days,
    }
}

/// Day-by-day breakdown, keeping every day and activity that is an object.
///
/// Activities keep the model's `id` when it is present and unused, otherwise
/// they get `d{day}-{n}` (both 1-based).
fn shape_days(days: Option<&Value>, tier: VariantTier) -> Vec<DayPlan> {
    let Some(days) = days.and_then(Value::as_array) else {
        if days.is_some() {
            log::debug!("Discarding non-array day breakdown for {} variant", tier);
        }
        return Vec::new();
    };

    let mut used_ids = HashSet::new();
    days.iter()
        .filter_map(Value::as_object)
        .enumerate()
        .map(|(day_index, day)| {
            let activities = day
                .get("activities")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter(|item| item.is_object()).collect::<Vec<_>>())
                .unwrap_or_default()
                .into_iter()
                .enumerate()
                .map(|(n, item)| {
                    let id = activity_id(item.get("id"))
                        .filter(|id| !used_ids.contains(id))
                        .unwrap_or_else(|| format!("d{}-{}", day_index + 1, n + 1));
                    used_ids.insert(id.clone());

                    PlannedActivity {
                        id,
                        time: text_or_empty(item.get("time")),
                        title: text_or_empty(item.get("title")),
                        description: text_or_empty(item.get("description")),
                        cost: lenient_number(item.get("cost"))
                            .filter(|cost| cost.is_finite() && *cost >= 0.0)
                            .unwrap_or(0.0),
                        transport: non_empty_str(item.get("transport")),
                    }
                })
                .collect();

            DayPlan {
                date: text_or_empty(day.get("date")),
                activities,
            }
        })
        .collect()
}

fn activity_id(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        other => non_empty_str(Some(other)),
    }
}
