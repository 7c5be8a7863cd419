use std::sync::Arc;

use crate::error::InsightsError;
use crate::models::insights::{DestinationInsights, InsightsQuery};
use crate::services::ai_provider::{CompletionProvider, CompletionRequest};
use crate::services::destination_context_service::DestinationContextProvider;
use crate::services::prompt_builder::{build_insights_prompt, INSIGHTS_SYSTEM_PROMPT, INSIGHTS_TEMPERATURE};
use crate::services::response_parsing::{extract_json_object, non_empty_str, string_list};

#[derive(Clone)]
pub struct InsightsService {
    provider: Arc<dyn CompletionProvider>,
    context: DestinationContextProvider,
}

impl InsightsService {
    pub fn new(provider: Arc<dyn CompletionProvider>, context: DestinationContextProvider) -> Self {
        Self { provider, context }
    }

    pub async fn generate(&self, query: &InsightsQuery) -> Result<DestinationInsights, InsightsError> {
        log::info!(
            "Generating {} insights for {} (aspects: {:?})",
            query.timeframe,
            query.destination,
            query.aspects
        );

        let context = self.context.get_context(&query.destination).await;
        let prompt = build_insights_prompt(&query.destination, &query.aspects, query.timeframe, &context);
        let completion = self
            .provider
            .complete(CompletionRequest::new(INSIGHTS_SYSTEM_PROMPT, prompt, INSIGHTS_TEMPERATURE))
            .await?;

        parse_insights(&completion.content, query)
    }
}

/// `bestTime` and `crowdLevel` are required; list fields default to empty.
pub fn parse_insights(content: &str, query: &InsightsQuery) -> Result<DestinationInsights, InsightsError> {
    let value = extract_json_object(content)
        .ok_or_else(|| InsightsError::Malformed("no JSON object in model output".to_string()))?;

    let best_time = non_empty_str(value.get("bestTime"))
        .ok_or_else(|| InsightsError::Malformed("missing bestTime".to_string()))?;
    let crowd_level = non_empty_str(value.get("crowdLevel"))
        .ok_or_else(|| InsightsError::Malformed("missing crowdLevel".to_string()))?;

    Ok(DestinationInsights {
        best_time,
        crowd_level,
        highlights: string_list(value.get("highlights")),
        concerns: string_list(value.get("concerns")),
        budget_tips: string_list(value.get("budgetTips")),
        timeframe: query.timeframe,
        aspects: query.aspects.clone(),
    })
}
