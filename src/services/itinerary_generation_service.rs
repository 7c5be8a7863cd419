use futures::future::join3;

use crate::error::{ItineraryGenerationError, VariantGenerationError};
use crate::models::itinerary::{ItineraryVariant, VariantTier};
use crate::models::trip::TripRequest;
use crate::services::destination_context_service::DestinationContextProvider;
use crate::services::prompt_builder::{build_itinerary_prompt, PROMPT_VERSION};
use crate::services::variant_generator::VariantGenerator;

type VariantResult = Result<ItineraryVariant, VariantGenerationError>;

/// Fans one trip request out into the budget, balanced and luxury variants.
#[derive(Clone)]
pub struct ItineraryOrchestrator {
    context: DestinationContextProvider,
    generator: VariantGenerator,
}

impl ItineraryOrchestrator {
    pub fn new(context: DestinationContextProvider, generator: VariantGenerator) -> Self {
        Self { context, generator }
    }

    /// Generate exactly one variant per tier, in tier order.
    ///
    /// The three provider calls run concurrently on the current task and are
    /// all awaited. If any tier fails the whole run fails and names every
    /// failed tier; partial sets are never returned. Dropping the returned
    /// future drops the in-flight calls.
    pub async fn generate_itinerary(
        &self,
        request: &TripRequest,
    ) -> Result<[ItineraryVariant; 3], ItineraryGenerationError> {
        let trip_ref = request.trip_id.as_deref().unwrap_or("-");
        log::info!(
            "Starting AI itinerary generation for trip {} ({}, prompt {})",
            trip_ref,
            request.destination,
            PROMPT_VERSION
        );

        let context = self.context.get_context(&request.destination).await;
        let base_prompt = build_itinerary_prompt(request, &context)?;

        let [budget, balanced, luxury] = VariantTier::ALL;
        let results = join3(
            self.generator.generate_variant(&base_prompt, budget, &request.budget),
            self.generator.generate_variant(&base_prompt, balanced, &request.budget),
            self.generator.generate_variant(&base_prompt, luxury, &request.budget),
        )
        .await;

        match collect_variants(results) {
            Ok(variants) => {
                log::info!(
                    "AI itinerary generation completed for trip {} ({} variants)",
                    trip_ref,
                    variants.len()
                );
                Ok(variants)
            }
            Err(err) => {
                log::error!("AI itinerary generation failed for trip {}: {}", trip_ref, err);
                Err(err)
            }
        }
    }
}

fn collect_variants(
    results: (VariantResult, VariantResult, VariantResult),
) -> Result<[ItineraryVariant; 3], ItineraryGenerationError> {
    match results {
        (Ok(budget), Ok(balanced), Ok(luxury)) => Ok([budget, balanced, luxury]),
        (budget, balanced, luxury) => {
            let failures: Vec<VariantGenerationError> = [budget.err(), balanced.err(), luxury.err()]
                .into_iter()
                .flatten()
                .collect();
            let failed_tiers = failures.iter().map(|f| f.tier).collect();
            Err(ItineraryGenerationError::Variants {
                failed_tiers,
                failures,
            })
        }
    }
}
