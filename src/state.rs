use std::sync::Arc;
use std::time::Duration;

use crate::services::ai_provider::CompletionProvider;
use crate::services::chat_guide_service::ChatGuideService;
use crate::services::destination_context_service::{DestinationContextProvider, DestinationIndex};
use crate::services::insights_service::InsightsService;
use crate::services::itinerary_generation_service::ItineraryOrchestrator;
use crate::services::replan_service::ReplanService;
use crate::services::review_summary_service::{ReviewSource, ReviewSummaryService};
use crate::services::trip_service::TripStore;
use crate::services::variant_generator::VariantGenerator;

/// Services shared by every handler, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub trips: Arc<dyn TripStore>,
    pub orchestrator: ItineraryOrchestrator,
    pub chat_guide: ChatGuideService,
    pub replanner: ReplanService,
    pub insights: InsightsService,
    pub review_summaries: ReviewSummaryService,
    pub provider_name: &'static str,
    pub model: String,
    pub environment: String,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        index: Arc<dyn DestinationIndex>,
        trips: Arc<dyn TripStore>,
        reviews: Arc<dyn ReviewSource>,
        context_timeout: Duration,
        environment: &str,
    ) -> Self {
        let context = DestinationContextProvider::new(index, context_timeout);

        Self {
            orchestrator: ItineraryOrchestrator::new(context.clone(), VariantGenerator::new(provider.clone())),
            chat_guide: ChatGuideService::new(provider.clone(), trips.clone()),
            replanner: ReplanService::new(provider.clone(), context.clone()),
            insights: InsightsService::new(provider.clone(), context),
            review_summaries: ReviewSummaryService::new(provider.clone(), reviews),
            provider_name: provider.name(),
            model: provider.model().to_string(),
            environment: environment.to_string(),
            trips,
        }
    }
}
