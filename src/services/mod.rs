pub mod ai_provider;
pub mod chat_guide_service;
pub mod destination_context_service;
pub mod insights_service;
pub mod itinerary_generation_service;
pub mod prompt_builder;
pub mod replan_service;
pub mod response_parsing;
pub mod review_summary_service;
pub mod trip_service;
pub mod variant_generator;
