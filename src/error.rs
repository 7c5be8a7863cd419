use thiserror::Error;

use crate::models::itinerary::VariantTier;

/// Caller-supplied data failed validation. Raised before any external call.
#[derive(Debug, Clone, Error)]
#[error("invalid input: {}", .details.join("; "))]
pub struct InvalidInputError {
    pub details: Vec<String>,
}

impl InvalidInputError {
    pub fn new(details: Vec<String>) -> Self {
        Self { details }
    }

    pub fn single(detail: impl Into<String>) -> Self {
        Self {
            details: vec![detail.into()],
        }
    }
}

/// Failure of the external LLM provider itself.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider rate limit exceeded")]
    RateLimited,

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Whether a repeated attempt may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Network(err) => err.is_timeout() || err.is_connect(),
            ProviderError::Status { status, .. } => *status >= 500,
            ProviderError::RateLimited => true,
            ProviderError::MalformedResponse(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("end date is before start date")]
pub struct InvalidDateRangeError;

#[derive(Debug, Error)]
#[error("{tier} variant generation failed: {source}")]
pub struct VariantGenerationError {
    pub tier: VariantTier,
    #[source]
    pub source: ProviderError,
}

#[derive(Debug, Error)]
pub enum ItineraryGenerationError {
    #[error(transparent)]
    InvalidRequest(#[from] InvalidDateRangeError),

    #[error("itinerary generation failed for tier(s): {}", tier_list(.failed_tiers))]
    Variants {
        failed_tiers: Vec<VariantTier>,
        failures: Vec<VariantGenerationError>,
    },
}

impl ItineraryGenerationError {
    pub fn failed_tiers(&self) -> &[VariantTier] {
        match self {
            ItineraryGenerationError::InvalidRequest(_) => &[],
            ItineraryGenerationError::Variants { failed_tiers, .. } => failed_tiers,
        }
    }
}

fn tier_list(tiers: &[VariantTier]) -> String {
    tiers
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum ReplanError {
    #[error("replan request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("replanned itinerary could not be parsed: {0}")]
    Malformed(String),

    #[error("replanned itinerary dropped locked item(s): {}", .0.join(", "))]
    LockedItemsMissing(Vec<String>),
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    #[error("chat generation failed: {0}")]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("insights generation failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("insights could not be parsed: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ReviewSummaryError {
    #[error("review lookup failed: {0}")]
    Store(#[from] StoreError),

    #[error("review summary generation failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("review summary could not be parsed: {0}")]
    Malformed(String),
}

/// Destination lookup failure. Never surfaced past the context provider.
#[derive(Debug, Error)]
pub enum ContextLookupError {
    #[error("destination lookup timed out")]
    Timeout,

    #[error("destination store error: {0}")]
    Store(#[from] StoreError),

    #[error("embedding request failed: {0}")]
    Embedding(#[from] ProviderError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("trip {0} not found")]
    TripNotFound(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingVars(Vec<String>),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: String, value: String },
}
