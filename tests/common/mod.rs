#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use travista_api::error::ProviderError;
use travista_api::middleware::auth::Claims;
use travista_api::models::review::Review;
use travista_api::routes::{self, ApiGuards};
use travista_api::services::ai_provider::{Completion, CompletionProvider, CompletionRequest};
use travista_api::services::destination_context_service::StaticDestinationIndex;
use travista_api::services::review_summary_service::InMemoryReviewSource;
use travista_api::services::trip_service::InMemoryTripStore;
use travista_api::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

pub const VARIANT_JSON: &str = r#"{"name": "Scripted Plan", "totalCost": 25000, "pace": "Moderate", "highlights": ["Old Goa churches"], "days": []}"#;

type Reply = Box<dyn Fn(&CompletionRequest) -> Result<String, ProviderError> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct CallRecord {
    pub prompt: String,
    pub temperature: f32,
    pub started: Instant,
    pub finished: Instant,
}

/// Provider fake that answers from a closure and records every call.
pub struct ScriptedProvider {
    reply: Reply,
    delay: Duration,
    calls: Mutex<Vec<CallRecord>>,
}

impl ScriptedProvider {
    pub fn replying<F>(reply: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        Self {
            reply: Box::new(reply),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_text(text: &str) -> Self {
        let text = text.to_string();
        Self::replying(move |_| Ok(text.clone()))
    }

    /// Replies with [`VARIANT_JSON`] except for the named tiers, which fail.
    pub fn failing_tiers(tiers: &[&'static str]) -> Self {
        let tiers = tiers.to_vec();
        Self::replying(move |request| {
            if tiers
                .iter()
                .any(|tier| request.prompt.contains(&format!("Create a {} variant", tier)))
            {
                Err(ProviderError::Status {
                    status: 503,
                    body: "overloaded".to_string(),
                })
            } else {
                Ok(VARIANT_JSON.to_string())
            }
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let started = Instant::now();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let result = (self.reply)(&request);

        self.calls.lock().unwrap().push(CallRecord {
            prompt: request.prompt.clone(),
            temperature: request.temperature,
            started,
            finished: Instant::now(),
        });

        result.map(|content| Completion {
            content,
            model: "scripted-model".to_string(),
            finish_reason: Some("stop".to_string()),
        })
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
        Ok(vec![1.0, 0.0, 0.0])
    }
}

pub struct TestApp {
    pub provider: Arc<ScriptedProvider>,
    pub trips: Arc<InMemoryTripStore>,
    pub state: AppState,
    pub guards: ApiGuards,
}

impl TestApp {
    pub fn new(provider: ScriptedProvider) -> Self {
        Self::with_reviews(provider, Vec::new())
    }

    pub fn with_reviews(provider: ScriptedProvider, reviews: Vec<Review>) -> Self {
        let provider = Arc::new(provider);
        let trips = Arc::new(InMemoryTripStore::new());
        let index = StaticDestinationIndex::default()
            .with_entry("Goa", "Goa: beaches, Portuguese heritage, seafood. Peak season November to February.");

        let state = AppState::new(
            provider.clone(),
            Arc::new(index),
            trips.clone(),
            Arc::new(InMemoryReviewSource::new(reviews)),
            Duration::from_millis(200),
            "test",
        );

        Self {
            provider,
            trips,
            state,
            guards: ApiGuards::new(TEST_SECRET),
        }
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.state.clone()))
            .route("/health", web::get().to(routes::health::health_check));
        routes::configure(cfg, &self.guards);
    }
}

pub fn token_for(user_id: &str) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: format!("{}@example.com", user_id),
        exp: now + 3600,
        iat: now,
        user_id: user_id.to_string(),
        preferences: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn bearer(user_id: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token_for(user_id)))
}
