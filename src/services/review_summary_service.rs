use async_trait::async_trait;
use bson::doc;
use futures::stream::TryStreamExt;
use mongodb::{Client, Collection};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::error::{ReviewSummaryError, StoreError};
use crate::models::review::{Review, ReviewSummary, ReviewSummaryQuery};
use crate::services::ai_provider::{CompletionProvider, CompletionRequest};
use crate::services::prompt_builder::{build_review_summary_prompt, REVIEWS_SYSTEM_PROMPT, REVIEWS_TEMPERATURE};
use crate::services::response_parsing::{extract_json_object, non_empty_str, string_list};

pub const MAX_REVIEWS: i64 = 100;

#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Newest first, at most `limit` entries.
    async fn recent_reviews(&self, poi_id: &str, limit: i64) -> Result<Vec<Review>, StoreError>;
}

pub struct MongoReviewSource {
    client: Arc<Client>,
    database: String,
}

impl MongoReviewSource {
    pub fn new(client: Arc<Client>, database: &str) -> Self {
        Self {
            client,
            database: database.to_string(),
        }
    }

    fn collection(&self) -> Collection<Review> {
        self.client.database(&self.database).collection("Reviews")
    }
}

#[async_trait]
impl ReviewSource for MongoReviewSource {
    async fn recent_reviews(&self, poi_id: &str, limit: i64) -> Result<Vec<Review>, StoreError> {
        let cursor = self
            .collection()
            .find(doc! { "poi_id": poi_id })
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[derive(Default)]
pub struct InMemoryReviewSource {
    reviews: Mutex<Vec<Review>>,
}

impl InMemoryReviewSource {
    pub fn new(reviews: Vec<Review>) -> Self {
        Self {
            reviews: Mutex::new(reviews),
        }
    }
}

#[async_trait]
impl ReviewSource for InMemoryReviewSource {
    async fn recent_reviews(&self, poi_id: &str, limit: i64) -> Result<Vec<Review>, StoreError> {
        let reviews = self.reviews.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut matching: Vec<Review> = reviews.iter().filter(|r| r.poi_id == poi_id).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit.max(0) as usize);
        Ok(matching)
    }
}

#[derive(Clone)]
pub struct ReviewSummaryService {
    provider: Arc<dyn CompletionProvider>,
    reviews: Arc<dyn ReviewSource>,
}

impl ReviewSummaryService {
    pub fn new(provider: Arc<dyn CompletionProvider>, reviews: Arc<dyn ReviewSource>) -> Self {
        Self { provider, reviews }
    }

    /// Rating and count are computed from the stored reviews; the model only
    /// contributes the narrative fields and aspect scores.
    pub async fn summarize(&self, query: &ReviewSummaryQuery) -> Result<ReviewSummary, ReviewSummaryError> {
        let reviews = self.reviews.recent_reviews(&query.poi_id, MAX_REVIEWS).await?;
        if reviews.is_empty() {
            log::info!("No reviews for POI {}, returning empty summary", query.poi_id);
            return Ok(ReviewSummary::empty());
        }

        log::info!("Summarizing {} reviews for POI {}", reviews.len(), query.poi_id);

        let prompt = build_review_summary_prompt(&reviews, &query.aspects);
        let completion = self
            .provider
            .complete(CompletionRequest::new(REVIEWS_SYSTEM_PROMPT, prompt, REVIEWS_TEMPERATURE))
            .await?;

        parse_review_summary(&completion.content, &reviews)
    }
}

pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let mean = reviews.iter().map(|r| r.rating).sum::<f64>() / reviews.len() as f64;
    (mean * 10.0).round() / 10.0
}

pub fn parse_review_summary(content: &str, reviews: &[Review]) -> Result<ReviewSummary, ReviewSummaryError> {
    let value = extract_json_object(content)
        .ok_or_else(|| ReviewSummaryError::Malformed("no JSON object in model output".to_string()))?;

    let aspect_scores = match value.get("aspectScores") {
        Some(Value::Object(scores)) => scores
            .iter()
            .filter_map(|(aspect, score)| {
                score
                    .as_f64()
                    .filter(|s| s.is_finite())
                    .map(|s| (aspect.clone(), s.clamp(0.0, 5.0)))
            })
            .collect(),
        _ => BTreeMap::new(),
    };

    Ok(ReviewSummary {
        overall_rating: average_rating(reviews),
        total_reviews: reviews.len(),
        highlights: string_list(value.get("highlights")),
        concerns: string_list(value.get("concerns")),
        best_time: non_empty_str(value.get("bestTime")),
        crowd_level: non_empty_str(value.get("crowdLevel")),
        aspect_scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn review(poi: &str, rating: f64, age_days: i64) -> Review {
        Review {
            poi_id: poi.to_string(),
            rating,
            text: format!("{} stars", rating),
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[test]
    fn test_average_rating_rounds_to_one_decimal() {
        let reviews = vec![review("p", 5.0, 1), review("p", 4.0, 2), review("p", 4.0, 3)];
        assert_eq!(average_rating(&reviews), 4.3);
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn test_summary_uses_local_counts() {
        let reviews = vec![review("p", 3.0, 1), review("p", 4.0, 2)];
        let content = r#"{"highlights": ["Quiet mornings"], "concerns": [], "crowdLevel": "low", "aspectScores": {"service": 4.5, "value": 9, "noise": "n/a"}}"#;
        let summary = parse_review_summary(content, &reviews).unwrap();
        assert_eq!(summary.total_reviews, 2);
        assert_eq!(summary.overall_rating, 3.5);
        assert_eq!(summary.best_time, None);
        assert_eq!(summary.crowd_level.as_deref(), Some("low"));
        assert_eq!(summary.aspect_scores.get("service"), Some(&4.5));
        assert_eq!(summary.aspect_scores.get("value"), Some(&5.0));
        assert!(!summary.aspect_scores.contains_key("noise"));
    }

    #[actix_rt::test]
    async fn test_in_memory_source_orders_newest_first() {
        let source = InMemoryReviewSource::new(vec![
            review("p", 1.0, 10),
            review("q", 2.0, 0),
            review("p", 5.0, 1),
            review("p", 3.0, 5),
        ]);
        let reviews = source.recent_reviews("p", 2).await.unwrap();
        let ratings: Vec<f64> = reviews.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![5.0, 3.0]);
    }
}
