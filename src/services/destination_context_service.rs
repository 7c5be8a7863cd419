use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ContextLookupError, StoreError};
use crate::services::ai_provider::CompletionProvider;

/// Matches scoring at or below this cosine similarity are dropped.
pub const SIMILARITY_THRESHOLD: f32 = 0.7;
pub const MAX_CONTEXT_RESULTS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationDocument {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DestinationMatch {
    pub name: String,
    pub content: String,
    pub score: f32,
}

#[async_trait]
pub trait DestinationIndex: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<DestinationMatch>, ContextLookupError>;
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Nearest neighbours above `threshold`, best first, at most `limit`.
pub fn rank_by_similarity(
    query_embedding: &[f32],
    documents: Vec<DestinationDocument>,
    threshold: f32,
    limit: usize,
) -> Vec<DestinationMatch> {
    let mut matches: Vec<DestinationMatch> = documents
        .into_iter()
        .filter_map(|doc| {
            let score = cosine_similarity(query_embedding, &doc.embedding);
            (score > threshold).then(|| DestinationMatch {
                name: doc.name,
                content: doc.content,
                score,
            })
        })
        .collect();

    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches.truncate(limit);
    matches
}

/// Embedding similarity search over the `Destinations` collection.
pub struct MongoDestinationIndex {
    client: Arc<Client>,
    database: String,
    provider: Arc<dyn CompletionProvider>,
}

impl MongoDestinationIndex {
    pub fn new(client: Arc<Client>, database: &str, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            client,
            database: database.to_string(),
            provider,
        }
    }

    fn collection(&self) -> Collection<DestinationDocument> {
        self.client.database(&self.database).collection("Destinations")
    }
}

#[async_trait]
impl DestinationIndex for MongoDestinationIndex {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<DestinationMatch>, ContextLookupError> {
        let query_embedding = self.provider.embed(query).await?;

        let cursor = self
            .collection()
            .find(doc! { "embedding.0": { "$exists": true } })
            .await
            .map_err(StoreError::from)?;
        let documents: Vec<DestinationDocument> = cursor.try_collect().await.map_err(StoreError::from)?;

        Ok(rank_by_similarity(
            &query_embedding,
            documents,
            SIMILARITY_THRESHOLD,
            limit,
        ))
    }
}

/// In-memory knowledge base matched by destination name.
#[derive(Default)]
pub struct StaticDestinationIndex {
    documents: Vec<DestinationDocument>,
}

impl StaticDestinationIndex {
    pub fn new(documents: Vec<DestinationDocument>) -> Self {
        Self { documents }
    }

    pub fn with_entry(mut self, name: &str, content: &str) -> Self {
        self.documents.push(DestinationDocument {
            name: name.to_string(),
            content: content.to_string(),
            categories: Vec::new(),
            embedding: Vec::new(),
        });
        self
    }
}

#[async_trait]
impl DestinationIndex for StaticDestinationIndex {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<DestinationMatch>, ContextLookupError> {
        let query = query.to_lowercase();
        Ok(self
            .documents
            .iter()
            .filter(|doc| {
                let name = doc.name.to_lowercase();
                query.contains(&name) || name.contains(&query)
            })
            .take(limit)
            .map(|doc| DestinationMatch {
                name: doc.name.clone(),
                content: doc.content.clone(),
                score: 1.0,
            })
            .collect())
    }
}

/// Grounding text for generation prompts.
///
/// Context is an enrichment: lookup failures and timeouts degrade to an empty
/// string and are never surfaced to the caller.
#[derive(Clone)]
pub struct DestinationContextProvider {
    index: Arc<dyn DestinationIndex>,
    timeout: Duration,
    limit: usize,
}

impl DestinationContextProvider {
    pub fn new(index: Arc<dyn DestinationIndex>, timeout: Duration) -> Self {
        Self {
            index,
            timeout,
            limit: MAX_CONTEXT_RESULTS,
        }
    }

    pub async fn get_context(&self, destination: &str) -> String {
        let destination = destination.trim();
        if destination.is_empty() {
            return String::new();
        }

        let lookup = tokio::time::timeout(self.timeout, self.index.search(destination, self.limit))
            .await
            .unwrap_or(Err(ContextLookupError::Timeout));

        match lookup {
            Ok(matches) if !matches.is_empty() => {
                log::debug!("Found {} context entries for '{}'", matches.len(), destination);
                matches
                    .into_iter()
                    .map(|m| m.content)
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Ok(_) => {
                log::info!("No destination context found for '{}'", destination);
                String::new()
            }
            Err(err) => {
                log::warn!("Failed to get destination context for '{}': {}", destination, err);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingIndex;

    #[async_trait]
    impl DestinationIndex for FailingIndex {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<DestinationMatch>, ContextLookupError> {
            Err(ContextLookupError::Store(StoreError::TripNotFound("n/a".to_string())))
        }
    }

    struct SlowIndex;

    #[async_trait]
    impl DestinationIndex for SlowIndex {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<DestinationMatch>, ContextLookupError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(vec![DestinationMatch {
                name: "Goa".to_string(),
                content: "too late".to_string(),
                score: 1.0,
            }])
        }
    }

    fn doc(name: &str, embedding: Vec<f32>) -> DestinationDocument {
        DestinationDocument {
            name: name.to_string(),
            content: format!("{} content", name),
            categories: Vec::new(),
            embedding,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_rank_applies_threshold_order_and_cap() {
        let docs = vec![
            doc("close", vec![0.9, 0.1]),
            doc("exact", vec![1.0, 0.0]),
            doc("orthogonal", vec![0.0, 1.0]),
            doc("unembedded", vec![]),
        ];

        let ranked = rank_by_similarity(&[1.0, 0.0], docs.clone(), SIMILARITY_THRESHOLD, 5);
        let names: Vec<_> = ranked.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["exact", "close"]);

        let capped = rank_by_similarity(&[1.0, 0.0], docs, SIMILARITY_THRESHOLD, 1);
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].name, "exact");
    }

    #[actix_rt::test]
    async fn test_static_index_joins_matches() {
        let index = StaticDestinationIndex::default()
            .with_entry("Goa", "Goa is known for beaches.")
            .with_entry("North Goa", "North Goa has Baga and Calangute.")
            .with_entry("Jaipur", "Jaipur is the Pink City.");
        let provider = DestinationContextProvider::new(Arc::new(index), Duration::from_secs(1));

        let context = provider.get_context("North Goa").await;
        assert_eq!(context, "Goa is known for beaches.\nNorth Goa has Baga and Calangute.");
    }

    #[actix_rt::test]
    async fn test_errors_and_misses_degrade_to_empty() {
        let failing = DestinationContextProvider::new(Arc::new(FailingIndex), Duration::from_secs(1));
        assert_eq!(failing.get_context("Goa").await, "");

        let empty = DestinationContextProvider::new(
            Arc::new(StaticDestinationIndex::default()),
            Duration::from_secs(1),
        );
        assert_eq!(empty.get_context("Atlantis").await, "");
        assert_eq!(empty.get_context("   ").await, "");
    }

    #[actix_rt::test]
    async fn test_timeout_degrades_to_empty() {
        let slow = DestinationContextProvider::new(Arc::new(SlowIndex), Duration::from_millis(20));
        assert_eq!(slow.get_context("Goa").await, "");
    }
}
