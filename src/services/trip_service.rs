use async_trait::async_trait;
use bson::doc;
use chrono::Utc;
use mongodb::{Client, Collection};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::StoreError;
use crate::models::trip::{Trip, TripStatus};

/// Trip persistence consumed by the AI routes.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn create_trip(&self, trip: Trip) -> Result<Trip, StoreError>;

    /// Only returns the trip when it belongs to `user_id`.
    async fn get_trip(&self, trip_id: &str, user_id: &str) -> Result<Option<Trip>, StoreError>;

    async fn update_itinerary(
        &self,
        trip_id: &str,
        user_id: &str,
        itinerary: Value,
        status: TripStatus,
    ) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct MongoTripStore {
    client: Arc<Client>,
    database: String,
}

impl MongoTripStore {
    pub fn new(client: Arc<Client>, database: &str) -> Self {
        Self {
            client,
            database: database.to_string(),
        }
    }

    fn collection(&self) -> Collection<Trip> {
        self.client.database(&self.database).collection("Trips")
    }
}

#[async_trait]
impl TripStore for MongoTripStore {
    async fn create_trip(&self, trip: Trip) -> Result<Trip, StoreError> {
        self.collection().insert_one(&trip).await?;
        log::info!("Trip created: {} for user {}", trip.id, trip.user_id);
        Ok(trip)
    }

    async fn get_trip(&self, trip_id: &str, user_id: &str) -> Result<Option<Trip>, StoreError> {
        let filter = doc! { "_id": trip_id, "user_id": user_id };
        Ok(self.collection().find_one(filter).await?)
    }

    async fn update_itinerary(
        &self,
        trip_id: &str,
        user_id: &str,
        itinerary: Value,
        status: TripStatus,
    ) -> Result<(), StoreError> {
        let update = doc! {
            "$set": {
                "itinerary": bson::to_bson(&itinerary)?,
                "status": bson::to_bson(&status)?,
                "updated_at": bson::to_bson(&Utc::now())?,
            }
        };

        let result = self
            .collection()
            .update_one(doc! { "_id": trip_id, "user_id": user_id }, update)
            .await?;

        if result.matched_count == 0 {
            return Err(StoreError::TripNotFound(trip_id.to_string()));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}

/// Process-local store for tests and local runs.
#[derive(Default)]
pub struct InMemoryTripStore {
    trips: Mutex<HashMap<String, Trip>>,
}

impl InMemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn trips(&self) -> std::sync::MutexGuard<'_, HashMap<String, Trip>> {
        self.trips.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TripStore for InMemoryTripStore {
    async fn create_trip(&self, trip: Trip) -> Result<Trip, StoreError> {
        self.trips().insert(trip.id.clone(), trip.clone());
        Ok(trip)
    }

    async fn get_trip(&self, trip_id: &str, user_id: &str) -> Result<Option<Trip>, StoreError> {
        Ok(self
            .trips()
            .get(trip_id)
            .filter(|trip| trip.user_id == user_id)
            .cloned())
    }

    async fn update_itinerary(
        &self,
        trip_id: &str,
        user_id: &str,
        itinerary: Value,
        status: TripStatus,
    ) -> Result<(), StoreError> {
        let mut trips = self.trips();
        match trips.get_mut(trip_id).filter(|trip| trip.user_id == user_id) {
            Some(trip) => {
                trip.itinerary = Some(itinerary);
                trip.status = status;
                trip.updated_at = Utc::now();
                Ok(())
            }
            None => Err(StoreError::TripNotFound(trip_id.to_string())),
        }
    }
}
