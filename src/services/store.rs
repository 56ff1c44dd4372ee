use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId, Bson};
use mongodb::Client;
use std::sync::Arc;

use crate::db::mongo;
use crate::error::ServiceError;
use crate::models::{
    recommendation::ActivityRecommendation, translation_cache::TranslationCacheEntry, trip::Trip,
};

/// Persistence seam for the recommendation pipeline. Production is Mongo;
/// tests substitute an in-memory double. The (trip_id, name, address)
/// dedupe lives behind this seam, so a future unique-index strategy would
/// slot in here.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn fetch_trip(&self, trip_id: &ObjectId) -> Result<Option<Trip>, ServiceError>;

    async fn find_existing(
        &self,
        trip_id: &ObjectId,
        name: &str,
        address: Option<&str>,
    ) -> Result<Option<ActivityRecommendation>, ServiceError>;

    async fn insert(&self, rec: &ActivityRecommendation) -> Result<ObjectId, ServiceError>;

    /// Refresh search_query and updated_at on a deduplicated row.
    async fn touch_search_query(&self, id: &ObjectId, query: &str) -> Result<(), ServiceError>;

    async fn apply_translations(
        &self,
        id: &ObjectId,
        description_zh: Option<&str>,
        cultural_notes_zh: Option<&str>,
        tips_for_chinese_travelers: Option<&str>,
    ) -> Result<(), ServiceError>;
}

/// Durable lookup for translated text, keyed by content hash + language pair.
#[async_trait]
pub trait TranslationCacheStore: Send + Sync {
    async fn get(
        &self,
        source_text_hash: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Option<TranslationCacheEntry>, ServiceError>;

    /// Bump usage_count and last_used_at after a cache hit.
    async fn record_hit(&self, id: &ObjectId) -> Result<(), ServiceError>;

    async fn put(&self, entry: TranslationCacheEntry) -> Result<(), ServiceError>;
}

pub struct MongoRecommendationStore {
    client: Arc<Client>,
}

impl MongoRecommendationStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecommendationStore for MongoRecommendationStore {
    async fn fetch_trip(&self, trip_id: &ObjectId) -> Result<Option<Trip>, ServiceError> {
        let trip = mongo::trips(&self.client)
            .find_one(doc! { "_id": trip_id })
            .await?;
        Ok(trip)
    }

    async fn find_existing(
        &self,
        trip_id: &ObjectId,
        name: &str,
        address: Option<&str>,
    ) -> Result<Option<ActivityRecommendation>, ServiceError> {
        let address_filter = match address {
            Some(addr) => Bson::String(addr.to_string()),
            None => Bson::Null,
        };
        let existing = mongo::recommendations(&self.client)
            .find_one(doc! {
                "trip_id": trip_id,
                "name": name,
                "address": address_filter,
            })
            .await?;
        Ok(existing)
    }

    async fn insert(&self, rec: &ActivityRecommendation) -> Result<ObjectId, ServiceError> {
        let result = mongo::recommendations(&self.client).insert_one(rec).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| ServiceError::Validation("insert returned no ObjectId".to_string()))
    }

    async fn touch_search_query(&self, id: &ObjectId, query: &str) -> Result<(), ServiceError> {
        mongo::recommendations(&self.client)
            .update_one(
                doc! { "_id": id },
                doc! { "$set": {
                    "search_query": query,
                    "updated_at": Utc::now().to_rfc3339(),
                }},
            )
            .await?;
        Ok(())
    }

    async fn apply_translations(
        &self,
        id: &ObjectId,
        description_zh: Option<&str>,
        cultural_notes_zh: Option<&str>,
        tips_for_chinese_travelers: Option<&str>,
    ) -> Result<(), ServiceError> {
        let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };
        if let Some(value) = description_zh {
            set.insert("description_zh", value);
        }
        if let Some(value) = cultural_notes_zh {
            set.insert("cultural_notes_zh", value);
        }
        if let Some(value) = tips_for_chinese_travelers {
            set.insert("tips_for_chinese_travelers", value);
        }

        mongo::recommendations(&self.client)
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        Ok(())
    }
}

pub struct MongoTranslationCacheStore {
    client: Arc<Client>,
}

impl MongoTranslationCacheStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranslationCacheStore for MongoTranslationCacheStore {
    async fn get(
        &self,
        source_text_hash: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Option<TranslationCacheEntry>, ServiceError> {
        let entry = mongo::translation_cache(&self.client)
            .find_one(doc! {
                "source_text_hash": source_text_hash,
                "source_language": source_language,
                "target_language": target_language,
            })
            .await?;
        Ok(entry)
    }

    async fn record_hit(&self, id: &ObjectId) -> Result<(), ServiceError> {
        mongo::translation_cache(&self.client)
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$inc": { "usage_count": 1 },
                    "$set": { "last_used_at": Utc::now().to_rfc3339() },
                },
            )
            .await?;
        Ok(())
    }

    async fn put(&self, entry: TranslationCacheEntry) -> Result<(), ServiceError> {
        // Same-key rows are overwritten rather than duplicated.
        let existing = self
            .get(
                &entry.source_text_hash,
                &entry.source_language,
                &entry.target_language,
            )
            .await?;

        match existing.and_then(|e| e.id) {
            Some(id) => {
                mongo::translation_cache(&self.client)
                    .update_one(
                        doc! { "_id": id },
                        doc! { "$set": {
                            "translated_text": &entry.translated_text,
                            "translation_service": entry.translation_service.as_deref(),
                            "translation_model": entry.translation_model.as_deref(),
                            "updated_at": Utc::now().to_rfc3339(),
                        }},
                    )
                    .await?;
            }
            None => {
                mongo::translation_cache(&self.client).insert_one(&entry).await?;
            }
        }
        Ok(())
    }
}
