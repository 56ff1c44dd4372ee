use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A candidate activity discovered through external search, held for family
/// voting. Not yet on the itinerary.
///
/// Logical uniqueness is (trip_id, name, address), enforced by a
/// check-then-insert at write time rather than a unique index. Two
/// concurrent searches for the same trip can race on that check; duplicates
/// under concurrency are a known, accepted gap.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActivityRecommendation {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub trip_id: ObjectId,

    pub name: String,
    pub description: Option<String>,
    pub category: String,

    pub location_name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    // External-source identifiers
    pub external_id: Option<String>,
    pub external_source: Option<String>,
    pub external_rating: Option<f64>,
    pub external_review_count: Option<i64>,

    pub estimated_cost: f64,
    pub estimated_duration_hours: Option<f64>,
    pub difficulty_level: Option<String>,
    pub age_appropriate: Option<String>,

    pub primary_image_url: Option<String>,
    /// JSON array of additional image URLs, stored serialized.
    pub image_urls: Option<String>,

    pub search_query: Option<String>,
    pub discovery_date: Option<DateTime<Utc>>,
    pub quality_score: u8,
    pub is_active: bool,

    // Chinese enrichment, filled by the translation collaborator
    pub description_zh: Option<String>,
    pub cultural_notes_zh: Option<String>,
    pub tips_for_chinese_travelers: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateRecommendation {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location_name: Option<String>,
    pub address: Option<String>,
    pub estimated_cost: Option<f64>,
    pub estimated_duration_hours: Option<f64>,
    pub difficulty_level: Option<String>,
    pub age_appropriate: Option<String>,
    pub is_active: Option<bool>,
    pub description_zh: Option<String>,
    pub cultural_notes_zh: Option<String>,
    pub tips_for_chinese_travelers: Option<String>,
}
