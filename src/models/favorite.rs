use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One favorite per (recommendation, family member) pair. Re-favoriting
/// updates the notes only; the original favorite_date is kept.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActivityFavorite {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub recommendation_id: ObjectId,
    pub family_member_id: ObjectId,
    pub notes: Option<String>,
    pub favorite_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFavorite {
    pub recommendation_id: String,
    pub family_member_id: String,
    pub notes: Option<String>,
}
