use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A member of the travelling family. The preference fields are free text
/// used only for aggregate reporting.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FamilyMember {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub trip_id: ObjectId,
    pub name: String,
    pub role: String,
    pub age: Option<u8>,
    pub dietary_restrictions: Option<String>,
    pub mobility_needs: Option<String>,
    pub interests: Option<String>,
    pub wishlist: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFamilyMember {
    pub trip_id: String,
    pub name: String,
    pub role: String,
    pub age: Option<u8>,
    pub dietary_restrictions: Option<String>,
    pub mobility_needs: Option<String>,
    pub interests: Option<String>,
    pub wishlist: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateFamilyMember {
    pub name: Option<String>,
    pub role: Option<String>,
    pub age: Option<u8>,
    pub dietary_restrictions: Option<String>,
    pub mobility_needs: Option<String>,
    pub interests: Option<String>,
    pub wishlist: Option<String>,
}
