use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A scheduled, budgeted item on the trip itinerary. Distinct from an
/// [`ActivityRecommendation`](super::recommendation::ActivityRecommendation),
/// which is a discovered candidate still subject to family voting.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Activity {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub trip_id: ObjectId,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub scheduled_date: Option<NaiveDate>,
    pub location_name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub estimated_cost: f64,
    pub estimated_duration_hours: Option<f64>,
    pub description_zh: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateActivity {
    pub trip_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub scheduled_date: Option<NaiveDate>,
    pub location_name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub estimated_cost: f64,
    pub estimated_duration_hours: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateActivity {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub location_name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub estimated_cost: Option<f64>,
    pub estimated_duration_hours: Option<f64>,
    pub description_zh: Option<String>,
}
