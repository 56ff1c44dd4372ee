use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Trip {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub accommodation_address: Option<String>,
    pub accommodation_lat: Option<f64>,
    pub accommodation_lon: Option<f64>,
    pub total_budget: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Trip {
    /// Coordinates of the accommodation, if both components were resolved.
    pub fn accommodation_coords(&self) -> Option<(f64, f64)> {
        match (self.accommodation_lat, self.accommodation_lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTrip {
    pub name: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub accommodation_address: Option<String>,
    #[serde(default)]
    pub total_budget: f64,
}

/// Partial patch: only provided fields change.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateTrip {
    pub name: Option<String>,
    pub destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub accommodation_address: Option<String>,
    pub accommodation_lat: Option<f64>,
    pub accommodation_lon: Option<f64>,
    pub total_budget: Option<f64>,
}
