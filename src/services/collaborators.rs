use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::models::search::PlaceCandidate;

/// External activity search, e.g. Google Places. The pipeline holds this as
/// an `Option<Arc<dyn SearchProvider>>`; absence selects the fixture
/// fallback tagged `mock_data`.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Stable source name reported in search metadata.
    fn source_name(&self) -> &'static str;

    /// Fetch raw candidates. `location` biases the search when known;
    /// `None` means the query runs un-anchored.
    async fn search(
        &self,
        query: &str,
        destination: &str,
        location: Option<(f64, f64)>,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<PlaceCandidate>, ServiceError>;
}

/// Address ⇄ coordinate resolution. Failures collapse to sentinels:
/// (0.0, 0.0) for geocoding, empty string for reverse geocoding.
#[async_trait]
pub trait Geocode: Send + Sync {
    async fn geocode(&self, address: &str) -> (f64, f64);
    async fn reverse(&self, latitude: f64, longitude: f64) -> String;
}

/// Prose notes plus practical tips synthesized for Chinese travellers.
/// Round-trips losslessly through serde for the durable cache.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CulturalContent {
    pub cultural_notes: String,
    pub travel_tips: String,
}

/// Remote translation model. `None` means "untranslated", never an error
/// that aborts a batch.
#[async_trait]
pub trait Translate: Send + Sync {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Option<String>;

    async fn cultural_content(&self, name: &str, description: &str) -> Option<CulturalContent>;

    /// Service/model identifiers recorded on cache rows.
    fn service_name(&self) -> &'static str;
    fn model_name(&self) -> &'static str;
}
