use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::collaborators::SearchProvider;
use crate::error::ServiceError;
use crate::models::search::PlaceCandidate;

const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
const DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const PHOTO_URL: &str = "https://maps.googleapis.com/maps/api/place/photo";
const MAX_PHOTOS: usize = 5;

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    #[serde(default)]
    results: Vec<TextSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TextSearchResult {
    place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize, Default)]
struct PlaceDetails {
    place_id: Option<String>,
    name: Option<String>,
    formatted_address: Option<String>,
    geometry: Option<Geometry>,
    rating: Option<f64>,
    user_ratings_total: Option<i64>,
    #[serde(default)]
    photos: Vec<Photo>,
    #[serde(default)]
    types: Vec<String>,
    editorial_summary: Option<EditorialSummary>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct Photo {
    photo_reference: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EditorialSummary {
    overview: Option<String>,
}

/// Google Places search provider: a text search followed by a details
/// lookup per place, converted to [`PlaceCandidate`] at this boundary so
/// nothing downstream touches the raw API shape.
pub struct GooglePlacesSearch {
    http_client: reqwest::Client,
    api_key: String,
}

impl GooglePlacesSearch {
    pub fn new(api_key: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            api_key,
        }
    }

    async fn place_details(&self, place_id: &str) -> Option<PlaceCandidate> {
        let response = self
            .http_client
            .get(DETAILS_URL)
            .query(&[
                ("place_id", place_id),
                (
                    "fields",
                    "place_id,name,formatted_address,geometry,rating,user_ratings_total,\
                     photos,types,editorial_summary",
                ),
                ("key", &self.api_key),
            ])
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            log::error!("Place details returned status {}", response.status());
            return None;
        }

        let details: DetailsResponse = response.json().await.ok()?;
        let place = details.result?;
        let name = place.name.clone()?;

        let mut image_urls = Vec::new();
        for photo in place.photos.iter().take(MAX_PHOTOS) {
            if let Some(reference) = &photo.photo_reference {
                image_urls.push(format!(
                    "{}?maxwidth=800&photo_reference={}&key={}",
                    PHOTO_URL, reference, self.api_key
                ));
            }
        }
        let primary_image_url = image_urls.first().cloned();

        let location = place.geometry.and_then(|g| g.location);

        Some(PlaceCandidate {
            location_name: Some(name.clone()),
            name,
            description: place.editorial_summary.and_then(|s| s.overview),
            category: place.types.first().cloned(),
            types: place.types,
            address: place.formatted_address,
            latitude: location.as_ref().map(|l| l.lat),
            longitude: location.as_ref().map(|l| l.lng),
            external_id: place.place_id,
            external_source: Some("google_places".to_string()),
            external_rating: place.rating,
            external_review_count: place.user_ratings_total,
            estimated_cost: 0.0,
            estimated_duration_hours: None,
            difficulty_level: None,
            age_appropriate: None,
            primary_image_url,
            image_urls,
        })
    }
}

#[async_trait]
impl SearchProvider for GooglePlacesSearch {
    fn source_name(&self) -> &'static str {
        "google_places"
    }

    async fn search(
        &self,
        query: &str,
        destination: &str,
        location: Option<(f64, f64)>,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<PlaceCandidate>, ServiceError> {
        let mut params = vec![
            ("query".to_string(), format!("{} in {}", query, destination)),
            ("key".to_string(), self.api_key.clone()),
            (
                "type".to_string(),
                "tourist_attraction|restaurant|point_of_interest".to_string(),
            ),
        ];
        // Only anchor the search when coordinates are known.
        if let Some((lat, lon)) = location {
            params.push(("location".to_string(), format!("{},{}", lat, lon)));
            params.push(("radius".to_string(), ((radius_km * 1000.0) as i64).to_string()));
        }

        let response = self
            .http_client
            .get(TEXT_SEARCH_URL)
            .query(&params)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalApi(format!("Google Places request: {}", e)))?;

        if !response.status().is_success() {
            return Err(ServiceError::ExternalApi(format!(
                "Google Places returned status {}",
                response.status()
            )));
        }

        let search: TextSearchResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::ExternalApi(format!("Google Places response: {}", e)))?;

        let mut candidates = Vec::new();
        for result in search.results.into_iter().take(limit) {
            let Some(place_id) = result.place_id else {
                continue;
            };
            if let Some(candidate) = self.place_details(&place_id).await {
                candidates.push(candidate);
            }
        }

        Ok(candidates)
    }
}
