use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::collaborators::Geocode;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = "family-trip-planner";

// Nominatim allows at most one request per second.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Nominatim-backed geocoder. All failures collapse to the (0.0, 0.0)
/// sentinel so the pipeline treats them as "no coordinates" rather than
/// errors.
pub struct NominatimGeocoder {
    http_client: reqwest::Client,
    last_request: Mutex<Option<Instant>>,
}

impl Default for NominatimGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NominatimGeocoder {
    pub fn new() -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            last_request: Mutex::new(None),
        }
    }

    /// Sleep long enough to keep at least one second between requests.
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn lookup(&self, address: &str) -> Option<NominatimPlace> {
        let response = self
            .http_client
            .get(format!("{}/search", NOMINATIM_URL))
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            log::error!("Nominatim returned status {}", response.status());
            return None;
        }

        let mut places: Vec<NominatimPlace> = response.json().await.ok()?;
        if places.is_empty() {
            None
        } else {
            Some(places.remove(0))
        }
    }
}

#[async_trait]
impl Geocode for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> (f64, f64) {
        let address = address.trim();
        if address.is_empty() {
            log::warn!("Empty address provided for geocoding");
            return (0.0, 0.0);
        }

        self.rate_limit().await;

        match self.lookup(address).await {
            Some(place) => {
                let lat = place.lat.parse().unwrap_or(0.0);
                let lon = place.lon.parse().unwrap_or(0.0);
                log::info!("Geocoded '{}' to ({}, {})", address, lat, lon);
                (lat, lon)
            }
            None => {
                log::warn!("No geocoding results found for address: '{}'", address);
                (0.0, 0.0)
            }
        }
    }

    async fn reverse(&self, latitude: f64, longitude: f64) -> String {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            log::warn!("Invalid coordinates: ({}, {})", latitude, longitude);
            return String::new();
        }

        self.rate_limit().await;

        let response = self
            .http_client
            .get(format!("{}/reverse", NOMINATIM_URL))
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                match resp.json::<NominatimPlace>().await {
                    Ok(place) => place.display_name,
                    Err(e) => {
                        log::error!("Failed to parse reverse geocoding response: {}", e);
                        String::new()
                    }
                }
            }
            Ok(resp) => {
                log::error!("Reverse geocoding returned status {}", resp.status());
                String::new()
            }
            Err(e) => {
                log::error!(
                    "Reverse geocoding failed for ({}, {}): {}",
                    latitude,
                    longitude,
                    e
                );
                String::new()
            }
        }
    }
}
