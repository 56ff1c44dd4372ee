use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::{json, Value};

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const CACHE_TTL: Duration = Duration::from_secs(600);
const MAX_FORECAST_DAYS: u32 = 5;

struct CacheEntry {
    data: Value,
    fetched_at: Instant,
}

/// OpenWeatherMap client with a 10-minute in-memory cache keyed by
/// (endpoint, lat, lon). Degrades to empty JSON objects on any failure;
/// state is process-local and resets on restart.
pub struct WeatherService {
    http_client: reqwest::Client,
    api_key: Option<String>,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl WeatherService {
    pub fn new(api_key: Option<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            api_key,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cache_key(endpoint: &str, lat: f64, lon: f64) -> String {
        format!("{}_{}_{}", endpoint, lat, lon)
    }

    fn cached(&self, key: &str) -> Option<Value> {
        let cache = self.cache.lock().ok()?;
        let entry = cache.get(key)?;
        if entry.fetched_at.elapsed() < CACHE_TTL {
            Some(entry.data.clone())
        } else {
            None
        }
    }

    fn store(&self, key: String, data: Value) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(
                key,
                CacheEntry {
                    data,
                    fetched_at: Instant::now(),
                },
            );
        }
    }

    async fn fetch(&self, path: &str, params: &[(String, String)]) -> Value {
        let result = self
            .http_client
            .get(format!("{}/{}", BASE_URL, path))
            .query(params)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => response
                .json::<Value>()
                .await
                .unwrap_or_else(|e| {
                    log::error!("Failed to parse weather response: {}", e);
                    json!({})
                }),
            Ok(response) => {
                log::error!("Weather API returned status {}", response.status());
                json!({})
            }
            Err(e) => {
                log::error!("Weather API request error: {}", e);
                json!({})
            }
        }
    }

    /// Current conditions for the coordinates, or `{}` when the key is
    /// missing or the call fails.
    pub async fn get_current_weather(&self, latitude: f64, longitude: f64) -> Value {
        let api_key = match &self.api_key {
            Some(key) => key.clone(),
            None => {
                log::warn!("OpenWeatherMap API key not configured");
                return json!({});
            }
        };

        let key = Self::cache_key("current", latitude, longitude);
        if let Some(data) = self.cached(&key) {
            log::info!(
                "Returning cached current weather for ({}, {})",
                latitude,
                longitude
            );
            return data;
        }

        let params = vec![
            ("lat".to_string(), latitude.to_string()),
            ("lon".to_string(), longitude.to_string()),
            ("appid".to_string(), api_key),
            ("units".to_string(), "metric".to_string()),
        ];
        let data = self.fetch("weather", &params).await;

        if data.as_object().is_some_and(|o| !o.is_empty()) {
            self.store(key, data.clone());
        }
        data
    }

    /// 3-hourly forecast rolled up by the caller; `days` is clamped to the
    /// free-tier maximum of 5.
    pub async fn get_weather_forecast(&self, latitude: f64, longitude: f64, days: u32) -> Value {
        let api_key = match &self.api_key {
            Some(key) => key.clone(),
            None => {
                log::warn!("OpenWeatherMap API key not configured");
                return json!({});
            }
        };

        let days = days.min(MAX_FORECAST_DAYS).max(1);
        let key = Self::cache_key(&format!("forecast_{}", days), latitude, longitude);
        if let Some(data) = self.cached(&key) {
            log::info!("Returning cached forecast for ({}, {})", latitude, longitude);
            return data;
        }

        let params = vec![
            ("lat".to_string(), latitude.to_string()),
            ("lon".to_string(), longitude.to_string()),
            ("appid".to_string(), api_key),
            ("units".to_string(), "metric".to_string()),
            // 8 forecast points per day, one every 3 hours
            ("cnt".to_string(), (days * 8).to_string()),
        ];
        let data = self.fetch("forecast", &params).await;

        if data.as_object().is_some_and(|o| !o.is_empty()) {
            self.store(key, data.clone());
        }
        data
    }
}

/// Reduce a raw current-weather payload to the fields the dashboard shows.
pub fn format_weather_summary(weather_data: &Value) -> Value {
    let main = &weather_data["main"];
    let weather = &weather_data["weather"][0];

    if main.is_null() || weather.is_null() {
        return json!({});
    }

    json!({
        "temperature": main["temp"].as_f64().unwrap_or(0.0).round(),
        "feels_like": main["feels_like"].as_f64().unwrap_or(0.0).round(),
        "humidity": main["humidity"].as_i64().unwrap_or(0),
        "description": weather["description"].as_str().unwrap_or(""),
        "icon": weather["icon"].as_str().unwrap_or(""),
        "condition": weather["main"].as_str().unwrap_or(""),
        "city": weather_data["name"].as_str().unwrap_or(""),
    })
}

/// Collapse the 3-hourly forecast list into one summary per day: min/max
/// temperature plus the most frequent condition.
pub fn daily_forecasts(forecast_data: &Value) -> Vec<Value> {
    let list = match forecast_data["list"].as_array() {
        Some(list) => list,
        None => return Vec::new(),
    };

    let mut days: Vec<(String, Vec<f64>, Vec<String>)> = Vec::new();

    for item in list {
        let timestamp = item["dt"].as_i64().unwrap_or(0);
        let date = match chrono::DateTime::from_timestamp(timestamp, 0) {
            Some(dt) => dt.format("%Y-%m-%d").to_string(),
            None => continue,
        };

        if days.last().map(|(d, _, _)| d.as_str()) != Some(date.as_str()) {
            days.push((date, Vec::new(), Vec::new()));
        }
        let (_, temps, conditions) = days.last_mut().expect("just pushed");

        if let Some(t) = item["main"]["temp_min"].as_f64() {
            temps.push(t);
        }
        if let Some(t) = item["main"]["temp_max"].as_f64() {
            temps.push(t);
        }
        if let Some(c) = item["weather"][0]["main"].as_str() {
            conditions.push(c.to_string());
        }
    }

    days.into_iter()
        .filter(|(_, temps, _)| !temps.is_empty())
        .map(|(date, temps, conditions)| {
            let min = temps.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = temps.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

            let mut counts: HashMap<&str, usize> = HashMap::new();
            for condition in &conditions {
                *counts.entry(condition.as_str()).or_insert(0) += 1;
            }
            let dominant = counts
                .into_iter()
                .max_by_key(|(_, count)| *count)
                .map(|(condition, _)| condition.to_string())
                .unwrap_or_default();

            json!({
                "date": date,
                "min_temp": min.round(),
                "max_temp": max.round(),
                "condition": dominant,
                "description": format!("{:.0}°-{:.0}°C", min, max),
            })
        })
        .collect()
}
