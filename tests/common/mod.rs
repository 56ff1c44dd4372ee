#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;

use trip_planner_api::error::ServiceError;
use trip_planner_api::models::activity::Activity;
use trip_planner_api::models::family_member::FamilyMember;
use trip_planner_api::models::recommendation::ActivityRecommendation;
use trip_planner_api::models::search::PlaceCandidate;
use trip_planner_api::models::translation_cache::TranslationCacheEntry;
use trip_planner_api::models::trip::Trip;
use trip_planner_api::services::collaborators::{
    CulturalContent, Geocode, SearchProvider, Translate,
};
use trip_planner_api::services::store::{RecommendationStore, TranslationCacheStore};

pub fn sample_trip(id: ObjectId, destination: &str, coords: Option<(f64, f64)>) -> Trip {
    Trip {
        id: Some(id),
        name: format!("{} family trip", destination),
        destination: destination.to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 10, 8).unwrap(),
        accommodation_address: None,
        accommodation_lat: coords.map(|c| c.0),
        accommodation_lon: coords.map(|c| c.1),
        total_budget: 100_000.0,
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    }
}

pub fn member(
    trip_id: ObjectId,
    name: &str,
    age: Option<u8>,
    dietary_restrictions: Option<&str>,
    interests: Option<&str>,
) -> FamilyMember {
    let now = Utc::now();
    FamilyMember {
        id: Some(ObjectId::new()),
        trip_id,
        name: name.to_string(),
        role: "parent".to_string(),
        age,
        dietary_restrictions: dietary_restrictions.map(str::to_string),
        mobility_needs: None,
        interests: interests.map(str::to_string),
        wishlist: None,
        created_at: Some(now),
        updated_at: Some(now),
    }
}

pub fn scheduled_activity(
    trip_id: ObjectId,
    name: &str,
    scheduled_date: Option<NaiveDate>,
    estimated_cost: f64,
) -> Activity {
    let now = Utc::now();
    Activity {
        id: Some(ObjectId::new()),
        trip_id,
        name: name.to_string(),
        description: None,
        category: "sightseeing".to_string(),
        scheduled_date,
        location_name: None,
        address: None,
        latitude: None,
        longitude: None,
        estimated_cost,
        estimated_duration_hours: Some(2.0),
        description_zh: None,
        created_at: Some(now),
        updated_at: Some(now),
    }
}

pub fn candidate(name: &str, category: &str, rating: f64, reviews: i64, cost: f64) -> PlaceCandidate {
    PlaceCandidate {
        name: name.to_string(),
        description: Some(format!("{} description", name)),
        category: Some(category.to_string()),
        address: Some(format!("{} street 1", name)),
        location_name: Some(name.to_string()),
        external_rating: Some(rating),
        external_review_count: Some(reviews),
        estimated_cost: cost,
        primary_image_url: Some("https://example.com/photo.jpg".to_string()),
        ..Default::default()
    }
}

pub fn sample_recommendation(name: &str, description: Option<&str>) -> ActivityRecommendation {
    let now = Utc::now();
    ActivityRecommendation {
        id: Some(ObjectId::new()),
        trip_id: ObjectId::new(),
        name: name.to_string(),
        description: description.map(str::to_string),
        category: "sightseeing".to_string(),
        location_name: None,
        address: None,
        latitude: None,
        longitude: None,
        external_id: None,
        external_source: Some("search".to_string()),
        external_rating: Some(4.2),
        external_review_count: Some(1500),
        estimated_cost: 1000.0,
        estimated_duration_hours: Some(2.0),
        difficulty_level: None,
        age_appropriate: None,
        primary_image_url: None,
        image_urls: None,
        search_query: Some("things to do".to_string()),
        discovery_date: Some(now),
        quality_score: 75,
        is_active: true,
        description_zh: None,
        cultural_notes_zh: None,
        tips_for_chinese_travelers: None,
        created_at: Some(now),
        updated_at: Some(now),
    }
}

/// Search provider double returning a preconfigured candidate list, or an
/// error when `fail` is set.
pub struct FixedSearch {
    pub results: Vec<PlaceCandidate>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FixedSearch {
    pub fn new(results: Vec<PlaceCandidate>) -> Self {
        Self {
            results,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            results: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SearchProvider for FixedSearch {
    fn source_name(&self) -> &'static str {
        "fixed_search"
    }

    async fn search(
        &self,
        _query: &str,
        _destination: &str,
        _location: Option<(f64, f64)>,
        _radius_km: f64,
        limit: usize,
    ) -> Result<Vec<PlaceCandidate>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ServiceError::ExternalApi("search unavailable".to_string()));
        }
        Ok(self.results.iter().take(limit).cloned().collect())
    }
}

/// Geocoder double with a fixed answer and call counting.
pub struct StubGeocoder {
    pub coords: (f64, f64),
    pub calls: AtomicUsize,
}

impl StubGeocoder {
    pub fn new(coords: (f64, f64)) -> Self {
        Self {
            coords,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Geocode for StubGeocoder {
    async fn geocode(&self, _address: &str) -> (f64, f64) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.coords
    }

    async fn reverse(&self, _latitude: f64, _longitude: f64) -> String {
        "Somewhere, Osaka".to_string()
    }
}

/// In-memory recommendation store for pipeline tests.
pub struct MemoryStore {
    pub trip: Option<Trip>,
    pub rows: Mutex<Vec<ActivityRecommendation>>,
    pub touched: AtomicUsize,
}

impl MemoryStore {
    pub fn new(trip: Trip) -> Self {
        Self {
            trip: Some(trip),
            rows: Mutex::new(Vec::new()),
            touched: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            trip: None,
            rows: Mutex::new(Vec::new()),
            touched: AtomicUsize::new(0),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl RecommendationStore for MemoryStore {
    async fn fetch_trip(&self, trip_id: &ObjectId) -> Result<Option<Trip>, ServiceError> {
        Ok(self
            .trip
            .clone()
            .filter(|trip| trip.id.as_ref() == Some(trip_id)))
    }

    async fn find_existing(
        &self,
        trip_id: &ObjectId,
        name: &str,
        address: Option<&str>,
    ) -> Result<Option<ActivityRecommendation>, ServiceError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|r| r.trip_id == *trip_id && r.name == name && r.address.as_deref() == address)
            .cloned())
    }

    async fn insert(&self, rec: &ActivityRecommendation) -> Result<ObjectId, ServiceError> {
        let id = ObjectId::new();
        let mut stored = rec.clone();
        stored.id = Some(id);
        self.rows.lock().unwrap().push(stored);
        Ok(id)
    }

    async fn touch_search_query(&self, id: &ObjectId, query: &str) -> Result<(), ServiceError> {
        self.touched.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id.as_ref() == Some(id)) {
            row.search_query = Some(query.to_string());
            row.updated_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn apply_translations(
        &self,
        id: &ObjectId,
        description_zh: Option<&str>,
        cultural_notes_zh: Option<&str>,
        tips_for_chinese_travelers: Option<&str>,
    ) -> Result<(), ServiceError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id.as_ref() == Some(id)) {
            row.description_zh = description_zh.map(str::to_string);
            row.cultural_notes_zh = cultural_notes_zh.map(str::to_string);
            row.tips_for_chinese_travelers = tips_for_chinese_travelers.map(str::to_string);
        }
        Ok(())
    }
}

/// In-memory translation cache keyed like the durable one.
#[derive(Default)]
pub struct MemoryCache {
    pub rows: Mutex<Vec<TranslationCacheEntry>>,
    pub hits: AtomicUsize,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn usage_count(&self, hash: &str) -> i64 {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.source_text_hash == hash)
            .map(|r| r.usage_count)
            .unwrap_or(0)
    }
}

#[async_trait]
impl TranslationCacheStore for MemoryCache {
    async fn get(
        &self,
        source_text_hash: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Option<TranslationCacheEntry>, ServiceError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|r| {
                r.source_text_hash == source_text_hash
                    && r.source_language == source_language
                    && r.target_language == target_language
            })
            .cloned())
    }

    async fn record_hit(&self, id: &ObjectId) -> Result<(), ServiceError> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id.as_ref() == Some(id)) {
            row.usage_count += 1;
            row.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn put(&self, mut entry: TranslationCacheEntry) -> Result<(), ServiceError> {
        if entry.id.is_none() {
            entry.id = Some(ObjectId::new());
        }
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|r| {
            !(r.source_text_hash == entry.source_text_hash
                && r.source_language == entry.source_language
                && r.target_language == entry.target_language)
        });
        rows.push(entry);
        Ok(())
    }
}

/// Deterministic remote translator that counts calls.
pub struct CountingTranslator {
    pub translate_calls: AtomicUsize,
    pub cultural_calls: AtomicUsize,
}

impl CountingTranslator {
    pub fn new() -> Self {
        Self {
            translate_calls: AtomicUsize::new(0),
            cultural_calls: AtomicUsize::new(0),
        }
    }
}

impl Default for CountingTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translate for CountingTranslator {
    async fn translate(&self, text: &str, _source_lang: &str, _target_lang: &str) -> Option<String> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        Some(format!("译文:{}", text))
    }

    async fn cultural_content(&self, name: &str, _description: &str) -> Option<CulturalContent> {
        self.cultural_calls.fetch_add(1, Ordering::SeqCst);
        Some(CulturalContent {
            cultural_notes: format!("{} 文化背景", name),
            travel_tips: format!("{} 实用建议", name),
        })
    }

    fn service_name(&self) -> &'static str {
        "counting_fake"
    }

    fn model_name(&self) -> &'static str {
        "fake-1"
    }
}
