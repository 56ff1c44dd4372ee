use std::sync::Arc;

use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use super::collaborators::{Geocode, SearchProvider};
use super::quality::score_candidate;
use super::store::RecommendationStore;
use super::translation::TranslationService;
use crate::error::ServiceError;
use crate::models::recommendation::ActivityRecommendation;
use crate::models::search::{PlaceCandidate, SearchMetadata, SearchRequest};

pub const DEFAULT_MIN_QUALITY_SCORE: u8 = 60;

// Fetch more than requested so quality filtering still fills the limit.
const OVERSAMPLE_FACTOR: usize = 3;

/// Orchestrates search → scoring → filtering → dedup/persistence →
/// optional Chinese enrichment, producing persisted recommendations for
/// family voting. Collaborators are injected so tests can run the whole
/// pipeline against doubles.
pub struct RecommendationPipeline {
    search: Option<Arc<dyn SearchProvider>>,
    geocoder: Arc<dyn Geocode>,
    store: Arc<dyn RecommendationStore>,
    translation: Arc<TranslationService>,
    min_quality_score: u8,
}

impl RecommendationPipeline {
    pub fn new(
        search: Option<Arc<dyn SearchProvider>>,
        geocoder: Arc<dyn Geocode>,
        store: Arc<dyn RecommendationStore>,
        translation: Arc<TranslationService>,
        min_quality_score: u8,
    ) -> Self {
        Self {
            search,
            geocoder,
            store,
            translation,
            min_quality_score,
        }
    }

    /// Run the full pipeline for one search request.
    ///
    /// Per-source failures are absorbed and reported through the metadata;
    /// only a missing trip (or malformed id) is fatal to the request.
    pub async fn search_activities(
        &self,
        request: &SearchRequest,
    ) -> Result<(Vec<ActivityRecommendation>, SearchMetadata), ServiceError> {
        let trip_id = ObjectId::parse_str(&request.trip_id)
            .map_err(|_| ServiceError::Validation("Invalid trip id".to_string()))?;

        let trip = self
            .store
            .fetch_trip(&trip_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Trip".to_string()))?;

        let mut metadata = SearchMetadata {
            query: request.query.clone(),
            trip_destination: trip.destination.clone(),
            search_timestamp: Utc::now().to_rfc3339(),
            ..Default::default()
        };

        // Prefer stored accommodation coordinates; otherwise geocode the
        // destination once. Failure leaves the location unset, not fatal.
        let location = match trip.accommodation_coords() {
            Some(coords) => Some(coords),
            None => {
                let (lat, lon) = self.geocoder.geocode(&trip.destination).await;
                if lat == 0.0 && lon == 0.0 {
                    None
                } else {
                    Some((lat, lon))
                }
            }
        };

        let oversample = request.limit.saturating_mul(OVERSAMPLE_FACTOR).max(1);
        let mut candidates: Vec<PlaceCandidate> = Vec::new();

        if let Some(provider) = &self.search {
            let source = provider.source_name().to_string();
            metadata.sources_searched.push(source.clone());
            match provider
                .search(
                    &request.query,
                    &trip.destination,
                    location,
                    request.radius_km,
                    oversample,
                )
                .await
            {
                Ok(results) => {
                    metadata
                        .results_count_by_source
                        .insert(source, results.len());
                    candidates.extend(results);
                }
                Err(e) => {
                    log::error!("{} search failed: {}", provider.source_name(), e);
                    metadata.results_count_by_source.insert(source, 0);
                }
            }
        } else {
            // Deterministic fixtures for demo/test environments.
            let mock = fixture_candidates(&request.query, oversample);
            metadata.sources_searched.push("mock_data".to_string());
            metadata
                .results_count_by_source
                .insert("mock_data".to_string(), mock.len());
            candidates.extend(mock);
        }

        // Score, then drop low-quality and out-of-filter candidates.
        let mut scored: Vec<(PlaceCandidate, u8)> = candidates
            .into_iter()
            .map(|candidate| {
                let score = score_candidate(&candidate);
                (candidate, score)
            })
            .filter(|(_, score)| *score >= self.min_quality_score)
            .collect();
        scored.retain(|(candidate, _)| passes_filters(candidate, request));

        // Descending quality; stable sort keeps discovery order for ties.
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.truncate(request.limit);

        // Persist survivors in ranked order, reusing any existing row with
        // the same (trip_id, name, address).
        let mut recommendations = Vec::with_capacity(scored.len());
        for (candidate, score) in scored {
            let existing = self
                .store
                .find_existing(&trip_id, &candidate.name, candidate.address.as_deref())
                .await?;

            match existing {
                Some(mut rec) => {
                    if let Some(id) = &rec.id {
                        self.store.touch_search_query(id, &request.query).await?;
                    }
                    rec.search_query = Some(request.query.clone());
                    rec.updated_at = Some(Utc::now());
                    recommendations.push(rec);
                }
                None => {
                    let mut rec = build_recommendation(trip_id, candidate, score, &request.query);
                    let id = self.store.insert(&rec).await?;
                    rec.id = Some(id);
                    recommendations.push(rec);
                }
            }
        }

        metadata.final_count = recommendations.len();

        if request.include_chinese_content && self.translation.is_enabled() {
            self.enrich_chinese_content(&mut recommendations).await;
        }

        Ok((recommendations, metadata))
    }

    /// Batch-translate the surviving set and write the results back onto
    /// the same rows. Best effort: items that fail stay untranslated.
    async fn enrich_chinese_content(&self, recommendations: &mut [ActivityRecommendation]) {
        let translated = self.translation.batch_translate(recommendations).await;

        for (rec, content) in recommendations.iter_mut().zip(translated) {
            if content.is_empty() {
                continue;
            }
            if let Some(id) = &rec.id {
                if let Err(e) = self
                    .store
                    .apply_translations(
                        id,
                        content.description_zh.as_deref(),
                        content.cultural_notes_zh.as_deref(),
                        content.tips_for_chinese_travelers.as_deref(),
                    )
                    .await
                {
                    log::error!("Failed to store translations for '{}': {}", rec.name, e);
                    continue;
                }
            }
            if content.description_zh.is_some() {
                rec.description_zh = content.description_zh;
            }
            if content.cultural_notes_zh.is_some() {
                rec.cultural_notes_zh = content.cultural_notes_zh;
            }
            if content.tips_for_chinese_travelers.is_some() {
                rec.tips_for_chinese_travelers = content.tips_for_chinese_travelers;
            }
        }
    }
}

/// Category and budget window checks from the request.
pub fn passes_filters(candidate: &PlaceCandidate, request: &SearchRequest) -> bool {
    if let Some(category) = &request.category {
        if candidate.resolved_category() != *category {
            return false;
        }
    }
    if let Some(min) = request.budget_min {
        if candidate.estimated_cost < min {
            return false;
        }
    }
    if let Some(max) = request.budget_max {
        if candidate.estimated_cost > max {
            return false;
        }
    }
    true
}

fn build_recommendation(
    trip_id: ObjectId,
    candidate: PlaceCandidate,
    quality_score: u8,
    search_query: &str,
) -> ActivityRecommendation {
    let now = Utc::now();
    let image_urls = if candidate.image_urls.is_empty() {
        None
    } else {
        serde_json::to_string(&candidate.image_urls).ok()
    };

    ActivityRecommendation {
        id: None,
        trip_id,
        category: candidate.resolved_category(),
        name: candidate.name,
        description: candidate.description,
        location_name: candidate.location_name,
        address: candidate.address,
        latitude: candidate.latitude,
        longitude: candidate.longitude,
        external_id: candidate.external_id,
        external_source: candidate.external_source.or_else(|| Some("search".to_string())),
        external_rating: candidate.external_rating,
        external_review_count: candidate.external_review_count,
        estimated_cost: candidate.estimated_cost,
        estimated_duration_hours: candidate.estimated_duration_hours,
        difficulty_level: candidate.difficulty_level,
        age_appropriate: candidate.age_appropriate,
        primary_image_url: candidate.primary_image_url,
        image_urls,
        search_query: Some(search_query.to_string()),
        discovery_date: Some(now),
        quality_score,
        is_active: true,
        description_zh: None,
        cultural_notes_zh: None,
        tips_for_chinese_travelers: None,
        created_at: Some(now),
        updated_at: Some(now),
    }
}

/// Fixed fixture list used when no search provider is configured. Filtered
/// by simple keyword relevance; the whole list is returned when nothing
/// matches so demos always show results.
pub fn fixture_candidates(query: &str, limit: usize) -> Vec<PlaceCandidate> {
    let fixtures = vec![
        fixture(
            "Osaka Castle",
            "Historic Japanese castle with beautiful gardens and museum",
            "sightseeing",
            "1-1 Osakajo, Chuo Ward, Osaka",
            (34.6873, 135.5262),
            4.3,
            15420,
            600.0,
            2.5,
            "easy",
            "all_ages",
        ),
        fixture(
            "Dotonbori Food Street",
            "Famous entertainment district known for street food and neon signs",
            "food",
            "Dotonbori, Chuo Ward, Osaka",
            (34.6698, 135.5023),
            4.5,
            8930,
            2500.0,
            3.0,
            "easy",
            "all_ages",
        ),
        fixture(
            "Universal Studios Japan",
            "Theme park with movie-themed attractions and rides",
            "sightseeing",
            "2-1-33 Sakurajima, Konohana Ward, Osaka",
            (34.6658, 135.4322),
            4.4,
            25600,
            8500.0,
            8.0,
            "moderate",
            "families",
        ),
        fixture(
            "Shinsaibashi Shopping District",
            "Major shopping area with department stores and boutiques",
            "shopping",
            "Shinsaibashi, Chuo Ward, Osaka",
            (34.6717, 135.5019),
            4.2,
            12400,
            5000.0,
            4.0,
            "easy",
            "all_ages",
        ),
        fixture(
            "Spa World",
            "Large onsen and spa complex with international themed baths",
            "rest",
            "3-4-24 Ebisuhigashi, Naniwa Ward, Osaka",
            (34.6547, 135.5065),
            4.1,
            7800,
            1500.0,
            3.0,
            "easy",
            "families",
        ),
        fixture(
            "Kuromon Ichiba Market",
            "Traditional market known as 'Osaka's Kitchen' with fresh food",
            "food",
            "2-4-1 Nipponbashi, Chuo Ward, Osaka",
            (34.6662, 135.5069),
            4.0,
            9200,
            1200.0,
            2.0,
            "easy",
            "all_ages",
        ),
    ];

    let query_lower = query.to_lowercase();
    let relevant: Vec<PlaceCandidate> = fixtures
        .iter()
        .filter(|f| {
            f.name.to_lowercase().contains(&query_lower)
                || f.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&query_lower))
                || f.resolved_category().contains(&query_lower)
        })
        .cloned()
        .collect();

    let selected = if relevant.is_empty() { fixtures } else { relevant };
    selected.into_iter().take(limit).collect()
}

#[allow(clippy::too_many_arguments)]
fn fixture(
    name: &str,
    description: &str,
    category: &str,
    address: &str,
    coords: (f64, f64),
    rating: f64,
    reviews: i64,
    cost: f64,
    duration: f64,
    difficulty: &str,
    ages: &str,
) -> PlaceCandidate {
    PlaceCandidate {
        name: name.to_string(),
        description: Some(description.to_string()),
        category: Some(category.to_string()),
        types: Vec::new(),
        location_name: Some(name.to_string()),
        address: Some(address.to_string()),
        latitude: Some(coords.0),
        longitude: Some(coords.1),
        external_id: None,
        external_source: Some("mock_data".to_string()),
        external_rating: Some(rating),
        external_review_count: Some(reviews),
        estimated_cost: cost,
        estimated_duration_hours: Some(duration),
        difficulty_level: Some(difficulty.to_string()),
        age_appropriate: Some(ages.to_string()),
        primary_image_url: Some(
            "https://images.unsplash.com/photo-1590736969955-71cc94901144?w=400".to_string(),
        ),
        image_urls: Vec::new(),
    }
}
