use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::recommendation::ActivityRecommendation;
use crate::services::dashboard::VoteSummary;

fn default_radius_km() -> f64 {
    5.0
}

fn default_limit() -> usize {
    20
}

/// Body of `POST /api/search/activities`.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub trip_id: String,
    pub category: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// When true the surviving set is batch-translated for Chinese readers.
    #[serde(default)]
    pub include_chinese_content: bool,
}

/// One raw candidate from a search source, validated into explicit optional
/// fields at the collaborator boundary before it enters the pipeline.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PlaceCandidate {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Source-side type tags, e.g. Google Places `types`.
    #[serde(default)]
    pub types: Vec<String>,
    pub location_name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub external_id: Option<String>,
    pub external_source: Option<String>,
    pub external_rating: Option<f64>,
    pub external_review_count: Option<i64>,
    #[serde(default)]
    pub estimated_cost: f64,
    pub estimated_duration_hours: Option<f64>,
    pub difficulty_level: Option<String>,
    pub age_appropriate: Option<String>,
    pub primary_image_url: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl PlaceCandidate {
    /// First non-empty category, falling back to the leading type tag.
    pub fn resolved_category(&self) -> String {
        if let Some(category) = &self.category {
            if !category.is_empty() {
                return category.clone();
            }
        }
        self.types
            .first()
            .cloned()
            .unwrap_or_else(|| "general".to_string())
    }
}

/// What the pipeline attempted and what each source yielded. When no real
/// provider is configured `sources_searched` contains `"mock_data"`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SearchMetadata {
    pub query: String,
    pub trip_destination: String,
    pub sources_searched: Vec<String>,
    pub results_count_by_source: HashMap<String, usize>,
    pub search_timestamp: String,
    pub final_count: usize,
}

/// A recommendation enriched with its vote aggregate for API responses.
#[derive(Debug, Serialize)]
pub struct RecommendationWithScores {
    #[serde(flatten)]
    pub recommendation: ActivityRecommendation,
    pub vote_summary: VoteSummary,
    pub popularity_score: f64,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub recommendations: Vec<RecommendationWithScores>,
    pub total_count: usize,
    pub search_metadata: SearchMetadata,
}

#[derive(Debug, Serialize)]
pub struct RecommendationListResponse {
    pub recommendations: Vec<RecommendationWithScores>,
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub has_next: bool,
    pub has_previous: bool,
}
