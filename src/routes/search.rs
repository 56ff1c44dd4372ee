use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::doc;
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;

use crate::db::mongo;
use crate::models::recommendation::{ActivityRecommendation, UpdateRecommendation};
use crate::models::search::{
    RecommendationListResponse, RecommendationWithScores, SearchRequest, SearchResponse,
};
use crate::models::vote::ActivityVote;
use crate::routes::parse_id;
use crate::services::dashboard::{popularity_score, vote_summary};
use crate::services::search_pipeline::RecommendationPipeline;

const MAX_PAGE_SIZE: u64 = 50;

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}

/// Active-status filter for the recommendation list. Soft-deleted rows are
/// hidden unless the caller asks for them: "true" when absent, "false" for
/// deleted rows only, "all" to disable the filter.
pub fn parse_active_filter(raw: Option<&str>) -> Result<Option<bool>, String> {
    match raw.unwrap_or("true") {
        "all" => Ok(None),
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        other => Err(format!("Unsupported is_active '{}'", other)),
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub trip_id: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

/// Load vote aggregates for a batch of recommendations in one query.
async fn attach_scores(
    client: &Client,
    recommendations: Vec<ActivityRecommendation>,
) -> Result<Vec<RecommendationWithScores>, mongodb::error::Error> {
    let ids: Vec<ObjectId> = recommendations.iter().filter_map(|r| r.id).collect();

    let mut votes_by_rec: HashMap<ObjectId, Vec<ActivityVote>> = HashMap::new();
    if !ids.is_empty() {
        let votes: Vec<ActivityVote> = mongo::votes(client)
            .find(doc! { "recommendation_id": { "$in": ids.clone() } })
            .await?
            .try_collect()
            .await?;
        for vote in votes {
            votes_by_rec
                .entry(vote.recommendation_id)
                .or_default()
                .push(vote);
        }
    }

    let empty = Vec::new();
    Ok(recommendations
        .into_iter()
        .map(|rec| {
            let votes = rec
                .id
                .and_then(|id| votes_by_rec.get(&id))
                .unwrap_or(&empty);
            let refs: Vec<&ActivityVote> = votes.iter().collect();
            let summary = vote_summary(&refs);
            let popularity = popularity_score(&summary, rec.external_rating);
            RecommendationWithScores {
                recommendation: rec,
                vote_summary: summary,
                popularity_score: popularity,
            }
        })
        .collect())
}

pub async fn search_activities(
    data: web::Data<Arc<Client>>,
    pipeline: web::Data<Arc<RecommendationPipeline>>,
    body: web::Json<SearchRequest>,
) -> impl Responder {
    let request = body.into_inner();
    if request.query.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "query must not be empty" }));
    }

    let (recommendations, metadata) = match pipeline.search_activities(&request).await {
        Ok(result) => result,
        Err(err) => return err.to_response(),
    };

    match attach_scores(&data, recommendations).await {
        Ok(scored) => HttpResponse::Ok().json(SearchResponse {
            total_count: scored.len(),
            recommendations: scored,
            search_metadata: metadata,
        }),
        Err(err) => {
            log::error!("Failed to load vote summaries: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to load vote summaries" }))
        }
    }
}

pub async fn get_recommendations(
    data: web::Data<Arc<Client>>,
    params: web::Query<RecommendationQuery>,
) -> impl Responder {
    let mut filter = doc! {};
    if let Some(trip_id) = &params.trip_id {
        match parse_id(trip_id, "trip") {
            Ok(id) => {
                filter.insert("trip_id", id);
            }
            Err(resp) => return resp,
        }
    }
    if let Some(category) = &params.category {
        filter.insert("category", category);
    }
    match parse_active_filter(params.is_active.as_deref()) {
        Ok(Some(is_active)) => {
            filter.insert("is_active", is_active);
        }
        Ok(None) => {}
        Err(message) => return HttpResponse::BadRequest().json(json!({ "error": message })),
    }

    let page = params.page.max(1);
    let page_size = params.page_size.clamp(1, MAX_PAGE_SIZE);
    let direction = match params.sort_order.as_deref() {
        Some("asc") => 1,
        _ => -1,
    };
    // Popularity is vote-derived and not stored, so it sorts by recency as a
    // proxy at the database and carries exact scores in the response rows.
    let sort_field = match params.sort_by.as_deref() {
        Some("quality_score") => "quality_score",
        Some("created_at") | Some("popularity_score") | None => "created_at",
        Some(other) => {
            return HttpResponse::BadRequest()
                .json(json!({ "error": format!("Unsupported sort_by '{}'", other) }));
        }
    };

    let collection = mongo::recommendations(&data);
    let total_count = match collection.count_documents(filter.clone()).await {
        Ok(count) => count,
        Err(err) => {
            log::error!("Failed to count recommendations: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to count recommendations" }));
        }
    };

    let cursor = collection
        .find(filter)
        .sort(doc! { sort_field: direction })
        .skip((page - 1) * page_size)
        .limit(page_size as i64)
        .await;

    let recommendations: Vec<ActivityRecommendation> = match cursor {
        Ok(cursor) => match cursor.try_collect().await {
            Ok(recs) => recs,
            Err(err) => {
                log::error!("Failed to collect recommendations: {:?}", err);
                return HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to collect recommendations" }));
            }
        },
        Err(err) => {
            log::error!("Failed to find recommendations: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to find recommendations" }));
        }
    };

    match attach_scores(&data, recommendations).await {
        Ok(scored) => HttpResponse::Ok().json(RecommendationListResponse {
            recommendations: scored,
            total_count,
            page,
            page_size,
            has_next: page * page_size < total_count,
            has_previous: page > 1,
        }),
        Err(err) => {
            log::error!("Failed to load vote summaries: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to load vote summaries" }))
        }
    }
}

pub async fn get_recommendation_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let rec_id = match parse_id(&path.into_inner(), "recommendation") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match mongo::recommendations(&data)
        .find_one(doc! { "_id": rec_id })
        .await
    {
        Ok(Some(rec)) => match attach_scores(&data, vec![rec]).await {
            Ok(mut scored) => match scored.pop() {
                Some(item) => HttpResponse::Ok().json(item),
                None => HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to score recommendation" })),
            },
            Err(err) => {
                log::error!("Failed to load vote summary: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to load vote summary" }))
            }
        },
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "Recommendation not found" })),
        Err(err) => {
            log::error!("Failed to fetch recommendation: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch recommendation" }))
        }
    }
}

pub async fn update_recommendation(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    body: web::Json<UpdateRecommendation>,
) -> impl Responder {
    let rec_id = match parse_id(&path.into_inner(), "recommendation") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let patch = body.into_inner();

    if let Some(cost) = patch.estimated_cost {
        if cost < 0.0 {
            return HttpResponse::BadRequest()
                .json(json!({ "error": "estimated_cost must not be negative" }));
        }
    }

    let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };
    if let Some(name) = patch.name {
        set.insert("name", name);
    }
    if let Some(description) = patch.description {
        set.insert("description", description);
    }
    if let Some(category) = patch.category {
        set.insert("category", category);
    }
    if let Some(location_name) = patch.location_name {
        set.insert("location_name", location_name);
    }
    if let Some(address) = patch.address {
        set.insert("address", address);
    }
    if let Some(cost) = patch.estimated_cost {
        set.insert("estimated_cost", cost);
    }
    if let Some(hours) = patch.estimated_duration_hours {
        set.insert("estimated_duration_hours", hours);
    }
    if let Some(difficulty) = patch.difficulty_level {
        set.insert("difficulty_level", difficulty);
    }
    if let Some(ages) = patch.age_appropriate {
        set.insert("age_appropriate", ages);
    }
    if let Some(is_active) = patch.is_active {
        set.insert("is_active", is_active);
    }
    if let Some(text) = patch.description_zh {
        set.insert("description_zh", text);
    }
    if let Some(text) = patch.cultural_notes_zh {
        set.insert("cultural_notes_zh", text);
    }
    if let Some(text) = patch.tips_for_chinese_travelers {
        set.insert("tips_for_chinese_travelers", text);
    }

    let collection = mongo::recommendations(&data);
    match collection
        .update_one(doc! { "_id": rec_id }, doc! { "$set": set })
        .await
    {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().json(json!({ "error": "Recommendation not found" }))
        }
        Ok(_) => match collection.find_one(doc! { "_id": rec_id }).await {
            Ok(Some(rec)) => HttpResponse::Ok().json(rec),
            _ => HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to reload recommendation" })),
        },
        Err(err) => {
            log::error!("Failed to update recommendation: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to update recommendation" }))
        }
    }
}

pub async fn delete_recommendation(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let rec_id = match parse_id(&path.into_inner(), "recommendation") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    // Votes, comments, and favorites reference the recommendation directly.
    let rec_filter = doc! { "recommendation_id": rec_id };
    let cascade = futures::join!(
        async { mongo::votes(&data).delete_many(rec_filter.clone()).await },
        async { mongo::comments(&data).delete_many(rec_filter.clone()).await },
        async { mongo::favorites(&data).delete_many(rec_filter.clone()).await },
    );
    if let (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) = cascade {
        log::error!("Cascade delete failed: {:?}", e);
        return HttpResponse::InternalServerError()
            .json(json!({ "error": "Failed to delete recommendation" }));
    }

    match mongo::recommendations(&data)
        .delete_one(doc! { "_id": rec_id })
        .await
    {
        Ok(result) if result.deleted_count == 0 => {
            HttpResponse::NotFound().json(json!({ "error": "Recommendation not found" }))
        }
        Ok(_) => {
            HttpResponse::Ok().json(json!({ "message": "Recommendation deleted successfully" }))
        }
        Err(err) => {
            log::error!("Failed to delete recommendation: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to delete recommendation" }))
        }
    }
}
