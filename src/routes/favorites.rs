use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::mongo;
use crate::models::family_member::FamilyMember;
use crate::models::favorite::{ActivityFavorite, CreateFavorite};
use crate::models::recommendation::ActivityRecommendation;
use crate::routes::parse_id;
use crate::services::dashboard::build_favorites_dashboard;

const MAX_PAGE_SIZE: u64 = 50;

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct FavoriteQuery {
    pub recommendation_id: Option<String>,
    pub family_member_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

/// A favorite joined with the recommendation it points at.
#[derive(Debug, Serialize)]
pub struct FavoriteWithRecommendation {
    #[serde(flatten)]
    pub favorite: ActivityFavorite,
    pub recommendation: Option<ActivityRecommendation>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteListResponse {
    pub favorites: Vec<FavoriteWithRecommendation>,
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

pub async fn create_favorite(
    data: web::Data<Arc<Client>>,
    body: web::Json<CreateFavorite>,
) -> impl Responder {
    let body = body.into_inner();
    let rec_id = match parse_id(&body.recommendation_id, "recommendation") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let member_id = match parse_id(&body.family_member_id, "family member") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match mongo::recommendations(&data)
        .find_one(doc! { "_id": rec_id })
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({ "error": "Recommendation not found" }))
        }
        Err(err) => {
            log::error!("Failed to fetch recommendation: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch recommendation" }));
        }
    }
    match mongo::family_members(&data)
        .find_one(doc! { "_id": member_id })
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({ "error": "Family member not found" }))
        }
        Err(err) => {
            log::error!("Failed to fetch family member: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch family member" }));
        }
    }

    let collection = mongo::favorites(&data);
    let pair = doc! { "recommendation_id": rec_id, "family_member_id": member_id };

    // Favoriting twice updates the notes; the original favorite_date stays.
    match collection.find_one(pair.clone()).await {
        Ok(Some(existing)) => {
            let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };
            if let Some(notes) = &body.notes {
                set.insert("notes", notes);
            }
            if let Err(err) = collection
                .update_one(pair.clone(), doc! { "$set": set })
                .await
            {
                log::error!("Failed to update favorite: {:?}", err);
                return HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to update favorite" }));
            }
            let mut favorite = existing;
            if body.notes.is_some() {
                favorite.notes = body.notes;
            }
            favorite.updated_at = Some(Utc::now());
            HttpResponse::Ok().json(favorite)
        }
        Ok(None) => {
            let now = Utc::now();
            let mut favorite = ActivityFavorite {
                id: None,
                recommendation_id: rec_id,
                family_member_id: member_id,
                notes: body.notes,
                favorite_date: Some(now),
                created_at: Some(now),
                updated_at: Some(now),
            };
            match collection.insert_one(&favorite).await {
                Ok(result) => {
                    favorite.id = result.inserted_id.as_object_id();
                    HttpResponse::Created().json(favorite)
                }
                Err(err) => {
                    log::error!("Failed to create favorite: {:?}", err);
                    HttpResponse::InternalServerError()
                        .json(json!({ "error": "Failed to create favorite" }))
                }
            }
        }
        Err(err) => {
            log::error!("Failed to look up favorite: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to look up favorite" }))
        }
    }
}

pub async fn get_favorites(
    data: web::Data<Arc<Client>>,
    params: web::Query<FavoriteQuery>,
) -> impl Responder {
    let mut filter = doc! {};
    if let Some(rec_id) = &params.recommendation_id {
        match parse_id(rec_id, "recommendation") {
            Ok(id) => {
                filter.insert("recommendation_id", id);
            }
            Err(resp) => return resp,
        }
    }
    if let Some(member_id) = &params.family_member_id {
        match parse_id(member_id, "family member") {
            Ok(id) => {
                filter.insert("family_member_id", id);
            }
            Err(resp) => return resp,
        }
    }

    match mongo::favorites(&data).find(filter).await {
        Ok(cursor) => match cursor.try_collect::<Vec<ActivityFavorite>>().await {
            Ok(favorites) => HttpResponse::Ok().json(favorites),
            Err(err) => {
                log::error!("Failed to collect favorites: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to collect favorites" }))
            }
        },
        Err(err) => {
            log::error!("Failed to find favorites: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to find favorites" }))
        }
    }
}

/// Paginated favorites for one family member, each joined with its
/// recommendation so clients can render the list without extra requests.
pub async fn get_member_favorites(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    params: web::Query<FavoriteListQuery>,
) -> impl Responder {
    let member_id = match parse_id(&path.into_inner(), "family member") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match mongo::family_members(&data)
        .find_one(doc! { "_id": member_id })
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({ "error": "Family member not found" }))
        }
        Err(err) => {
            log::error!("Failed to fetch family member: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch family member" }));
        }
    }

    let page = params.page.max(1);
    let page_size = params.page_size.clamp(1, MAX_PAGE_SIZE);
    let filter = doc! { "family_member_id": member_id };

    let collection = mongo::favorites(&data);
    let total_count = match collection.count_documents(filter.clone()).await {
        Ok(count) => count,
        Err(err) => {
            log::error!("Failed to count favorites: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to count favorites" }));
        }
    };

    let favorites: Vec<ActivityFavorite> = match collection
        .find(filter)
        .sort(doc! { "favorite_date": -1 })
        .skip((page - 1) * page_size)
        .limit(page_size as i64)
        .await
    {
        Ok(cursor) => match cursor.try_collect().await {
            Ok(favorites) => favorites,
            Err(err) => {
                log::error!("Failed to collect favorites: {:?}", err);
                return HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to collect favorites" }));
            }
        },
        Err(err) => {
            log::error!("Failed to find favorites: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to find favorites" }));
        }
    };

    let rec_ids: Vec<ObjectId> = favorites.iter().map(|f| f.recommendation_id).collect();
    let recommendations: Vec<ActivityRecommendation> = match mongo::recommendations(&data)
        .find(doc! { "_id": { "$in": rec_ids } })
        .await
    {
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

    let joined: Vec<FavoriteWithRecommendation> = favorites
        .into_iter()
        .map(|favorite| {
            let recommendation = recommendations
                .iter()
                .find(|r| r.id == Some(favorite.recommendation_id))
                .cloned();
            FavoriteWithRecommendation {
                favorite,
                recommendation,
            }
        })
        .collect();

    HttpResponse::Ok().json(FavoriteListResponse {
        favorites: joined,
        total_count,
        page,
        page_size,
        has_next: page * page_size < total_count,
        has_previous: page > 1,
    })
}

#[derive(Debug, Deserialize)]
pub struct UpdateFavorite {
    pub notes: Option<String>,
}

pub async fn update_favorite(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    body: web::Json<UpdateFavorite>,
) -> impl Responder {
    let favorite_id = match parse_id(&path.into_inner(), "favorite") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };
    if let Some(notes) = &body.notes {
        set.insert("notes", notes);
    }

    let collection = mongo::favorites(&data);
    match collection
        .update_one(doc! { "_id": favorite_id }, doc! { "$set": set })
        .await
    {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().json(json!({ "error": "Favorite not found" }))
        }
        Ok(_) => match collection.find_one(doc! { "_id": favorite_id }).await {
            Ok(Some(favorite)) => HttpResponse::Ok().json(favorite),
            _ => HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to reload favorite" })),
        },
        Err(err) => {
            log::error!("Failed to update favorite: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to update favorite" }))
        }
    }
}

/// Remove a favorite addressed by its (recommendation, family member) pair
/// instead of its own id.
pub async fn delete_favorite_by_pair(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (rec_raw, member_raw) = path.into_inner();
    let rec_id = match parse_id(&rec_raw, "recommendation") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let member_id = match parse_id(&member_raw, "family member") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match mongo::favorites(&data)
        .delete_one(doc! { "recommendation_id": rec_id, "family_member_id": member_id })
        .await
    {
        Ok(result) if result.deleted_count == 0 => {
            HttpResponse::NotFound().json(json!({ "error": "Favorite not found" }))
        }
        Ok(_) => HttpResponse::Ok().json(json!({ "message": "Favorite deleted successfully" })),
        Err(err) => {
            log::error!("Failed to delete favorite: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to delete favorite" }))
        }
    }
}

pub async fn check_favorite(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (rec_raw, member_raw) = path.into_inner();
    let rec_id = match parse_id(&rec_raw, "recommendation") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let member_id = match parse_id(&member_raw, "family member") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match mongo::favorites(&data)
        .find_one(doc! { "recommendation_id": rec_id, "family_member_id": member_id })
        .await
    {
        Ok(favorite) => HttpResponse::Ok().json(json!({
            "is_favorited": favorite.is_some(),
            "favorite_id": favorite.as_ref().and_then(|f| f.id).map(|id| id.to_hex()),
            "favorite_date": favorite.as_ref().and_then(|f| f.favorite_date),
            "notes": favorite.and_then(|f| f.notes),
        })),
        Err(err) => {
            log::error!("Failed to look up favorite: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to look up favorite" }))
        }
    }
}

pub async fn delete_favorite(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let favorite_id = match parse_id(&path.into_inner(), "favorite") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match mongo::favorites(&data)
        .delete_one(doc! { "_id": favorite_id })
        .await
    {
        Ok(result) if result.deleted_count == 0 => {
            HttpResponse::NotFound().json(json!({ "error": "Favorite not found" }))
        }
        Ok(_) => HttpResponse::Ok().json(json!({ "message": "Favorite deleted successfully" })),
        Err(err) => {
            log::error!("Failed to delete favorite: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to delete favorite" }))
        }
    }
}

pub async fn favorites_dashboard(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let trip_id = match parse_id(&path.into_inner(), "trip") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let trip = match mongo::trips(&data).find_one(doc! { "_id": trip_id }).await {
        Ok(Some(trip)) => trip,
        Ok(None) => return HttpResponse::NotFound().json(json!({ "error": "Trip not found" })),
        Err(err) => {
            log::error!("Failed to fetch trip: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch trip" }));
        }
    };

    let loaded = futures::try_join!(
        async {
            mongo::family_members(&data)
                .find(doc! { "trip_id": trip_id })
                .await?
                .try_collect::<Vec<FamilyMember>>()
                .await
        },
        async {
            mongo::recommendations(&data)
                .find(doc! { "trip_id": trip_id, "is_active": true })
                .await?
                .try_collect::<Vec<ActivityRecommendation>>()
                .await
        },
    );
    let (members, recommendations) = match loaded {
        Ok(pair) => pair,
        Err(err) => {
            log::error!("Failed to load dashboard rows: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to load dashboard rows" }));
        }
    };

    let rec_ids: Vec<ObjectId> = recommendations.iter().filter_map(|r| r.id).collect();
    let favorites: Vec<ActivityFavorite> = match mongo::favorites(&data)
        .find(doc! { "recommendation_id": { "$in": rec_ids } })
        .await
    {
        Ok(cursor) => match cursor.try_collect().await {
            Ok(favorites) => favorites,
            Err(err) => {
                log::error!("Failed to collect favorites: {:?}", err);
                return HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to collect favorites" }));
            }
        },
        Err(err) => {
            log::error!("Failed to find favorites: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to find favorites" }));
        }
    };

    let dashboard = build_favorites_dashboard(&trip, &members, &recommendations, &favorites);
    HttpResponse::Ok().json(dashboard)
}
