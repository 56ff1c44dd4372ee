use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;

use crate::db::mongo;
use crate::models::family_member::FamilyMember;
use crate::models::recommendation::ActivityRecommendation;
use crate::models::vote::{
    ActivityComment, ActivityVote, CreateComment, CreateVote, UpdateComment, UpdateVote, VoteType,
};
use crate::routes::parse_id;
use crate::services::dashboard::build_voting_dashboard;

#[derive(Debug, Deserialize)]
pub struct VoteQuery {
    pub recommendation_id: Option<String>,
    pub family_member_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentQuery {
    pub recommendation_id: Option<String>,
    pub family_member_id: Option<String>,
}

pub async fn create_vote(
    data: web::Data<Arc<Client>>,
    body: web::Json<CreateVote>,
) -> impl Responder {
    let body = body.into_inner();

    // Reject bad vote values before touching the database.
    let vote_type = match VoteType::parse(&body.vote_type) {
        Some(v) => v,
        None => {
            return HttpResponse::BadRequest().json(json!({
                "error": format!("Invalid vote_type '{}'", body.vote_type)
            }))
        }
    };
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

    let collection = mongo::votes(&data);
    let pair = doc! { "recommendation_id": rec_id, "family_member_id": member_id };

    // One vote per pair: re-voting overwrites the earlier value.
    match collection.find_one(pair.clone()).await {
        Ok(Some(existing)) => {
            let update = doc! { "$set": {
                "vote_type": vote_type.as_str(),
                "updated_at": Utc::now().to_rfc3339(),
            }};
            if let Err(err) = collection.update_one(pair.clone(), update).await {
                log::error!("Failed to update vote: {:?}", err);
                return HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to update vote" }));
            }
            let mut vote = existing;
            vote.vote_type = vote_type;
            vote.updated_at = Some(Utc::now());
            HttpResponse::Ok().json(vote)
        }
        Ok(None) => {
            let now = Utc::now();
            let mut vote = ActivityVote {
                id: None,
                recommendation_id: rec_id,
                family_member_id: member_id,
                vote_type,
                created_at: Some(now),
                updated_at: Some(now),
            };
            match collection.insert_one(&vote).await {
                Ok(result) => {
                    vote.id = result.inserted_id.as_object_id();
                    HttpResponse::Created().json(vote)
                }
                Err(err) => {
                    log::error!("Failed to create vote: {:?}", err);
                    HttpResponse::InternalServerError()
                        .json(json!({ "error": "Failed to create vote" }))
                }
            }
        }
        Err(err) => {
            log::error!("Failed to look up vote: {:?}", err);
            HttpResponse::InternalServerError().json(json!({ "error": "Failed to look up vote" }))
        }
    }
}

pub async fn get_votes(
    data: web::Data<Arc<Client>>,
    params: web::Query<VoteQuery>,
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

    match mongo::votes(&data).find(filter).await {
        Ok(cursor) => match cursor.try_collect::<Vec<ActivityVote>>().await {
            Ok(votes) => HttpResponse::Ok().json(votes),
            Err(err) => {
                log::error!("Failed to collect votes: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to collect votes" }))
            }
        },
        Err(err) => {
            log::error!("Failed to find votes: {:?}", err);
            HttpResponse::InternalServerError().json(json!({ "error": "Failed to find votes" }))
        }
    }
}

pub async fn update_vote(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    body: web::Json<UpdateVote>,
) -> impl Responder {
    let vote_id = match parse_id(&path.into_inner(), "vote") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let vote_type = match VoteType::parse(&body.vote_type) {
        Some(v) => v,
        None => {
            return HttpResponse::BadRequest().json(json!({
                "error": format!("Invalid vote_type '{}'", body.vote_type)
            }))
        }
    };

    let collection = mongo::votes(&data);
    let update = doc! { "$set": {
        "vote_type": vote_type.as_str(),
        "updated_at": Utc::now().to_rfc3339(),
    }};
    match collection.update_one(doc! { "_id": vote_id }, update).await {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().json(json!({ "error": "Vote not found" }))
        }
        Ok(_) => match collection.find_one(doc! { "_id": vote_id }).await {
            Ok(Some(vote)) => HttpResponse::Ok().json(vote),
            _ => {
                HttpResponse::InternalServerError().json(json!({ "error": "Failed to reload vote" }))
            }
        },
        Err(err) => {
            log::error!("Failed to update vote: {:?}", err);
            HttpResponse::InternalServerError().json(json!({ "error": "Failed to update vote" }))
        }
    }
}

pub async fn delete_vote(data: web::Data<Arc<Client>>, path: web::Path<String>) -> impl Responder {
    let vote_id = match parse_id(&path.into_inner(), "vote") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match mongo::votes(&data).delete_one(doc! { "_id": vote_id }).await {
        Ok(result) if result.deleted_count == 0 => {
            HttpResponse::NotFound().json(json!({ "error": "Vote not found" }))
        }
        Ok(_) => HttpResponse::Ok().json(json!({ "message": "Vote deleted successfully" })),
        Err(err) => {
            log::error!("Failed to delete vote: {:?}", err);
            HttpResponse::InternalServerError().json(json!({ "error": "Failed to delete vote" }))
        }
    }
}

pub async fn create_comment(
    data: web::Data<Arc<Client>>,
    body: web::Json<CreateComment>,
) -> impl Responder {
    let body = body.into_inner();
    if body.comment_text.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "comment_text must not be empty" }));
    }
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

    let now = Utc::now();
    let mut comment = ActivityComment {
        id: None,
        recommendation_id: rec_id,
        family_member_id: member_id,
        comment_text: body.comment_text,
        created_at: Some(now),
        updated_at: Some(now),
    };
    match mongo::comments(&data).insert_one(&comment).await {
        Ok(result) => {
            comment.id = result.inserted_id.as_object_id();
            HttpResponse::Created().json(comment)
        }
        Err(err) => {
            log::error!("Failed to create comment: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to create comment" }))
        }
    }
}

pub async fn get_comments(
    data: web::Data<Arc<Client>>,
    params: web::Query<CommentQuery>,
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

    match mongo::comments(&data).find(filter).await {
        Ok(cursor) => match cursor.try_collect::<Vec<ActivityComment>>().await {
            Ok(comments) => HttpResponse::Ok().json(comments),
            Err(err) => {
                log::error!("Failed to collect comments: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to collect comments" }))
            }
        },
        Err(err) => {
            log::error!("Failed to find comments: {:?}", err);
            HttpResponse::InternalServerError().json(json!({ "error": "Failed to find comments" }))
        }
    }
}

pub async fn update_comment(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    body: web::Json<UpdateComment>,
) -> impl Responder {
    let comment_id = match parse_id(&path.into_inner(), "comment") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if body.comment_text.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "comment_text must not be empty" }));
    }

    let collection = mongo::comments(&data);
    let update = doc! { "$set": {
        "comment_text": &body.comment_text,
        "updated_at": Utc::now().to_rfc3339(),
    }};
    match collection
        .update_one(doc! { "_id": comment_id }, update)
        .await
    {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().json(json!({ "error": "Comment not found" }))
        }
        Ok(_) => match collection.find_one(doc! { "_id": comment_id }).await {
            Ok(Some(comment)) => HttpResponse::Ok().json(comment),
            _ => HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to reload comment" })),
        },
        Err(err) => {
            log::error!("Failed to update comment: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to update comment" }))
        }
    }
}

pub async fn delete_comment(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let comment_id = match parse_id(&path.into_inner(), "comment") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match mongo::comments(&data)
        .delete_one(doc! { "_id": comment_id })
        .await
    {
        Ok(result) if result.deleted_count == 0 => {
            HttpResponse::NotFound().json(json!({ "error": "Comment not found" }))
        }
        Ok(_) => HttpResponse::Ok().json(json!({ "message": "Comment deleted successfully" })),
        Err(err) => {
            log::error!("Failed to delete comment: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to delete comment" }))
        }
    }
}

pub async fn voting_dashboard(
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
    let rec_filter = doc! { "recommendation_id": { "$in": rec_ids } };
    let loaded = futures::try_join!(
        async {
            mongo::votes(&data)
                .find(rec_filter.clone())
                .await?
                .try_collect::<Vec<ActivityVote>>()
                .await
        },
        async {
            mongo::comments(&data)
                .find(rec_filter.clone())
                .await?
                .try_collect::<Vec<ActivityComment>>()
                .await
        },
    );
    let (votes, comments) = match loaded {
        Ok(pair) => pair,
        Err(err) => {
            log::error!("Failed to load votes and comments: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to load votes and comments" }));
        }
    };

    let dashboard = build_voting_dashboard(&trip, &members, &recommendations, &votes, &comments);
    HttpResponse::Ok().json(dashboard)
}
