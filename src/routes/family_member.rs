use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo;
use crate::models::family_member::{CreateFamilyMember, FamilyMember, UpdateFamilyMember};
use crate::routes::parse_id;

#[derive(Debug, Deserialize)]
pub struct MemberQuery {
    pub trip_id: Option<String>,
}

pub async fn create_member(
    data: web::Data<Arc<Client>>,
    body: web::Json<CreateFamilyMember>,
) -> impl Responder {
    let body = body.into_inner();
    let trip_id = match parse_id(&body.trip_id, "trip") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match mongo::trips(&data).find_one(doc! { "_id": trip_id }).await {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::NotFound().json(json!({ "error": "Trip not found" })),
        Err(err) => {
            log::error!("Failed to fetch trip: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch trip" }));
        }
    }

    let now = Utc::now();
    let mut member = FamilyMember {
        id: None,
        trip_id,
        name: body.name,
        role: body.role,
        age: body.age,
        dietary_restrictions: body.dietary_restrictions,
        mobility_needs: body.mobility_needs,
        interests: body.interests,
        wishlist: body.wishlist,
        created_at: Some(now),
        updated_at: Some(now),
    };

    match mongo::family_members(&data).insert_one(&member).await {
        Ok(result) => {
            member.id = result.inserted_id.as_object_id();
            HttpResponse::Created().json(member)
        }
        Err(err) => {
            log::error!("Failed to create family member: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to create family member" }))
        }
    }
}

pub async fn get_members(
    data: web::Data<Arc<Client>>,
    params: web::Query<MemberQuery>,
) -> impl Responder {
    let filter = match &params.trip_id {
        Some(trip_id) => match parse_id(trip_id, "trip") {
            Ok(id) => doc! { "trip_id": id },
            Err(resp) => return resp,
        },
        None => doc! {},
    };

    match mongo::family_members(&data).find(filter).await {
        Ok(cursor) => match cursor.try_collect::<Vec<FamilyMember>>().await {
            Ok(members) => HttpResponse::Ok().json(members),
            Err(err) => {
                log::error!("Failed to collect family members: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to collect family members" }))
            }
        },
        Err(err) => {
            log::error!("Failed to find family members: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to find family members" }))
        }
    }
}

pub async fn get_member_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let member_id = match parse_id(&path.into_inner(), "family member") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match mongo::family_members(&data)
        .find_one(doc! { "_id": member_id })
        .await
    {
        Ok(Some(member)) => HttpResponse::Ok().json(member),
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "Family member not found" })),
        Err(err) => {
            log::error!("Failed to fetch family member: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch family member" }))
        }
    }
}

pub async fn update_member(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    body: web::Json<UpdateFamilyMember>,
) -> impl Responder {
    let member_id = match parse_id(&path.into_inner(), "family member") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let patch = body.into_inner();

    let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };
    if let Some(name) = patch.name {
        set.insert("name", name);
    }
    if let Some(role) = patch.role {
        set.insert("role", role);
    }
    if let Some(age) = patch.age {
        set.insert("age", age as i32);
    }
    if let Some(value) = patch.dietary_restrictions {
        set.insert("dietary_restrictions", value);
    }
    if let Some(value) = patch.mobility_needs {
        set.insert("mobility_needs", value);
    }
    if let Some(value) = patch.interests {
        set.insert("interests", value);
    }
    if let Some(value) = patch.wishlist {
        set.insert("wishlist", value);
    }

    let collection = mongo::family_members(&data);
    match collection
        .update_one(doc! { "_id": member_id }, doc! { "$set": set })
        .await
    {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().json(json!({ "error": "Family member not found" }))
        }
        Ok(_) => match collection.find_one(doc! { "_id": member_id }).await {
            Ok(Some(member)) => HttpResponse::Ok().json(member),
            _ => HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to reload family member" })),
        },
        Err(err) => {
            log::error!("Failed to update family member: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to update family member" }))
        }
    }
}

pub async fn delete_member(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let member_id = match parse_id(&path.into_inner(), "family member") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    // Their votes, favorites, and comments go with them.
    let member_filter = doc! { "family_member_id": member_id };
    let cascade = futures::join!(
        async { mongo::votes(&data).delete_many(member_filter.clone()).await },
        async { mongo::favorites(&data).delete_many(member_filter.clone()).await },
        async { mongo::comments(&data).delete_many(member_filter.clone()).await },
    );
    if let (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) = cascade {
        log::error!("Cascade delete failed: {:?}", e);
        return HttpResponse::InternalServerError()
            .json(json!({ "error": "Failed to delete family member" }));
    }

    match mongo::family_members(&data)
        .delete_one(doc! { "_id": member_id })
        .await
    {
        Ok(result) if result.deleted_count == 0 => {
            HttpResponse::NotFound().json(json!({ "error": "Family member not found" }))
        }
        Ok(_) => {
            HttpResponse::Ok().json(json!({ "message": "Family member deleted successfully" }))
        }
        Err(err) => {
            log::error!("Failed to delete family member: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to delete family member" }))
        }
    }
}
