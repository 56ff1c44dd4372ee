use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo;
use crate::models::activity::{Activity, CreateActivity, UpdateActivity};
use crate::routes::parse_id;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub trip_id: Option<String>,
    pub category: Option<String>,
}

pub async fn create_activity(
    data: web::Data<Arc<Client>>,
    body: web::Json<CreateActivity>,
) -> impl Responder {
    let body = body.into_inner();
    let trip_id = match parse_id(&body.trip_id, "trip") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if body.estimated_cost < 0.0 {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "estimated_cost must not be negative" }));
    }

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
    let mut activity = Activity {
        id: None,
        trip_id,
        name: body.name,
        description: body.description,
        category: body.category,
        scheduled_date: body.scheduled_date,
        location_name: body.location_name,
        address: body.address,
        latitude: body.latitude,
        longitude: body.longitude,
        estimated_cost: body.estimated_cost,
        estimated_duration_hours: body.estimated_duration_hours,
        description_zh: None,
        created_at: Some(now),
        updated_at: Some(now),
    };

    match mongo::activities(&data).insert_one(&activity).await {
        Ok(result) => {
            activity.id = result.inserted_id.as_object_id();
            HttpResponse::Created().json(activity)
        }
        Err(err) => {
            log::error!("Failed to create activity: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to create activity" }))
        }
    }
}

pub async fn get_activities(
    data: web::Data<Arc<Client>>,
    params: web::Query<ActivityQuery>,
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

    match mongo::activities(&data).find(filter).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Activity>>().await {
            Ok(activities) => HttpResponse::Ok().json(activities),
            Err(err) => {
                log::error!("Failed to collect activities: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to collect activities" }))
            }
        },
        Err(err) => {
            log::error!("Failed to find activities: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to find activities" }))
        }
    }
}

pub async fn get_activity_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let activity_id = match parse_id(&path.into_inner(), "activity") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match mongo::activities(&data)
        .find_one(doc! { "_id": activity_id })
        .await
    {
        Ok(Some(activity)) => HttpResponse::Ok().json(activity),
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "Activity not found" })),
        Err(err) => {
            log::error!("Failed to fetch activity: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch activity" }))
        }
    }
}

pub async fn update_activity(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    body: web::Json<UpdateActivity>,
) -> impl Responder {
    let activity_id = match parse_id(&path.into_inner(), "activity") {
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
    if let Some(date) = patch.scheduled_date {
        set.insert("scheduled_date", date.to_string());
    }
    if let Some(location_name) = patch.location_name {
        set.insert("location_name", location_name);
    }
    if let Some(address) = patch.address {
        set.insert("address", address);
    }
    if let Some(latitude) = patch.latitude {
        set.insert("latitude", latitude);
    }
    if let Some(longitude) = patch.longitude {
        set.insert("longitude", longitude);
    }
    if let Some(cost) = patch.estimated_cost {
        set.insert("estimated_cost", cost);
    }
    if let Some(hours) = patch.estimated_duration_hours {
        set.insert("estimated_duration_hours", hours);
    }
    if let Some(description_zh) = patch.description_zh {
        set.insert("description_zh", description_zh);
    }

    let collection = mongo::activities(&data);
    match collection
        .update_one(doc! { "_id": activity_id }, doc! { "$set": set })
        .await
    {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().json(json!({ "error": "Activity not found" }))
        }
        Ok(_) => match collection.find_one(doc! { "_id": activity_id }).await {
            Ok(Some(activity)) => HttpResponse::Ok().json(activity),
            _ => HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to reload activity" })),
        },
        Err(err) => {
            log::error!("Failed to update activity: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to update activity" }))
        }
    }
}

pub async fn delete_activity(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let activity_id = match parse_id(&path.into_inner(), "activity") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match mongo::activities(&data)
        .delete_one(doc! { "_id": activity_id })
        .await
    {
        Ok(result) if result.deleted_count == 0 => {
            HttpResponse::NotFound().json(json!({ "error": "Activity not found" }))
        }
        Ok(_) => HttpResponse::Ok().json(json!({ "message": "Activity deleted successfully" })),
        Err(err) => {
            log::error!("Failed to delete activity: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to delete activity" }))
        }
    }
}
