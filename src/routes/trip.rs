use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Client;
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo;
use crate::models::activity::Activity;
use crate::models::family_member::FamilyMember;
use crate::models::trip::{CreateTrip, Trip, UpdateTrip};
use crate::routes::parse_id;
use crate::services::collaborators::Geocode;
use crate::services::reports::{aggregate_family_preferences, group_daily_activities};

/// Resolve accommodation coordinates from the address when the caller did
/// not supply them. The (0.0, 0.0) geocoder sentinel leaves the supplied
/// values untouched.
pub async fn resolve_accommodation_coords(
    geocoder: &dyn Geocode,
    address: Option<&str>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> (Option<f64>, Option<f64>) {
    if lat.is_some() && lon.is_some() {
        return (lat, lon);
    }
    let Some(address) = address.filter(|a| !a.trim().is_empty()) else {
        return (lat, lon);
    };
    match geocoder.geocode(address).await {
        (0.0, 0.0) => (lat, lon),
        (resolved_lat, resolved_lon) => (Some(resolved_lat), Some(resolved_lon)),
    }
}

pub async fn create_trip(
    data: web::Data<Arc<Client>>,
    geocoder: web::Data<Arc<dyn Geocode>>,
    body: web::Json<CreateTrip>,
) -> impl Responder {
    let body = body.into_inner();

    if body.start_date >= body.end_date {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "start_date must be before end_date" }));
    }
    if body.total_budget < 0.0 {
        return HttpResponse::BadRequest().json(json!({ "error": "total_budget must be >= 0" }));
    }

    let (accommodation_lat, accommodation_lon) = resolve_accommodation_coords(
        geocoder.get_ref().as_ref(),
        body.accommodation_address.as_deref(),
        None,
        None,
    )
    .await;

    let now = Utc::now();
    let mut trip = Trip {
        id: None,
        name: body.name,
        destination: body.destination,
        start_date: body.start_date,
        end_date: body.end_date,
        accommodation_address: body.accommodation_address,
        accommodation_lat,
        accommodation_lon,
        total_budget: body.total_budget,
        created_at: Some(now),
        updated_at: Some(now),
    };

    match mongo::trips(&data).insert_one(&trip).await {
        Ok(result) => {
            trip.id = result.inserted_id.as_object_id();
            HttpResponse::Created().json(trip)
        }
        Err(err) => {
            log::error!("Failed to create trip: {:?}", err);
            HttpResponse::InternalServerError().json(json!({ "error": "Failed to create trip" }))
        }
    }
}

pub async fn get_trips(data: web::Data<Arc<Client>>) -> impl Responder {
    match mongo::trips(&data).find(doc! {}).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Trip>>().await {
            Ok(trips) => HttpResponse::Ok().json(trips),
            Err(err) => {
                log::error!("Failed to collect trips: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to collect trips" }))
            }
        },
        Err(err) => {
            log::error!("Failed to find trips: {:?}", err);
            HttpResponse::InternalServerError().json(json!({ "error": "Failed to find trips" }))
        }
    }
}

pub async fn get_trip_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let trip_id = match parse_id(&path.into_inner(), "trip") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match mongo::trips(&data).find_one(doc! { "_id": trip_id }).await {
        Ok(Some(trip)) => HttpResponse::Ok().json(trip),
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "Trip not found" })),
        Err(err) => {
            log::error!("Failed to fetch trip: {:?}", err);
            HttpResponse::InternalServerError().json(json!({ "error": "Failed to fetch trip" }))
        }
    }
}

pub async fn update_trip(
    data: web::Data<Arc<Client>>,
    geocoder: web::Data<Arc<dyn Geocode>>,
    path: web::Path<String>,
    body: web::Json<UpdateTrip>,
) -> impl Responder {
    let trip_id = match parse_id(&path.into_inner(), "trip") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let patch = body.into_inner();

    let collection = mongo::trips(&data);
    let existing = match collection.find_one(doc! { "_id": trip_id }).await {
        Ok(Some(trip)) => trip,
        Ok(None) => return HttpResponse::NotFound().json(json!({ "error": "Trip not found" })),
        Err(err) => {
            log::error!("Failed to fetch trip: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch trip" }));
        }
    };

    // Validate the date range after the patch is applied, before mutating.
    let start = patch.start_date.unwrap_or(existing.start_date);
    let end = patch.end_date.unwrap_or(existing.end_date);
    if start >= end {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "start_date must be before end_date" }));
    }
    if patch.total_budget.is_some_and(|b| b < 0.0) {
        return HttpResponse::BadRequest().json(json!({ "error": "total_budget must be >= 0" }));
    }

    let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };
    if let Some(name) = patch.name {
        set.insert("name", name);
    }
    if let Some(destination) = patch.destination {
        set.insert("destination", destination);
    }
    if let Some(start_date) = patch.start_date {
        set.insert("start_date", start_date.to_string());
    }
    if let Some(end_date) = patch.end_date {
        set.insert("end_date", end_date.to_string());
    }
    if let Some(address) = &patch.accommodation_address {
        set.insert("accommodation_address", address);
    }
    // A new address without explicit coordinates is re-geocoded.
    let (lat, lon) = resolve_accommodation_coords(
        geocoder.get_ref().as_ref(),
        patch.accommodation_address.as_deref(),
        patch.accommodation_lat,
        patch.accommodation_lon,
    )
    .await;
    if let Some(lat) = lat {
        set.insert("accommodation_lat", lat);
    }
    if let Some(lon) = lon {
        set.insert("accommodation_lon", lon);
    }
    if let Some(budget) = patch.total_budget {
        set.insert("total_budget", budget);
    }

    match collection
        .update_one(doc! { "_id": trip_id }, doc! { "$set": set })
        .await
    {
        Ok(_) => match collection.find_one(doc! { "_id": trip_id }).await {
            Ok(Some(trip)) => HttpResponse::Ok().json(trip),
            _ => HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to reload trip" })),
        },
        Err(err) => {
            log::error!("Failed to update trip: {:?}", err);
            HttpResponse::InternalServerError().json(json!({ "error": "Failed to update trip" }))
        }
    }
}

/// Delete a trip and everything it owns: activities, family members,
/// recommendations, and the votes/favorites/comments on those
/// recommendations.
pub async fn delete_trip(data: web::Data<Arc<Client>>, path: web::Path<String>) -> impl Responder {
    let trip_id = match parse_id(&path.into_inner(), "trip") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let trips = mongo::trips(&data);
    match trips.find_one(doc! { "_id": trip_id }).await {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::NotFound().json(json!({ "error": "Trip not found" })),
        Err(err) => {
            log::error!("Failed to fetch trip: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch trip" }));
        }
    }

    // Collect recommendation ids first so their dependents can go too.
    let rec_ids: Vec<_> = match mongo::recommendations(&data)
        .find(doc! { "trip_id": trip_id })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<_>>().await {
            Ok(recs) => recs.into_iter().filter_map(|r| r.id).collect(),
            Err(err) => {
                log::error!("Failed to collect recommendations: {:?}", err);
                return HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to delete trip" }));
            }
        },
        Err(err) => {
            log::error!("Failed to find recommendations: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to delete trip" }));
        }
    };

    let rec_filter = doc! { "recommendation_id": { "$in": rec_ids } };
    let cascade = futures::join!(
        async { mongo::votes(&data).delete_many(rec_filter.clone()).await },
        async { mongo::comments(&data).delete_many(rec_filter.clone()).await },
        async { mongo::favorites(&data).delete_many(rec_filter.clone()).await },
    );
    if let (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) = cascade {
        log::error!("Cascade delete failed: {:?}", e);
        return HttpResponse::InternalServerError()
            .json(json!({ "error": "Failed to delete trip" }));
    }

    let owned = futures::join!(
        async {
            mongo::recommendations(&data)
                .delete_many(doc! { "trip_id": trip_id })
                .await
        },
        async {
            mongo::activities(&data)
                .delete_many(doc! { "trip_id": trip_id })
                .await
        },
        async {
            mongo::family_members(&data)
                .delete_many(doc! { "trip_id": trip_id })
                .await
        },
    );
    if let (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) = owned {
        log::error!("Cascade delete failed: {:?}", e);
        return HttpResponse::InternalServerError()
            .json(json!({ "error": "Failed to delete trip" }));
    }

    match trips.delete_one(doc! { "_id": trip_id }).await {
        Ok(_) => HttpResponse::Ok().json(json!({ "message": "Trip deleted successfully" })),
        Err(err) => {
            log::error!("Failed to delete trip: {:?}", err);
            HttpResponse::InternalServerError().json(json!({ "error": "Failed to delete trip" }))
        }
    }
}

pub async fn get_family_preferences(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let trip_id = match parse_id(&path.into_inner(), "trip") {
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

    let members = match mongo::family_members(&data)
        .find(doc! { "trip_id": trip_id })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<FamilyMember>>().await {
            Ok(members) => members,
            Err(err) => {
                log::error!("Failed to collect family members: {:?}", err);
                return HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to collect family members" }));
            }
        },
        Err(err) => {
            log::error!("Failed to find family members: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to find family members" }));
        }
    };

    HttpResponse::Ok().json(aggregate_family_preferences(&members))
}

pub async fn get_daily_activities(
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

    let activities = match mongo::activities(&data)
        .find(doc! { "trip_id": trip_id })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<Activity>>().await {
            Ok(activities) => activities,
            Err(err) => {
                log::error!("Failed to collect activities: {:?}", err);
                return HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to collect activities" }));
            }
        },
        Err(err) => {
            log::error!("Failed to find activities: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to find activities" }));
        }
    };

    HttpResponse::Ok().json(group_daily_activities(&trip, &activities))
}
