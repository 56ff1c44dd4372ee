use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::services::collaborators::Geocode;

#[derive(Debug, Deserialize)]
pub struct GeocodeRequest {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct ReverseGeocodeRequest {
    pub latitude: f64,
    pub longitude: f64,
}

pub async fn geocode_address(
    geocoder: web::Data<Arc<dyn Geocode>>,
    body: web::Json<GeocodeRequest>,
) -> impl Responder {
    if body.address.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "address must not be empty" }));
    }

    let (latitude, longitude) = geocoder.geocode(&body.address).await;
    if latitude == 0.0 && longitude == 0.0 {
        return HttpResponse::NotFound()
            .json(json!({ "error": "Address could not be geocoded" }));
    }
    HttpResponse::Ok().json(json!({
        "address": body.address,
        "latitude": latitude,
        "longitude": longitude,
    }))
}

pub async fn reverse_geocode(
    geocoder: web::Data<Arc<dyn Geocode>>,
    body: web::Json<ReverseGeocodeRequest>,
) -> impl Responder {
    if !(-90.0..=90.0).contains(&body.latitude) || !(-180.0..=180.0).contains(&body.longitude) {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "Coordinates out of range" }));
    }

    let address = geocoder.reverse(body.latitude, body.longitude).await;
    if address.is_empty() {
        return HttpResponse::NotFound()
            .json(json!({ "error": "Coordinates could not be resolved" }));
    }
    HttpResponse::Ok().json(json!({
        "latitude": body.latitude,
        "longitude": body.longitude,
        "address": address,
    }))
}
