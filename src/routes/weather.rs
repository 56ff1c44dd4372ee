use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use mongodb::bson::doc;
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;

use crate::db::mongo;
use crate::routes::parse_id;
use crate::services::collaborators::Geocode;
use crate::services::weather::{daily_forecasts, format_weather_summary, WeatherService};

fn default_days() -> u32 {
    5
}

#[derive(Debug, Deserialize)]
pub struct CoordinatesQuery {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_days")]
    pub days: u32,
}

pub async fn current_weather(
    weather: web::Data<Arc<WeatherService>>,
    params: web::Query<CoordinatesQuery>,
) -> impl Responder {
    let raw = weather
        .get_current_weather(params.latitude, params.longitude)
        .await;
    let summary = format_weather_summary(&raw);
    if summary == json!({}) {
        return HttpResponse::BadGateway().json(json!({ "error": "Weather data unavailable" }));
    }
    HttpResponse::Ok().json(json!({
        "latitude": params.latitude,
        "longitude": params.longitude,
        "current": summary,
    }))
}

pub async fn weather_forecast(
    weather: web::Data<Arc<WeatherService>>,
    params: web::Query<ForecastQuery>,
) -> impl Responder {
    let raw = weather
        .get_weather_forecast(params.latitude, params.longitude, params.days)
        .await;
    let days = daily_forecasts(&raw);
    if days.is_empty() {
        return HttpResponse::BadGateway().json(json!({ "error": "Weather data unavailable" }));
    }
    HttpResponse::Ok().json(json!({
        "latitude": params.latitude,
        "longitude": params.longitude,
        "forecast": days,
    }))
}

/// Current conditions and forecast for the trip's resolved coordinates:
/// stored accommodation coordinates when present, else a one-shot geocode
/// of the destination.
pub async fn trip_weather(
    data: web::Data<Arc<Client>>,
    weather: web::Data<Arc<WeatherService>>,
    geocoder: web::Data<Arc<dyn Geocode>>,
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

    let (latitude, longitude) = match trip.accommodation_coords() {
        Some(coords) => coords,
        None => {
            let (lat, lon) = geocoder.geocode(&trip.destination).await;
            if lat == 0.0 && lon == 0.0 {
                return HttpResponse::NotFound()
                    .json(json!({ "error": "Could not resolve trip location" }));
            }
            (lat, lon)
        }
    };

    let (current_raw, forecast_raw) = futures::join!(
        weather.get_current_weather(latitude, longitude),
        weather.get_weather_forecast(latitude, longitude, default_days()),
    );

    HttpResponse::Ok().json(json!({
        "trip_id": trip_id.to_hex(),
        "destination": trip.destination,
        "latitude": latitude,
        "longitude": longitude,
        "current": format_weather_summary(&current_raw),
        "forecast": daily_forecasts(&forecast_raw),
    }))
}
