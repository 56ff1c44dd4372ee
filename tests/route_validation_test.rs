mod common;

use std::sync::Arc;

use actix_web::{test, web, App};
use serde_json::json;
use serial_test::serial;

use trip_planner_api::routes;
use trip_planner_api::services::collaborators::Geocode;
use trip_planner_api::services::geocoding::NominatimGeocoder;
use trip_planner_api::services::weather::WeatherService;

/// Client that parses but never connects. Handlers under test reject the
/// request before any database operation happens.
async fn offline_client() -> web::Data<Arc<mongodb::Client>> {
    let client = mongodb::Client::with_uri_str("mongodb://localhost:27017")
        .await
        .expect("parse mongo uri");
    web::Data::new(Arc::new(client))
}

#[actix_rt::test]
#[serial]
async fn health_check_returns_ok() {
    let app = test::init_service(
        App::new().route("/health", web::get().to(|| async { "OK" })),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(test::read_body(resp).await, "OK");
}

#[actix_rt::test]
#[serial]
async fn malformed_trip_id_is_rejected() {
    let client = offline_client().await;
    let app = test::init_service(
        App::new()
            .app_data(client)
            .route("/api/trips/{id}", web::get().to(routes::trip::get_trip_by_id)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/trips/not-a-valid-id")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid trip id");
}

#[actix_rt::test]
#[serial]
async fn invalid_vote_type_is_rejected_before_any_lookup() {
    let client = offline_client().await;
    let app = test::init_service(
        App::new()
            .app_data(client)
            .route("/api/voting/votes", web::post().to(routes::voting::create_vote)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/voting/votes")
        .set_json(json!({
            "recommendation_id": "64a0f1e2c3b4a5d6e7f80912",
            "family_member_id": "64a0f1e2c3b4a5d6e7f80913",
            "vote_type": "maybe"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid vote_type 'maybe'");
}

#[actix_rt::test]
#[serial]
async fn vote_with_malformed_recommendation_id_is_rejected() {
    let client = offline_client().await;
    let app = test::init_service(
        App::new()
            .app_data(client)
            .route("/api/voting/votes", web::post().to(routes::voting::create_vote)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/voting/votes")
        .set_json(json!({
            "recommendation_id": "nope",
            "family_member_id": "64a0f1e2c3b4a5d6e7f80913",
            "vote_type": "positive"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn empty_geocode_address_is_rejected() {
    let geocoder: Arc<dyn Geocode> = Arc::new(NominatimGeocoder::new());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(geocoder))
            .route(
                "/api/geocoding/geocode",
                web::post().to(routes::geocoding::geocode_address),
            ),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/geocoding/geocode")
        .set_json(json!({ "address": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn out_of_range_reverse_coordinates_are_rejected() {
    let geocoder: Arc<dyn Geocode> = Arc::new(NominatimGeocoder::new());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(geocoder))
            .route(
                "/api/geocoding/reverse",
                web::post().to(routes::geocoding::reverse_geocode),
            ),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/geocoding/reverse")
        .set_json(json!({ "latitude": 123.0, "longitude": 10.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Coordinates out of range");
}

#[actix_rt::test]
#[serial]
async fn weather_without_api_key_reports_bad_gateway() {
    let weather = Arc::new(WeatherService::new(None));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(weather))
            .route(
                "/api/weather/current",
                web::get().to(routes::weather::current_weather),
            ),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/weather/current?latitude=34.69&longitude=135.50")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 502);
}

#[actix_rt::test]
#[serial]
async fn blank_address_geocodes_to_the_unset_sentinel_without_network() {
    let geocoder = NominatimGeocoder::new();
    let (lat, lon) = geocoder.geocode("   ").await;
    assert_eq!((lat, lon), (0.0, 0.0));
}

// `use actix_web::test` shadows the built-in `#[test]` attribute, so name it
// explicitly for this synchronous test.
#[::core::prelude::v1::test]
fn active_filter_defaults_to_active_rows() {
    use trip_planner_api::routes::search::parse_active_filter;

    assert_eq!(parse_active_filter(None), Ok(Some(true)));
    assert_eq!(parse_active_filter(Some("true")), Ok(Some(true)));
    assert_eq!(parse_active_filter(Some("false")), Ok(Some(false)));
    assert_eq!(parse_active_filter(Some("all")), Ok(None));
    assert!(parse_active_filter(Some("banana")).is_err());
}

#[actix_rt::test]
#[serial]
async fn unknown_active_filter_value_is_rejected() {
    let client = offline_client().await;
    let app = test::init_service(App::new().app_data(client).route(
        "/api/search/recommendations",
        web::get().to(routes::search::get_recommendations),
    ))
    .await;

    let req = test::TestRequest::get()
        .uri("/api/search/recommendations?is_active=banana")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Unsupported is_active 'banana'");
}

#[actix_rt::test]
#[serial]
async fn malformed_ids_are_rejected_before_cascade_deletes() {
    let client = offline_client().await;
    let app = test::init_service(
        App::new()
            .app_data(client)
            .route("/api/trips/{id}", web::delete().to(routes::trip::delete_trip))
            .route(
                "/api/search/recommendations/{id}",
                web::delete().to(routes::search::delete_recommendation),
            )
            .route(
                "/api/family-members/{id}",
                web::delete().to(routes::family_member::delete_member),
            ),
    )
    .await;

    for uri in [
        "/api/trips/nope",
        "/api/search/recommendations/nope",
        "/api/family-members/nope",
    ] {
        let req = test::TestRequest::delete().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "{}", uri);
    }
}

#[actix_rt::test]
#[serial]
async fn malformed_pair_ids_are_rejected_on_favorite_check() {
    let client = offline_client().await;
    let app = test::init_service(App::new().app_data(client).route(
        "/api/favorites/check/{recommendation_id}/member/{family_member_id}",
        web::get().to(routes::favorites::check_favorite),
    ))
    .await;

    let req = test::TestRequest::get()
        .uri("/api/favorites/check/nope/member/also-nope")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn malformed_trip_id_is_rejected_on_report_routes() {
    let client = offline_client().await;
    let app = test::init_service(
        App::new()
            .app_data(client)
            .route(
                "/api/trips/{id}/family-preferences",
                web::get().to(routes::trip::get_family_preferences),
            )
            .route(
                "/api/trips/{id}/daily-activities",
                web::get().to(routes::trip::get_daily_activities),
            ),
    )
    .await;

    for uri in [
        "/api/trips/nope/family-preferences",
        "/api/trips/nope/daily-activities",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "{}", uri);
    }
}
