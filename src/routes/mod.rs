use actix_web::HttpResponse;
use mongodb::bson::oid::ObjectId;
use serde_json::json;

pub mod activity;
pub mod family_member;
pub mod favorites;
pub mod geocoding;
pub mod search;
pub mod translation;
pub mod trip;
pub mod voting;
pub mod weather;

/// Parse a path/body id, or produce the 400 the handler should return.
pub(crate) fn parse_id(id: &str, what: &str) -> Result<ObjectId, HttpResponse> {
    ObjectId::parse_str(id).map_err(|_| {
        HttpResponse::BadRequest().json(json!({ "error": format!("Invalid {} id", what) }))
    })
}
