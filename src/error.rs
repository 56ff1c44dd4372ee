use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy at the service boundary. Collaborator-level failures
/// (geocoding, weather, search, translation) are absorbed into sentinels
/// before they reach this level; only pipeline-fatal conditions surface.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("external service error: {0}")]
    ExternalApi(String),
}

impl ServiceError {
    /// Map to the client-facing status, with a JSON error body.
    pub fn to_response(&self) -> HttpResponse {
        match self {
            ServiceError::NotFound(_) => {
                HttpResponse::NotFound().json(json!({ "error": self.to_string() }))
            }
            ServiceError::Validation(_) => {
                HttpResponse::BadRequest().json(json!({ "error": self.to_string() }))
            }
            ServiceError::Database(err) => {
                log::error!("Database error: {:?}", err);
                HttpResponse::InternalServerError().json(json!({ "error": "Database error" }))
            }
            ServiceError::ExternalApi(err) => {
                log::error!("External service error: {}", err);
                HttpResponse::BadGateway().json(json!({ "error": "External service error" }))
            }
        }
    }
}
