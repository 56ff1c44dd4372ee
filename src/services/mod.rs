pub mod collaborators;
pub mod dashboard;
pub mod geocoding;
pub mod places;
pub mod quality;
pub mod reports;
pub mod search_pipeline;
pub mod store;
pub mod translation;
pub mod weather;
