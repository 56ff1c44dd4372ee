use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};
use std::sync::Arc;
use std::time::Duration;

use crate::models::{
    activity::Activity,
    family_member::FamilyMember,
    favorite::ActivityFavorite,
    recommendation::ActivityRecommendation,
    translation_cache::TranslationCacheEntry,
    trip::Trip,
    vote::{ActivityComment, ActivityVote},
};

pub const DB_NAME: &str = "TripPlanner";

pub async fn create_mongo_client(uri: &str) -> Arc<Client> {
    log::info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri)
        .await
        .expect("MongoDB URI may be incorrect! Failed to parse.");

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client =
        Client::with_options(client_options).expect("Failed to create MongoDB client with options");

    // Verify the connection before serving traffic.
    match client
        .database(DB_NAME)
        .run_command(mongodb::bson::doc! {"ping": 1})
        .await
    {
        Ok(_) => log::info!("Successfully connected to MongoDB and verified with ping command"),
        Err(e) => {
            log::warn!("Connected to MongoDB but ping test failed: {}", e);
            log::warn!("The API may still work, but some functionality might be impaired");
        }
    }

    Arc::new(client)
}

pub fn trips(client: &Client) -> Collection<Trip> {
    client.database(DB_NAME).collection("trips")
}

pub fn activities(client: &Client) -> Collection<Activity> {
    client.database(DB_NAME).collection("activities")
}

pub fn family_members(client: &Client) -> Collection<FamilyMember> {
    client.database(DB_NAME).collection("family_members")
}

pub fn recommendations(client: &Client) -> Collection<ActivityRecommendation> {
    client
        .database(DB_NAME)
        .collection("activity_recommendations")
}

pub fn votes(client: &Client) -> Collection<ActivityVote> {
    client.database(DB_NAME).collection("activity_votes")
}

pub fn comments(client: &Client) -> Collection<ActivityComment> {
    client.database(DB_NAME).collection("activity_comments")
}

pub fn favorites(client: &Client) -> Collection<ActivityFavorite> {
    client.database(DB_NAME).collection("activity_favorites")
}

pub fn translation_cache(client: &Client) -> Collection<TranslationCacheEntry> {
    client.database(DB_NAME).collection("translation_cache")
}
