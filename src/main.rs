use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use trip_planner_api::config::Settings;
use trip_planner_api::db;
use trip_planner_api::routes;
use trip_planner_api::services::collaborators::{Geocode, SearchProvider, Translate};
use trip_planner_api::services::geocoding::NominatimGeocoder;
use trip_planner_api::services::places::GooglePlacesSearch;
use trip_planner_api::services::search_pipeline::RecommendationPipeline;
use trip_planner_api::services::store::{MongoRecommendationStore, MongoTranslationCacheStore};
use trip_planner_api::services::translation::{OpenAiTranslator, TranslationService};
use trip_planner_api::services::weather::WeatherService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = Settings::from_env();
    println!(
        "Attempting to bind to {}:{}",
        settings.host, settings.port
    );

    let client = db::mongo::create_mongo_client(&settings.mongodb_uri).await;
    println!("MongoDB connection established");

    if settings.debug {
        db::seed::seed_sample_data(&client).await;
    }

    // Collaborators. A missing API key disables the collaborator, it never
    // prevents startup.
    let weather = Arc::new(WeatherService::new(settings.openweather_api_key.clone()));
    let geocoder: Arc<dyn Geocode> = Arc::new(NominatimGeocoder::new());
    let search_provider: Option<Arc<dyn SearchProvider>> = settings
        .google_places_api_key
        .clone()
        .map(|key| Arc::new(GooglePlacesSearch::new(key)) as Arc<dyn SearchProvider>);
    if search_provider.is_none() {
        log::warn!("GOOGLE_PLACES_API_KEY not set, search will use fixture data");
    }
    let remote_translator: Option<Arc<dyn Translate>> = settings
        .openai_api_key
        .clone()
        .map(|key| Arc::new(OpenAiTranslator::new(key)) as Arc<dyn Translate>);
    if remote_translator.is_none() {
        log::warn!("OPENAI_API_KEY not set, Chinese translation disabled");
    }

    let cache_store = Arc::new(MongoTranslationCacheStore::new(client.clone()));
    let translation = Arc::new(TranslationService::new(cache_store, remote_translator));
    let recommendation_store = Arc::new(MongoRecommendationStore::new(client.clone()));
    let pipeline = Arc::new(RecommendationPipeline::new(
        search_provider,
        geocoder.clone(),
        recommendation_store,
        translation.clone(),
        settings.min_quality_score,
    ));

    let allowed_origins = settings.allowed_origins.clone();
    let bind_addr = (settings.host.clone(), settings.port);

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allow_any_header()
            .max_age(3600);
        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .route("/health", web::get().to(|| async { "OK" }))
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(pipeline.clone()))
            .app_data(web::Data::new(translation.clone()))
            .app_data(web::Data::new(weather.clone()))
            .app_data(web::Data::new(geocoder.clone()))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/trips")
                            .route("", web::post().to(routes::trip::create_trip))
                            .route("", web::get().to(routes::trip::get_trips))
                            .route("/{id}", web::get().to(routes::trip::get_trip_by_id))
                            .route("/{id}", web::put().to(routes::trip::update_trip))
                            .route("/{id}", web::delete().to(routes::trip::delete_trip))
                            .route(
                                "/{id}/family-preferences",
                                web::get().to(routes::trip::get_family_preferences),
                            )
                            .route(
                                "/{id}/daily-activities",
                                web::get().to(routes::trip::get_daily_activities),
                            ),
                    )
                    .service(
                        web::scope("/family-members")
                            .route("", web::post().to(routes::family_member::create_member))
                            .route("", web::get().to(routes::family_member::get_members))
                            .route(
                                "/{id}",
                                web::get().to(routes::family_member::get_member_by_id),
                            )
                            .route(
                                "/{id}",
                                web::put().to(routes::family_member::update_member),
                            )
                            .route(
                                "/{id}",
                                web::delete().to(routes::family_member::delete_member),
                            ),
                    )
                    .service(
                        web::scope("/activities")
                            .route("", web::post().to(routes::activity::create_activity))
                            .route("", web::get().to(routes::activity::get_activities))
                            .route("/{id}", web::get().to(routes::activity::get_activity_by_id))
                            .route("/{id}", web::put().to(routes::activity::update_activity))
                            .route(
                                "/{id}",
                                web::delete().to(routes::activity::delete_activity),
                            ),
                    )
                    .service(
                        web::scope("/search")
                            .route(
                                "/activities",
                                web::post().to(routes::search::search_activities),
                            )
                            .route(
                                "/recommendations",
                                web::get().to(routes::search::get_recommendations),
                            )
                            .route(
                                "/recommendations/{id}",
                                web::get().to(routes::search::get_recommendation_by_id),
                            )
                            .route(
                                "/recommendations/{id}",
                                web::put().to(routes::search::update_recommendation),
                            )
                            .route(
                                "/recommendations/{id}",
                                web::delete().to(routes::search::delete_recommendation),
                            ),
                    )
                    .service(
                        web::scope("/voting")
                            .route("/votes", web::post().to(routes::voting::create_vote))
                            .route("/votes", web::get().to(routes::voting::get_votes))
                            .route("/votes/{id}", web::put().to(routes::voting::update_vote))
                            .route(
                                "/votes/{id}",
                                web::delete().to(routes::voting::delete_vote),
                            )
                            .route("/comments", web::post().to(routes::voting::create_comment))
                            .route("/comments", web::get().to(routes::voting::get_comments))
                            .route(
                                "/comments/{id}",
                                web::put().to(routes::voting::update_comment),
                            )
                            .route(
                                "/comments/{id}",
                                web::delete().to(routes::voting::delete_comment),
                            )
                            .route(
                                "/dashboard/{trip_id}",
                                web::get().to(routes::voting::voting_dashboard),
                            ),
                    )
                    .service(
                        web::scope("/favorites")
                            .route("", web::post().to(routes::favorites::create_favorite))
                            .route("", web::get().to(routes::favorites::get_favorites))
                            .route(
                                "/list/{family_member_id}",
                                web::get().to(routes::favorites::get_member_favorites),
                            )
                            .route(
                                "/dashboard/{trip_id}",
                                web::get().to(routes::favorites::favorites_dashboard),
                            )
                            .route(
                                "/check/{recommendation_id}/member/{family_member_id}",
                                web::get().to(routes::favorites::check_favorite),
                            )
                            .route(
                                "/recommendation/{recommendation_id}/member/{family_member_id}",
                                web::delete().to(routes::favorites::delete_favorite_by_pair),
                            )
                            .route(
                                "/{id}",
                                web::put().to(routes::favorites::update_favorite),
                            )
                            .route(
                                "/{id}",
                                web::delete().to(routes::favorites::delete_favorite),
                            ),
                    )
                    .service(
                        web::scope("/translation")
                            .route(
                                "/activities",
                                web::post().to(routes::translation::translate_activity),
                            )
                            .route(
                                "/batch",
                                web::post().to(routes::translation::batch_translate),
                            )
                            .route(
                                "/status/{trip_id}",
                                web::get().to(routes::translation::translation_status),
                            ),
                    )
                    .service(
                        web::scope("/weather")
                            .route("/current", web::get().to(routes::weather::current_weather))
                            .route(
                                "/forecast",
                                web::get().to(routes::weather::weather_forecast),
                            )
                            .route(
                                "/trip/{trip_id}",
                                web::get().to(routes::weather::trip_weather),
                            ),
                    )
                    .service(
                        web::scope("/geocoding")
                            .route(
                                "/geocode",
                                web::post().to(routes::geocoding::geocode_address),
                            )
                            .route(
                                "/reverse",
                                web::post().to(routes::geocoding::reverse_geocode),
                            ),
                    ),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
