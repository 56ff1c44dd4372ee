use std::env;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MIN_QUALITY_SCORE: u8 = 60;

/// Runtime settings collected from the environment. A missing API key
/// disables the corresponding collaborator; it never prevents startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub openweather_api_key: Option<String>,
    pub google_places_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub allowed_origins: Vec<String>,
    pub debug: bool,
    pub min_quality_score: u8,
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl Settings {
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let mongodb_uri = env::var("MONGODB_URI").expect("MONGODB_URI must be set");

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:8080".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let debug = env::var("DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let min_quality_score = env::var("SEARCH_MIN_QUALITY_SCORE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MIN_QUALITY_SCORE);

        Self {
            host,
            port,
            mongodb_uri,
            openweather_api_key: non_empty("OPENWEATHER_API_KEY"),
            google_places_api_key: non_empty("GOOGLE_PLACES_API_KEY"),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            allowed_origins,
            debug,
            min_quality_score,
        }
    }
}
