use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Durable cache row for one translated text, keyed by a normalized content
/// hash plus the language pair. The only cross-request cache backed by
/// storage; everything else is process memory.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCacheEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub source_text_hash: String,
    pub source_language: String,
    pub target_language: String,
    pub source_text: String,
    pub translated_text: String,
    pub translation_service: Option<String>,
    pub translation_model: Option<String>,
    pub usage_count: i64,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TranslationCacheEntry {
    pub fn new(
        source_text: &str,
        translated_text: &str,
        source_language: &str,
        target_language: &str,
        service: &str,
        model: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            source_text_hash: content_hash(source_text),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            source_text: source_text.to_string(),
            translated_text: translated_text.to_string(),
            translation_service: Some(service.to_string()),
            translation_model: Some(model.to_string()),
            usage_count: 1,
            last_used_at: Some(now),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Age-based staleness check used by the cleanup path.
    pub fn is_stale(&self, max_age_days: i64) -> bool {
        match self.created_at {
            Some(created) => (Utc::now() - created).num_days() > max_age_days,
            None => false,
        }
    }
}

/// SHA-256 of the normalized (trimmed, lowercased) source text. Empty input
/// hashes to the empty string so it can never collide with real content.
pub fn content_hash(text: &str) -> String {
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        return String::new();
    }
    let digest = Sha256::digest(normalized.as_bytes());
    format!("{:x}", digest)
}
