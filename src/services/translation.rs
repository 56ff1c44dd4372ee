use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::collaborators::{CulturalContent, Translate};
use super::store::TranslationCacheStore;
use crate::error::ServiceError;
use crate::models::recommendation::ActivityRecommendation;
use crate::models::translation_cache::{content_hash, TranslationCacheEntry};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODEL: &str = "gpt-4";

// API constraint on batch translation
const MAX_BATCH_SIZE: usize = 10;
const BATCH_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// OpenAI-backed remote translator. Returns `None` on any failure; the
/// caller treats absence as "untranslated".
pub struct OpenAiTranslator {
    http_client: reqwest::Client,
    api_key: String,
}

impl OpenAiTranslator {
    pub fn new(api_key: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            api_key,
        }
    }

    async fn chat(&self, system: &str, user: &str, max_tokens: u32, temperature: f64) -> Option<String> {
        let payload = json!({
            "model": OPENAI_MODEL,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let response = self
            .http_client
            .post(OPENAI_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                let parsed: ChatResponse = resp.json().await.ok()?;
                parsed
                    .choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message.content.trim().to_string())
            }
            Ok(resp) => {
                log::error!("OpenAI API error {}", resp.status());
                None
            }
            Err(e) => {
                log::error!("Error calling OpenAI API: {}", e);
                None
            }
        }
    }

    fn language_name(code: &str) -> &str {
        match code {
            "en" => "English",
            "zh" => "Chinese",
            "ja" => "Japanese",
            other => other,
        }
    }
}

#[async_trait]
impl Translate for OpenAiTranslator {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Option<String> {
        let prompt = format!(
            "This is a travel activity description for Chinese tourists visiting Japan. \
             Translate it keeping the informative tone, using terminology familiar to \
             Chinese travellers, and keep it natural and engaging.\n\n\
             Please translate the following {} text to {}:\n\n\"{}\"\n\n\
             Provide only the translation without any additional explanation.",
            Self::language_name(source_lang),
            Self::language_name(target_lang),
            text
        );

        self.chat(
            "You are a professional translator specializing in travel content for \
             Chinese tourists visiting Japan. Provide accurate, culturally-aware translations.",
            &prompt,
            500,
            0.3,
        )
        .await
    }

    async fn cultural_content(&self, name: &str, description: &str) -> Option<CulturalContent> {
        let prompt = format!(
            "为中国游客生成关于日本景点\"{}\"的文化背景和实用建议。\n\n\
             景点描述: {}\n\n\
             请提供:\n\
             1. 文化背景 (cultural_notes): 这个地方的历史文化意义，为什么对中国游客有趣\n\
             2. 实用建议 (travel_tips): 中国游客的实用提示（支付方式、语言、最佳参观时间等）\n\n\
             请用JSON格式回复:\n\
             {{\"cultural_notes\": \"文化背景说明...\", \"travel_tips\": \"实用旅行建议...\"}}",
            name, description
        );

        let content = self
            .chat("你是一个专门为中国游客提供日本旅行建议的文化专家。", &prompt, 800, 0.7)
            .await?;

        match serde_json::from_str::<CulturalContent>(&content) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                log::warn!("Failed to parse cultural content JSON");
                None
            }
        }
    }

    fn service_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &'static str {
        OPENAI_MODEL
    }
}

/// Chinese enrichment produced for one recommendation. Absent fields mean
/// the corresponding translation was unavailable, not an error.
#[derive(Debug, Clone, Default)]
pub struct TranslatedContent {
    pub description_zh: Option<String>,
    pub cultural_notes_zh: Option<String>,
    pub tips_for_chinese_travelers: Option<String>,
}

impl TranslatedContent {
    pub fn is_empty(&self) -> bool {
        self.description_zh.is_none()
            && self.cultural_notes_zh.is_none()
            && self.tips_for_chinese_travelers.is_none()
    }
}

/// Cache-first translation orchestrator. The durable cache is consulted
/// before any remote call; misses go to the remote model and successful
/// results are written back.
pub struct TranslationService {
    cache: Arc<dyn TranslationCacheStore>,
    remote: Option<Arc<dyn Translate>>,
}

impl TranslationService {
    pub fn new(cache: Arc<dyn TranslationCacheStore>, remote: Option<Arc<dyn Translate>>) -> Self {
        Self { cache, remote }
    }

    pub fn is_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Translate one text. Cache hit: bump usage and return with no remote
    /// call. Miss: remote call, cache on success, `None` on failure.
    pub async fn translate_text(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Option<String>, ServiceError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let hash = content_hash(text);
        if let Some(cached) = self.cache.get(&hash, source_lang, target_lang).await? {
            if let Some(id) = cached.id {
                self.cache.record_hit(&id).await?;
            }
            log::info!("Translation cache hit for {}->{}", source_lang, target_lang);
            return Ok(Some(cached.translated_text));
        }

        let remote = match &self.remote {
            Some(remote) => remote,
            None => {
                log::warn!("Translation requested but no translator is configured");
                return Ok(None);
            }
        };

        match remote.translate(text, source_lang, target_lang).await {
            Some(translated) => {
                self.cache
                    .put(TranslationCacheEntry::new(
                        text,
                        &translated,
                        source_lang,
                        target_lang,
                        remote.service_name(),
                        remote.model_name(),
                    ))
                    .await?;
                Ok(Some(translated))
            }
            None => Ok(None),
        }
    }

    /// Cultural notes and tips for one activity, cached under a synthetic
    /// key scoped to the activity name. The cached value is serialized JSON
    /// and must round-trip through parse/serialize without loss.
    pub async fn cultural_content(
        &self,
        activity_name: &str,
        description: &str,
    ) -> Result<Option<CulturalContent>, ServiceError> {
        let cache_key = format!("cultural_content_{}", activity_name);
        let hash = content_hash(&cache_key);

        if let Some(cached) = self.cache.get(&hash, "en", "zh").await? {
            match serde_json::from_str::<CulturalContent>(&cached.translated_text) {
                Ok(content) => {
                    if let Some(id) = cached.id {
                        self.cache.record_hit(&id).await?;
                    }
                    return Ok(Some(content));
                }
                // Unparseable cached value: regenerate below.
                Err(e) => log::warn!("Discarding unparseable cached cultural content: {}", e),
            }
        }

        let remote = match &self.remote {
            Some(remote) => remote,
            None => return Ok(None),
        };

        match remote.cultural_content(activity_name, description).await {
            Some(content) => {
                let serialized = serde_json::to_string(&content)
                    .map_err(|e| ServiceError::ExternalApi(format!("serialize: {}", e)))?;
                self.cache
                    .put(TranslationCacheEntry::new(
                        &cache_key,
                        &serialized,
                        "en",
                        "zh",
                        remote.service_name(),
                        remote.model_name(),
                    ))
                    .await?;
                Ok(Some(content))
            }
            None => Ok(None),
        }
    }

    /// Full Chinese enrichment for one recommendation.
    pub async fn translate_recommendation(
        &self,
        rec: &ActivityRecommendation,
    ) -> TranslatedContent {
        let mut content = TranslatedContent::default();

        if let Some(description) = &rec.description {
            match self.translate_text(description, "en", "zh").await {
                Ok(translated) => content.description_zh = translated,
                Err(e) => log::error!("Translation failed for '{}': {}", rec.name, e),
            }
        }

        let description = rec.description.as_deref().unwrap_or("");
        match self.cultural_content(&rec.name, description).await {
            Ok(Some(cultural)) => {
                content.cultural_notes_zh = Some(cultural.cultural_notes);
                content.tips_for_chinese_travelers = Some(cultural.travel_tips);
            }
            Ok(None) => {}
            Err(e) => log::error!("Cultural content failed for '{}': {}", rec.name, e),
        }

        content
    }

    /// Translate a set of recommendations in chunks of at most ten, pausing
    /// between chunks. A failing chunk never stops later chunks; the result
    /// always has one entry per input (empty where translation failed).
    pub async fn batch_translate(
        &self,
        recommendations: &[ActivityRecommendation],
    ) -> Vec<TranslatedContent> {
        let mut results = Vec::with_capacity(recommendations.len());

        let chunk_count = recommendations.len().div_ceil(MAX_BATCH_SIZE);
        for (index, chunk) in recommendations.chunks(MAX_BATCH_SIZE).enumerate() {
            log::info!(
                "Translating batch {}/{} ({} activities)",
                index + 1,
                chunk_count,
                chunk.len()
            );

            let chunk_results =
                futures::future::join_all(chunk.iter().map(|rec| self.translate_recommendation(rec)))
                    .await;
            results.extend(chunk_results);

            if index + 1 < chunk_count {
                tokio::time::sleep(BATCH_PAUSE).await;
            }
        }

        results
    }
}
