mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{sample_recommendation, CountingTranslator, MemoryCache};
use trip_planner_api::models::translation_cache::{content_hash, TranslationCacheEntry};
use trip_planner_api::services::collaborators::Translate;
use trip_planner_api::services::store::TranslationCacheStore;
use trip_planner_api::services::translation::TranslationService;

fn service(cache: Arc<MemoryCache>, remote: Arc<CountingTranslator>) -> TranslationService {
    TranslationService::new(cache, Some(remote as Arc<dyn Translate>))
}

#[test]
fn content_hash_normalizes_whitespace_and_case() {
    assert_eq!(content_hash("Osaka Castle"), content_hash("  osaka castle  "));
    assert_ne!(content_hash("Osaka Castle"), content_hash("Osaka Castles"));
    assert_eq!(content_hash("   "), "");
}

#[test]
fn stale_entries_are_detected_by_age() {
    let mut entry = TranslationCacheEntry::new("hello", "你好", "en", "zh", "svc", "model");
    assert!(!entry.is_stale(30));

    entry.created_at = Some(chrono::Utc::now() - chrono::Duration::days(31));
    assert!(entry.is_stale(30));
    assert!(!entry.is_stale(60));
}

#[actix_rt::test]
async fn second_translation_of_identical_text_hits_the_cache() {
    let cache = Arc::new(MemoryCache::new());
    let remote = Arc::new(CountingTranslator::new());
    let svc = service(cache.clone(), remote.clone());

    let first = svc.translate_text("Osaka Castle", "en", "zh").await.unwrap();
    assert_eq!(first.as_deref(), Some("译文:Osaka Castle"));
    assert_eq!(remote.translate_calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.row_count(), 1);

    // Different surface form, same normalized content.
    let second = svc.translate_text("  osaka castle ", "en", "zh").await.unwrap();
    assert_eq!(second, first);
    assert_eq!(remote.translate_calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.hits.load(Ordering::SeqCst), 1);
    assert_eq!(cache.usage_count(&content_hash("Osaka Castle")), 2);
}

#[actix_rt::test]
async fn blank_text_translates_to_nothing_without_remote_calls() {
    let cache = Arc::new(MemoryCache::new());
    let remote = Arc::new(CountingTranslator::new());
    let svc = service(cache.clone(), remote.clone());

    let result = svc.translate_text("   ", "en", "zh").await.unwrap();
    assert!(result.is_none());
    assert_eq!(remote.translate_calls.load(Ordering::SeqCst), 0);
    assert_eq!(cache.row_count(), 0);
}

#[actix_rt::test]
async fn disabled_service_returns_untranslated() {
    let svc = TranslationService::new(Arc::new(MemoryCache::new()), None);
    assert!(!svc.is_enabled());

    let result = svc.translate_text("Osaka Castle", "en", "zh").await.unwrap();
    assert!(result.is_none());

    let rec = sample_recommendation("Osaka Castle", Some("Historic castle"));
    let content = svc.translate_recommendation(&rec).await;
    assert!(content.is_empty());
}

#[actix_rt::test]
async fn cultural_content_round_trips_through_the_cache() {
    let cache = Arc::new(MemoryCache::new());
    let remote = Arc::new(CountingTranslator::new());
    let svc = service(cache.clone(), remote.clone());

    let first = svc
        .cultural_content("Osaka Castle", "Historic castle")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(remote.cultural_calls.load(Ordering::SeqCst), 1);

    let second = svc
        .cultural_content("Osaka Castle", "Historic castle")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(remote.cultural_calls.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);

    // The synthetic cache key is scoped to the activity name.
    let key_hash = content_hash("cultural_content_Osaka Castle");
    assert_eq!(cache.usage_count(&key_hash), 2);
}

#[actix_rt::test]
async fn unparseable_cached_cultural_content_is_regenerated() {
    let cache = Arc::new(MemoryCache::new());
    let remote = Arc::new(CountingTranslator::new());

    // Poison the cache with a value that is not CulturalContent JSON.
    cache
        .put(TranslationCacheEntry::new(
            "cultural_content_Spa World",
            "not json at all",
            "en",
            "zh",
            "svc",
            "model",
        ))
        .await
        .unwrap();

    let svc = service(cache.clone(), remote.clone());
    let content = svc
        .cultural_content("Spa World", "Onsen complex")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(remote.cultural_calls.load(Ordering::SeqCst), 1);
    assert_eq!(content.cultural_notes, "Spa World 文化背景");

    // The poisoned row was replaced with a parseable one.
    let again = svc
        .cultural_content("Spa World", "Onsen complex")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(remote.cultural_calls.load(Ordering::SeqCst), 1);
    assert_eq!(again, content);
}

#[actix_rt::test]
async fn translate_recommendation_fills_all_chinese_fields() {
    let cache = Arc::new(MemoryCache::new());
    let remote = Arc::new(CountingTranslator::new());
    let svc = service(cache, remote);

    let rec = sample_recommendation("Osaka Castle", Some("Historic castle"));
    let content = svc.translate_recommendation(&rec).await;

    assert_eq!(content.description_zh.as_deref(), Some("译文:Historic castle"));
    assert_eq!(content.cultural_notes_zh.as_deref(), Some("Osaka Castle 文化背景"));
    assert_eq!(
        content.tips_for_chinese_travelers.as_deref(),
        Some("Osaka Castle 实用建议")
    );
}

#[actix_rt::test]
async fn batch_translate_returns_one_result_per_input() {
    let cache = Arc::new(MemoryCache::new());
    let remote = Arc::new(CountingTranslator::new());
    let svc = service(cache, remote);

    let recs: Vec<_> = (0..3)
        .map(|i| sample_recommendation(&format!("Spot {}", i), Some("desc")))
        .collect();
    let results = svc.batch_translate(&recs).await;

    assert_eq!(results.len(), recs.len());
    assert!(results.iter().all(|r| !r.is_empty()));
}
