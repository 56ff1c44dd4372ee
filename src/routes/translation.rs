use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;

use crate::db::mongo;
use crate::models::recommendation::ActivityRecommendation;
use crate::routes::parse_id;
use crate::services::translation::{TranslatedContent, TranslationService};

#[derive(Debug, Deserialize)]
pub struct TranslateActivityRequest {
    pub recommendation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchTranslateRequest {
    pub trip_id: String,
    /// Skip rows that already carry a Chinese description.
    #[serde(default)]
    pub only_untranslated: bool,
}

async fn store_translations(
    client: &Client,
    id: &ObjectId,
    content: &TranslatedContent,
) -> Result<(), mongodb::error::Error> {
    let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };
    if let Some(text) = &content.description_zh {
        set.insert("description_zh", text);
    }
    if let Some(text) = &content.cultural_notes_zh {
        set.insert("cultural_notes_zh", text);
    }
    if let Some(text) = &content.tips_for_chinese_travelers {
        set.insert("tips_for_chinese_travelers", text);
    }
    mongo::recommendations(client)
        .update_one(doc! { "_id": id }, doc! { "$set": set })
        .await?;
    Ok(())
}

pub async fn translate_activity(
    data: web::Data<Arc<Client>>,
    translation: web::Data<Arc<TranslationService>>,
    body: web::Json<TranslateActivityRequest>,
) -> impl Responder {
    if !translation.is_enabled() {
        return HttpResponse::ServiceUnavailable()
            .json(json!({ "error": "Translation service is not configured" }));
    }
    let rec_id = match parse_id(&body.recommendation_id, "recommendation") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let mut rec = match mongo::recommendations(&data)
        .find_one(doc! { "_id": rec_id })
        .await
    {
        Ok(Some(rec)) => rec,
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({ "error": "Recommendation not found" }))
        }
        Err(err) => {
            log::error!("Failed to fetch recommendation: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch recommendation" }));
        }
    };

    let content = translation.translate_recommendation(&rec).await;
    if content.is_empty() {
        return HttpResponse::BadGateway()
            .json(json!({ "error": "Translation produced no content" }));
    }

    if let Err(err) = store_translations(&data, &rec_id, &content).await {
        log::error!("Failed to store translations: {:?}", err);
        return HttpResponse::InternalServerError()
            .json(json!({ "error": "Failed to store translations" }));
    }

    if content.description_zh.is_some() {
        rec.description_zh = content.description_zh;
    }
    if content.cultural_notes_zh.is_some() {
        rec.cultural_notes_zh = content.cultural_notes_zh;
    }
    if content.tips_for_chinese_travelers.is_some() {
        rec.tips_for_chinese_travelers = content.tips_for_chinese_travelers;
    }
    HttpResponse::Ok().json(rec)
}

pub async fn batch_translate(
    data: web::Data<Arc<Client>>,
    translation: web::Data<Arc<TranslationService>>,
    body: web::Json<BatchTranslateRequest>,
) -> impl Responder {
    if !translation.is_enabled() {
        return HttpResponse::ServiceUnavailable()
            .json(json!({ "error": "Translation service is not configured" }));
    }
    let trip_id = match parse_id(&body.trip_id, "trip") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match mongo::trips(&data).find_one(doc! { "_id": trip_id }).await {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::NotFound().json(json!({ "error": "Trip not found" })),
        Err(err) => {
            log::error!("Failed to fetch trip: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch trip" }));
        }
    }

    let mut filter = doc! { "trip_id": trip_id, "is_active": true };
    if body.only_untranslated {
        // Equality with null also matches documents missing the field.
        filter.insert("description_zh", mongodb::bson::Bson::Null);
    }

    let recommendations: Vec<ActivityRecommendation> =
        match mongo::recommendations(&data).find(filter).await {
            Ok(cursor) => match cursor.try_collect().await {
                Ok(recs) => recs,
                Err(err) => {
                    log::error!("Failed to collect recommendations: {:?}", err);
                    return HttpResponse::InternalServerError()
                        .json(json!({ "error": "Failed to collect recommendations" }));
                }
            },
            Err(err) => {
                log::error!("Failed to find recommendations: {:?}", err);
                return HttpResponse::InternalServerError()
                    .json(json!({ "error": "Failed to find recommendations" }));
            }
        };

    let translated = translation.batch_translate(&recommendations).await;
    let mut translated_count = 0usize;
    let mut failed_count = 0usize;
    for (rec, content) in recommendations.iter().zip(&translated) {
        if content.is_empty() {
            failed_count += 1;
            continue;
        }
        if let Some(id) = &rec.id {
            match store_translations(&data, id, content).await {
                Ok(()) => translated_count += 1,
                Err(err) => {
                    log::error!("Failed to store translations for '{}': {:?}", rec.name, err);
                    failed_count += 1;
                }
            }
        }
    }

    HttpResponse::Ok().json(json!({
        "trip_id": trip_id.to_hex(),
        "requested_count": recommendations.len(),
        "translated_count": translated_count,
        "failed_count": failed_count,
    }))
}

pub async fn translation_status(
    data: web::Data<Arc<Client>>,
    translation: web::Data<Arc<TranslationService>>,
    path: web::Path<String>,
) -> impl Responder {
    let trip_id = match parse_id(&path.into_inner(), "trip") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match mongo::trips(&data).find_one(doc! { "_id": trip_id }).await {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::NotFound().json(json!({ "error": "Trip not found" })),
        Err(err) => {
            log::error!("Failed to fetch trip: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to fetch trip" }));
        }
    }

    let collection = mongo::recommendations(&data);
    let base = doc! { "trip_id": trip_id, "is_active": true };
    let mut translated_filter = base.clone();
    translated_filter.insert("description_zh", doc! { "$ne": mongodb::bson::Bson::Null });

    let counts = futures::try_join!(
        async { collection.count_documents(base).await },
        async { collection.count_documents(translated_filter).await },
    );
    match counts {
        Ok((total, translated)) => HttpResponse::Ok().json(json!({
            "trip_id": trip_id.to_hex(),
            "total_recommendations": total,
            "translated_count": translated,
            "untranslated_count": total.saturating_sub(translated),
            "translation_enabled": translation.is_enabled(),
        })),
        Err(err) => {
            log::error!("Failed to count recommendations: {:?}", err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to count recommendations" }))
        }
    }
}
