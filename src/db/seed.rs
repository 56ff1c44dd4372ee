use chrono::{NaiveDate, Utc};
use mongodb::bson::doc;
use mongodb::Client;

use crate::db::mongo;
use crate::models::{family_member::FamilyMember, trip::Trip};

/// Seed a demo trip with two family members when the trips collection is
/// empty. Only runs when the DEBUG flag is set.
pub async fn seed_sample_data(client: &Client) {
    let trips = mongo::trips(client);

    let existing = match trips.count_documents(doc! {}).await {
        Ok(count) => count,
        Err(e) => {
            log::warn!("Skipping sample data seed, count failed: {}", e);
            return;
        }
    };
    if existing > 0 {
        return;
    }

    let now = Utc::now();
    let trip = Trip {
        id: None,
        name: "Osaka Family Trip".to_string(),
        destination: "Osaka, Japan".to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap_or_default(),
        end_date: NaiveDate::from_ymd_opt(2026, 10, 8).unwrap_or_default(),
        accommodation_address: Some("1-1-43 Abenosuji, Abeno Ward, Osaka".to_string()),
        accommodation_lat: Some(34.6452),
        accommodation_lon: Some(135.5136),
        total_budget: 50000.0,
        created_at: Some(now),
        updated_at: Some(now),
    };

    let trip_id = match trips.insert_one(&trip).await {
        Ok(result) => match result.inserted_id.as_object_id() {
            Some(id) => id,
            None => return,
        },
        Err(e) => {
            log::warn!("Sample trip insert failed: {}", e);
            return;
        }
    };

    let members = vec![
        FamilyMember {
            id: None,
            trip_id,
            name: "Wei".to_string(),
            role: "parent".to_string(),
            age: Some(42),
            dietary_restrictions: None,
            mobility_needs: None,
            interests: Some("history, food markets".to_string()),
            wishlist: Some("Osaka Castle".to_string()),
            created_at: Some(now),
            updated_at: Some(now),
        },
        FamilyMember {
            id: None,
            trip_id,
            name: "Lily".to_string(),
            role: "child".to_string(),
            age: Some(9),
            dietary_restrictions: Some("no shellfish".to_string()),
            mobility_needs: None,
            interests: Some("theme parks".to_string()),
            wishlist: Some("Universal Studios".to_string()),
            created_at: Some(now),
            updated_at: Some(now),
        },
    ];

    match mongo::family_members(client).insert_many(&members).await {
        Ok(_) => log::info!("Seeded sample trip and family members"),
        Err(e) => log::warn!("Sample family member insert failed: {}", e),
    }
}
