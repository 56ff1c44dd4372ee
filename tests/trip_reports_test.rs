mod common;

use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use std::sync::atomic::Ordering;

use common::{member, sample_trip, scheduled_activity, StubGeocoder};
use trip_planner_api::routes::trip::resolve_accommodation_coords;
use trip_planner_api::services::reports::{aggregate_family_preferences, group_daily_activities};

#[test]
fn preferences_of_empty_family_are_all_zero() {
    let prefs = aggregate_family_preferences(&[]);
    assert_eq!(prefs.total_members, 0);
    assert_eq!(prefs.age_groups.children, 0);
    assert_eq!(prefs.age_groups.adults, 0);
    assert_eq!(prefs.age_groups.seniors, 0);
    assert!(prefs.dietary_restrictions.is_empty());
    assert!(prefs.mobility_needs.is_empty());
    assert!(prefs.common_interests.is_empty());
}

#[test]
fn preferences_aggregate_across_members() {
    let trip_id = ObjectId::new();
    let members = vec![
        member(
            trip_id,
            "Wei",
            Some(42),
            Some("no shellfish, vegetarian"),
            Some("history, food markets"),
        ),
        member(
            trip_id,
            "Lily",
            Some(9),
            Some("no shellfish"),
            Some("theme parks, history"),
        ),
        member(trip_id, "Grandpa", Some(70), None, Some("history")),
    ];

    let prefs = aggregate_family_preferences(&members);
    assert_eq!(prefs.total_members, 3);
    assert_eq!(prefs.age_groups.children, 1);
    assert_eq!(prefs.age_groups.adults, 1);
    assert_eq!(prefs.age_groups.seniors, 1);
    assert_eq!(
        prefs.dietary_restrictions,
        vec!["no shellfish".to_string(), "vegetarian".to_string()]
    );
    // Only interests named by more than one member count as common.
    assert_eq!(prefs.common_interests, vec!["history".to_string()]);
}

#[test]
fn age_group_boundaries() {
    let trip_id = ObjectId::new();
    let members = vec![
        member(trip_id, "A", Some(17), None, None),
        member(trip_id, "B", Some(18), None, None),
        member(trip_id, "C", Some(64), None, None),
        member(trip_id, "D", Some(65), None, None),
        member(trip_id, "E", None, None, None),
    ];

    let prefs = aggregate_family_preferences(&members);
    assert_eq!(prefs.age_groups.children, 1);
    assert_eq!(prefs.age_groups.adults, 2);
    assert_eq!(prefs.age_groups.seniors, 1);
    assert_eq!(prefs.total_members, 5);
}

#[test]
fn daily_plan_covers_every_trip_day() {
    let trip_id = ObjectId::new();
    // Trip runs 2026-10-01 through 2026-10-08.
    let trip = sample_trip(trip_id, "Osaka", None);
    let oct = |day| NaiveDate::from_ymd_opt(2026, 10, day).unwrap();

    let activities = vec![
        scheduled_activity(trip_id, "Castle visit", Some(oct(2)), 250.0),
        scheduled_activity(trip_id, "Aquarium", Some(oct(2)), 100.0),
        scheduled_activity(trip_id, "Market walk", Some(oct(5)), 0.0),
        scheduled_activity(trip_id, "Unscheduled idea", None, 9999.0),
        scheduled_activity(trip_id, "After the trip", Some(oct(20)), 500.0),
    ];

    let plans = group_daily_activities(&trip, &activities);
    assert_eq!(plans.len(), 8);
    assert_eq!(plans[0].date, oct(1));
    assert_eq!(plans[7].date, oct(8));

    let day_two = &plans[1];
    assert_eq!(day_two.date, oct(2));
    assert_eq!(day_two.activities.len(), 2);
    assert_eq!(day_two.activities[0].name, "Aquarium");
    assert_eq!(day_two.activities[1].name, "Castle visit");
    assert_eq!(day_two.total_estimated_cost, 350.0);

    let day_five = &plans[4];
    assert_eq!(day_five.activities.len(), 1);
    assert_eq!(day_five.total_estimated_cost, 0.0);

    // Empty days still appear, with nothing in them.
    assert!(plans[0].activities.is_empty());
    assert_eq!(plans[0].total_estimated_cost, 0.0);

    let placed: usize = plans.iter().map(|p| p.activities.len()).sum();
    assert_eq!(placed, 3);
}

#[actix_rt::test]
async fn address_is_geocoded_when_coords_are_missing() {
    let geocoder = StubGeocoder::new((34.6873, 135.5262));
    let (lat, lon) =
        resolve_accommodation_coords(&geocoder, Some("1-1 Osaka Station"), None, None).await;
    assert_eq!(lat, Some(34.6873));
    assert_eq!(lon, Some(135.5262));
    assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
}

#[actix_rt::test]
async fn explicit_coords_skip_the_geocoder() {
    let geocoder = StubGeocoder::new((34.6873, 135.5262));
    let (lat, lon) =
        resolve_accommodation_coords(&geocoder, Some("1-1 Osaka Station"), Some(1.0), Some(2.0))
            .await;
    assert_eq!(lat, Some(1.0));
    assert_eq!(lon, Some(2.0));
    assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
async fn missing_or_blank_address_is_not_geocoded() {
    let geocoder = StubGeocoder::new((34.6873, 135.5262));
    let (lat, lon) = resolve_accommodation_coords(&geocoder, None, None, None).await;
    assert_eq!((lat, lon), (None, None));

    let (lat, lon) = resolve_accommodation_coords(&geocoder, Some("   "), None, None).await;
    assert_eq!((lat, lon), (None, None));
    assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
}

#[actix_rt::test]
async fn unresolvable_address_leaves_coords_unset() {
    let geocoder = StubGeocoder::new((0.0, 0.0));
    let (lat, lon) =
        resolve_accommodation_coords(&geocoder, Some("nowhere at all"), None, None).await;
    assert_eq!((lat, lon), (None, None));
    assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
}
