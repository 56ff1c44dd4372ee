mod common;

use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use common::{sample_recommendation, sample_trip};
use trip_planner_api::models::family_member::FamilyMember;
use trip_planner_api::models::favorite::ActivityFavorite;
use trip_planner_api::models::vote::{ActivityComment, ActivityVote, VoteType};
use trip_planner_api::services::dashboard::{
    build_favorites_dashboard, build_voting_dashboard, participation_rate, popularity_score,
    vote_summary,
};

fn member(trip_id: ObjectId, name: &str) -> FamilyMember {
    FamilyMember {
        id: Some(ObjectId::new()),
        trip_id,
        name: name.to_string(),
        role: "parent".to_string(),
        age: Some(40),
        dietary_restrictions: None,
        mobility_needs: None,
        interests: None,
        wishlist: None,
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    }
}

fn vote(rec_id: ObjectId, member_id: ObjectId, vote_type: VoteType) -> ActivityVote {
    ActivityVote {
        id: Some(ObjectId::new()),
        recommendation_id: rec_id,
        family_member_id: member_id,
        vote_type,
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    }
}

#[test]
fn vote_summary_counts_and_score() {
    let rec_id = ObjectId::new();
    let votes = vec![
        vote(rec_id, ObjectId::new(), VoteType::Positive),
        vote(rec_id, ObjectId::new(), VoteType::Positive),
        vote(rec_id, ObjectId::new(), VoteType::Positive),
        vote(rec_id, ObjectId::new(), VoteType::Negative),
        vote(rec_id, ObjectId::new(), VoteType::Neutral),
    ];
    let refs: Vec<&ActivityVote> = votes.iter().collect();
    let summary = vote_summary(&refs);

    assert_eq!(summary.total, 5);
    assert_eq!(summary.positive, 3);
    assert_eq!(summary.negative, 1);
    assert_eq!(summary.score, 2);
}

#[test]
fn popularity_blends_votes_with_external_rating() {
    let rec_id = ObjectId::new();
    let votes = vec![
        vote(rec_id, ObjectId::new(), VoteType::Positive),
        vote(rec_id, ObjectId::new(), VoteType::Positive),
        vote(rec_id, ObjectId::new(), VoteType::Positive),
        vote(rec_id, ObjectId::new(), VoteType::Negative),
    ];
    let refs: Vec<&ActivityVote> = votes.iter().collect();
    let summary = vote_summary(&refs);

    // score 2 + 4.5 * 0.2
    assert!((popularity_score(&summary, Some(4.5)) - 2.9).abs() < 1e-9);
    // Missing rating contributes nothing.
    assert!((popularity_score(&summary, None) - 2.0).abs() < 1e-9);
}

#[test]
fn participation_rate_is_zero_guarded() {
    assert_eq!(participation_rate(5, 0, 3), 0.0);
    assert_eq!(participation_rate(5, 3, 0), 0.0);
    assert!((participation_rate(3, 2, 3) - 0.5).abs() < 1e-9);
}

#[test]
fn voting_dashboard_joins_every_member_with_every_recommendation() {
    let trip_id = ObjectId::new();
    let trip = sample_trip(trip_id, "Osaka, Japan", None);
    let members = vec![member(trip_id, "Wei"), member(trip_id, "Lily")];

    let mut rec_a = sample_recommendation("Osaka Castle", Some("castle"));
    rec_a.trip_id = trip_id;
    rec_a.external_rating = Some(4.5);
    let mut rec_b = sample_recommendation("Spa World", Some("onsen"));
    rec_b.trip_id = trip_id;
    let recommendations = vec![rec_a.clone(), rec_b.clone()];

    // Wei votes on both, Lily only on the castle.
    let wei = members[0].id.unwrap();
    let lily = members[1].id.unwrap();
    let votes = vec![
        vote(rec_a.id.unwrap(), wei, VoteType::Positive),
        vote(rec_a.id.unwrap(), lily, VoteType::Negative),
        vote(rec_b.id.unwrap(), wei, VoteType::Neutral),
    ];
    let comments = vec![ActivityComment {
        id: Some(ObjectId::new()),
        recommendation_id: rec_a.id.unwrap(),
        family_member_id: wei,
        comment_text: "Looks great".to_string(),
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    }];

    let dashboard = build_voting_dashboard(&trip, &members, &recommendations, &votes, &comments);

    assert_eq!(dashboard.trip_id, trip_id);
    assert_eq!(dashboard.family_members.len(), 2);
    assert_eq!(dashboard.recommendations_with_votes.len(), 2);

    let castle = &dashboard.recommendations_with_votes[0];
    assert_eq!(castle.recommendation_name, "Osaka Castle");
    assert_eq!(castle.vote_summary.total, 2);
    assert_eq!(castle.vote_summary.score, 0);
    assert_eq!(castle.comments.len(), 1);
    // Every member appears, voted or not.
    assert_eq!(castle.family_votes.len(), 2);
    assert!(castle.family_votes.iter().all(|fv| fv.has_voted));

    let spa = &dashboard.recommendations_with_votes[1];
    assert_eq!(spa.family_votes.len(), 2);
    let lily_row = spa
        .family_votes
        .iter()
        .find(|fv| fv.family_member_id == lily)
        .unwrap();
    assert!(!lily_row.has_voted);
    assert!(lily_row.vote_type.is_none());

    let stats = &dashboard.voting_statistics;
    assert_eq!(stats.total_recommendations, 2);
    assert_eq!(stats.total_votes, 3);
    assert_eq!(stats.total_family_members, 2);
    assert_eq!(stats.vote_distribution.positive, 1);
    assert_eq!(stats.vote_distribution.negative, 1);
    assert_eq!(stats.vote_distribution.neutral, 1);
    assert!((stats.average_votes_per_recommendation - 1.5).abs() < 1e-9);
    // 3 votes over a 2x2 pair space
    assert!((stats.voting_participation_rate - 0.75).abs() < 1e-9);
}

#[test]
fn voting_dashboard_with_no_votes_has_empty_statistics() {
    let trip_id = ObjectId::new();
    let trip = sample_trip(trip_id, "Osaka, Japan", None);
    let dashboard = build_voting_dashboard(&trip, &[], &[], &[], &[]);

    assert!(dashboard.recommendations_with_votes.is_empty());
    assert_eq!(dashboard.voting_statistics.total_votes, 0);
    assert_eq!(dashboard.voting_statistics.average_votes_per_recommendation, 0.0);
    assert_eq!(dashboard.voting_statistics.voting_participation_rate, 0.0);
}

#[test]
fn favorites_dashboard_mirrors_the_join_with_notes() {
    let trip_id = ObjectId::new();
    let trip = sample_trip(trip_id, "Osaka, Japan", None);
    let members = vec![member(trip_id, "Wei"), member(trip_id, "Lily")];
    let wei = members[0].id.unwrap();

    let mut rec = sample_recommendation("Kuromon Market", Some("market"));
    rec.trip_id = trip_id;
    let favorites = vec![ActivityFavorite {
        id: Some(ObjectId::new()),
        recommendation_id: rec.id.unwrap(),
        family_member_id: wei,
        notes: Some("Must eat here".to_string()),
        favorite_date: Some(Utc::now()),
        created_at: Some(Utc::now()),
        updated_at: Some(Utc::now()),
    }];

    let dashboard = build_favorites_dashboard(&trip, &members, &[rec], &favorites);

    assert_eq!(dashboard.recommendations_with_favorites.len(), 1);
    let row = &dashboard.recommendations_with_favorites[0];
    assert_eq!(row.favorite_count, 1);
    assert_eq!(row.family_favorites.len(), 2);

    let wei_row = row
        .family_favorites
        .iter()
        .find(|ff| ff.family_member_id == wei)
        .unwrap();
    assert!(wei_row.has_favorited);
    assert_eq!(wei_row.notes.as_deref(), Some("Must eat here"));

    let other_row = row
        .family_favorites
        .iter()
        .find(|ff| ff.family_member_id != wei)
        .unwrap();
    assert!(!other_row.has_favorited);
    assert!(other_row.notes.is_none());

    let stats = &dashboard.favorites_statistics;
    assert_eq!(stats.total_favorites, 1);
    assert!((stats.favorite_participation_rate - 0.5).abs() < 1e-9);
}
