use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::{
    family_member::FamilyMember,
    favorite::ActivityFavorite,
    recommendation::ActivityRecommendation,
    trip::Trip,
    vote::{ActivityComment, ActivityVote, VoteType},
};

/// External rating contributes at a fifth of its weight to popularity.
const EXTERNAL_RATING_WEIGHT: f64 = 0.2;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct VoteSummary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub score: i64,
}

pub fn vote_summary(votes: &[&ActivityVote]) -> VoteSummary {
    let positive = votes
        .iter()
        .filter(|v| v.vote_type == VoteType::Positive)
        .count();
    let negative = votes
        .iter()
        .filter(|v| v.vote_type == VoteType::Negative)
        .count();

    VoteSummary {
        total: votes.len(),
        positive,
        negative,
        score: positive as i64 - negative as i64,
    }
}

/// Vote score adjusted by a fraction of the external rating (0 if absent).
pub fn popularity_score(summary: &VoteSummary, external_rating: Option<f64>) -> f64 {
    summary.score as f64 + external_rating.unwrap_or(0.0) * EXTERNAL_RATING_WEIGHT
}

#[derive(Debug, Serialize, Clone)]
pub struct FamilyMemberInfo {
    pub id: ObjectId,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct FamilyMemberVoteInfo {
    pub family_member_id: ObjectId,
    pub family_member_name: String,
    pub vote_type: Option<VoteType>,
    pub has_voted: bool,
}

#[derive(Debug, Serialize)]
pub struct RecommendationWithVotes {
    pub recommendation_id: ObjectId,
    pub recommendation_name: String,
    pub vote_summary: VoteSummary,
    pub popularity_score: f64,
    pub family_votes: Vec<FamilyMemberVoteInfo>,
    pub comments: Vec<ActivityComment>,
}

#[derive(Debug, Serialize, Default, PartialEq, Eq)]
pub struct VoteDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

#[derive(Debug, Serialize)]
pub struct VotingStatistics {
    pub total_recommendations: usize,
    pub total_votes: usize,
    pub total_family_members: usize,
    pub vote_distribution: VoteDistribution,
    pub average_votes_per_recommendation: f64,
    pub voting_participation_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct VotingDashboard {
    pub trip_id: ObjectId,
    pub trip_name: String,
    pub family_members: Vec<FamilyMemberInfo>,
    pub recommendations_with_votes: Vec<RecommendationWithVotes>,
    pub voting_statistics: VotingStatistics,
}

/// Fraction of all possible (recommendation × member) pairs with an entry.
/// Yields 0 (never NaN) when either factor is 0.
pub fn participation_rate(entries: usize, recommendations: usize, members: usize) -> f64 {
    if recommendations == 0 || members == 0 {
        return 0.0;
    }
    entries as f64 / (recommendations * members) as f64
}

/// Join every active recommendation with every family member's vote state.
/// This is a full outer join over the pair space: members who have not
/// voted still appear with `has_voted=false`.
pub fn build_voting_dashboard(
    trip: &Trip,
    members: &[FamilyMember],
    recommendations: &[ActivityRecommendation],
    votes: &[ActivityVote],
    comments: &[ActivityComment],
) -> VotingDashboard {
    let mut votes_by_rec: HashMap<ObjectId, Vec<&ActivityVote>> = HashMap::new();
    for vote in votes {
        votes_by_rec
            .entry(vote.recommendation_id)
            .or_default()
            .push(vote);
    }

    let mut comments_by_rec: HashMap<ObjectId, Vec<&ActivityComment>> = HashMap::new();
    for comment in comments {
        comments_by_rec
            .entry(comment.recommendation_id)
            .or_default()
            .push(comment);
    }

    let mut rows = Vec::with_capacity(recommendations.len());
    let mut total_votes = 0;
    let mut distribution = VoteDistribution::default();

    for rec in recommendations {
        let Some(rec_id) = rec.id else { continue };
        let rec_votes = votes_by_rec.remove(&rec_id).unwrap_or_default();

        let votes_by_member: HashMap<ObjectId, &ActivityVote> = rec_votes
            .iter()
            .map(|vote| (vote.family_member_id, *vote))
            .collect();

        let family_votes = members
            .iter()
            .filter_map(|member| {
                let member_id = member.id?;
                let vote = votes_by_member.get(&member_id);
                Some(FamilyMemberVoteInfo {
                    family_member_id: member_id,
                    family_member_name: member.name.clone(),
                    vote_type: vote.map(|v| v.vote_type),
                    has_voted: vote.is_some(),
                })
            })
            .collect();

        for vote in &rec_votes {
            match vote.vote_type {
                VoteType::Positive => distribution.positive += 1,
                VoteType::Negative => distribution.negative += 1,
                VoteType::Neutral => distribution.neutral += 1,
            }
        }

        let summary = vote_summary(&rec_votes);
        total_votes += summary.total;

        rows.push(RecommendationWithVotes {
            recommendation_id: rec_id,
            recommendation_name: rec.name.clone(),
            popularity_score: popularity_score(&summary, rec.external_rating),
            vote_summary: summary,
            family_votes,
            comments: comments_by_rec
                .remove(&rec_id)
                .unwrap_or_default()
                .into_iter()
                .cloned()
                .collect(),
        });
    }

    let total_recommendations = rows.len();
    let statistics = VotingStatistics {
        total_recommendations,
        total_votes,
        total_family_members: members.len(),
        vote_distribution: distribution,
        average_votes_per_recommendation: if total_recommendations > 0 {
            total_votes as f64 / total_recommendations as f64
        } else {
            0.0
        },
        voting_participation_rate: participation_rate(
            total_votes,
            total_recommendations,
            members.len(),
        ),
    };

    VotingDashboard {
        trip_id: trip.id.unwrap_or_default(),
        trip_name: trip.name.clone(),
        family_members: members
            .iter()
            .filter_map(|m| {
                Some(FamilyMemberInfo {
                    id: m.id?,
                    name: m.name.clone(),
                    role: m.role.clone(),
                })
            })
            .collect(),
        recommendations_with_votes: rows,
        voting_statistics: statistics,
    }
}

#[derive(Debug, Serialize)]
pub struct FamilyMemberFavoriteInfo {
    pub family_member_id: ObjectId,
    pub family_member_name: String,
    pub has_favorited: bool,
    pub notes: Option<String>,
    pub favorite_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationWithFavorites {
    pub recommendation_id: ObjectId,
    pub recommendation_name: String,
    pub favorite_count: usize,
    pub family_favorites: Vec<FamilyMemberFavoriteInfo>,
}

#[derive(Debug, Serialize)]
pub struct FavoritesStatistics {
    pub total_recommendations: usize,
    pub total_favorites: usize,
    pub total_family_members: usize,
    pub average_favorites_per_recommendation: f64,
    pub favorite_participation_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct FavoritesDashboard {
    pub trip_id: ObjectId,
    pub trip_name: String,
    pub family_members: Vec<FamilyMemberInfo>,
    pub recommendations_with_favorites: Vec<RecommendationWithFavorites>,
    pub favorites_statistics: FavoritesStatistics,
}

/// Favorites mirror of the voting dashboard: same full outer join, with
/// notes and favorite timestamps instead of vote values.
pub fn build_favorites_dashboard(
    trip: &Trip,
    members: &[FamilyMember],
    recommendations: &[ActivityRecommendation],
    favorites: &[ActivityFavorite],
) -> FavoritesDashboard {
    let mut favorites_by_rec: HashMap<ObjectId, Vec<&ActivityFavorite>> = HashMap::new();
    for favorite in favorites {
        favorites_by_rec
            .entry(favorite.recommendation_id)
            .or_default()
            .push(favorite);
    }

    let mut rows = Vec::with_capacity(recommendations.len());
    let mut total_favorites = 0;

    for rec in recommendations {
        let Some(rec_id) = rec.id else { continue };
        let rec_favorites = favorites_by_rec.remove(&rec_id).unwrap_or_default();

        let favorites_by_member: HashMap<ObjectId, &ActivityFavorite> = rec_favorites
            .iter()
            .map(|favorite| (favorite.family_member_id, *favorite))
            .collect();

        let family_favorites = members
            .iter()
            .filter_map(|member| {
                let member_id = member.id?;
                let favorite = favorites_by_member.get(&member_id);
                Some(FamilyMemberFavoriteInfo {
                    family_member_id: member_id,
                    family_member_name: member.name.clone(),
                    has_favorited: favorite.is_some(),
                    notes: favorite.and_then(|f| f.notes.clone()),
                    favorite_date: favorite.and_then(|f| f.favorite_date),
                })
            })
            .collect();

        total_favorites += rec_favorites.len();
        rows.push(RecommendationWithFavorites {
            recommendation_id: rec_id,
            recommendation_name: rec.name.clone(),
            favorite_count: rec_favorites.len(),
            family_favorites,
        });
    }

    let total_recommendations = rows.len();
    let statistics = FavoritesStatistics {
        total_recommendations,
        total_favorites,
        total_family_members: members.len(),
        average_favorites_per_recommendation: if total_recommendations > 0 {
            total_favorites as f64 / total_recommendations as f64
        } else {
            0.0
        },
        favorite_participation_rate: participation_rate(
            total_favorites,
            total_recommendations,
            members.len(),
        ),
    };

    FavoritesDashboard {
        trip_id: trip.id.unwrap_or_default(),
        trip_name: trip.name.clone(),
        family_members: members
            .iter()
            .filter_map(|m| {
                Some(FamilyMemberInfo {
                    id: m.id?,
                    name: m.name.clone(),
                    role: m.role.clone(),
                })
            })
            .collect(),
        recommendations_with_favorites: rows,
        favorites_statistics: statistics,
    }
}
