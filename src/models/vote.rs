use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Vote values a family member can cast on a recommendation.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Positive,
    Negative,
    Neutral,
}

impl VoteType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "positive" => Some(VoteType::Positive),
            "negative" => Some(VoteType::Negative),
            "neutral" => Some(VoteType::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Positive => "positive",
            VoteType::Negative => "negative",
            VoteType::Neutral => "neutral",
        }
    }
}

/// One vote per (recommendation, family member) pair. Re-voting overwrites
/// the existing row in place.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActivityVote {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub recommendation_id: ObjectId,
    pub family_member_id: ObjectId,
    pub vote_type: VoteType,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateVote {
    pub recommendation_id: String,
    pub family_member_id: String,
    pub vote_type: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVote {
    pub vote_type: String,
}

/// Free-form remarks; unlike votes, any number per member per recommendation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActivityComment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub recommendation_id: ObjectId,
    pub family_member_id: ObjectId,
    pub comment_text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub recommendation_id: String,
    pub family_member_id: String,
    pub comment_text: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateComment {
    pub comment_text: String,
}
