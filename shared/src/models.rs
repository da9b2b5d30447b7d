use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use time::OffsetDateTime;

// Mirrored from the external CRM; read-only on our side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Charity {
    pub id: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub detail_url: Option<String>,
}

// user_id is unique at the storage layer: at most one row per user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
pub struct Vote {
    pub id: i64,
    pub user_id: String,
    pub charity_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

// success:false means "already voted", still an HTTP 200.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteCountsResponse {
    pub success: bool,
    pub vote_counts: HashMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlushResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub user_id: String,
    pub charities: Vec<Charity>,
    pub vote_counts: HashMap<String, i64>,
    pub user_vote: Option<Vote>,
    pub recent_votes: Vec<Vote>,
    pub total_votes: i64,
}
