use sqlx::{PgPool, Row};
use std::collections::HashMap;
use shared::models::Vote;
use crate::error::ApiError;

pub const RECENT_VOTES_LIMIT: i64 = 11;

pub struct VoteLedger;

impl VoteLedger {
    // Uniqueness is decided by the insert itself, never a prior read.
    // Ok(false) is the already-voted outcome; anything but a unique
    // violation is a storage error.
    pub async fn cast_vote(
        pool: &PgPool,
        user_id: &str,
        charity_id: &str,
    ) -> Result<bool, ApiError> {
        let result = sqlx::query("INSERT INTO votes (user_id, charity_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(charity_id)
            .execute(pool)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Ok(false),
            Err(e) => Err(ApiError::Storage(e.to_string())),
        }
    }

    pub async fn vote_count(pool: &PgPool, charity_id: &str) -> Result<i64, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE charity_id = $1")
            .bind(charity_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn total_votes(pool: &PgPool) -> Result<i64, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM votes")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn vote_for_user(pool: &PgPool, user_id: &str) -> Result<Option<Vote>, ApiError> {
        let vote = sqlx::query_as::<_, Vote>(
            "SELECT id, user_id, charity_id, created_at, updated_at
             FROM votes WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
        Ok(vote)
    }

    pub async fn recent_votes(pool: &PgPool, limit: i64) -> Result<Vec<Vote>, ApiError> {
        let votes = sqlx::query_as::<_, Vote>(
            "SELECT id, user_id, charity_id, created_at, updated_at
             FROM votes ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(votes)
    }

    // Charities nobody voted for are absent here; the tally layer
    // zero-fills them from the catalog.
    pub async fn counts_by_charity(pool: &PgPool) -> Result<HashMap<String, i64>, ApiError> {
        let rows = sqlx::query("SELECT charity_id, COUNT(*) AS votes FROM votes GROUP BY charity_id")
            .fetch_all(pool)
            .await?;

        let mut counts = HashMap::with_capacity(rows.len());
        for row in rows {
            let charity_id: String = row.try_get("charity_id")?;
            let votes: i64 = row.try_get("votes")?;
            counts.insert(charity_id, votes);
        }
        Ok(counts)
    }
}
