/// Interaction Repository
///
/// Write-side operations for the live feedback path: append to the
/// interaction log and keep the item's stored counters and popularity
/// score in step with it.
use sqlx::PgPool;
use tracing::error;

use reco_engine::{InteractionKind, ItemId, UserId};

use crate::error::{AppError, Result};

pub struct InteractionRepo {
    pool: PgPool,
}

impl InteractionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one interaction row and return its id.
    pub async fn record(
        &self,
        user_id: UserId,
        item_id: ItemId,
        kind: InteractionKind,
    ) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO interactions (user_id, item_id, interaction_type, timestamp)
            VALUES ($1, $2, $3, NOW())
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to record interaction: {}", e);
            AppError::Database(e.to_string())
        })?;

        Ok(id)
    }

    /// Bump the per-kind counter and add the kind's weight to the stored
    /// popularity score. Returns the updated score, or None when the item
    /// no longer exists.
    pub async fn apply_feedback(
        &self,
        item_id: ItemId,
        kind: InteractionKind,
    ) -> Result<Option<f64>> {
        let column = match kind {
            InteractionKind::Like => "likes_count",
            InteractionKind::View => "views_count",
            InteractionKind::Share => "shares_count",
        };

        // The column name comes from the match above, never from input.
        let sql = format!(
            r#"
            UPDATE items
            SET {column} = {column} + 1,
                popularity_score = popularity_score + $1
            WHERE id = $2
            RETURNING popularity_score
            "#
        );

        let score = sqlx::query_scalar::<_, f64>(&sql)
            .bind(kind.weight())
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to apply feedback to item {}: {}", item_id, e);
                AppError::Database(e.to_string())
            })?;

        Ok(score)
    }

    /// Total rows in the interaction log. The refresh job compares this
    /// against the count baked into the fitted engine.
    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM interactions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to count interactions: {}", e);
                AppError::Database(e.to_string())
            })?;

        Ok(count)
    }
}
