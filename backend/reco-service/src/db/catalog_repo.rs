/// Catalog Repository
///
/// Read-side database operations: users, items, and the full interaction
/// log the engine fits on.
use sqlx::PgPool;
use tracing::error;

use reco_engine::{CatalogSnapshot, Interaction, InteractionKind, Item, User, UserId};

use crate::error::{AppError, Result};

pub struct CatalogRepo {
    pool: PgPool,
}

impl CatalogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a single user row, or None when the id is unknown.
    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<
            _,
            (
                i64,                           // id
                String,                        // name
                String,                        // community
                String,                        // tags
                chrono::DateTime<chrono::Utc>, // signup_date
            ),
        >(
            r#"
            SELECT id, name, community, tags, signup_date
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to fetch user {}: {}", user_id, e);
            AppError::Database(e.to_string())
        })?
        .map(|(id, name, community, tags, signup_date)| User {
            id,
            name,
            community,
            tags,
            signup_date,
        });

        Ok(row)
    }

    /// Batch-fetch users by id, keyed for lookup. Ids with no row are
    /// simply absent from the map.
    pub async fn get_users_by_ids(
        &self,
        ids: &[UserId],
    ) -> Result<std::collections::HashMap<UserId, User>> {
        if ids.is_empty() {
            return Ok(std::collections::HashMap::new());
        }

        let rows = sqlx::query_as::<
            _,
            (
                i64,                           // id
                String,                        // name
                String,                        // community
                String,                        // tags
                chrono::DateTime<chrono::Utc>, // signup_date
            ),
        >(
            r#"
            SELECT id, name, community, tags, signup_date
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to batch-fetch users: {}", e);
            AppError::Database(e.to_string())
        })?;

        Ok(rows
            .into_iter()
            .map(|(id, name, community, tags, signup_date)| {
                (
                    id,
                    User {
                        id,
                        name,
                        community,
                        tags,
                        signup_date,
                    },
                )
            })
            .collect())
    }

    /// Fetch the whole item catalog ordered by id.
    pub async fn get_items(&self) -> Result<Vec<Item>> {
        let items = sqlx::query_as::<
            _,
            (
                i64,                           // id
                String,                        // title
                String,                        // description
                String,                        // tags
                i64,                           // creator_id
                chrono::DateTime<chrono::Utc>, // created_at
                i32,                           // likes_count
                i32,                           // views_count
                i32,                           // shares_count
                f64,                           // popularity_score
            ),
        >(
            r#"
            SELECT
                id,
                title,
                description,
                tags,
                creator_id,
                created_at,
                likes_count,
                views_count,
                shares_count,
                popularity_score
            FROM items
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to fetch items: {}", e);
            AppError::Database(e.to_string())
        })?
        .into_iter()
        .map(
            |(
                id,
                title,
                description,
                tags,
                creator_id,
                created_at,
                likes,
                views,
                shares,
                popularity_score,
            )| {
                Item {
                    id,
                    title,
                    description,
                    tags,
                    creator_id,
                    created_at,
                    likes_count: likes,
                    views_count: views,
                    shares_count: shares,
                    popularity_score,
                }
            },
        )
        .collect();

        Ok(items)
    }

    /// Fetch the full interaction log ordered by id. Rows whose type column
    /// does not parse as a known kind are dropped with a warning so one bad
    /// row cannot block a fit.
    pub async fn get_all_interactions(&self) -> Result<Vec<Interaction>> {
        let rows = sqlx::query_as::<
            _,
            (
                i64,                           // id
                i64,                           // user_id
                i64,                           // item_id
                String,                        // interaction_type
                chrono::DateTime<chrono::Utc>, // timestamp
            ),
        >(
            r#"
            SELECT id, user_id, item_id, interaction_type, timestamp
            FROM interactions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to fetch interactions: {}", e);
            AppError::Database(e.to_string())
        })?;

        let mut interactions = Vec::with_capacity(rows.len());
        let mut dropped = 0usize;
        for (id, user_id, item_id, kind, timestamp) in rows {
            match InteractionKind::parse(&kind) {
                Some(kind) => interactions.push(Interaction {
                    id,
                    user_id,
                    item_id,
                    kind,
                    timestamp,
                }),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            tracing::warn!(
                dropped,
                "Interaction rows with unknown types were skipped"
            );
        }

        Ok(interactions)
    }

    /// Load everything the engine needs for a fit in one snapshot.
    pub async fn load_snapshot(&self) -> Result<CatalogSnapshot> {
        let items = self.get_items().await?;
        let interactions = self.get_all_interactions().await?;
        Ok(CatalogSnapshot {
            items,
            interactions,
        })
    }
}
