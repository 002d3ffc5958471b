/// Home Feed Handler
///
/// Personalized recommendations, enriched with catalog fields for display.
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use reco_engine::{RecoMode, UserId};

use crate::error::{AppError, Result};
use crate::handlers::RecoHandlerState;
use crate::models::{HomefeedResponse, RecommendationOut};

/// Query parameters for GET /v1/reco/homefeed
#[derive(Debug, Deserialize)]
pub struct HomefeedQuery {
    /// User to build the feed for
    pub user_id: UserId,

    /// Number of recommendations to return (default: 10, max: 100)
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    10
}

/// GET /v1/reco/homefeed
///
/// Users the factor model knows get the hybrid ranking; everyone else
/// gets the cold-start blend. Both paths share the diversity filter.
#[get("/v1/reco/homefeed")]
pub async fn get_homefeed(
    query: web::Query<HomefeedQuery>,
    state: web::Data<RecoHandlerState>,
) -> Result<HttpResponse> {
    let top_k = query.top_k.clamp(1, 100);

    let user = state
        .catalog
        .get_user(query.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", query.user_id)))?;

    let mode = if state.engine.knows_user(user.id)? {
        RecoMode::Hybrid
    } else {
        RecoMode::ColdStart
    };

    debug!(
        user_id = user.id,
        top_k,
        mode = ?mode,
        "Building home feed"
    );

    // Scoring is CPU work over owned state; keep it off the runtime threads.
    let engine = Arc::clone(&state.engine);
    let scoring_user = user.clone();
    let recs = web::block(move || engine.recommend(&scoring_user, top_k, mode))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    // Enrich from the live catalog. Items deleted since the last fit can
    // still appear in the ranking; they are dropped here.
    let items = state.catalog.get_items().await?;
    let by_id: HashMap<_, _> = items.into_iter().map(|i| (i.id, i)).collect();

    let creator_ids: Vec<UserId> = recs
        .iter()
        .filter_map(|rec| by_id.get(&rec.item_id))
        .map(|item| item.creator_id)
        .collect();
    let creators = state.catalog.get_users_by_ids(&creator_ids).await?;

    let recommendations: Vec<RecommendationOut> = recs
        .into_iter()
        .filter_map(|rec| {
            by_id.get(&rec.item_id).map(|item| {
                let creator = creators.get(&item.creator_id);
                RecommendationOut {
                    item_id: item.id,
                    title: item.title.clone(),
                    description: item.description.clone(),
                    tags: item.tags.clone(),
                    score: rec.score,
                    reason: rec.reason,
                    creator_name: creator
                        .map(|c| c.name.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    community: creator
                        .map(|c| c.community.clone())
                        .unwrap_or_else(|| "Unknown".to_string()),
                }
            })
        })
        .collect();

    let count = recommendations.len();
    Ok(HttpResponse::Ok().json(HomefeedResponse {
        user_id: user.id,
        recommendations,
        count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_top_k() {
        assert_eq!(default_top_k(), 10);
    }

    #[test]
    fn test_top_k_clamps_to_bounds() {
        let mut query = HomefeedQuery {
            user_id: 1,
            top_k: 500,
        };
        assert_eq!(query.top_k.clamp(1, 100), 100);

        query.top_k = 0;
        assert_eq!(query.top_k.clamp(1, 100), 1);
    }
}
