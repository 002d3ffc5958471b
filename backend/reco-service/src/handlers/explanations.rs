/// Explanations Handler
///
/// Surfaces which signals carried each of a user's top items.
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use reco_engine::UserId;

use crate::error::{AppError, Result};
use crate::handlers::RecoHandlerState;
use crate::models::{ExplanationOut, ExplanationsResponse};

/// Query parameters for GET /v1/reco/explanations
#[derive(Debug, Deserialize)]
pub struct ExplanationsQuery {
    pub user_id: UserId,

    /// Number of explained items to return (default: 10, max: 100)
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    10
}

/// GET /v1/reco/explanations
#[get("/v1/reco/explanations")]
pub async fn get_explanations(
    query: web::Query<ExplanationsQuery>,
    state: web::Data<RecoHandlerState>,
) -> Result<HttpResponse> {
    let top_k = query.top_k.clamp(1, 100);

    let user = state
        .catalog
        .get_user(query.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", query.user_id)))?;

    debug!(user_id = user.id, top_k, "Building explanations");

    let engine = Arc::clone(&state.engine);
    let scoring_user = user.clone();
    let explained = web::block(move || engine.explain(&scoring_user, top_k))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let items = state.catalog.get_items().await?;
    let by_id: HashMap<_, _> = items.into_iter().map(|i| (i.id, i)).collect();

    let creator_ids: Vec<UserId> = explained
        .iter()
        .filter_map(|ex| by_id.get(&ex.item_id))
        .map(|item| item.creator_id)
        .collect();
    let creators = state.catalog.get_users_by_ids(&creator_ids).await?;

    let explanations: Vec<ExplanationOut> = explained
        .into_iter()
        .filter_map(|ex| {
            by_id.get(&ex.item_id).map(|item| {
                let creator = creators.get(&item.creator_id);
                ExplanationOut {
                    item_id: item.id,
                    title: item.title.clone(),
                    description: item.description.clone(),
                    tags: item.tags.clone(),
                    score: ex.score,
                    reasons: ex.reasons,
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

    let count = explanations.len();
    Ok(HttpResponse::Ok().json(ExplanationsResponse {
        user_id: user.id,
        explanations,
        count,
    }))
}
