use serde::{Deserialize, Serialize};

use reco_engine::{ItemId, UserId};

// ============================================
// HTTP Request/Response Models
// ============================================

/// One fully enriched entry in the home feed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationOut {
    pub item_id: ItemId,
    pub title: String,
    pub description: String,
    pub tags: String,
    pub score: f64,
    pub reason: String,
    pub creator_name: String,
    pub community: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomefeedResponse {
    pub user_id: UserId,
    pub recommendations: Vec<RecommendationOut>,
    pub count: usize,
}

/// Body for POST /v1/reco/feedback.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub user_id: UserId,
    pub item_id: ItemId,
    /// One of "like", "view", "share".
    pub feedback_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub status: String,
    pub interaction_id: i64,
    /// Item popularity score after the per-kind delta was applied.
    pub updated_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationOut {
    pub item_id: ItemId,
    pub title: String,
    pub description: String,
    pub tags: String,
    pub score: f64,
    pub reasons: Vec<String>,
    pub creator_name: String,
    pub community: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationsResponse {
    pub user_id: UserId,
    pub explanations: Vec<ExplanationOut>,
    pub count: usize,
}

/// Payload for GET /health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub engine: String,
    pub items: usize,
    pub interactions: usize,
}
