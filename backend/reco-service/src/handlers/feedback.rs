/// Feedback Handler
///
/// Records live interactions and applies their popularity deltas. The
/// fitted models only see these rows at the next refresh; the stored
/// score moves immediately.
use actix_web::{post, web, HttpResponse};
use tracing::debug;

use reco_engine::InteractionKind;

use crate::error::{AppError, Result};
use crate::handlers::RecoHandlerState;
use crate::models::{FeedbackRequest, FeedbackResponse};

/// POST /v1/reco/feedback
#[post("/v1/reco/feedback")]
pub async fn post_feedback(
    body: web::Json<FeedbackRequest>,
    state: web::Data<RecoHandlerState>,
) -> Result<HttpResponse> {
    let kind = InteractionKind::parse(&body.feedback_type).ok_or_else(|| {
        AppError::BadRequest(format!(
            "unknown feedback_type {:?}; expected like, view, or share",
            body.feedback_type
        ))
    })?;

    state
        .catalog
        .get_user(body.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", body.user_id)))?;

    // Counter bump and score delta first; a missing item means nothing
    // was written and the log should not get an orphan row.
    let updated_score = state
        .interactions
        .apply_feedback(body.item_id, kind)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("item {} not found", body.item_id)))?;

    let interaction_id = state
        .interactions
        .record(body.user_id, body.item_id, kind)
        .await?;

    debug!(
        user_id = body.user_id,
        item_id = body.item_id,
        kind = %kind,
        interaction_id,
        updated_score,
        "Feedback recorded"
    );

    Ok(HttpResponse::Ok().json(FeedbackResponse {
        status: "ok".to_string(),
        interaction_id,
        updated_score,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_type_parsing() {
        assert_eq!(InteractionKind::parse("like"), Some(InteractionKind::Like));
        assert_eq!(InteractionKind::parse("view"), Some(InteractionKind::View));
        assert_eq!(
            InteractionKind::parse("share"),
            Some(InteractionKind::Share)
        );
        assert_eq!(InteractionKind::parse("clap"), None);
        assert_eq!(InteractionKind::parse(""), None);
    }
}
