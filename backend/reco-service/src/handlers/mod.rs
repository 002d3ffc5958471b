/// HTTP Handlers
///
/// One file per endpoint family, all sharing `RecoHandlerState`.
use std::sync::Arc;

use reco_engine::RecoEngine;

use crate::db::{CatalogRepo, InteractionRepo};

pub mod explanations;
pub mod feedback;
pub mod health;
pub mod homefeed;

pub use explanations::get_explanations;
pub use feedback::post_feedback;
pub use health::get_health;
pub use homefeed::get_homefeed;

/// Shared state handed to every handler via `web::Data`.
pub struct RecoHandlerState {
    pub engine: Arc<RecoEngine>,
    pub catalog: CatalogRepo,
    pub interactions: InteractionRepo,
}
