/// Health Handler
use actix_web::{get, web, HttpResponse};

use reco_engine::EngineStatus;

use crate::handlers::RecoHandlerState;
use crate::models::HealthResponse;

/// GET /health
///
/// Reports "ok" only once the engine is fitted and serving.
#[get("/health")]
pub async fn get_health(state: web::Data<RecoHandlerState>) -> HttpResponse {
    let engine_status = state.engine.status();
    let status = match engine_status {
        EngineStatus::Ready => "ok",
        _ => "starting",
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        engine: format!("{engine_status:?}").to_lowercase(),
        items: state.engine.item_count().unwrap_or(0),
        interactions: state.engine.interaction_count().unwrap_or(0),
    })
}
