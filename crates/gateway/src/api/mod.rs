pub mod auth;
pub mod chat;

use axum::middleware;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
///
/// Routes are split into **public** (liveness probe) and **protected**
/// (gated behind the `QC_API_TOKEN` bearer-token middleware).
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/healthz", get(healthz));

    let protected = Router::new()
        .route("/v1/thread", post(chat::create_thread))
        .route("/v1/threads/:thread_id/stream", post(chat::stream_turn))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_api_token,
        ));

    public.merge(protected)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
