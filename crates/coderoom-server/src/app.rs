//! HTTP routes: WebSocket endpoint, health probe and the single-page app.

use std::path::Path;

use axum::{Json, Router, routing::get};
use coderoom_core::ExecutionBackend;
use coderoom_session::RoomCoordinator;
use coderoom_transport::create_ws_router;
use serde_json::{Value, json};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// Build the full application router.
///
/// Any path that is neither `/ws` nor `/health` is looked up in `static_dir`;
/// unknown paths get `index.html` so client-side routes load the app.
pub fn router<E>(rooms: RoomCoordinator<E>, static_dir: &Path) -> Router
where
    E: ExecutionBackend + 'static,
{
    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(health))
        .merge(create_ws_router(rooms))
        .fallback_service(spa)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
