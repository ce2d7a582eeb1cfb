pub mod chat;
pub mod demo;
pub mod state;
pub mod stop;

use axum::{
    Router,
    routing::{get, post},
};
use state::AppState;
use tower_http::cors::CorsLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat::start_chat))
        .route("/api/stop", post(stop::stop_chat))
        .route("/api/demo/chat", post(demo::demo_chat))
        .route("/api/demo/upstream", get(demo::demo_upstream))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
