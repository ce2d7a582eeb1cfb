use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopChatRequest {
    pub session_id: String,
}

/// POST /api/stop
///
/// Requests cancellation of a running session. The session observes the
/// removal at its next poll; unknown ids are accepted silently.
pub async fn stop_chat(
    State(state): State<AppState>,
    Json(request): Json<StopChatRequest>,
) -> StatusCode {
    tracing::debug!(session_id = %request.session_id, "stop requested");
    state.relay.stop(&request.session_id);
    StatusCode::NO_CONTENT
}
