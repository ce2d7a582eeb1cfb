use std::convert::Infallible;

use axum::{
    Json,
    extract::State,
    response::sse::{Event, Sse},
};
use futures::{Stream, StreamExt as _};
use serde::Deserialize;

use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartChatRequest {
    /// Caller-supplied id correlating this session with a later stop call.
    pub session_id: String,
    pub prompt: String,
}

/// POST /api/chat
///
/// Starts one relay session and streams its outbound events as SSE frames,
/// one frame per event, ending with exactly one terminal frame. Dropping
/// the connection mid-stream terminates the session.
pub async fn start_chat(
    State(state): State<AppState>,
    Json(request): Json<StartChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(session_id = %request.session_id, "starting relay session");
    let stream = state
        .relay
        .start(request.session_id, request.prompt)
        .map(|event| Ok(Event::default().data(event.wire_json())));
    Sse::new(stream)
}
