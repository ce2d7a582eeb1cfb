//! Synthetic event sources for exercising clients without a live upstream.
//!
//! `demo_chat` emits the full outbound taxonomy (it is the only producer
//! of `Image` events) with randomized fragment lengths, and can simulate
//! an HTTP-level failure or a mid-stream error frame on request.
//! `demo_upstream` produces raw `data: <text>` records terminated by
//! `[DONE]`, a local stand-in for the upstream completion endpoint.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::sse::{Event, Sse},
};
use futures::{Stream, StreamExt as _};
use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};
use relay_stream::{DONE_SENTINEL, RelayEvent};
use serde::Deserialize;
use tokio::sync::mpsc;

const FRAME_DELAY: Duration = Duration::from_millis(50);

const DEMO_IMAGE_URL: &str = "https://images.example/huarong-trail.png";

const DEMO_THINK: &str = "The user wants a short summary of the Huarong Trail episode. \
Key beats: Cao Cao flees after Red Cliffs, Guan Yu blocks the muddy pass, \
remembers an old debt of kindness, and lets him go. Keep it under a few sentences.";

const DEMO_TEXT: &str = "After his defeat at Red Cliffs, Cao Cao retreated along the \
Huarong Trail, where Guan Yu barred the way. Remembering past kindness, Guan Yu \
released him, a choice remembered as the famous act of honor on the trail.";

const DEMO_RAW: &str = "却说曹操兵败赤壁，行至华容道，前有泥泞，后有追兵。\
忽见关云长横刀立马，拦住去路。关羽念及旧恩，长叹一声，终放曹操一条生路。";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DemoChatRequest {
    /// Fail before streaming starts, with a plain 400 response.
    #[serde(rename = "showHTTPError")]
    pub show_http_error: bool,
    /// Inject a terminal error frame partway through the think phase.
    #[serde(rename = "showSSEError")]
    pub show_sse_error: bool,
}

/// POST /api/demo/chat
pub async fn demo_chat(
    Json(request): Json<DemoChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    if request.show_http_error {
        return Err(StatusCode::BAD_REQUEST);
    }

    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(demo_script(request.show_sse_error, FRAME_DELAY, tx));
    let stream =
        receiver_stream(rx).map(|event: RelayEvent| Ok(Event::default().data(event.wire_json())));
    Ok(Sse::new(stream))
}

/// GET /api/demo/upstream
pub async fn demo_upstream() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut rng = StdRng::from_entropy();
        for fragment in random_fragments(DEMO_RAW, &mut rng) {
            if tx.send(fragment).await.is_err() {
                return;
            }
            tokio::time::sleep(FRAME_DELAY).await;
        }
        let _ = tx.send(DONE_SENTINEL.to_string()).await;
    });
    let stream = receiver_stream(rx).map(|data: String| Ok(Event::default().data(data)));
    Sse::new(stream)
}

/// Emits the scripted event sequence: one image, randomized think
/// fragments, randomized text fragments, then `End`. With error injection
/// enabled the stream ends with a single `Error` frame partway through.
async fn demo_script(inject_error: bool, delay: Duration, tx: mpsc::Sender<RelayEvent>) {
    let mut rng = StdRng::from_entropy();
    let think_fragments = random_fragments(DEMO_THINK, &mut rng);
    let error_after = inject_error.then(|| rng.gen_range(0..think_fragments.len()));

    if tx
        .send(RelayEvent::Image {
            url: DEMO_IMAGE_URL.to_string(),
        })
        .await
        .is_err()
    {
        return;
    }

    for (i, delta) in think_fragments.into_iter().enumerate() {
        if error_after == Some(i) {
            let _ = tx.send(RelayEvent::error("simulated stream failure")).await;
            return;
        }
        if tx.send(RelayEvent::Think { delta }).await.is_err() {
            return;
        }
        tokio::time::sleep(delay).await;
    }

    for delta in random_fragments(DEMO_TEXT, &mut rng) {
        if tx.send(RelayEvent::Text { delta }).await.is_err() {
            return;
        }
        tokio::time::sleep(delay).await;
    }

    let _ = tx.send(RelayEvent::end()).await;
}

/// Splits text into fragments of 1..=10 characters, respecting char
/// boundaries so multi-byte text fragments stay valid.
fn random_fragments(text: &str, rng: &mut StdRng) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut fragments = Vec::new();
    let mut cursor = 0;
    while cursor < chars.len() {
        let len = rng.gen_range(1..=10).min(chars.len() - cursor);
        fragments.push(chars[cursor..cursor + len].iter().collect());
        cursor += len;
    }
    fragments
}

fn receiver_stream<T: Send + 'static>(rx: mpsc::Receiver<T>) -> impl Stream<Item = T> {
    futures::stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run_script(inject_error: bool) -> Vec<RelayEvent> {
        let (tx, mut rx) = mpsc::channel(256);
        tokio::spawn(demo_script(inject_error, Duration::ZERO, tx));
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn script_starts_with_image_and_ends_with_end() {
        let events = run_script(false).await;
        assert!(matches!(events.first(), Some(RelayEvent::Image { .. })));
        assert_eq!(events.last(), Some(&RelayEvent::end()));
        let terminals = events.iter().filter(|e| e.is_terminal()).count();
        assert_eq!(terminals, 1);
    }

    #[tokio::test]
    async fn script_reassembles_to_the_full_texts() {
        let events = run_script(false).await;
        let think: String = events
            .iter()
            .filter_map(|e| match e {
                RelayEvent::Think { delta } => Some(delta.as_str()),
                _ => None,
            })
            .collect();
        let text: String = events
            .iter()
            .filter_map(|e| match e {
                RelayEvent::Text { delta } => Some(delta.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(think, DEMO_THINK);
        assert_eq!(text, DEMO_TEXT);
    }

    #[tokio::test]
    async fn error_injection_ends_the_stream_with_one_error() {
        let events = run_script(true).await;
        assert!(matches!(events.last(), Some(RelayEvent::Error { .. })));
        let terminals = events.iter().filter(|e| e.is_terminal()).count();
        assert_eq!(terminals, 1);
        assert!(!events.iter().any(|e| matches!(e, RelayEvent::Text { .. })));
    }

    #[test]
    fn random_fragments_respect_char_boundaries() {
        let mut rng = StdRng::seed_from_u64(7);
        let fragments = random_fragments(DEMO_RAW, &mut rng);
        assert_eq!(fragments.concat(), DEMO_RAW);
        assert!(fragments.iter().all(|f| (1..=10).contains(&f.chars().count())));
    }
}
