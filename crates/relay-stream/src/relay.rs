use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::StreamExt as _;
use tokio::sync::mpsc;
use tracing::debug;

use crate::decoder::FrameDecoder;
use crate::event::RelayEvent;
use crate::registry::SessionRegistry;
use crate::translate::classify;
use crate::upstream::UpstreamSource;

const DEFAULT_BUFFER_CAPACITY: usize = 128;

/// Relays upstream streaming completions to per-session event streams.
///
/// Each started session runs as an independent task that owns its own
/// decode buffer and upstream connection; sessions share only the
/// cancellation registry.
#[derive(Clone)]
pub struct Relay {
    upstream: Arc<dyn UpstreamSource>,
    registry: SessionRegistry,
    buffer_capacity: usize,
}

impl Relay {
    /// Creates a relay over the given upstream source and registry.
    pub fn new(upstream: Arc<dyn UpstreamSource>, registry: SessionRegistry) -> Self {
        Self {
            upstream,
            registry,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }

    /// Sets the bounded event buffer size between the session task and the
    /// consumer.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Returns a handle to the shared cancellation registry.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Starts one relay session and returns its event stream.
    ///
    /// The session id is caller-supplied and correlates a later `stop`
    /// call; it is registered as alive before this method returns.
    pub fn start(&self, session_id: impl Into<String>, prompt: impl Into<String>) -> RelayStream {
        let session_id = session_id.into();
        let prompt = prompt.into();
        let (tx, rx) = mpsc::channel(self.buffer_capacity);

        self.registry.begin(&session_id);
        tokio::spawn(relay_task(
            self.upstream.clone(),
            self.registry.clone(),
            session_id,
            prompt,
            tx,
        ));

        RelayStream { rx }
    }

    /// Requests cancellation of a running session.
    ///
    /// Cancellation is cooperative: the session observes it at its next
    /// poll, so at most one further upstream chunk is read and discarded.
    /// Unknown ids are a no-op.
    pub fn stop(&self, session_id: &str) {
        self.registry.end(session_id);
    }
}

/// Per-session event stream handed to the downstream writer.
///
/// Yields zero or more non-terminal events followed by exactly one
/// terminal event, then closes. Dropping the stream mid-session counts as
/// a client disconnect and makes the session task release its resources.
pub struct RelayStream {
    rx: mpsc::Receiver<RelayEvent>,
}

impl RelayStream {
    /// Waits for and returns the next outbound event.
    ///
    /// Returns `None` after the terminal event has been delivered.
    pub async fn next_event(&mut self) -> Option<RelayEvent> {
        self.rx.recv().await
    }
}

impl futures::Stream for RelayStream {
    type Item = RelayEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Terminal transition of one session, for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RelayOutcome {
    Completed,
    Cancelled,
    Failed,
    Disconnected,
}

async fn relay_task(
    upstream: Arc<dyn UpstreamSource>,
    registry: SessionRegistry,
    session_id: String,
    prompt: String,
    tx: mpsc::Sender<RelayEvent>,
) {
    let outcome = stream_session(upstream.as_ref(), &registry, &session_id, &prompt, &tx).await;
    // The single release point for the registry entry, shared by every
    // terminal transition.
    registry.end(&session_id);
    debug!(session_id = %session_id, outcome = ?outcome, "relay session finished");
}

async fn stream_session(
    upstream: &dyn UpstreamSource,
    registry: &SessionRegistry,
    session_id: &str,
    prompt: &str,
    tx: &mpsc::Sender<RelayEvent>,
) -> RelayOutcome {
    let mut bytes = match upstream.open(prompt).await {
        Ok(stream) => stream,
        Err(err) => {
            let _ = tx.send(RelayEvent::error(err.to_string())).await;
            return RelayOutcome::Failed;
        }
    };

    let mut decoder = FrameDecoder::default();
    loop {
        let chunk = match bytes.next().await {
            Some(Ok(chunk)) => chunk,
            Some(Err(err)) => {
                let _ = tx.send(RelayEvent::error(err.to_string())).await;
                return RelayOutcome::Failed;
            }
            // Upstream end-of-stream; any End the translator produced for a
            // `[DONE]` or stop record has already been emitted. A leftover
            // unterminated record in the decoder is dropped.
            None => return RelayOutcome::Completed,
        };

        // Cancellation is polled after each read and before processing, so
        // a stopped session discards at most this one chunk.
        if !registry.is_alive(session_id) {
            let _ = tx.send(RelayEvent::Cancelled).await;
            return RelayOutcome::Cancelled;
        }
        if tx.is_closed() {
            // Client went away; nothing can be delivered, release silently.
            return RelayOutcome::Disconnected;
        }

        for payload in decoder.push(&chunk) {
            match classify(&payload) {
                Ok(Some(event)) => {
                    let terminal = event.is_terminal();
                    if tx.send(event).await.is_err() {
                        return RelayOutcome::Disconnected;
                    }
                    if terminal {
                        // Records still buffered behind a terminal record
                        // are intentionally not emitted.
                        return RelayOutcome::Completed;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    let _ = tx.send(RelayEvent::error(err.to_string())).await;
                    return RelayOutcome::Failed;
                }
            }
        }
    }
}
