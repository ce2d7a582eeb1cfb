use std::sync::Arc;

use relay_stream::{Relay, SessionRegistry, UpstreamSource};

/// Shared state handed to every route handler.
///
/// The relay owns the cancellation registry, so start and stop requests
/// arriving on separate connections correlate through it.
#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
}

impl AppState {
    pub fn new(upstream: Arc<dyn UpstreamSource>) -> Self {
        Self {
            relay: Relay::new(upstream, SessionRegistry::new()),
        }
    }
}
