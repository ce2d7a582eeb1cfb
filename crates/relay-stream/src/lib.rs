//! Streaming relay core for chat-completion SSE traffic.
//!
//! The crate turns one upstream streaming completion into one downstream
//! event stream per session: raw upstream bytes are decoded into discrete
//! `data:` records, each record is classified into a small outbound event
//! taxonomy, and a shared registry lets a concurrent request cancel an
//! in-flight session by id.
//!
//! # Relaying a completion
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use relay_stream::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), RelayError> {
//! let relay = Relay::new(Arc::new(HttpUpstream::from_env()?), SessionRegistry::new());
//!
//! let mut stream = relay.start("session-1", "Describe Huarong Trail briefly.");
//! while let Some(event) = stream.next_event().await {
//!     print!("{}", event.to_sse_frame());
//!     if event.is_terminal() {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Incremental frame decoder for the upstream byte stream.
pub mod decoder;
/// Public error types.
pub mod errors;
/// Outbound event taxonomy and SSE wire encoding.
pub mod event;
/// Common imports for typical usage.
pub mod prelude;
/// Shared cancellation registry.
pub mod registry;
/// Relay sessions and their event streams.
pub mod relay;
/// Record-to-event classification and the upstream chunk model.
pub mod translate;
/// Upstream source trait, HTTP implementation, and client config.
pub mod upstream;

pub use decoder::FrameDecoder;
pub use errors::{RelayError, TranslateError, UpstreamError};
pub use event::RelayEvent;
pub use registry::SessionRegistry;
pub use relay::{Relay, RelayStream};
pub use translate::{ChatChunk, ChunkChoice, ChunkDelta, DONE_SENTINEL, classify};
pub use upstream::{ByteStream, HttpUpstream, UpstreamConfig, UpstreamSource};
