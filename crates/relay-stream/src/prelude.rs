//! Common imports for typical relay usage.
pub use crate::{
    HttpUpstream, Relay, RelayError, RelayEvent, RelayStream, SessionRegistry, UpstreamConfig,
    UpstreamSource,
};
