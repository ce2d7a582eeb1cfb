/// Errors raised while opening or reading the upstream stream, before they
/// are converted into a terminal outbound event by the relay loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    /// Upstream responded with a non-success status.
    #[error("upstream request failed with status {status}: {body}")]
    Unavailable { status: u16, body: String },
    /// Upstream response carried no readable body.
    #[error("upstream response has no readable body")]
    Unreadable,
    /// Network or stream I/O failed.
    #[error("upstream transport error: {message}")]
    Transport { message: String },
}

impl UpstreamError {
    /// Creates a transport-level error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates an unavailable error from a response status and body.
    pub fn unavailable(status: u16, body: impl Into<String>) -> Self {
        Self::Unavailable {
            status,
            body: body.into(),
        }
    }
}

/// Error raised by the event translator for a record that should have been
/// a chat chunk but failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    /// The record payload was not valid chat chunk JSON.
    #[error("malformed upstream record: {message}")]
    Malformed { message: String },
}

impl TranslateError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Top-level error type for relay construction and configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// Invalid upstream/client configuration.
    #[error("config error: {0}")]
    Config(String),
}
