use serde::Serialize;

/// Outbound event delivered to the downstream client.
///
/// Every relay session emits zero or more non-terminal events followed by
/// exactly one terminal event (`End`, `Cancelled`, or `Error`). Nothing is
/// emitted after the terminal event; clients must treat the tag as
/// authoritative rather than the connection closing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayEvent {
    /// Image attachment by URL (produced by synthetic sources only).
    Image { url: String },
    /// Partial reasoning ("think") text.
    Think { delta: String },
    /// Partial final-answer text.
    Text { delta: String },
    /// Terminal success, optionally carrying the raw record that closed the
    /// upstream stream.
    End { trailing: Option<String> },
    /// Terminal, client-initiated abort.
    Cancelled,
    /// Terminal failure.
    Error { message: String },
}

impl RelayEvent {
    /// Creates an `End` event without a trailing payload.
    pub fn end() -> Self {
        RelayEvent::End { trailing: None }
    }

    /// Creates an `Error` event from any displayable failure.
    pub fn error(message: impl Into<String>) -> Self {
        RelayEvent::Error {
            message: message.into(),
        }
    }

    /// Returns true for `End`, `Cancelled`, and `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RelayEvent::End { .. } | RelayEvent::Cancelled | RelayEvent::Error { .. }
        )
    }

    /// Returns the integer wire tag for this event.
    pub fn tag(&self) -> u8 {
        match self {
            RelayEvent::Image { .. } => 1,
            RelayEvent::Think { .. } => 2,
            RelayEvent::Text { .. } => 3,
            RelayEvent::End { .. } => 4,
            RelayEvent::Cancelled => 5,
            RelayEvent::Error { .. } => 6,
        }
    }

    /// Encodes the event as its single-line wire JSON document.
    ///
    /// The document carries the integer tag under `t` and, for events with a
    /// payload, the string payload under `r`. `End` without a trailing
    /// record and `Cancelled` encode as just the tag field.
    pub fn wire_json(&self) -> String {
        let line = match self {
            RelayEvent::Image { url } => WireLine::tagged(self.tag(), Some(url.clone())),
            RelayEvent::Think { delta } | RelayEvent::Text { delta } => {
                WireLine::tagged(self.tag(), Some(delta.clone()))
            }
            RelayEvent::End { trailing } => WireLine::tagged(self.tag(), trailing.clone()),
            RelayEvent::Cancelled => WireLine::tagged(self.tag(), None),
            RelayEvent::Error { message } => WireLine::tagged(self.tag(), Some(message.clone())),
        };
        serde_json::to_string(&line).expect("wire line serialization is infallible")
    }

    /// Encodes the event as one complete SSE frame, ready to write.
    ///
    /// One event maps to one frame to one write; frames are never batched.
    pub fn to_sse_frame(&self) -> String {
        format!("data: {}\n\n", self.wire_json())
    }
}

/// Flat wire representation: `{"t":<tag>}` or `{"t":<tag>,"r":"<payload>"}`.
#[derive(Debug, Serialize)]
struct WireLine {
    t: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    r: Option<String>,
}

impl WireLine {
    fn tagged(t: u8, r: Option<String>) -> Self {
        Self { t, r }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_events_encode_tag_and_payload() {
        assert_eq!(
            RelayEvent::Think {
                delta: "x".into()
            }
            .wire_json(),
            r#"{"t":2,"r":"x"}"#
        );
        assert_eq!(
            RelayEvent::Text {
                delta: "y".into()
            }
            .wire_json(),
            r#"{"t":3,"r":"y"}"#
        );
        assert_eq!(
            RelayEvent::Image {
                url: "http://i".into()
            }
            .wire_json(),
            r#"{"t":1,"r":"http://i"}"#
        );
        assert_eq!(
            RelayEvent::error("boom").wire_json(),
            r#"{"t":6,"r":"boom"}"#
        );
    }

    #[test]
    fn bare_terminal_events_encode_only_the_tag() {
        assert_eq!(RelayEvent::end().wire_json(), r#"{"t":4}"#);
        assert_eq!(RelayEvent::Cancelled.wire_json(), r#"{"t":5}"#);
    }

    #[test]
    fn end_with_trailing_record_keeps_the_payload() {
        let event = RelayEvent::End {
            trailing: Some(r#"{"choices":[]}"#.into()),
        };
        assert_eq!(event.wire_json(), r#"{"t":4,"r":"{\"choices\":[]}"}"#);
    }

    #[test]
    fn sse_frame_is_bit_exact() {
        assert_eq!(
            RelayEvent::Think {
                delta: "x".into()
            }
            .to_sse_frame(),
            "data: {\"t\":2,\"r\":\"x\"}\n\n"
        );
        assert_eq!(RelayEvent::end().to_sse_frame(), "data: {\"t\":4}\n\n");
    }

    #[test]
    fn terminal_classification_covers_all_variants() {
        assert!(RelayEvent::end().is_terminal());
        assert!(RelayEvent::Cancelled.is_terminal());
        assert!(RelayEvent::error("e").is_terminal());
        assert!(
            !RelayEvent::Think {
                delta: "t".into()
            }
            .is_terminal()
        );
        assert!(
            !RelayEvent::Text {
                delta: "t".into()
            }
            .is_terminal()
        );
        assert!(
            !RelayEvent::Image {
                url: "u".into()
            }
            .is_terminal()
        );
    }
}
