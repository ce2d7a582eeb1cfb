use serde::Deserialize;

use crate::errors::TranslateError;
use crate::event::RelayEvent;

/// Literal record payload marking successful upstream completion.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One parsed upstream chat-completion chunk.
///
/// Only the fields the translator inspects are modeled; ids, usage blocks,
/// and other metadata are ignored by serde.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
}

/// Maps one decoded record payload to at most one outbound event.
///
/// Classification is ordered and the first matching branch wins:
/// 1. the `[DONE]` sentinel ends the session;
/// 2. a non-empty reasoning delta becomes `Think`;
/// 3. a non-empty content delta becomes `Text`;
/// 4. a `stop` finish reason becomes `End` carrying the raw payload.
///
/// A chunk with no choices (for example a usage-only record) and a chunk
/// whose deltas are both empty with no stop reason yield nothing. The
/// Think-before-Text priority mirrors observed upstream behavior; chunks
/// carrying both deltas at once have not been seen in the wild.
pub fn classify(payload: &str) -> Result<Option<RelayEvent>, TranslateError> {
    if payload == DONE_SENTINEL {
        return Ok(Some(RelayEvent::end()));
    }

    let chunk: ChatChunk =
        serde_json::from_str(payload).map_err(|e| TranslateError::malformed(e.to_string()))?;
    let Some(choice) = chunk.choices.first() else {
        return Ok(None);
    };

    if let Some(reasoning) = non_empty(choice.delta.reasoning_content.as_deref()) {
        return Ok(Some(RelayEvent::Think {
            delta: reasoning.to_string(),
        }));
    }
    if let Some(content) = non_empty(choice.delta.content.as_deref()) {
        return Ok(Some(RelayEvent::Text {
            delta: content.to_string(),
        }));
    }
    if choice.finish_reason.as_deref() == Some("stop") {
        return Ok(Some(RelayEvent::End {
            trailing: Some(payload.to_string()),
        }));
    }
    Ok(None)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
