use std::{error::Error, fmt};

use docchat_types::models::DocResultEnvelope;
use docchat_types::schema::{EVENT_DATA_PREFIX, JSONRPC_MARKER};

/// Error type for event-stream parse failures.
#[derive(Debug)]
pub enum EventStreamError {
    /// No `data:` line carrying a JSON-RPC payload was found.
    MissingEventLine,
    /// The payload after the `data:` prefix is not a valid JSON-RPC response.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for EventStreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEventLine => write!(f, "no JSON-RPC data line in event stream"),
            Self::InvalidPayload(err) => write!(f, "invalid JSON-RPC payload: {err}"),
        }
    }
}

impl Error for EventStreamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingEventLine => None,
            Self::InvalidPayload(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for EventStreamError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err)
    }
}

/// Parser for the single-event stream returned by the documentation service.
///
/// The response is framed like server-sent events, but only the first
/// `data:` line carrying a JSON-RPC payload is used. Every other line,
/// including `event:` and `id:` fields, is ignored.
pub struct EventStreamParser;

impl EventStreamParser {
    /// Extracts and decodes the first JSON-RPC event payload.
    ///
    /// # Errors
    /// Returns `EventStreamError::MissingEventLine` when no candidate line
    /// exists, and `EventStreamError::InvalidPayload` when the first candidate
    /// does not decode.
    pub fn parse(body: &str) -> Result<DocResultEnvelope, EventStreamError> {
        let payload = Self::find_payload(body).ok_or(EventStreamError::MissingEventLine)?;
        Ok(serde_json::from_str(payload)?)
    }

    /// Returns the trimmed payload of the first JSON-RPC `data:` line.
    #[must_use]
    pub fn find_payload(body: &str) -> Option<&str> {
        body.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| line.contains(JSONRPC_MARKER))
            .find_map(|line| line.strip_prefix(EVENT_DATA_PREFIX))
            .map(str::trim)
    }
}
