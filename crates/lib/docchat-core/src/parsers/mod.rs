//! Parsers for upstream response formats.
//!
//! The documentation service answers with an event-stream framed body even
//! for a single JSON-RPC response; this module isolates that framing.

pub mod event_stream;

pub use event_stream::{EventStreamError, EventStreamParser};
