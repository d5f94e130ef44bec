//! Core clients and orchestration for docchat.
//!
//! This crate owns the documentation-service client, the completion providers,
//! and the [`ChatService`](services::ChatService) that chains them into a
//! single chat turn.

pub mod docs;
pub mod parsers;
pub mod secret;
pub mod services;
pub mod synthesis;

pub use docs::{DocsClient, DocsConfig, DocsError};
pub use secret::ApiKey;
pub use services::{ChatError, ChatOutcome, ChatService};
pub use synthesis::{SynthesisClient, SynthesisError, SynthesisProvider};
