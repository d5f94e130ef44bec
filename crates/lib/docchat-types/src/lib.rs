//! Wire and domain models for docchat.
//!
//! This crate defines the chat messages exchanged with clients and the
//! JSON-RPC envelopes exchanged with the documentation service.

pub mod models;
pub mod schema;

pub use models::*;
