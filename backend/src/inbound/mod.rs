//! Inbound boundary: payload shaping for external representations.
//!
//! The HTTP controllers themselves live in a separate slice; this module
//! owns the versioned payload shapes they serialize, so the domain types
//! stay serialization-agnostic.

pub mod schemas;

pub use schemas::{TopicPayload, UserPayload, user_payload};
