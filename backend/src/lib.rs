//! User persistence slice for the topics backend.
//!
//! Provides the `User` domain model (identity fields, role grants, topic
//! ownership and membership), the capability-token derivation consumed by
//! the authorization middleware, a typed repository port with explicit
//! cascade-delete semantics, its Diesel/PostgreSQL adapter, and the
//! versioned API payload shape.

pub mod domain;
pub mod inbound;
pub mod outbound;
