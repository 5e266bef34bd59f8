//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via Diesel with async support through `diesel-async` and
//! `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types; the cascade-delete contract is the one piece of
//!   application-level logic they carry.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leak to the domain.
//! - **Strongly typed errors**: database failures map to
//!   `UserPersistenceError` variants, with unique violations resolved to
//!   the identity field that collided.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/app")).await?;
//! let repository = DieselUserRepository::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
