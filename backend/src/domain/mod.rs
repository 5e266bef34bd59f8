//! Domain primitives and aggregates.
//!
//! Purpose: define the strongly typed user model shared by the persistence
//! adapters and the API boundary. Keep types framework-agnostic and document
//! invariants in each type's Rustdoc.
//!
//! Public surface:
//! - `User`, `Username`, `EmailAddress`, `UserId` — account identity.
//! - `Role`, `UserRole`, `Topic`, `TopicMembership` — association records.
//! - `role_capabilities` — derived authorization tokens.
//! - `DomainError` / `ErrorCode` — transport-agnostic error payload.
//! - `ports` — repository port and fixture implementation.

pub mod capabilities;
pub mod error;
pub mod ports;
pub mod role;
pub mod topic;
pub mod user;

pub use self::capabilities::{CapabilityToken, role_capabilities};
pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::role::{Role, RoleId, RoleName, RoleValidationError, UserRole};
pub use self::topic::{Topic, TopicId, TopicMembership, TopicTitle, TopicValidationError};
pub use self::user::{
    EmailAddress, USERNAME_MAX, USERNAME_MIN, User, UserId, UserValidationError, Username,
};
