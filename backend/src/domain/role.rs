//! Role contract types.
//!
//! The full role entity (description, audit fields, its own user list) is
//! owned by the role-management slice; the user aggregate only needs the
//! identifier, the name the capability derivation reads, and the user-role
//! association record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;

/// Validation error for role contract values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleValidationError {
    /// Role name was missing or blank once trimmed.
    EmptyName,
}

impl fmt::Display for RoleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "role name must not be empty"),
        }
    }
}

impl std::error::Error for RoleValidationError {}

/// Storage-assigned role identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(i64);

impl RoleId {
    /// Wrap a raw storage identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw integer value for storage-layer use.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role name as stored; the capability derivation upper-cases on read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    /// Validate and construct a [`RoleName`].
    pub fn new(name: impl Into<String>) -> Result<Self, RoleValidationError> {
        Self::from_owned(name.into())
    }

    fn from_owned(name: String) -> Result<Self, RoleValidationError> {
        if name.trim().is_empty() {
            return Err(RoleValidationError::EmptyName);
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for RoleName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

impl TryFrom<String> for RoleName {
    type Error = RoleValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Role as seen from the user aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// Storage identifier of the role.
    pub id: RoleId,
    /// Role name, e.g. `admin` or `user`.
    pub name: RoleName,
}

impl Role {
    /// Build a role contract value.
    pub const fn new(id: RoleId, name: RoleName) -> Self {
        Self { id, name }
    }
}

/// User-role association record.
///
/// One record per grant; duplicates are permitted and ordering follows
/// insertion. `user_id` stays unset until the owning user is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRole {
    /// Owning user, once persisted.
    pub user_id: Option<UserId>,
    /// The granted role.
    pub role: Role,
}
