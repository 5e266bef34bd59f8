//! User data model.
//!
//! The `User` aggregate carries account identity fields and the three
//! association collections (roles held, topics owned, topics joined).
//! Identity fields are validated newtypes that normalize to lowercase at
//! construction, so mixed case is never stored and absent input is
//! unrepresentable.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::role::{Role, UserRole};
use crate::domain::topic::{Topic, TopicMembership};

/// Validation errors returned by the user identity constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Username fell below the minimum length.
    UsernameTooShort {
        /// Minimum accepted length in characters.
        min: usize,
    },
    /// Username exceeded the maximum length.
    UsernameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
    /// Email did not parse as `local@domain.tld`.
    InvalidEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooShort { min } => {
                write!(f, "username must be at least {min} characters")
            }
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::InvalidEmail => write!(f, "primary email must be a valid email address"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Storage-assigned user identifier.
///
/// Unset on freshly constructed users; the persistence layer assigns it on
/// first insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw storage identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw integer value for storage-layer use.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimum allowed length for a username.
pub const USERNAME_MIN: usize = 2;
/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 30;

/// Sign-on name for the user.
///
/// ## Invariants
/// - Always lowercase; input is folded at construction.
/// - Between [`USERNAME_MIN`] and [`USERNAME_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate, lowercase, and construct a [`Username`].
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(username.into())
    }

    fn from_owned(username: String) -> Result<Self, UserValidationError> {
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }

        let length = username.chars().count();
        if length < USERNAME_MIN {
            return Err(UserValidationError::UsernameTooShort { min: USERNAME_MIN });
        }
        if length > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }

        Ok(Self(username.to_lowercase()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Pragmatic syntax check: non-empty local part, one `@`, dotted
        // domain, no whitespace. Deliverability is not this layer's concern.
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Primary email address for the user.
///
/// ## Invariants
/// - Always lowercase; input is folded at construction.
/// - Matches a pragmatic `local@domain.tld` syntax check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate, lowercase, and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(email.into())
    }

    fn from_owned(email: String) -> Result<Self, UserValidationError> {
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email.to_lowercase()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Application user account.
///
/// ## Invariants
/// - `username` and `primary_email` are lowercase and, once persisted,
///   globally unique (enforced by the storage layer's unique indexes).
/// - `roles` preserves insertion order and permits duplicates.
/// - `owned_topics` and `member_topics` are disjoint by calling-code
///   convention (ownership vs plain membership); nothing here enforces it.
///
/// The authorization capability list is derived from `roles` by
/// [`crate::domain::capabilities::role_capabilities`] and is never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: Option<UserId>,
    username: Username,
    primary_email: EmailAddress,
    roles: Vec<UserRole>,
    owned_topics: Vec<Topic>,
    member_topics: Vec<TopicMembership>,
}

impl User {
    /// Build a new unpersisted [`User`] from validated components.
    pub const fn new(username: Username, primary_email: EmailAddress) -> Self {
        Self {
            id: None,
            username,
            primary_email,
            roles: Vec::new(),
            owned_topics: Vec::new(),
            member_topics: Vec::new(),
        }
    }

    /// Fallible constructor from raw string inputs.
    ///
    /// Prefer [`User::new`] when components are already validated.
    pub fn try_from_strings(
        username: impl Into<String>,
        primary_email: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let username = Username::new(username)?;
        let primary_email = EmailAddress::new(primary_email)?;
        Ok(Self::new(username, primary_email))
    }

    /// Storage identifier, if the user has been persisted.
    pub const fn id(&self) -> Option<UserId> {
        self.id
    }

    /// Sign-on name, always lowercase.
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Primary email address, always lowercase.
    pub const fn primary_email(&self) -> &EmailAddress {
        &self.primary_email
    }

    /// Replace the username with an already-validated value.
    pub fn set_username(&mut self, username: Username) {
        self.username = username;
    }

    /// Replace the primary email with an already-validated value.
    pub fn set_primary_email(&mut self, primary_email: EmailAddress) {
        self.primary_email = primary_email;
    }

    /// Record the storage-assigned identifier and tag association records
    /// that were attached before the first save.
    pub fn assign_id(&mut self, id: UserId) {
        self.id = Some(id);
        for role in &mut self.roles {
            role.user_id.get_or_insert(id);
        }
        for membership in &mut self.member_topics {
            membership.user_id.get_or_insert(id);
        }
    }

    /// Append a role association for this user.
    ///
    /// No deduplication: adding the same role twice yields two records.
    pub fn add_role(&mut self, role: Role) {
        self.roles.push(UserRole {
            user_id: self.id,
            role,
        });
    }

    /// Role associations in insertion order.
    pub fn roles(&self) -> &[UserRole] {
        &self.roles
    }

    /// Replace the role associations (adapter hydration).
    pub fn set_roles(&mut self, roles: Vec<UserRole>) {
        self.roles = roles;
    }

    /// Topics this user owns (topic leader).
    pub fn owned_topics(&self) -> &[Topic] {
        &self.owned_topics
    }

    /// Replace the owned topics (adapter hydration).
    pub fn set_owned_topics(&mut self, owned_topics: Vec<Topic>) {
        self.owned_topics = owned_topics;
    }

    /// Topic memberships, exclusive of owned topics by convention.
    pub fn member_topics(&self) -> &[TopicMembership] {
        &self.member_topics
    }

    /// Replace the topic memberships (adapter hydration).
    pub fn set_member_topics(&mut self, member_topics: Vec<TopicMembership>) {
        self.member_topics = member_topics;
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User{{username='{}'}}", self.username)
    }
}

#[cfg(test)]
mod tests;
