//! Topic contract types.
//!
//! The topic entity proper (survey content, lifecycle, its member list) is
//! owned by the topic-management slice. The user aggregate needs just enough
//! to express ownership and membership: a topic record and the user-topic
//! association.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;

/// Validation error for topic contract values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicValidationError {
    /// Topic title was missing or blank once trimmed.
    EmptyTitle,
}

impl fmt::Display for TopicValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "topic title must not be empty"),
        }
    }
}

impl std::error::Error for TopicValidationError {}

/// Storage-assigned topic identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(i64);

impl TopicId {
    /// Wrap a raw storage identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw integer value for storage-layer use.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-readable topic title, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TopicTitle(String);

impl TopicTitle {
    /// Validate, trim, and construct a [`TopicTitle`].
    pub fn new(title: impl Into<String>) -> Result<Self, TopicValidationError> {
        Self::from_owned(title.into())
    }

    fn from_owned(title: String) -> Result<Self, TopicValidationError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(TopicValidationError::EmptyTitle);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for TopicTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TopicTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<TopicTitle> for String {
    fn from(value: TopicTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for TopicTitle {
    type Error = TopicValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Topic as seen from the user aggregate.
///
/// Deleting the owning user deletes their owned topics (orphan removal is
/// explicit application logic in the repository's `delete`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    /// Storage identifier, unset before first persist.
    pub id: Option<TopicId>,
    /// Topic title.
    pub title: TopicTitle,
    /// Owner (topic leader), once the owner is persisted.
    pub owner_id: Option<UserId>,
}

impl Topic {
    /// Build a topic contract value.
    pub const fn new(id: Option<TopicId>, title: TopicTitle, owner_id: Option<UserId>) -> Self {
        Self {
            id,
            title,
            owner_id,
        }
    }
}

/// User-topic membership association record.
///
/// Membership is distinct from ownership; a user's memberships and owned
/// topics are disjoint by calling-code convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMembership {
    /// Member user, once persisted.
    pub user_id: Option<UserId>,
    /// The joined topic.
    pub topic: Topic,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("  \t ")]
    fn blank_titles_are_rejected(#[case] title: &str) {
        assert_eq!(
            TopicTitle::new(title).expect_err("blank titles must fail"),
            TopicValidationError::EmptyTitle
        );
    }

    #[rstest]
    fn titles_are_trimmed() {
        let title = TopicTitle::new("  Weekly standup  ").expect("valid title");
        assert_eq!(title.as_ref(), "Weekly standup");
    }
}
