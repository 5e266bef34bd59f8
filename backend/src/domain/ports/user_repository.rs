//! Port abstraction for user persistence adapters and their errors.
//!
//! The port exposes typed CRUD for the user aggregate. Uniqueness of
//! username and email is owned by the storage layer's unique indexes
//! (race-free under concurrent creation); adapters translate violations
//! into [`UserPersistenceError::DuplicateIdentity`].

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{User, UserId, Username};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserPersistenceError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },

    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },

    /// A unique index rejected the write (post-normalization collision).
    #[error("{field} '{value}' is already taken")]
    DuplicateIdentity {
        /// Which identity field collided (`username` or `primary_email`).
        field: String,
        /// The normalized value that collided.
        value: String,
    },

    /// No user exists with the given identifier.
    #[error("no user with id {id}")]
    NotFound {
        /// The missing identifier.
        id: UserId,
    },
}

impl UserPersistenceError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a duplicate-identity error for the given field and value.
    pub fn duplicate_identity(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::DuplicateIdentity {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a not-found error for the given identifier.
    pub const fn not_found(id: UserId) -> Self {
        Self::NotFound { id }
    }
}

/// Typed CRUD port for user persistence.
///
/// `delete` carries the cascade contract: deleting a user removes their
/// role associations, their memberships, memberships of topics they own,
/// and the owned topics themselves.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user and return it with its assigned identifier.
    ///
    /// The input must not carry an identifier yet. Role associations
    /// already attached to the aggregate are persisted alongside it; topic
    /// collections are attached by separate topic-management operations.
    ///
    /// The returned aggregate keeps the input's role grants verbatim,
    /// duplicates included. Adapters whose storage collapses duplicate
    /// grants (the Diesel join table keys on user and role) will report
    /// fewer grants on a subsequent fetch.
    async fn create(&self, user: &User) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier, hydrating the association collections.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by (lowercase) username, hydrating the association
    /// collections.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Delete a user and everything they own (see trait docs for order).
    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError>;
}

/// Deterministic in-memory [`UserRepository`] for tests and local wiring.
///
/// Assigns sequential identifiers, enforces username/email uniqueness after
/// normalization, and mirrors the cascade-delete semantics of the Diesel
/// adapter.
///
/// One extension beyond the port contract: `create` also stores topic
/// collections pre-attached to the aggregate. There are no separate
/// topic-management operations in memory, so this is the only way to seed
/// the state the cascade-delete semantics act on.
#[derive(Debug, Default)]
pub struct FixtureUserRepository {
    state: Mutex<FixtureState>,
}

#[derive(Debug, Default)]
struct FixtureState {
    users: Vec<User>,
    next_id: i64,
}

impl FixtureUserRepository {
    /// Create an empty fixture repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, FixtureState>, UserPersistenceError> {
        self.state
            .lock()
            .map_err(|_| UserPersistenceError::connection("fixture state poisoned"))
    }
}

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn create(&self, user: &User) -> Result<User, UserPersistenceError> {
        if user.id().is_some() {
            return Err(UserPersistenceError::query(
                "create requires an unpersisted user",
            ));
        }

        let mut state = self.lock()?;

        if state
            .users
            .iter()
            .any(|existing| existing.username() == user.username())
        {
            return Err(UserPersistenceError::duplicate_identity(
                "username",
                user.username().as_ref(),
            ));
        }
        if state
            .users
            .iter()
            .any(|existing| existing.primary_email() == user.primary_email())
        {
            return Err(UserPersistenceError::duplicate_identity(
                "primary_email",
                user.primary_email().as_ref(),
            ));
        }

        state.next_id += 1;
        let id = UserId::new(state.next_id);

        let mut stored = user.clone();
        stored.assign_id(id);
        state.users.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock()?;
        Ok(state
            .users
            .iter()
            .find(|user| user.id() == Some(id))
            .cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock()?;
        Ok(state
            .users
            .iter()
            .find(|user| user.username() == username)
            .cloned())
    }

    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError> {
        let mut state = self.lock()?;

        let Some(position) = state.users.iter().position(|user| user.id() == Some(id)) else {
            return Err(UserPersistenceError::not_found(id));
        };
        let removed = state.users.remove(position);

        // Orphan removal: other users lose memberships of topics the
        // deleted user owned.
        let owned_topic_ids: HashSet<_> = removed
            .owned_topics()
            .iter()
            .filter_map(|topic| topic.id)
            .collect();
        for user in &mut state.users {
            let retained = user
                .member_topics()
                .iter()
                .filter(|membership| {
                    membership
                        .topic
                        .id
                        .is_none_or(|topic_id| !owned_topic_ids.contains(&topic_id))
                })
                .cloned()
                .collect();
            user.set_member_topics(retained);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn mockable_port_reports_injected_errors() {
        let mut repository = MockUserRepository::new();
        repository
            .expect_find_by_id()
            .returning(|id| Err(UserPersistenceError::not_found(id)));

        let err = repository
            .find_by_id(UserId::new(7))
            .await
            .expect_err("stubbed miss");
        assert_eq!(err, UserPersistenceError::not_found(UserId::new(7)));
        assert_eq!(err.to_string(), "no user with id 7");
    }

    #[rstest]
    fn duplicate_identity_message_names_the_field() {
        let err = UserPersistenceError::duplicate_identity("username", "ada");
        assert_eq!(err.to_string(), "username 'ada' is already taken");
    }
}
