//! Shared mapping from pool and Diesel failures to user persistence errors.

use diesel::result::DatabaseErrorInformation;
use tracing::debug;

use crate::domain::ports::UserPersistenceError;

use super::pool::PoolError;

/// Map pool errors to user persistence connection errors.
pub(super) fn map_pool_error(error: PoolError) -> UserPersistenceError {
    let (PoolError::Build(message) | PoolError::Checkout(message)) = error;
    UserPersistenceError::connection(message)
}

/// Map Diesel errors to user persistence errors.
///
/// Unique-index violations are not translated here; writers that can name
/// the colliding value resolve the field with [`unique_violation_field`]
/// and build a `DuplicateIdentity` themselves.
pub(super) fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => UserPersistenceError::query("database error"),
        _ => UserPersistenceError::query("database error"),
    }
}

/// Resolve which identity field a unique violation hit.
///
/// PostgreSQL reports the violated index in the constraint name; the
/// `users` unique indexes are `users_username_key` and
/// `users_primary_email_key`.
pub(super) fn unique_violation_field(
    info: &(dyn DatabaseErrorInformation + Send + Sync),
) -> &'static str {
    match info.constraint_name() {
        Some(name) if name.contains("email") => "primary_email",
        Some(name) if name.contains("username") => "username",
        _ => "identity",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PoolError::Checkout("timed out".to_owned()), "timed out")]
    #[case(PoolError::Build("bad url".to_owned()), "bad url")]
    fn pool_errors_map_to_connection(#[case] error: PoolError, #[case] message: &str) {
        assert_eq!(
            map_pool_error(error),
            UserPersistenceError::connection(message)
        );
    }

    #[rstest]
    fn not_found_maps_to_query() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert_eq!(err, UserPersistenceError::query("record not found"));
    }
}
