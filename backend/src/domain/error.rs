//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses or any other protocol-specific envelope. Persistence and
//! validation failures convert into [`DomainError`] via `From`, so every
//! operation's error path ends in the same payload shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ports::UserPersistenceError;
use crate::domain::user::UserValidationError;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The requested resource does not exist.
    NotFound,
    /// The request conflicts with existing state (e.g. duplicate identity).
    Conflict,
    /// A required backing service is temporarily unavailable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use backend::domain::{DomainError, ErrorCode};
///
/// let err = DomainError::new(ErrorCode::NotFound, "missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "DomainErrorDto", into = "DomainErrorDto")]
pub struct DomainError {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainErrorValidationError {
    /// The message was empty once trimmed.
    EmptyMessage,
}

impl std::fmt::Display for DomainErrorValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error message must not be empty"),
        }
    }
}

impl std::error::Error for DomainErrorValidationError {}

impl DomainError {
    /// Create a new error, panicking if validation fails.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, DomainErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(DomainErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    /// Stable machine-readable error code.
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details for adapters.
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{DomainError, ErrorCode};
    /// use serde_json::json;
    ///
    /// let err = DomainError::new(ErrorCode::InvalidRequest, "bad")
    ///     .with_details(json!({ "field": "username" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<UserPersistenceError> for DomainError {
    fn from(error: UserPersistenceError) -> Self {
        match &error {
            UserPersistenceError::Connection { .. } => {
                Self::service_unavailable(error.to_string())
            }
            UserPersistenceError::Query { .. } => Self::internal(error.to_string()),
            UserPersistenceError::DuplicateIdentity { field, .. } => {
                let details = serde_json::json!({ "field": field });
                Self::conflict(error.to_string()).with_details(details)
            }
            UserPersistenceError::NotFound { id } => {
                let details = serde_json::json!({ "id": id });
                Self::not_found(error.to_string()).with_details(details)
            }
        }
    }
}

impl From<UserValidationError> for DomainError {
    fn from(error: UserValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DomainError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DomainErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<DomainError> for DomainErrorDto {
    fn from(value: DomainError) -> Self {
        Self {
            code: value.code,
            message: value.message,
            details: value.details,
        }
    }
}

impl TryFrom<DomainErrorDto> for DomainError {
    type Error = DomainErrorValidationError;

    fn try_from(value: DomainErrorDto) -> Result<Self, Self::Error> {
        let DomainErrorDto {
            code,
            message,
            details,
        } = value;

        let mut error = DomainError::try_new(code, message)?;
        error.details = details;
        Ok(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn rejects_blank_messages() {
        assert_eq!(
            DomainError::try_new(ErrorCode::InternalError, "  "),
            Err(DomainErrorValidationError::EmptyMessage)
        );
    }

    #[rstest]
    fn serializes_with_camel_case_and_snake_case_code() {
        let err = DomainError::conflict("username already taken")
            .with_details(json!({ "field": "username" }));
        let value = serde_json::to_value(&err).expect("serializable error");
        assert_eq!(
            value,
            json!({
                "code": "conflict",
                "message": "username already taken",
                "details": { "field": "username" }
            })
        );
    }

    #[rstest]
    fn omits_absent_details() {
        let value =
            serde_json::to_value(DomainError::not_found("no such user")).expect("serializable");
        assert!(value.get("details").is_none());
    }

    #[rstest]
    fn duplicate_identity_becomes_a_conflict() {
        let err = DomainError::from(UserPersistenceError::duplicate_identity("username", "ada"));

        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.message(), "username 'ada' is already taken");
        assert_eq!(err.details(), Some(&json!({ "field": "username" })));
    }

    #[rstest]
    fn connection_failures_become_service_unavailable() {
        let err = DomainError::from(UserPersistenceError::connection("pool timed out"));
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    fn repository_misses_become_not_found() {
        let err = DomainError::from(UserPersistenceError::not_found(
            crate::domain::UserId::new(7),
        ));

        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "no user with id 7");
        assert_eq!(err.details(), Some(&json!({ "id": 7 })));
    }

    #[rstest]
    fn validation_failures_become_invalid_request() {
        let err = DomainError::from(UserValidationError::InvalidEmail);

        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "primary email must be a valid email address");
    }
}
