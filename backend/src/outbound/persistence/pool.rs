//! bb8-backed connection pooling for the Diesel adapters.
//!
//! Checkout never blocks the runtime; `diesel-async` drives the PostgreSQL
//! connections natively. This is also the slice's configuration surface:
//! callers supply a database URL, a connection cap, and a checkout timeout.
//! Anything finer-grained stays at bb8's defaults.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// Failures raised by the connection pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The pool itself could not be constructed.
    #[error("could not build database pool: {0}")]
    Build(String),
    /// No connection became available within the checkout timeout.
    #[error("could not check out database connection: {0}")]
    Checkout(String),
}

/// Pool settings for the user persistence slice.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_connections: u32,
    checkout_timeout: Duration,
}

impl PoolConfig {
    /// Settings for the given database URL.
    ///
    /// Starts from the slice defaults: 8 connections, 10 second checkout
    /// timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 8,
            checkout_timeout: Duration::from_secs(10),
        }
    }

    /// Cap the number of concurrent connections.
    #[must_use]
    pub const fn max_connections(mut self, limit: u32) -> Self {
        self.max_connections = limit;
        self
    }

    /// Bound how long a checkout may wait for a free connection.
    #[must_use]
    pub const fn checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }
}

/// Shared async pool of PostgreSQL connections.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build a pool from the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Build`] when the pool cannot be constructed,
    /// e.g. for a malformed database URL.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);

        let inner = Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(config.checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::Build(err.to_string()))?;

        Ok(Self { inner })
    }

    /// Check out a connection.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Checkout`] when no connection becomes available
    /// within the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::Checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn settings_start_from_slice_defaults() {
        let config = PoolConfig::new("postgres://localhost/users");

        assert_eq!(config.database_url, "postgres://localhost/users");
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.checkout_timeout, Duration::from_secs(10));
    }

    #[rstest]
    fn settings_are_overridable() {
        let config = PoolConfig::new("postgres://localhost/users")
            .max_connections(2)
            .checkout_timeout(Duration::from_millis(250));

        assert_eq!(config.max_connections, 2);
        assert_eq!(config.checkout_timeout, Duration::from_millis(250));
    }

    #[rstest]
    fn errors_name_the_failing_stage() {
        assert_eq!(
            PoolError::Build("bad url".to_owned()).to_string(),
            "could not build database pool: bad url"
        );
        assert_eq!(
            PoolError::Checkout("timed out".to_owned()).to_string(),
            "could not check out database connection: timed out"
        );
    }
}
