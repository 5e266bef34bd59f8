//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Audit timestamps live here only; the
//! domain model does not carry them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{topics, user_roles, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub primary_email: String,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub created_at: DateTime<Utc>,
    #[expect(dead_code, reason = "schema field for future audit trail support")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub primary_email: &'a str,
}

/// Insertable struct for user-role association records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_roles)]
pub(crate) struct NewUserRoleRow {
    pub user_id: i64,
    pub role_id: i64,
}

/// Row struct for reading topics owned by a user.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = topics)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TopicRow {
    pub id: i64,
    pub title: String,
    pub owner_id: i64,
}
