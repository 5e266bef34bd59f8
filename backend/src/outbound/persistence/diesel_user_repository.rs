//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! The adapter translates between Diesel rows and the domain aggregate and
//! expresses the cascade contract as explicit statements inside a single
//! transaction. Uniqueness of username and email rests on the `users`
//! unique indexes; violations map to `DuplicateIdentity`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, Role, RoleId, RoleName, Topic, TopicId, TopicMembership, TopicTitle, User,
    UserId, UserRole, Username,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error, unique_violation_field};
use super::models::{NewUserRoleRow, NewUserRow, TopicRow, UserRow};
use super::pool::DbPool;
use super::schema::{roles, topic_users, topics, user_roles, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map a failed insert, resolving unique violations against the attempted
/// identity values.
fn map_create_error(error: diesel::result::Error, user: &User) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &error {
        let field = unique_violation_field(info.as_ref());
        let value = match field {
            "primary_email" => user.primary_email().as_ref(),
            _ => user.username().as_ref(),
        };
        return UserPersistenceError::duplicate_identity(field, value);
    }
    map_diesel_error(error)
}

/// Convert a stored user row into the domain aggregate (associations not
/// yet hydrated).
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let id = row.id;
    let username = Username::new(row.username).map_err(|err| {
        warn!(user_id = id, %err, "stored username failed domain validation");
        UserPersistenceError::query("stored username failed validation")
    })?;
    let primary_email = EmailAddress::new(row.primary_email).map_err(|err| {
        warn!(user_id = id, %err, "stored email failed domain validation");
        UserPersistenceError::query("stored email failed validation")
    })?;

    let mut user = User::new(username, primary_email);
    user.assign_id(UserId::new(id));
    Ok(user)
}

fn topic_row_to_topic(row: TopicRow) -> Result<Topic, UserPersistenceError> {
    let id = row.id;
    let title = TopicTitle::new(row.title).map_err(|err| {
        warn!(topic_id = id, %err, "stored topic title failed domain validation");
        UserPersistenceError::query("stored topic title failed validation")
    })?;
    Ok(Topic::new(
        Some(TopicId::new(id)),
        title,
        Some(UserId::new(row.owner_id)),
    ))
}

impl DieselUserRepository {
    /// Load the three association collections for a user that already has
    /// its identity fields populated.
    async fn hydrate(
        &self,
        conn: &mut diesel_async::AsyncPgConnection,
        user: &mut User,
    ) -> Result<(), UserPersistenceError> {
        let Some(user_id) = user.id() else {
            return Err(UserPersistenceError::query("cannot hydrate unsaved user"));
        };
        let raw_id = user_id.get();

        // The join table has no ordinal column; role id order keeps the
        // collection deterministic across loads.
        let role_rows: Vec<(i64, String)> = user_roles::table
            .inner_join(roles::table)
            .filter(user_roles::user_id.eq(raw_id))
            .order(user_roles::role_id.asc())
            .select((roles::id, roles::name))
            .load(conn)
            .await
            .map_err(map_diesel_error)?;

        let mut grants = Vec::with_capacity(role_rows.len());
        for (role_id, name) in role_rows {
            let name = RoleName::new(name).map_err(|err| {
                warn!(role_id, %err, "stored role name failed domain validation");
                UserPersistenceError::query("stored role name failed validation")
            })?;
            grants.push(UserRole {
                user_id: Some(user_id),
                role: Role::new(RoleId::new(role_id), name),
            });
        }
        user.set_roles(grants);

        let owned_rows: Vec<TopicRow> = topics::table
            .filter(topics::owner_id.eq(raw_id))
            .order(topics::id.asc())
            .select(TopicRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let owned = owned_rows
            .into_iter()
            .map(topic_row_to_topic)
            .collect::<Result<Vec<_>, _>>()?;
        user.set_owned_topics(owned);

        let joined_rows: Vec<TopicRow> = topic_users::table
            .inner_join(topics::table)
            .filter(topic_users::user_id.eq(raw_id))
            .order(topics::id.asc())
            .select(TopicRow::as_select())
            .load(conn)
            .await
            .map_err(map_diesel_error)?;
        let memberships = joined_rows
            .into_iter()
            .map(|row| {
                topic_row_to_topic(row).map(|topic| TopicMembership {
                    user_id: Some(user_id),
                    topic,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        user.set_member_topics(memberships);

        Ok(())
    }

    async fn find_by_row(
        &self,
        conn: &mut diesel_async::AsyncPgConnection,
        row: Option<UserRow>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let Some(row) = row else {
            return Ok(None);
        };
        let mut user = row_to_user(row)?;
        self.hydrate(conn, &mut user).await?;
        Ok(Some(user))
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User) -> Result<User, UserPersistenceError> {
        if user.id().is_some() {
            return Err(UserPersistenceError::query(
                "create requires an unpersisted user",
            ));
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            username: user.username().as_ref(),
            primary_email: user.primary_email().as_ref(),
        };
        let role_ids: Vec<i64> = user
            .roles()
            .iter()
            .map(|grant| grant.role.id.get())
            .collect();

        let assigned_id: i64 = conn
            .transaction(|conn| {
                async move {
                    let id: i64 = diesel::insert_into(users::table)
                        .values(&new_row)
                        .returning(users::id)
                        .get_result(conn)
                        .await?;

                    if !role_ids.is_empty() {
                        // The join table's composite key collapses duplicate
                        // grants; the in-memory collection is the only place
                        // duplicates survive.
                        let links: Vec<NewUserRoleRow> = role_ids
                            .iter()
                            .map(|role_id| NewUserRoleRow {
                                user_id: id,
                                role_id: *role_id,
                            })
                            .collect();
                        diesel::insert_into(user_roles::table)
                            .values(&links)
                            .on_conflict_do_nothing()
                            .execute(conn)
                            .await?;
                    }

                    Ok::<_, diesel::result::Error>(id)
                }
                .scope_boxed()
            })
            .await
            .map_err(|error| map_create_error(error, user))?;

        let mut stored = user.clone();
        stored.assign_id(UserId::new(assigned_id));
        Ok(stored)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        self.find_by_row(&mut conn, row).await
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        self.find_by_row(&mut conn, row).await
    }

    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw_id = id.get();

        // Cascade order: role links, own memberships, memberships of owned
        // topics, the owned topics, then the user row. Deleting a missing
        // user touches nothing, so the existence check is the final row
        // count rather than an upfront query.
        let removed_users = conn
            .transaction(|conn| {
                async move {
                    diesel::delete(user_roles::table.filter(user_roles::user_id.eq(raw_id)))
                        .execute(conn)
                        .await?;

                    diesel::delete(topic_users::table.filter(topic_users::user_id.eq(raw_id)))
                        .execute(conn)
                        .await?;

                    let owned_ids: Vec<i64> = topics::table
                        .filter(topics::owner_id.eq(raw_id))
                        .select(topics::id)
                        .load(conn)
                        .await?;

                    if !owned_ids.is_empty() {
                        diesel::delete(
                            topic_users::table.filter(topic_users::topic_id.eq_any(&owned_ids)),
                        )
                        .execute(conn)
                        .await?;

                        diesel::delete(topics::table.filter(topics::owner_id.eq(raw_id)))
                            .execute(conn)
                            .await?;
                    }

                    let removed = diesel::delete(users::table.find(raw_id))
                        .execute(conn)
                        .await?;

                    Ok::<_, diesel::result::Error>(removed)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        if removed_users == 0 {
            return Err(UserPersistenceError::not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn create_error_mapping_falls_through_for_non_unique_failures() {
        let user = User::try_from_strings("Ada", "Ada@Example.com").expect("valid user");

        let err = map_create_error(diesel::result::Error::NotFound, &user);
        assert_eq!(err, UserPersistenceError::query("record not found"));
    }

    #[rstest]
    fn rows_rehydrate_with_assigned_id() {
        let row = UserRow {
            id: 12,
            username: "ada".to_owned(),
            primary_email: "ada@example.com".to_owned(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let user = row_to_user(row).expect("well-formed row");
        assert_eq!(user.id(), Some(UserId::new(12)));
        assert_eq!(user.username().as_ref(), "ada");
    }

    #[rstest]
    fn malformed_rows_surface_as_query_errors() {
        let row = UserRow {
            id: 13,
            username: "a".to_owned(),
            primary_email: "ada@example.com".to_owned(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let err = row_to_user(row).expect_err("one-character username");
        assert_eq!(
            err,
            UserPersistenceError::query("stored username failed validation")
        );
    }

    #[rstest]
    fn topic_rows_become_owned_topics() {
        let row = TopicRow {
            id: 4,
            title: "Retro".to_owned(),
            owner_id: 12,
        };

        let topic = topic_row_to_topic(row).expect("well-formed row");
        assert_eq!(topic.id, Some(TopicId::new(4)));
        assert_eq!(topic.owner_id, Some(UserId::new(12)));
        assert_eq!(topic.title.as_ref(), "Retro");
    }
}
