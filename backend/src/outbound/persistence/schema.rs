//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.
//! Unique indexes on `users.username` and `users.primary_email` are the
//! authority for identity uniqueness (the application only normalizes case).

diesel::table! {
    /// User accounts.
    ///
    /// `username` and `primary_email` are stored lowercase and carry unique
    /// indexes (`users_username_key`, `users_primary_email_key`).
    users (id) {
        /// Primary key, assigned by the storage engine.
        id -> Int8,
        /// Lowercase sign-on name, unique.
        username -> Varchar,
        /// Lowercase primary email, unique.
        primary_email -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp (auto-updated by trigger).
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Role catalogue, owned by the role-management slice.
    roles (id) {
        /// Primary key, assigned by the storage engine.
        id -> Int8,
        /// Role name, unique.
        name -> Varchar,
    }
}

diesel::table! {
    /// User-role association records.
    user_roles (user_id, role_id) {
        /// Granted user.
        user_id -> Int8,
        /// Granted role.
        role_id -> Int8,
    }
}

diesel::table! {
    /// Topics, each owned by a single user (the topic leader).
    topics (id) {
        /// Primary key, assigned by the storage engine.
        id -> Int8,
        /// Topic title.
        title -> Varchar,
        /// Owning user.
        owner_id -> Int8,
    }
}

diesel::table! {
    /// User-topic membership association records (distinct from ownership).
    topic_users (user_id, topic_id) {
        /// Member user.
        user_id -> Int8,
        /// Joined topic.
        topic_id -> Int8,
    }
}

diesel::joinable!(user_roles -> users (user_id));
diesel::joinable!(user_roles -> roles (role_id));
diesel::joinable!(topics -> users (owner_id));
diesel::joinable!(topic_users -> users (user_id));
diesel::joinable!(topic_users -> topics (topic_id));

diesel::allow_tables_to_appear_in_same_query!(users, roles, user_roles, topics, topic_users);
