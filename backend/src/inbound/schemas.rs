//! Versioned API payload shapes for the user aggregate (v1).
//!
//! Shaping is an explicit function at the boundary rather than serde
//! attributes on the domain types. The v1 contract:
//!
//! - includes `id`, `username`, `primaryEmail`;
//! - renders topic memberships under the name `topics`;
//! - excludes role associations, owned topics, and any derived capability
//!   data, so association plumbing never leaks and Role/Topic
//!   back-references cannot expand cyclically.

use serde::{Deserialize, Serialize};

use crate::domain::{TopicId, TopicMembership, User, UserId};

/// Topic entry inside a user payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicPayload {
    /// Topic identifier, absent for unpersisted topics.
    pub id: Option<TopicId>,
    /// Topic title.
    pub title: String,
}

/// External representation of a user (payload version 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    /// Storage identifier, `null` for unpersisted users.
    pub id: Option<UserId>,
    /// Lowercase sign-on name.
    pub username: String,
    /// Lowercase primary email address.
    pub primary_email: String,
    /// Topic memberships (ownership is not rendered here).
    pub topics: Vec<TopicPayload>,
}

fn membership_payload(membership: &TopicMembership) -> TopicPayload {
    TopicPayload {
        id: membership.topic.id,
        title: membership.topic.title.as_ref().to_owned(),
    }
}

/// Shape a user into its v1 external representation.
pub fn user_payload(user: &User) -> UserPayload {
    UserPayload {
        id: user.id(),
        username: user.username().as_ref().to_owned(),
        primary_email: user.primary_email().as_ref().to_owned(),
        topics: user.member_topics().iter().map(membership_payload).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, RoleId, RoleName, Topic, TopicTitle};
    use rstest::rstest;
    use serde_json::json;

    fn user_with_associations() -> User {
        let mut user = User::try_from_strings("Ada", "ada@example.com").expect("valid user");
        user.assign_id(UserId::new(1));

        user.add_role(Role::new(
            RoleId::new(1),
            RoleName::new("admin").expect("valid role name"),
        ));

        let owned = Topic::new(
            Some(TopicId::new(10)),
            TopicTitle::new("Retro").expect("valid title"),
            Some(UserId::new(1)),
        );
        user.set_owned_topics(vec![owned]);

        let joined = Topic::new(
            Some(TopicId::new(20)),
            TopicTitle::new("Standup").expect("valid title"),
            Some(UserId::new(2)),
        );
        user.set_member_topics(vec![TopicMembership {
            user_id: Some(UserId::new(1)),
            topic: joined,
        }]);

        user
    }

    #[rstest]
    fn renders_memberships_as_topics_and_hides_roles_and_owned() {
        let value =
            serde_json::to_value(user_payload(&user_with_associations())).expect("serializable");

        assert_eq!(
            value,
            json!({
                "id": 1,
                "username": "ada",
                "primaryEmail": "ada@example.com",
                "topics": [{ "id": 20, "title": "Standup" }]
            })
        );
        assert!(value.get("roles").is_none());
        assert!(value.get("ownedTopics").is_none());
        assert!(value.get("authority").is_none());
    }

    #[rstest]
    fn unpersisted_user_renders_null_id() {
        let user = User::try_from_strings("Ada", "ada@example.com").expect("valid user");
        let value = serde_json::to_value(user_payload(&user)).expect("serializable");
        assert_eq!(value.get("id"), Some(&serde_json::Value::Null));
    }
}
