//! Capability-token derivation for the authorization layer.
//!
//! The security middleware authorizes actions against `ROLE_<NAME>` tokens.
//! Tokens are derived purely from a user's role associations, recomputed on
//! every call, and never persisted; this module is the sole interface
//! between the user model and the access-control subsystem.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::role::UserRole;

/// Authorization capability token in `ROLE_<NAME>` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityToken(String);

impl CapabilityToken {
    /// Derive the token for a single role name.
    pub fn from_role_name(name: &str) -> Self {
        Self(format!("ROLE_{}", name.to_uppercase()))
    }
}

impl AsRef<str> for CapabilityToken {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CapabilityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<CapabilityToken> for String {
    fn from(value: CapabilityToken) -> Self {
        value.0
    }
}

/// Derive the capability list for a set of role associations.
///
/// Order follows the input; duplicate associations yield duplicate tokens.
pub fn role_capabilities(roles: &[UserRole]) -> Vec<CapabilityToken> {
    roles
        .iter()
        .map(|user_role| CapabilityToken::from_role_name(user_role.role.name.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::role::{Role, RoleId, RoleName, UserRole};
    use rstest::rstest;

    fn grant(name: &str) -> UserRole {
        UserRole {
            user_id: None,
            role: Role::new(
                RoleId::new(1),
                RoleName::new(name).expect("valid role name"),
            ),
        }
    }

    #[rstest]
    fn empty_roles_derive_no_capabilities() {
        assert!(role_capabilities(&[]).is_empty());
    }

    #[rstest]
    #[case("admin", "ROLE_ADMIN")]
    #[case("Admin", "ROLE_ADMIN")]
    #[case("user", "ROLE_USER")]
    fn tokens_are_prefixed_and_uppercased(#[case] name: &str, #[case] expected: &str) {
        let tokens = role_capabilities(&[grant(name)]);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].as_ref(), expected);
    }

    #[rstest]
    fn duplicate_grants_yield_duplicate_tokens_in_order() {
        let roles = vec![grant("admin"), grant("admin")];
        let tokens = role_capabilities(&roles);
        let rendered: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        assert_eq!(rendered, ["ROLE_ADMIN", "ROLE_ADMIN"]);
    }

    #[rstest]
    fn order_follows_input() {
        let roles = vec![grant("user"), grant("admin")];
        let tokens = role_capabilities(&roles);
        let rendered: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
        assert_eq!(rendered, ["ROLE_USER", "ROLE_ADMIN"]);
    }
}
