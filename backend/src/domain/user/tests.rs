//! Tests for the domain user model.

use super::*;
use crate::domain::role::{Role, RoleId, RoleName};
use rstest::{fixture, rstest};

#[fixture]
fn valid_user() -> User {
    User::try_from_strings("Ada", "Ada@Example.COM").expect("valid user inputs")
}

fn role(id: i64, name: &str) -> Role {
    Role::new(RoleId::new(id), RoleName::new(name).expect("valid role name"))
}

#[rstest]
#[case("Ada", "ada")]
#[case("ADA", "ada")]
#[case("MiXeD", "mixed")]
fn usernames_are_lowercased(#[case] input: &str, #[case] expected: &str) {
    let username = Username::new(input).expect("valid username");
    assert_eq!(username.as_ref(), expected);
}

#[rstest]
fn accepts_minimum_length_username() {
    let name = "a".repeat(USERNAME_MIN);
    let username = Username::new(name.clone()).expect("boundary length accepted");
    assert_eq!(username.as_ref(), name);
}

#[rstest]
fn accepts_maximum_length_username() {
    let name = "a".repeat(USERNAME_MAX);
    assert!(Username::new(name).is_ok());
}

#[rstest]
fn rejects_single_character_username() {
    assert_eq!(
        Username::new("a").expect_err("below minimum"),
        UserValidationError::UsernameTooShort { min: USERNAME_MIN }
    );
}

#[rstest]
fn rejects_oversized_username() {
    let name = "a".repeat(USERNAME_MAX + 1);
    assert_eq!(
        Username::new(name).expect_err("above maximum"),
        UserValidationError::UsernameTooLong { max: USERNAME_MAX }
    );
}

#[rstest]
#[case("")]
#[case("   ")]
fn rejects_blank_username(#[case] input: &str) {
    assert_eq!(
        Username::new(input).expect_err("blank input"),
        UserValidationError::EmptyUsername
    );
}

#[rstest]
#[case("John@Lambda.IO", "john@lambda.io")]
#[case("UPPER@CASE.ORG", "upper@case.org")]
fn emails_are_lowercased(#[case] input: &str, #[case] expected: &str) {
    let email = EmailAddress::new(input).expect("valid email");
    assert_eq!(email.as_ref(), expected);
}

#[rstest]
#[case("")]
#[case("plainaddress")]
#[case("missing@domain")]
#[case("two@@ats.example")]
#[case("spaces in@local.example")]
fn rejects_malformed_emails(#[case] input: &str) {
    assert_eq!(
        EmailAddress::new(input).expect_err("malformed email"),
        UserValidationError::InvalidEmail
    );
}

#[rstest]
fn construction_normalizes_both_identity_fields(valid_user: User) {
    assert_eq!(valid_user.username().as_ref(), "ada");
    assert_eq!(valid_user.primary_email().as_ref(), "ada@example.com");
    assert!(valid_user.id().is_none());
    assert!(valid_user.roles().is_empty());
    assert!(valid_user.owned_topics().is_empty());
    assert!(valid_user.member_topics().is_empty());
}

#[rstest]
fn setters_replace_with_normalized_values(mut valid_user: User) {
    valid_user.set_username(Username::new("Grace").expect("valid username"));
    valid_user.set_primary_email(EmailAddress::new("Grace@Navy.MIL").expect("valid email"));

    assert_eq!(valid_user.username().as_ref(), "grace");
    assert_eq!(valid_user.primary_email().as_ref(), "grace@navy.mil");
}

#[rstest]
fn add_role_permits_duplicates_in_order(mut valid_user: User) {
    valid_user.add_role(role(1, "admin"));
    valid_user.add_role(role(1, "admin"));

    assert_eq!(valid_user.roles().len(), 2);
    assert_eq!(valid_user.roles()[0].role.name.as_ref(), "admin");
    assert_eq!(valid_user.roles()[1].role.name.as_ref(), "admin");
}

#[rstest]
fn assign_id_tags_preattached_associations(mut valid_user: User) {
    valid_user.add_role(role(2, "user"));
    assert_eq!(valid_user.roles()[0].user_id, None);

    valid_user.assign_id(UserId::new(41));

    assert_eq!(valid_user.id(), Some(UserId::new(41)));
    assert_eq!(valid_user.roles()[0].user_id, Some(UserId::new(41)));
}

#[rstest]
fn roles_added_after_persist_carry_the_id(mut valid_user: User) {
    valid_user.assign_id(UserId::new(9));
    valid_user.add_role(role(3, "moderator"));

    assert_eq!(valid_user.roles()[0].user_id, Some(UserId::new(9)));
}

#[rstest]
fn display_shows_the_username(valid_user: User) {
    assert_eq!(valid_user.to_string(), "User{username='ada'}");
}
