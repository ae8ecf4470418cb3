use super::*;
use crate::net::error::{ApiError, ValidationErrors};
use crate::test_support::student;
use crate::util::form::field_messages;

fn named(first: &str, last: &str, phone: Option<&str>) -> UserRecord {
    let mut user = student(1);
    user.first_name = Some(first.to_owned());
    user.last_name = Some(last.to_owned());
    user.phone = phone.map(str::to_owned);
    user
}

#[test]
fn profile_changes_is_empty_when_nothing_differs() {
    let user = named("Amina", "Benali", None);
    assert!(profile_changes(&user, "Amina", " Benali ", "").is_empty());
}

#[test]
fn profile_changes_keeps_only_edited_fields() {
    let user = named("Amina", "Benali", Some("0550"));
    let update = profile_changes(&user, "Amina", "Benali-Kaci", "0661");
    assert_eq!(
        update,
        ProfileUpdate { first_name: None, last_name: Some("Benali-Kaci".to_owned()), phone: Some("0661".to_owned()) }
    );
}

#[test]
fn profile_changes_sends_cleared_phone_as_empty() {
    let user = named("Amina", "Benali", Some("0550"));
    assert_eq!(profile_changes(&user, "Amina", "Benali", "  ").phone, Some(String::new()));
}

#[test]
fn validation_errors_map_onto_profile_fields() {
    let err = ApiError::Validation(ValidationErrors::from_body(
        r#"{"message":"Invalid.","errors":{"phone":["The phone format is invalid."],"email":["taken"]}}"#,
    ));
    let messages = field_messages(&err, &PROFILE_FIELDS);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages.get("phone").map(String::as_str), Some("The phone format is invalid."));
}
