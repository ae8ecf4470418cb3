use super::*;

#[test]
fn extract_message_prefers_message_then_error() {
    assert_eq!(extract_message(r#"{"message":"Invalid credentials"}"#).as_deref(), Some("Invalid credentials"));
    assert_eq!(extract_message(r#"{"error":"Token expired"}"#).as_deref(), Some("Token expired"));
    assert_eq!(
        extract_message(r#"{"message":"  ","error":"fallback"}"#).as_deref(),
        Some("fallback")
    );
}

#[test]
fn extract_message_handles_plain_text_and_html() {
    assert_eq!(extract_message("Too Many Attempts.").as_deref(), Some("Too Many Attempts."));
    assert_eq!(extract_message("<html><body>502</body></html>"), None);
    assert_eq!(extract_message("   "), None);
    assert_eq!(extract_message(r#"{"status":500}"#), None);
}

#[test]
fn validation_errors_parse_field_lists() {
    let errors = ValidationErrors::from_body(
        r#"{"message":"The given data was invalid.","errors":{"new_password":["Too short.","Needs a digit."],"current_password":"Wrong password."}}"#,
    );
    assert_eq!(errors.message.as_deref(), Some("The given data was invalid."));
    assert_eq!(errors.first("new_password"), Some("Too short."));
    assert_eq!(errors.errors["new_password"].len(), 2);
    assert_eq!(errors.first("current_password"), Some("Wrong password."));
    assert_eq!(errors.first("email"), None);
    assert_eq!(errors.body["errors"]["new_password"][1], "Needs a digit.");
}

#[test]
fn validation_errors_keep_unexpected_body() {
    let errors = ValidationErrors::from_body(r#"["odd"]"#);
    assert!(errors.errors.is_empty());
    assert_eq!(errors.body, serde_json::json!(["odd"]));
    let errors = ValidationErrors::from_body("not json");
    assert_eq!(errors.body, serde_json::Value::Null);
}

#[test]
fn field_error_only_for_validation() {
    let err = ApiError::Validation(ValidationErrors::from_body(r#"{"errors":{"phone":["Invalid phone."]}}"#));
    assert_eq!(err.field_error("phone"), Some("Invalid phone."));
    assert_eq!(ApiError::Unauthorized.field_error("phone"), None);
}

#[test]
fn display_messages_are_user_facing() {
    assert_eq!(
        ApiError::Status { status: 500, message: Some("boom".to_owned()) }.user_message(),
        "request failed (500): boom"
    );
    assert_eq!(ApiError::Status { status: 404, message: None }.user_message(), "request failed (404)");
    assert_eq!(
        ApiError::Forbidden { message: None }.user_message(),
        "you are not allowed to perform this action"
    );
    assert_eq!(
        ApiError::RateLimited { message: Some("Slow down".to_owned()) }.user_message(),
        "Slow down"
    );
    let validation = ApiError::Validation(ValidationErrors::from_body(r#"{"errors":{"email":["Taken."]}}"#));
    assert_eq!(validation.user_message(), "Taken.");
}

#[test]
fn only_unauthorized_is_session_expiry() {
    assert!(ApiError::Unauthorized.is_session_expiry());
    assert!(!ApiError::Forbidden { message: None }.is_session_expiry());
    assert!(!ApiError::RateLimited { message: None }.is_session_expiry());
    assert!(!ApiError::Network("offline".to_owned()).is_session_expiry());
}
