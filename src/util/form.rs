//! Form error helpers shared by pages that submit to the API.

#[cfg(test)]
#[path = "form_test.rs"]
mod form_test;

use std::collections::BTreeMap;

use crate::net::error::ApiError;

/// Per-field messages of a `422` for the given form fields, keyed by field.
///
/// Fields the form does not render are left out; callers show
/// [`ApiError::user_message`] as the banner.
#[must_use]
pub fn field_messages(err: &ApiError, fields: &[&str]) -> BTreeMap<String, String> {
    fields
        .iter()
        .filter_map(|field| err.field_error(field).map(|m| ((*field).to_owned(), m.to_owned())))
        .collect()
}

/// Banner text for a failed submission. Session expiry gets no banner: the
/// app is already on its way to the login page.
#[must_use]
pub fn banner_message(err: &ApiError) -> Option<String> {
    match err {
        ApiError::Unauthorized | ApiError::SessionChanged => None,
        _ => Some(err.user_message()),
    }
}
