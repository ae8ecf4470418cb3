//! User-initiated session operations.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages call these instead of the API client directly so that token store
//! writes and session writes always happen together. The three token store
//! writers are [`login`], [`logout`] and [`teardown`].
//!
//! DESIGN
//! ======
//! Every mutation that awaits the network captures the session epoch first
//! and writes back through [`AuthSession::set_user_if_epoch`]. A logout or
//! invalidation that lands while the request is in flight therefore wins, and
//! the late response is reported as [`ApiError::SessionChanged`].

#[cfg(test)]
#[path = "actions_test.rs"]
mod actions_test;

use crate::net::api::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::{ProfileUpdate, UserRecord};
use crate::session::token_store::TokenStore;
use crate::state::auth::{AuthSession, SessionUser};

/// What the login page needs to decide where to go next.
#[derive(Clone, Debug, PartialEq)]
pub struct LoginOutcome {
    pub user: UserRecord,
    pub must_change_password: bool,
}

/// Clear persisted credentials and the in-memory identity.
///
/// This is the invalidation path: it never fails and is safe to repeat.
pub fn teardown(session: &AuthSession, tokens: &TokenStore) {
    tokens.clear();
    session.set_user(None);
    session.finish_loading();
}

/// Sign in and start a confirmed session.
///
/// Credential errors leave storage and session untouched.
///
/// # Errors
///
/// Returns the mapped API error, or [`ApiError::Storage`] if the credential
/// pair could not be persisted.
pub async fn login(
    session: &AuthSession,
    client: &ApiClient,
    email: &str,
    password: &str,
) -> Result<LoginOutcome, ApiError> {
    let resp = client.login(email, password).await?;
    let mut user = resp.user;
    user.must_change_password = user.must_change_password || resp.must_change_password;
    client.tokens().save(&resp.token, &user)?;
    session.set_user(Some(SessionUser::Confirmed(user.clone())));
    session.finish_loading();
    log::info!("signed in as user {} ({})", user.id, user.role_kind().label());
    Ok(LoginOutcome { must_change_password: user.must_change_password, user })
}

/// Sign out. Local teardown is unconditional and happens first; the server
/// call is best effort, using the token captured before teardown.
pub async fn logout(session: &AuthSession, client: &ApiClient) {
    let token = client.tokens().token();
    teardown(session, client.tokens());
    log::info!("signed out");
    let Some(token) = token else {
        return;
    };
    if let Err(err) = client.logout(&token).await {
        log::debug!("server logout failed (ignored): {err}");
    }
}

/// Send a partial profile update and adopt the server's record.
///
/// # Errors
///
/// [`ApiError::NotAuthenticated`] without a user, the mapped API error on
/// failure (local state unchanged), or [`ApiError::SessionChanged`] when the
/// session ended while the request was in flight.
pub async fn update_profile(
    session: &AuthSession,
    client: &ApiClient,
    update: &ProfileUpdate,
) -> Result<UserRecord, ApiError> {
    let Some(current) = session.current_user() else {
        return Err(ApiError::NotAuthenticated);
    };
    let epoch = session.epoch();
    let mut user = client.update_profile(update).await?;
    user.must_change_password = current.must_change_password;
    if !session.set_user_if_epoch(epoch, Some(SessionUser::Confirmed(user.clone()))) {
        log::warn!("discarding profile update that finished after the session ended");
        return Err(ApiError::SessionChanged);
    }
    Ok(user)
}

/// Re-fetch the profile on demand.
///
/// Separate from the bootstrap path: while bootstrap is still resolving the
/// answer is returned but not written.
///
/// # Errors
///
/// As [`update_profile`].
pub async fn refresh_profile(session: &AuthSession, client: &ApiClient) -> Result<UserRecord, ApiError> {
    let Some(current) = session.current_user() else {
        return Err(ApiError::NotAuthenticated);
    };
    let epoch = session.epoch();
    let mut user = client.fetch_profile().await?;
    if session.is_loading() {
        return Ok(user);
    }
    user.must_change_password = user.must_change_password || current.must_change_password;
    if !session.set_user_if_epoch(epoch, Some(SessionUser::Confirmed(user.clone()))) {
        return Err(ApiError::SessionChanged);
    }
    Ok(user)
}

/// Change the password and drop the temporary-password flag.
///
/// # Errors
///
/// As [`update_profile`]; a `422` carries field messages for
/// `current_password` / `new_password`.
pub async fn change_password(
    session: &AuthSession,
    client: &ApiClient,
    current_password: &str,
    new_password: &str,
) -> Result<String, ApiError> {
    if session.current_user().is_none() {
        return Err(ApiError::NotAuthenticated);
    }
    let epoch = session.epoch();
    let message = client.change_password(current_password, new_password).await?;
    let Some(state_user) = session.state().user else {
        return Err(ApiError::SessionChanged);
    };
    let confirmed = state_user.is_confirmed();
    let mut user = state_user.into_record();
    user.must_change_password = false;
    let next = if confirmed { SessionUser::Confirmed(user) } else { SessionUser::Provisional(user) };
    if !session.set_user_if_epoch(epoch, Some(next)) {
        return Err(ApiError::SessionChanged);
    }
    Ok(message)
}
