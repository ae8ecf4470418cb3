//! Shared auth routing decisions.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route components should apply identical redirect behavior. The decisions
//! here are pure functions of [`AuthState`]; `components::guards` renders them
//! and performs the navigation.
//!
//! Neither guard decides anything while the initial bootstrap is still
//! loading, so a valid session restored on reload is never bounced to the
//! login page for a frame.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::config::{CHANGE_PASSWORD_ROUTE, HOME_ROUTE, LOGIN_ROUTE};
use crate::net::types::UserRecord;
use crate::state::auth::AuthState;

/// What a guard should do for the current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Bootstrap still resolving: render a neutral placeholder.
    Pending,
    /// Render the guarded children.
    Render,
    /// Navigate away.
    Redirect { to: &'static str, replace: bool },
}

impl GuardDecision {
    /// Only an undecided guard shows the loading placeholder; a guard about
    /// to redirect renders nothing.
    #[must_use]
    pub fn shows_placeholder(self) -> bool {
        self == GuardDecision::Pending
    }
}

/// Per-route view of the session state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoutePhase {
    Resolving,
    Authenticated,
    Anonymous,
}

#[must_use]
pub fn route_phase(state: &AuthState) -> RoutePhase {
    if state.loading {
        RoutePhase::Resolving
    } else if state.user.is_some() {
        RoutePhase::Authenticated
    } else {
        RoutePhase::Anonymous
    }
}

/// Whether a protected page must send the visitor to `/login`.
#[must_use]
pub fn should_redirect_unauth(state: &AuthState) -> bool {
    route_phase(state) == RoutePhase::Anonymous
}

/// Decision for pages that need a signed-in user.
#[must_use]
pub fn protected_route_decision(state: &AuthState) -> GuardDecision {
    match route_phase(state) {
        RoutePhase::Resolving => GuardDecision::Pending,
        RoutePhase::Authenticated => GuardDecision::Render,
        RoutePhase::Anonymous => GuardDecision::Redirect { to: LOGIN_ROUTE, replace: true },
    }
}

/// Where a signed-in user lands: the password change while the account
/// still has a temporary password, the dashboard otherwise.
#[must_use]
pub fn landing_route(user: &UserRecord) -> &'static str {
    if user.must_change_password {
        CHANGE_PASSWORD_ROUTE
    } else {
        HOME_ROUTE
    }
}

/// Decision for pages only anonymous visitors should see (login).
///
/// Signed-in users are sent to their [`landing_route`], replacing the history
/// entry so back-navigation does not return here. This is the only redirect
/// after a successful login; the login page itself does not navigate.
#[must_use]
pub fn public_route_decision(state: &AuthState) -> GuardDecision {
    if route_phase(state) == RoutePhase::Resolving {
        return GuardDecision::Pending;
    }
    match state.current_user() {
        Some(user) => GuardDecision::Redirect { to: landing_route(user), replace: true },
        None => GuardDecision::Render,
    }
}
