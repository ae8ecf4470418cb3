//! One-shot session bootstrap at application start.
//!
//! SYSTEM CONTEXT
//! ==============
//! Reconciles the persisted credential pair with the server's "who am I"
//! answer. A cached snapshot is shown immediately as a provisional identity so
//! already-signed-in users never see the login page flash; without one, the
//! session stays `loading` until the server answers.
//!
//! TRADE-OFFS
//! ==========
//! Any failure of the "who am I" call, network errors included, invalidates
//! the session. There is no retry: failing closed means the user signs in
//! again rather than keeping access on an ambiguous answer.

#[cfg(test)]
#[path = "bootstrap_test.rs"]
mod bootstrap_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::net::api::ApiClient;
use crate::state::auth::{AuthSession, SessionUser};

/// Liveness flag of the component driving the bootstrap.
///
/// Released from the owner's cleanup; async work checks it before writing.
#[derive(Clone, Debug)]
pub struct Liveness(Arc<AtomicBool>);

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness {
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn release(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// No persisted token.
    Anonymous,
    /// The server confirmed the session.
    Authenticated,
    /// The token was rejected or the server was unreachable; storage cleared.
    Invalidated,
    /// A login or logout happened while the call was in flight; its answer
    /// was discarded.
    Superseded,
    /// The owner went away before the call resolved; nothing was written.
    Abandoned,
    /// This session already ran its bootstrap.
    AlreadyStarted,
}

/// Resolve the initial session from storage and the server.
pub async fn bootstrap(session: &AuthSession, client: &ApiClient, liveness: &Liveness) -> BootstrapOutcome {
    if !session.claim_bootstrap() {
        log::debug!("bootstrap already ran for this session");
        return BootstrapOutcome::AlreadyStarted;
    }

    let tokens = client.tokens();
    let persisted = tokens.load();
    if persisted.token.is_none() {
        if persisted.user.is_some() {
            tokens.forget_user();
        }
        session.set_user(None);
        session.finish_loading();
        log::info!("bootstrap: no stored credential");
        return BootstrapOutcome::Anonymous;
    }

    let credential = persisted.token.clone();

    // The interceptor reads the token store for every request, so from here
    // on any request from any component carries the stored credential.
    if let Some(cached) = persisted.user {
        log::debug!("bootstrap: restoring cached user {} provisionally", cached.id);
        session.set_user(Some(SessionUser::Provisional(cached)));
        session.finish_loading();
    }
    let epoch = session.epoch();

    let result = client.fetch_profile().await;

    if !liveness.is_alive() {
        log::debug!("bootstrap: owner released before profile resolved");
        return BootstrapOutcome::Abandoned;
    }
    if session.epoch() != epoch {
        session.finish_loading();
        // A 401 here has usually already been torn down by the invalidation
        // subscriber, which is what moved the epoch.
        if result.is_err() && !session.state().is_authenticated() {
            tokens.clear();
            return BootstrapOutcome::Invalidated;
        }
        log::warn!("bootstrap: session changed while validating, discarding answer");
        return BootstrapOutcome::Superseded;
    }
    // A login over the provisional user swaps the token without moving the
    // epoch; the answer is about the old credential.
    if tokens.token() != credential {
        session.finish_loading();
        log::warn!("bootstrap: credential replaced while validating, discarding answer");
        return BootstrapOutcome::Superseded;
    }

    let outcome = match result {
        Ok(user) => {
            log::info!("bootstrap: session confirmed for user {}", user.id);
            session.set_user_if_epoch(epoch, Some(SessionUser::Confirmed(user)));
            BootstrapOutcome::Authenticated
        }
        Err(err) => {
            log::warn!("bootstrap: session rejected: {err}");
            tokens.clear();
            session.set_user(None);
            BootstrapOutcome::Invalidated
        }
    };
    session.finish_loading();
    outcome
}
