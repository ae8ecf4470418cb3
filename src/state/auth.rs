//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards and user-aware components to coordinate login
//! redirects and identity-dependent rendering. The app root bridges
//! [`AuthSession`] into an `RwSignal<AuthState>` through a listener.
//!
//! DESIGN
//! ======
//! All writes go through [`AuthSession::set_user`] (or its epoch-guarded
//! variant) so every change reaches subscribers. The epoch advances whenever
//! an identity appears or disappears; an async mutation that captured an older
//! epoch can no longer write, which is how logout beats stale responses.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::net::types::UserRecord;

/// The current identity and how much it can be trusted.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionUser {
    /// Restored from the persisted snapshot, not yet confirmed by the server.
    Provisional(UserRecord),
    /// Returned by the server during this page load.
    Confirmed(UserRecord),
}

impl SessionUser {
    #[must_use]
    pub fn record(&self) -> &UserRecord {
        match self {
            SessionUser::Provisional(user) | SessionUser::Confirmed(user) => user,
        }
    }

    #[must_use]
    pub fn into_record(self) -> UserRecord {
        match self {
            SessionUser::Provisional(user) | SessionUser::Confirmed(user) => user,
        }
    }

    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SessionUser::Confirmed(_))
    }
}

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<SessionUser>,
    /// True only while the initial bootstrap has not decided yet.
    pub loading: bool,
}

impl AuthState {
    #[must_use]
    pub fn current_user(&self) -> Option<&UserRecord> {
        self.user.as_ref().map(SessionUser::record)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Handle returned by [`AuthSession::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&AuthState)>;

struct SessionInner {
    state: AuthState,
    epoch: u64,
    bootstrap_claimed: bool,
}

/// Observable session state. Clones share state and subscribers.
#[derive(Clone)]
pub struct AuthSession {
    inner: Rc<RefCell<SessionInner>>,
    listeners: Rc<RefCell<Vec<(ListenerId, Listener)>>>,
    next_listener: Rc<Cell<u64>>,
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthSession {
    /// A session at application start: no user, bootstrap pending.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SessionInner {
                state: AuthState { user: None, loading: true },
                epoch: 0,
                bootstrap_claimed: false,
            })),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener: Rc::new(Cell::new(0)),
        }
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.inner.borrow().state.clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<UserRecord> {
        self.inner.borrow().state.current_user().cloned()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.borrow().state.loading
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.inner.borrow().epoch
    }

    /// Replace the current identity. `None` is the logout primitive; it does
    /// not touch storage or navigation.
    pub fn set_user(&self, user: Option<SessionUser>) {
        self.write(None, user);
    }

    /// Replace the identity only if no login/logout happened since `epoch`
    /// was read. Returns whether the write was applied.
    pub fn set_user_if_epoch(&self, epoch: u64, user: Option<SessionUser>) -> bool {
        self.write(Some(epoch), user)
    }

    fn write(&self, expected_epoch: Option<u64>, user: Option<SessionUser>) -> bool {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            if expected_epoch.is_some_and(|epoch| epoch != inner.epoch) {
                return false;
            }
            if user.is_none() || inner.state.user.is_none() {
                inner.epoch += 1;
            }
            if inner.state.user == user {
                None
            } else {
                inner.state.user = user;
                Some(inner.state.clone())
            }
        };
        if let Some(state) = changed {
            self.notify(&state);
        }
        true
    }

    /// End the bootstrap window. Only the first call has an effect.
    pub fn finish_loading(&self) -> bool {
        let state = {
            let mut inner = self.inner.borrow_mut();
            if !inner.state.loading {
                return false;
            }
            inner.state.loading = false;
            inner.state.clone()
        };
        self.notify(&state);
        true
    }

    /// Reserve the single bootstrap run of this session.
    pub(crate) fn claim_bootstrap(&self) -> bool {
        let mut inner = self.inner.borrow_mut();
        !std::mem::replace(&mut inner.bootstrap_claimed, true)
    }

    /// Call `listener` with the new state after every change.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&AuthState) + 'static,
    {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(listener, _)| *listener != id);
    }

    /// Drop every listener (app unmount).
    pub fn teardown(&self) {
        self.listeners.borrow_mut().clear();
    }

    fn notify(&self, state: &AuthState) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(state);
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("AuthSession")
            .field("state", &inner.state)
            .field("epoch", &inner.epoch)
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}
