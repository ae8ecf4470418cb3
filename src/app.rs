//! Root application component with routing and context providers.
//!
//! SYSTEM CONTEXT
//! ==============
//! The root owns the session services for the lifetime of the page: it builds
//! the token store, API client and [`AuthSession`], bridges the session into
//! an `RwSignal<AuthState>` for reactive consumers, subscribes to
//! invalidation events, and starts the one-shot bootstrap.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::hooks::use_navigate;
use leptos_router::{
    NavigateOptions, StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::guards::{ProtectedRoute, PublicRoute};
use crate::config::{ClientConfig, LOGIN_ROUTE};
use crate::net::api::ApiClient;
use crate::net::transport::GlooTransport;
use crate::pages::{
    change_password::ChangePasswordPage, dashboard::DashboardPage, login::LoginPage, profile::ProfilePage,
};
use crate::session::actions::teardown;
use crate::session::bootstrap::Liveness;
use crate::session::token_store::TokenStore;
use crate::state::auth::AuthSession;
use crate::util::storage::BrowserStorage;

/// Session services shared by pages.
#[derive(Clone, Debug)]
pub struct Services {
    pub session: AuthSession,
    pub client: ApiClient,
}

/// Context handle for [`Services`]; they are `!Send`, so they live in local
/// storage behind a `Copy` handle.
pub type ServicesHandle = StoredValue<Services, LocalStorage>;

/// Fetch the session services from context.
pub fn use_services() -> ServicesHandle {
    expect_context::<ServicesHandle>()
}

/// Root application component.
///
/// Provides the shared auth state and sets up client-side routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let config = ClientConfig::from_build_env();
    let tokens = TokenStore::new(BrowserStorage);
    let client = ApiClient::new(config.api_base_url, Rc::new(GlooTransport), tokens);
    let session = AuthSession::new();

    let auth = RwSignal::new(session.state());
    session.subscribe(move |state| {
        let _ = auth.try_set(state.clone());
    });

    let services: ServicesHandle = StoredValue::new_local(Services { session, client });
    provide_context(auth);
    provide_context(services);
    on_cleanup(move || {
        let _ = services.try_with_value(|s| s.session.teardown());
    });

    view! {
        <Title text="PFE Portal"/>

        <Router>
            <SessionSupervisor/>
            <main class="app-main">
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route
                        path=StaticSegment("login")
                        view=|| view! { <PublicRoute><LoginPage/></PublicRoute> }
                    />
                    <Route
                        path=StaticSegment("")
                        view=|| view! { <ProtectedRoute><DashboardPage/></ProtectedRoute> }
                    />
                    <Route
                        path=StaticSegment("profile")
                        view=|| view! { <ProtectedRoute><ProfilePage/></ProtectedRoute> }
                    />
                    <Route
                        path=StaticSegment("change-password")
                        view=|| view! { <ProtectedRoute><ChangePasswordPage/></ProtectedRoute> }
                    />
                </Routes>
            </main>
        </Router>
    }
}

/// Tear the session down and call `redirect` on every invalidation while
/// `liveness` holds. The subscription is dropped when the current reactive
/// owner is cleaned up.
fn watch_invalidation(handle: ServicesHandle, liveness: &Liveness, redirect: impl Fn() + 'static) {
    let services = handle.get_value();
    let session = services.session.clone();
    let tokens = services.client.tokens().clone();
    let alive = liveness.clone();
    let subscription = services.client.events().subscribe(move |event| {
        if !alive.is_alive() {
            return;
        }
        log::info!("tearing down session after {:?} on {}", event.reason, event.path);
        teardown(&session, &tokens);
        redirect();
    });
    on_cleanup(move || {
        let _ = handle.try_with_value(|s| s.client.events().unsubscribe(subscription));
    });
}

/// Wires invalidation events to teardown + login redirect and runs the
/// bootstrap once. Lives inside the router so it can navigate.
#[component]
fn SessionSupervisor() -> impl IntoView {
    let handle = use_services();
    let navigate = use_navigate();
    let liveness = Liveness::new();

    watch_invalidation(handle, &liveness, move || {
        navigate(LOGIN_ROUTE, NavigateOptions { replace: true, ..NavigateOptions::default() });
    });

    #[cfg(feature = "csr")]
    {
        let services = handle.get_value();
        let alive = liveness.clone();
        leptos::task::spawn_local(async move {
            let outcome = crate::session::bootstrap::bootstrap(&services.session, &services.client, &alive).await;
            log::debug!("bootstrap finished: {outcome:?}");
        });
    }

    on_cleanup(move || liveness.release());
}
