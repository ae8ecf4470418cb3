//! Top bar for signed-in pages: identity, profile link and logout.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::app::use_services;
use crate::config::{HOME_ROUTE, PROFILE_ROUTE};
use crate::state::auth::AuthState;

#[component]
pub fn Header() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let services = use_services();
    let navigate = use_navigate();
    let busy = RwSignal::new(false);

    let identity = move || {
        auth.get()
            .current_user()
            .map(|user| (user.display_name(), user.role_kind().label()))
            .unwrap_or_default()
    };

    let on_logout = move |_: leptos::ev::MouseEvent| {
        if busy.get() {
            return;
        }
        busy.set(true);
        let navigate = navigate.clone();
        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            let Some(services) = services.try_get_value() else {
                return;
            };
            crate::session::actions::logout(&services.session, &services.client).await;
            navigate(
                crate::config::LOGIN_ROUTE,
                leptos_router::NavigateOptions { replace: true, ..Default::default() },
            );
        });
        #[cfg(not(feature = "csr"))]
        {
            let _ = (services, navigate);
        }
    };

    view! {
        <header class="app-header">
            <a class="app-header__brand" href=HOME_ROUTE>"PFE Portal"</a>
            <div class="app-header__user">
                <span class="app-header__name">{move || identity().0}</span>
                <span class="app-header__role">{move || identity().1}</span>
                <a class="app-header__link" href=PROFILE_ROUTE>"Profile"</a>
                <button class="app-header__logout" on:click=on_logout disabled=move || busy.get()>
                    "Sign out"
                </button>
            </div>
        </header>
    }
}
