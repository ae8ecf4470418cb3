//! Route guard components.
//!
//! Both guards render a neutral placeholder while the bootstrap resolves,
//! nothing while a redirect is pending, and navigate from an effect, so an
//! invalidation while a guarded page is shown re-runs the decision and
//! redirects.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::state::auth::AuthState;
use crate::util::auth::{GuardDecision, protected_route_decision, public_route_decision};

/// Navigate whenever `decide` asks for a redirect.
fn install_redirect(auth: RwSignal<AuthState>, decide: fn(&AuthState) -> GuardDecision) -> Memo<GuardDecision> {
    let navigate = use_navigate();
    let decision = Memo::new(move |_| decide(&auth.get()));
    Effect::new(move || {
        if let GuardDecision::Redirect { to, replace } = decision.get() {
            navigate(to, NavigateOptions { replace, ..NavigateOptions::default() });
        }
    });
    decision
}

#[component]
fn RoutePending() -> impl IntoView {
    view! { <div class="route-pending" aria-busy="true">"Loading..."</div> }
}

/// Placeholder while the bootstrap resolves; nothing while a redirect is
/// pending.
#[component]
fn GuardFallback(decision: Memo<GuardDecision>) -> impl IntoView {
    view! {
        <Show when=move || decision.get().shows_placeholder()>
            <RoutePending/>
        </Show>
    }
}

/// Renders `children` only for a signed-in user; anonymous visitors are sent
/// to `/login` once the bootstrap has decided.
#[component]
pub fn ProtectedRoute(children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let decision = install_redirect(auth, protected_route_decision);

    view! {
        <Show when=move || decision.get() == GuardDecision::Render fallback=move || view! { <GuardFallback decision/> }>
            {children()}
        </Show>
    }
}

/// Renders `children` only for anonymous visitors; signed-in users are sent
/// to the landing route.
#[component]
pub fn PublicRoute(children: ChildrenFn) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let decision = install_redirect(auth, public_route_decision);

    view! {
        <Show when=move || decision.get() == GuardDecision::Render fallback=move || view! { <GuardFallback decision/> }>
            {children()}
        </Show>
    }
}
