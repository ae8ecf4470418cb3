//! Profile page: view the account and edit names and phone.
//!
//! ERROR HANDLING
//! ==============
//! A `422` puts the server's first message for each field under its input and
//! keeps the typed values. Session expiry shows nothing here; the invalidation
//! path is already moving the app to `/login`.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use std::collections::BTreeMap;

use leptos::prelude::*;

use crate::components::header::Header;
use crate::net::types::{ProfileUpdate, UserRecord};
use crate::state::auth::AuthState;

pub(crate) const PROFILE_FIELDS: [&str; 3] = ["first_name", "last_name", "phone"];

fn changed(current: Option<&str>, typed: &str) -> Option<String> {
    let typed = typed.trim();
    (current.unwrap_or("").trim() != typed).then(|| typed.to_owned())
}

/// Build a partial update holding only the fields that differ from `current`.
#[must_use]
pub fn profile_changes(current: &UserRecord, first_name: &str, last_name: &str, phone: &str) -> ProfileUpdate {
    ProfileUpdate {
        first_name: changed(current.first_name.as_deref(), first_name),
        last_name: changed(current.last_name.as_deref(), last_name),
        phone: changed(current.phone.as_deref(), phone),
    }
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let initial = auth.get_untracked().current_user().cloned();

    let first_name = RwSignal::new(initial.as_ref().and_then(|u| u.first_name.clone()).unwrap_or_default());
    let last_name = RwSignal::new(initial.as_ref().and_then(|u| u.last_name.clone()).unwrap_or_default());
    let phone = RwSignal::new(initial.as_ref().and_then(|u| u.phone.clone()).unwrap_or_default());
    let field_errors = RwSignal::new(BTreeMap::<String, String>::new());
    let banner = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    #[cfg(feature = "csr")]
    let services = crate::app::use_services();

    let field_error = move |field: &'static str| move || field_errors.get().get(field).cloned().unwrap_or_default();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let Some(current) = auth.get_untracked().current_user().cloned() else {
            return;
        };
        let update = profile_changes(&current, &first_name.get(), &last_name.get(), &phone.get());
        if update.is_empty() {
            banner.set("Nothing to save.".to_owned());
            return;
        }
        busy.set(true);
        field_errors.set(BTreeMap::new());
        banner.set(String::new());

        #[cfg(feature = "csr")]
        leptos::task::spawn_local(async move {
            let Some(services) = services.try_get_value() else {
                return;
            };
            match crate::session::actions::update_profile(&services.session, &services.client, &update).await {
                Ok(_) => banner.set("Profile saved.".to_owned()),
                Err(err) => {
                    field_errors.set(crate::util::form::field_messages(&err, &PROFILE_FIELDS));
                    banner.set(crate::util::form::banner_message(&err).unwrap_or_default());
                }
            }
            busy.set(false);
        });
        #[cfg(not(feature = "csr"))]
        {
            let _ = update;
        }
    };

    #[cfg(feature = "csr")]
    let on_refresh = move |_: leptos::ev::MouseEvent| {
        if busy.get() {
            return;
        }
        busy.set(true);
        leptos::task::spawn_local(async move {
            let Some(services) = services.try_get_value() else {
                return;
            };
            match crate::session::actions::refresh_profile(&services.session, &services.client).await {
                Ok(user) => {
                    first_name.set(user.first_name.unwrap_or_default());
                    last_name.set(user.last_name.unwrap_or_default());
                    phone.set(user.phone.unwrap_or_default());
                    field_errors.set(BTreeMap::new());
                    banner.set(String::new());
                }
                Err(err) => banner.set(crate::util::form::banner_message(&err).unwrap_or_default()),
            }
            busy.set(false);
        });
    };
    #[cfg(not(feature = "csr"))]
    let on_refresh = move |_: leptos::ev::MouseEvent| {};

    let email = move || auth.get().current_user().map(|u| u.email.clone()).unwrap_or_default();
    let role = move || auth.get().current_user().map(|u| u.role_kind().label()).unwrap_or_default();

    view! {
        <div class="profile-page">
            <Header/>
            <section class="profile">
                <h1>"My profile"</h1>
                <p class="profile__meta">{email}" · "{role}</p>
                <form class="profile-form" on:submit=on_submit>
                    <label>
                        "First name"
                        <input
                            type="text"
                            prop:value=move || first_name.get()
                            on:input=move |ev| first_name.set(event_target_value(&ev))
                        />
                        <span class="field-error">{field_error("first_name")}</span>
                    </label>
                    <label>
                        "Last name"
                        <input
                            type="text"
                            prop:value=move || last_name.get()
                            on:input=move |ev| last_name.set(event_target_value(&ev))
                        />
                        <span class="field-error">{field_error("last_name")}</span>
                    </label>
                    <label>
                        "Phone"
                        <input
                            type="tel"
                            prop:value=move || phone.get()
                            on:input=move |ev| phone.set(event_target_value(&ev))
                        />
                        <span class="field-error">{field_error("phone")}</span>
                    </label>
                    <div class="profile-form__actions">
                        <button type="submit" disabled=move || busy.get()>"Save"</button>
                        <button type="button" on:click=on_refresh disabled=move || busy.get()>"Reload"</button>
                    </div>
                </form>
                <Show when=move || !banner.get().is_empty()>
                    <p class="profile__banner">{move || banner.get()}</p>
                </Show>
            </section>
        </div>
    }
}
