//! Change-password page. Users signed in with a temporary password land here
//! straight from the login page.

#[cfg(test)]
#[path = "change_password_test.rs"]
mod change_password_test;

use std::collections::BTreeMap;

use leptos::prelude::*;

use crate::components::header::Header;
use crate::state::auth::AuthState;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;
pub(crate) const PASSWORD_FIELDS: [&str; 2] = ["current_password", "new_password"];

/// Local checks before the request goes out.
///
/// # Errors
///
/// Returns the message to show when the inputs cannot be submitted.
pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<(), &'static str> {
    if current.is_empty() {
        return Err("Enter your current password.");
    }
    if new.chars().count() < MIN_PASSWORD_LEN {
        return Err("The new password must be at least 8 characters.");
    }
    if new != confirm {
        return Err("The new passwords do not match.");
    }
    if new == current {
        return Err("The new password must differ from the current one.");
    }
    Ok(())
}

#[component]
pub fn ChangePasswordPage() -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let current = RwSignal::new(String::new());
    let new = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let field_errors = RwSignal::new(BTreeMap::<String, String>::new());
    let banner = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    #[cfg(feature = "csr")]
    let services = crate::app::use_services();
    #[cfg(feature = "csr")]
    let navigate = leptos_router::hooks::use_navigate();

    let forced = move || auth.get().current_user().is_some_and(|u| u.must_change_password);
    let field_error = move |field: &'static str| move || field_errors.get().get(field).cloned().unwrap_or_default();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (current_value, new_value) = (current.get(), new.get());
        if let Err(message) = validate_password_change(&current_value, &new_value, &confirm.get()) {
            banner.set(message.to_owned());
            return;
        }
        busy.set(true);
        field_errors.set(BTreeMap::new());
        banner.set(String::new());

        #[cfg(feature = "csr")]
        {
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                let Some(services) = services.try_get_value() else {
                    return;
                };
                match crate::session::actions::change_password(
                    &services.session,
                    &services.client,
                    &current_value,
                    &new_value,
                )
                .await
                {
                    Ok(message) => {
                        log::info!("password changed: {message}");
                        current.set(String::new());
                        new.set(String::new());
                        confirm.set(String::new());
                        navigate(crate::config::HOME_ROUTE, leptos_router::NavigateOptions::default());
                    }
                    Err(err) => {
                        field_errors.set(crate::util::form::field_messages(&err, &PASSWORD_FIELDS));
                        banner.set(crate::util::form::banner_message(&err).unwrap_or_default());
                    }
                }
                busy.set(false);
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (current_value, new_value);
        }
    };

    view! {
        <div class="change-password-page">
            <Header/>
            <section class="change-password">
                <h1>"Change password"</h1>
                <Show when=forced>
                    <p class="change-password__notice">
                        "Your account uses a temporary password. Choose a new one to continue."
                    </p>
                </Show>
                <form class="change-password-form" on:submit=on_submit>
                    <label>
                        "Current password"
                        <input
                            type="password"
                            autocomplete="current-password"
                            prop:value=move || current.get()
                            on:input=move |ev| current.set(event_target_value(&ev))
                        />
                        <span class="field-error">{field_error("current_password")}</span>
                    </label>
                    <label>
                        "New password"
                        <input
                            type="password"
                            autocomplete="new-password"
                            prop:value=move || new.get()
                            on:input=move |ev| new.set(event_target_value(&ev))
                        />
                        <span class="field-error">{field_error("new_password")}</span>
                    </label>
                    <label>
                        "Confirm new password"
                        <input
                            type="password"
                            autocomplete="new-password"
                            prop:value=move || confirm.get()
                            on:input=move |ev| confirm.set(event_target_value(&ev))
                        />
                    </label>
                    <button type="submit" disabled=move || busy.get()>"Update password"</button>
                </form>
                <Show when=move || !banner.get().is_empty()>
                    <p class="change-password__banner">{move || banner.get()}</p>
                </Show>
            </section>
        </div>
    }
}
