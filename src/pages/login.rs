//! Login page: email + password sign-in.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;

use crate::net::error::ApiError;

pub(crate) fn validate_login_input(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err("Enter a valid email address.");
    }
    if password.is_empty() {
        return Err("Enter your password.");
    }
    Ok((email.to_owned(), password.to_owned()))
}

pub(crate) fn login_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Unauthorized => "Incorrect email or password.".to_owned(),
        ApiError::Validation(errors) => errors
            .first("email")
            .or_else(|| errors.first("password"))
            .map_or_else(|| err.user_message(), str::to_owned),
        ApiError::RateLimited { .. } => "Too many attempts. Wait a moment and try again.".to_owned(),
        ApiError::Forbidden { message } => message
            .clone()
            .unwrap_or_else(|| "This account is disabled.".to_owned()),
        ApiError::Network(_) => "Cannot reach the server. Check your connection.".to_owned(),
        _ => err.user_message(),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    #[cfg(feature = "csr")]
    let services = crate::app::use_services();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (email_value, password_value) = match validate_login_input(&email.get(), &password.get()) {
            Ok(input) => input,
            Err(message) => {
                info.set(message.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set("Signing in...".to_owned());

        // On success the session change makes `PublicRoute` redirect to the
        // landing route; navigating here as well would race it.
        #[cfg(feature = "csr")]
        {
            leptos::task::spawn_local(async move {
                let Some(services) = services.try_get_value() else {
                    return;
                };
                match crate::session::actions::login(&services.session, &services.client, &email_value, &password_value)
                    .await
                {
                    Ok(outcome) => {
                        log::debug!("login succeeded for user {}", outcome.user.id);
                        password.set(String::new());
                        info.set(String::new());
                    }
                    Err(err) => {
                        log::debug!("login failed: {err}");
                        info.set(login_error_message(&err));
                    }
                }
                busy.set(false);
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (email_value, password_value);
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"PFE Portal"</h1>
                <p class="login-card__subtitle">"Sign in with your university account"</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@univ.dz"
                        autocomplete="username"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Sign In"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
            </div>
        </div>
    }
}
