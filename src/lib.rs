//! # pfe-portal
//!
//! Leptos + WASM client of the end-of-studies project (PFE) portal.
//!
//! The crate's core is the session layer: a persisted token store, a one-shot
//! bootstrap that reconciles it with the server, an observable auth state,
//! route guards, and an HTTP client that attaches the bearer token and reports
//! expired sessions. Pages (login, role dashboard, profile, password change)
//! sit on top of it.
//!
//! Build with `--features csr` for the browser; without it, browser calls
//! compile to inert stubs so the session logic can be unit-tested natively.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod session;
pub mod state;
pub mod util;

#[cfg(test)]
pub(crate) mod test_support;

/// Browser entry point: install logging and mount the app.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    log::info!("pfe-portal starting");
    leptos::mount::mount_to_body(app::App);
}
