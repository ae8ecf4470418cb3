//! Client configuration and route constants.
//!
//! The API base URL is fixed at build time from `PFE_API_BASE_URL` (the
//! bundle has no runtime environment); everything else is a constant.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

/// Route of the login page.
pub const LOGIN_ROUTE: &str = "/login";
/// Default landing route for signed-in users.
pub const HOME_ROUTE: &str = "/";
pub const PROFILE_ROUTE: &str = "/profile";
pub const CHANGE_PASSWORD_ROUTE: &str = "/change-password";

/// Used when `PFE_API_BASE_URL` is not set: same-origin `/api`.
pub const DEFAULT_API_BASE_URL: &str = "/api";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix of every REST path, without a trailing slash.
    pub api_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_base_url: DEFAULT_API_BASE_URL.to_owned() }
    }
}

impl ClientConfig {
    /// Configuration baked in at compile time.
    #[must_use]
    pub fn from_build_env() -> Self {
        Self::from_base_url(option_env!("PFE_API_BASE_URL"))
    }

    /// Build from an optional base URL; blank values fall back to the default.
    #[must_use]
    pub fn from_base_url(raw: Option<&str>) -> Self {
        let api_base_url = raw
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map_or(DEFAULT_API_BASE_URL, |url| url)
            .trim_end_matches('/')
            .to_owned();
        Self { api_base_url }
    }
}
