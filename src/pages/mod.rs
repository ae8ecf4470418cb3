//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration and delegates session changes to
//! `session::actions`.

pub mod change_password;
pub mod dashboard;
pub mod login;
pub mod profile;
