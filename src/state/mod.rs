//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by domain so components can depend on small focused models.
//! Only auth state is shared across pages; forms keep their own signals.

pub mod auth;
