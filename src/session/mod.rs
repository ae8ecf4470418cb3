//! Session lifecycle: persisted credentials, startup bootstrap and the
//! user-initiated operations that change who is signed in.

pub mod actions;
pub mod bootstrap;
pub mod token_store;
