//! Networking modules for the portal REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` applies the interceptor policy and exposes the endpoints, `transport`
//! is the injectable HTTP seam, `events` carries session invalidation out of
//! the client, `error` is the error taxonomy and `types` the wire schema.

pub mod api;
pub mod error;
pub mod events;
pub mod transport;
pub mod types;
