//! Reusable UI components shared by pages.

pub mod guards;
pub mod header;
