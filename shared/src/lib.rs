//! Shared types and rules for the warehouse inventory platform
//!
//! This crate contains the I/O-free pieces used by both the backend and the
//! browser bindings (via WASM): status and movement enums, the order status
//! transition table, stock floor rules and validated request inputs.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::*;
