//! Domain models for the warehouse inventory platform

mod catalog;
mod order;
mod stock;
mod user;

pub use catalog::*;
pub use order::*;
pub use stock::*;
pub use user::*;
