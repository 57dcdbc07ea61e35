//! HTTP handlers

pub mod auth;
pub mod category;
pub mod health;
pub mod order;
pub mod product;
pub mod stock_movement;
pub mod supplier;

pub use auth::*;
pub use category::*;
pub use health::*;
pub use order::*;
pub use product::*;
pub use stock_movement::*;
pub use supplier::*;
