//! Business logic services for the warehouse inventory backend

pub mod auth;
pub mod category;
pub mod inventory;
pub mod ledger;
pub mod order;
pub mod order_status;
pub mod product;
pub mod stock_adjustment;
pub mod supplier;

pub use auth::AuthService;
pub use category::CategoryService;
pub use ledger::LedgerService;
pub use order::OrderService;
pub use order_status::{OrderStatusService, TransitionOutcome};
pub use product::ProductService;
pub use stock_adjustment::{AdjustmentReceipt, StockAdjustmentService};
pub use supplier::SupplierService;
