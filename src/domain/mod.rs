//! Rules of the storefront that do not touch the database.

pub mod address;
pub mod order_status;
pub mod pricing;
pub mod role;
pub mod stock;

pub use order_status::OrderStatus;
pub use role::Role;
