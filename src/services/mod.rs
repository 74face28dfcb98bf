pub mod auth_service;
pub mod cart_service;
pub mod dashboard_service;
pub mod direct_order_service;
pub mod order_service;
pub mod product_service;
pub mod review_service;
pub mod sale_service;
pub mod stock_service;
pub mod user_service;
