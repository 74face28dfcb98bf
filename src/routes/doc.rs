use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{OrderStatus, Role},
    dto::{
        cart::{AddToCartRequest, UpdateCartItemRequest},
        dashboard::{DashboardSummary, StatusCount, TopOrderedProduct},
        orders::{
            DirectOrderItem, DirectOrderRequest, DuplicateOrderRequest, EditOrderRequest,
            OrderList, OrderWithItems, PlaceOrderRequest, UpdateOrderStatusRequest,
        },
        products::{
            BulkCreateRequest, BulkFailure, BulkProductRow, BulkResult, BulkSuccess,
            CreateProductRequest, ProductList, UpdateProductRequest,
        },
        reviews::{CreateReviewRequest, RatingCount, ReviewList, UpdateReviewRequest},
        sales::{CreateSaleRequest, SaleList, SalesStats, TopSellingProduct, UpdateSaleRequest},
        stock::{CreateStockRequest, StockList, UpdateStockRequest},
        users::{
            AdminCreateUserRequest, LoginRequest, LoginResponse, PasswordChanged,
            RegisterRequest, ResetPasswordRequest, UpdateUserRequest, UserList,
        },
    },
    models::{
        Cart, CartItem, Order, OrderItem, Product, ProductSummary, Review, SaleRecord,
        StockRecord, User, UserSummary,
    },
    notify::OrderEvent,
    response::{ApiResponse, Meta},
    routes::{
        cart, dashboard, direct_orders, health, notifications, orders, params, products, reviews,
        sales, stock, users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Sorveteria Delícia API", description = "Storefront catalog, cart, orders and back office"),
    paths(
        health::health_check,
        users::register,
        users::login,
        users::admin_create,
        users::me,
        users::list_users,
        users::search_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::reset_password,
        products::list_products,
        products::search_products,
        products::get_product,
        products::create_product,
        products::create_products_bulk,
        products::update_product,
        products::delete_product,
        cart::get_cart,
        cart::add_item,
        cart::update_item,
        cart::remove_item,
        cart::clear_cart,
        orders::place_order,
        orders::my_orders,
        orders::get_order,
        orders::cancel_order,
        orders::update_status,
        orders::edit_order,
        orders::delete_order,
        orders::list_all_orders,
        direct_orders::create_direct_order,
        direct_orders::duplicate_order,
        reviews::create_review,
        reviews::list_reviews,
        reviews::product_reviews,
        reviews::user_reviews,
        reviews::update_review,
        reviews::delete_review,
        reviews::rating_distribution,
        stock::list_stock,
        stock::stock_for_product,
        stock::create_stock,
        stock::update_stock,
        stock::delete_stock,
        sales::list_sales,
        sales::sales_for_product,
        sales::sales_for_order,
        sales::sales_stats,
        sales::create_sale,
        sales::update_sale,
        dashboard::summary,
        notifications::subscribe
    ),
    components(
        schemas(
            Role,
            OrderStatus,
            User,
            UserSummary,
            Product,
            ProductSummary,
            Cart,
            CartItem,
            Order,
            OrderItem,
            Review,
            StockRecord,
            SaleRecord,
            OrderEvent,
            RegisterRequest,
            AdminCreateUserRequest,
            LoginRequest,
            LoginResponse,
            UpdateUserRequest,
            ResetPasswordRequest,
            PasswordChanged,
            UserList,
            CreateProductRequest,
            UpdateProductRequest,
            BulkProductRow,
            BulkCreateRequest,
            BulkSuccess,
            BulkFailure,
            BulkResult,
            ProductList,
            AddToCartRequest,
            UpdateCartItemRequest,
            PlaceOrderRequest,
            UpdateOrderStatusRequest,
            EditOrderRequest,
            DirectOrderItem,
            DirectOrderRequest,
            DuplicateOrderRequest,
            OrderWithItems,
            OrderList,
            CreateReviewRequest,
            UpdateReviewRequest,
            ReviewList,
            RatingCount,
            CreateStockRequest,
            UpdateStockRequest,
            StockList,
            CreateSaleRequest,
            UpdateSaleRequest,
            SaleList,
            TopSellingProduct,
            SalesStats,
            StatusCount,
            TopOrderedProduct,
            DashboardSummary,
            params::Pagination,
            params::ProductQuery,
            params::AdminOrderQuery,
            params::SearchQuery,
            health::HealthData,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Users", description = "Accounts, login and roles"),
        (name = "Products", description = "Ice-cream catalog"),
        (name = "Cart", description = "Caller's shopping cart"),
        (name = "Orders", description = "Order placement and lifecycle"),
        (name = "Direct orders", description = "Orders placed by staff on behalf of customers"),
        (name = "Reviews", description = "Product ratings"),
        (name = "Stock", description = "Stock records"),
        (name = "Sales", description = "Sale records and statistics"),
        (name = "Dashboard", description = "Back-office aggregates"),
        (name = "Notifications", description = "Server-sent order events"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_resource_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/usuarios/login",
            "/api/produtos/bulk",
            "/api/carrinho/itens/{product_id}",
            "/api/pedidos/{id}/status",
            "/api/pedidos-admin/duplicar/{id}",
            "/api/avaliacoes/distribuicao",
            "/api/estoque/produto/{product_id}",
            "/api/vendas/estatisticas",
            "/api/dashboard/resumo",
            "/api/notificacoes",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
