use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    routing::get,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

pub mod cart;
pub mod dashboard;
pub mod direct_orders;
pub mod doc;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod params;
pub mod products;
pub mod reviews;
pub mod sales;
pub mod stock;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/usuarios", users::router())
        .nest("/produtos", products::router())
        .nest("/carrinho", cart::router())
        .nest("/pedidos", orders::router())
        .nest("/pedidos-admin", direct_orders::router())
        .nest("/avaliacoes", reviews::router())
        .nest("/estoque", stock::router())
        .nest("/vendas", sales::router())
        .nest("/dashboard", dashboard::router())
        .nest("/notificacoes", notifications::router())
}

/// Full application: `/health`, `/docs` and the API under `/api`, bound to `state`.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
