use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::sales::{CreateSaleRequest, SaleList, SalesStats, UpdateSaleRequest},
    error::AppResult,
    extract::{Json, Path},
    middleware::rbac::{RequireRole, StaffOnly},
    models::SaleRecord,
    response::ApiResponse,
    services::sale_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route("/estatisticas", get(sales_stats))
        .route("/produto/{product_id}", get(sales_for_product))
        .route("/pedido/{order_id}", get(sales_for_order))
        .route("/{id}", put(update_sale))
}

#[utoipa::path(
    get,
    path = "/api/vendas",
    responses((status = 200, description = "Sale records, newest first", body = ApiResponse<SaleList>)),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    _staff: RequireRole<StaffOnly>,
) -> AppResult<Json<ApiResponse<SaleList>>> {
    Ok(Json(sale_service::list_sales(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/vendas/produto/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Sales of a product", body = ApiResponse<SaleList>),
        (status = 404, description = "No sales for this product")
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn sales_for_product(
    State(state): State<AppState>,
    _staff: RequireRole<StaffOnly>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SaleList>>> {
    Ok(Json(
        sale_service::sales_for_product(&state, product_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/vendas/pedido/{order_id}",
    params(("order_id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Sales of an order", body = ApiResponse<SaleList>),
        (status = 404, description = "No sales for this order")
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn sales_for_order(
    State(state): State<AppState>,
    _staff: RequireRole<StaffOnly>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SaleList>>> {
    Ok(Json(sale_service::sales_for_order(&state, order_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/vendas/estatisticas",
    responses((status = 200, description = "Sale totals and top 5 products", body = ApiResponse<SalesStats>)),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn sales_stats(
    State(state): State<AppState>,
    _staff: RequireRole<StaffOnly>,
) -> AppResult<Json<ApiResponse<SalesStats>>> {
    Ok(Json(sale_service::sales_stats(&state).await?))
}

#[utoipa::path(
    post,
    path = "/api/vendas",
    request_body = CreateSaleRequest,
    responses(
        (status = 201, description = "Sale recorded", body = ApiResponse<SaleRecord>),
        (status = 400, description = "Missing or invalid fields"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn create_sale(
    State(state): State<AppState>,
    RequireRole(staff, ..): RequireRole<StaffOnly>,
    Json(payload): Json<CreateSaleRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SaleRecord>>)> {
    let resp = sale_service::create_sale(&state, &staff, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/vendas/{id}",
    params(("id" = Uuid, Path, description = "Sale record ID")),
    request_body = UpdateSaleRequest,
    responses(
        (status = 200, description = "Sale updated", body = ApiResponse<SaleRecord>),
        (status = 404, description = "Sale record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn update_sale(
    State(state): State<AppState>,
    RequireRole(staff, ..): RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSaleRequest>,
) -> AppResult<Json<ApiResponse<SaleRecord>>> {
    Ok(Json(
        sale_service::update_sale(&state, &staff, id, payload).await?,
    ))
}
