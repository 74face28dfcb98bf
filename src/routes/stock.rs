use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::stock::{CreateStockRequest, StockList, UpdateStockRequest},
    error::AppResult,
    extract::{Json, Path},
    middleware::rbac::{AdminOnly, RequireRole},
    models::StockRecord,
    response::ApiResponse,
    services::stock_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stock).post(create_stock))
        .route("/produto/{product_id}", get(stock_for_product))
        .route("/{id}", put(update_stock).delete(delete_stock))
}

#[utoipa::path(
    get,
    path = "/api/estoque",
    responses((status = 200, description = "Stock records ordered by product", body = ApiResponse<StockList>)),
    tag = "Stock"
)]
pub async fn list_stock(State(state): State<AppState>) -> AppResult<Json<ApiResponse<StockList>>> {
    Ok(Json(stock_service::list_stock(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/estoque/produto/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Stock records of a product", body = ApiResponse<StockList>),
        (status = 404, description = "Product has no stock records")
    ),
    tag = "Stock"
)]
pub async fn stock_for_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<StockList>>> {
    Ok(Json(
        stock_service::stock_for_product(&state, product_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/estoque",
    request_body = CreateStockRequest,
    responses(
        (status = 201, description = "Stock record created", body = ApiResponse<StockRecord>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Stock"
)]
pub async fn create_stock(
    State(state): State<AppState>,
    RequireRole(admin, ..): RequireRole<AdminOnly>,
    Json(payload): Json<CreateStockRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<StockRecord>>)> {
    let resp = stock_service::create_stock(&state, &admin, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/estoque/{id}",
    params(("id" = Uuid, Path, description = "Stock record ID")),
    request_body = UpdateStockRequest,
    responses(
        (status = 200, description = "Stock record updated", body = ApiResponse<StockRecord>),
        (status = 404, description = "Stock record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Stock"
)]
pub async fn update_stock(
    State(state): State<AppState>,
    RequireRole(admin, ..): RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStockRequest>,
) -> AppResult<Json<ApiResponse<StockRecord>>> {
    Ok(Json(
        stock_service::update_stock(&state, &admin, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/estoque/{id}",
    params(("id" = Uuid, Path, description = "Stock record ID")),
    responses(
        (status = 204, description = "Stock record deleted"),
        (status = 404, description = "Stock record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Stock"
)]
pub async fn delete_stock(
    State(state): State<AppState>,
    RequireRole(admin, ..): RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    stock_service::delete_stock(&state, &admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
