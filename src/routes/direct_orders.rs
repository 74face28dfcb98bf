use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use uuid::Uuid;

use crate::{
    dto::orders::{DirectOrderRequest, DuplicateOrderRequest, OrderWithItems},
    error::AppResult,
    extract::{Json, Path},
    middleware::rbac::{RequireRole, StaffOnly},
    response::ApiResponse,
    services::direct_order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_direct_order))
        .route("/duplicar/{id}", post(duplicate_order))
}

#[utoipa::path(
    post,
    path = "/api/pedidos-admin",
    request_body = DirectOrderRequest,
    responses(
        (status = 201, description = "Order placed on behalf of a user", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Invalid items, missing price or insufficient stock"),
        (status = 404, description = "User or product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Direct orders"
)]
pub async fn create_direct_order(
    State(state): State<AppState>,
    RequireRole(staff, ..): RequireRole<StaffOnly>,
    Json(payload): Json<DirectOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let resp = direct_order_service::create_direct_order(&state, &staff, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/pedidos-admin/duplicar/{id}",
    params(("id" = Uuid, Path, description = "Order to copy")),
    request_body = DuplicateOrderRequest,
    responses(
        (status = 201, description = "New order with the same items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Direct orders"
)]
pub async fn duplicate_order(
    State(state): State<AppState>,
    RequireRole(staff, ..): RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    payload: Option<Json<DuplicateOrderRequest>>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let resp = direct_order_service::duplicate_order(&state, &staff, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
