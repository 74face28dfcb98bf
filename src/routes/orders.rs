use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        EditOrderRequest, OrderList, OrderWithItems, PlaceOrderRequest, UpdateOrderStatusRequest,
    },
    error::AppResult,
    extract::{Json, Path, Query},
    middleware::{
        auth::AuthUser,
        rbac::{AdminOnly, RequireRole, StaffOnly},
    },
    models::Order,
    response::ApiResponse,
    routes::params::AdminOrderQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(place_order))
        .route("/me", get(my_orders))
        .route("/admin/all", get(list_all_orders))
        .route(
            "/{id}",
            get(get_order).put(edit_order).delete(delete_order),
        )
        .route("/{id}/cancel", patch(cancel_order))
        .route("/{id}/status", patch(update_status))
}

#[utoipa::path(
    post,
    path = "/api/pedidos",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order created from the cart", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Empty cart, invalid address or product without price")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let resp = order_service::place_from_cart(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/pedidos/me",
    responses((status = 200, description = "Caller's orders, newest first", body = ApiResponse<OrderList>)),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    Ok(Json(order_service::list_my_orders(&state, &user).await?))
}

#[utoipa::path(
    get,
    path = "/api/pedidos/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderWithItems>),
        (status = 403, description = "Not the owner nor staff"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    Ok(Json(order_service::get_order(&state, &user, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/pedidos/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Cancelled order", body = ApiResponse<Order>),
        (status = 400, description = "Order is not pending"),
        (status = 403, description = "Not the owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(Json(order_service::cancel_order(&state, &user, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/pedidos/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order with its new status", body = ApiResponse<Order>),
        (status = 400, description = "Unknown status or transition not allowed")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_status(
    State(state): State<AppState>,
    RequireRole(staff, ..): RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(Json(
        order_service::update_status(&state, &staff, id, payload).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/pedidos/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = EditOrderRequest,
    responses(
        (status = 200, description = "Edited order", body = ApiResponse<Order>),
        (status = 400, description = "Invalid status or address")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn edit_order(
    State(state): State<AppState>,
    RequireRole(admin, ..): RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EditOrderRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    Ok(Json(
        order_service::edit_order(&state, &admin, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/pedidos/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 204, description = "Order and its items deleted"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    RequireRole(admin, ..): RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    order_service::delete_order(&state, &admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/pedidos/admin/all",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("userId" = Option<Uuid>, Query, description = "Filter by owner"),
        ("startDate" = Option<String>, Query, description = "Created at or after (RFC 3339 or YYYY-MM-DD)"),
        ("endDate" = Option<String>, Query, description = "Created at or before (RFC 3339 or YYYY-MM-DD)"),
        ("sortBy" = Option<String>, Query, description = "valorTotal, status, createdAt or updatedAt"),
        ("order" = Option<String>, Query, description = "ASC or DESC; default DESC"),
    ),
    responses((status = 200, description = "All orders with items and owner", body = ApiResponse<OrderList>)),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    _staff: RequireRole<StaffOnly>,
    Query(query): Query<AdminOrderQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    Ok(Json(order_service::list_all_orders(&state, query).await?))
}
