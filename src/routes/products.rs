use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::products::{BulkCreateRequest, BulkResult, CreateProductRequest, ProductList, UpdateProductRequest},
    error::AppResult,
    extract::{Json, Path, Query},
    middleware::rbac::{RequireRole, StaffOnly},
    models::Product,
    response::ApiResponse,
    routes::params::{ProductQuery, SearchQuery},
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/busca", get(search_products))
        .route("/bulk", post(create_products_bulk))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[utoipa::path(
    get,
    path = "/api/produtos",
    params(
        ("search" = Option<String>, Query, description = "Matches name or description, case-insensitive"),
        ("minPrice" = Option<f64>, Query, description = "Lowest price"),
        ("maxPrice" = Option<f64>, Query, description = "Highest price"),
        ("sortBy" = Option<String>, Query, description = "nome, preco, createdAt or updatedAt; default createdAt"),
        ("order" = Option<String>, Query, description = "ASC or DESC; default DESC"),
        ("page" = Option<i64>, Query, description = "Page number; without page or perPage every product is returned"),
        ("perPage" = Option<i64>, Query, description = "Items per page, default 20 when paginating"),
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    Ok(Json(product_service::list_products(&state, query).await?))
}

#[utoipa::path(
    get,
    path = "/api/produtos/busca",
    params(("termo" = String, Query, description = "At least 3 characters")),
    responses(
        (status = 200, description = "Up to 10 products", body = ApiResponse<ProductList>),
        (status = 400, description = "Term too short")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn search_products(
    State(state): State<AppState>,
    _staff: RequireRole<StaffOnly>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let term = query.term()?;
    Ok(Json(product_service::search_products(&state, term).await?))
}

#[utoipa::path(
    get,
    path = "/api/produtos/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    Ok(Json(product_service::get_product(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/produtos",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product", body = ApiResponse<Product>),
        (status = 400, description = "Invalid payload")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    RequireRole(user, ..): RequireRole<StaffOnly>,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/produtos/bulk",
    request_body = BulkCreateRequest,
    responses(
        (status = 201, description = "Every row imported", body = ApiResponse<BulkResult>),
        (status = 207, description = "Some rows failed", body = ApiResponse<BulkResult>),
        (status = 400, description = "Empty list")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_products_bulk(
    State(state): State<AppState>,
    RequireRole(user, ..): RequireRole<StaffOnly>,
    Json(payload): Json<BulkCreateRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<BulkResult>>)> {
    let resp = product_service::create_products_bulk(&state, &user, payload).await?;
    let status = match &resp.data {
        Some(result) if !result.failures.is_empty() => StatusCode::MULTI_STATUS,
        _ => StatusCode::CREATED,
    };
    Ok((status, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/produtos/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    RequireRole(user, ..): RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    Ok(Json(
        product_service::update_product(&state, &user, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/produtos/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Deleted product"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product appears in orders")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireRole(user, ..): RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    product_service::delete_product(&state, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
