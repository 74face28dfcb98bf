use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::reviews::{CreateReviewRequest, RatingCount, ReviewList, UpdateReviewRequest},
    error::AppResult,
    extract::{Json, Path},
    middleware::auth::AuthUser,
    models::Review,
    response::ApiResponse,
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route("/distribuicao", get(rating_distribution))
        .route("/produto/{product_id}", get(product_reviews))
        .route("/usuario/{user_id}", get(user_reviews))
        .route("/{id}", put(update_review).delete(delete_review))
}

#[utoipa::path(
    post,
    path = "/api/avaliacoes",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ApiResponse<Review>),
        (status = 400, description = "Rating missing or outside 1..=5"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Review>>)> {
    let resp = review_service::create_review(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/avaliacoes",
    responses((status = 200, description = "All reviews, newest first", body = ApiResponse<ReviewList>)),
    tag = "Reviews"
)]
pub async fn list_reviews(State(state): State<AppState>) -> AppResult<Json<ApiResponse<ReviewList>>> {
    Ok(Json(review_service::list_reviews(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/avaliacoes/produto/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses((status = 200, description = "Reviews of a product", body = ApiResponse<ReviewList>)),
    tag = "Reviews"
)]
pub async fn product_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    Ok(Json(
        review_service::list_product_reviews(&state, product_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/avaliacoes/usuario/{user_id}",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Reviews written by a user", body = ApiResponse<ReviewList>),
        (status = 403, description = "Neither the user nor an admin")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn user_reviews(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    Ok(Json(
        review_service::list_user_reviews(&state, &caller, user_id).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/avaliacoes/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ApiResponse<Review>),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn update_review(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    Ok(Json(
        review_service::update_review(&state, &caller, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/avaliacoes/{id}",
    params(("id" = Uuid, Path, description = "Review ID")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Neither the author nor an admin"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    review_service::delete_review(&state, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/avaliacoes/distribuicao",
    responses((status = 200, description = "Review count per rating, highest first", body = ApiResponse<Vec<RatingCount>>)),
    tag = "Reviews"
)]
pub async fn rating_distribution(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<RatingCount>>>> {
    Ok(Json(review_service::rating_distribution(&state).await?))
}
