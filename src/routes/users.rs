use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::users::{
        AdminCreateUserRequest, LoginRequest, LoginResponse, PasswordChanged, RegisterRequest,
        ResetPasswordRequest, UpdateUserRequest, UserList,
    },
    error::AppResult,
    extract::{Json, Path, Query},
    middleware::{
        auth::AuthUser,
        rbac::{AdminOnly, RequireRole, StaffOnly},
    },
    models::User,
    response::ApiResponse,
    routes::params::SearchQuery,
    services::{
        auth_service::{login_user, register_user},
        user_service,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/admin/create", post(admin_create))
        .route("/me", get(me))
        .route("/busca", get(search_users))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/reset-password", put(reset_password))
}

#[utoipa::path(
    post,
    path = "/api/usuarios/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register a customer", body = ApiResponse<User>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "E-mail already registered")
    ),
    tag = "Users"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = register_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/usuarios/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Users"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = login_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/usuarios/admin/create",
    request_body = AdminCreateUserRequest,
    responses(
        (status = 201, description = "User created with the chosen role", body = ApiResponse<User>),
        (status = 403, description = "Admins only")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn admin_create(
    State(state): State<AppState>,
    RequireRole(admin, ..): RequireRole<AdminOnly>,
    Json(payload): Json<AdminCreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = user_service::admin_create_user(&state, &admin, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/usuarios/me",
    responses((status = 200, description = "Current user", body = ApiResponse<User>)),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(user_service::me(&state, &user).await?))
}

#[utoipa::path(
    get,
    path = "/api/usuarios",
    responses((status = 200, description = "All users", body = ApiResponse<UserList>)),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    Ok(Json(user_service::list_users(&state).await?))
}

#[utoipa::path(
    get,
    path = "/api/usuarios/busca",
    params(("termo" = String, Query, description = "At least 3 characters; matches name or e-mail")),
    responses(
        (status = 200, description = "Up to 10 users", body = ApiResponse<UserList>),
        (status = 400, description = "Term too short")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn search_users(
    State(state): State<AppState>,
    _staff: RequireRole<StaffOnly>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let term = query.term()?;
    Ok(Json(user_service::search_users(&state, term).await?))
}

#[utoipa::path(
    get,
    path = "/api/usuarios/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = ApiResponse<User>),
        (status = 403, description = "Neither admin nor the user"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(user_service::get_user(&state, &user, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/usuarios/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = ApiResponse<User>),
        (status = 403, description = "Not allowed, or a non-admin tried to change the role")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    Ok(Json(user_service::update_user(&state, &user, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/usuarios/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "User not found"),
        (status = 409, description = "User has orders")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireRole(admin, ..): RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user_service::delete_user(&state, &admin, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/usuarios/{id}/reset-password",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = ResetPasswordRequest,
    responses((status = 200, description = "Password changed", body = ApiResponse<PasswordChanged>)),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<PasswordChanged>>> {
    Ok(Json(
        user_service::reset_password(&state, &user, id, payload).await?,
    ))
}
