use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::users::{
        AdminCreateUserRequest, PasswordChanged, ResetPasswordRequest, UpdateUserRequest,
        UserList, validate_phone,
    },
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        users::{self, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    services::auth_service::{create_user, hash_password},
    state::AppState,
};

const SEARCH_LIMIT: u64 = 10;

async fn find_user(state: &AppState, id: Uuid) -> AppResult<users::Model> {
    Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}

pub async fn admin_create_user(
    state: &AppState,
    admin: &AuthUser,
    payload: AdminCreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    let role = payload.role.unwrap_or_default();
    let user = create_user(state, payload.user, role).await?;

    audit::record(
        &state.orm,
        admin.user_id,
        "user_admin_create",
        "users",
        serde_json::json!({ "user_id": user.id, "role": role }),
    )
    .await;

    Ok(ApiResponse::success("User created", User::from(user), None))
}

pub async fn me(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let model = find_user(state, user.user_id).await?;
    Ok(ApiResponse::success("User", User::from(model), None))
}

pub async fn list_users(state: &AppState) -> AppResult<ApiResponse<UserList>> {
    let items: Vec<User> = Users::find()
        .order_by_asc(UserCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

/// Name or e-mail contains `term`, case-insensitive, at most ten hits.
pub async fn search_users(state: &AppState, term: &str) -> AppResult<ApiResponse<UserList>> {
    let pattern = format!("%{term}%");
    let items: Vec<User> = Users::find()
        .filter(
            Condition::any()
                .add(Expr::col(UserCol::Name).ilike(pattern.clone()))
                .add(Expr::col(UserCol::Email).ilike(pattern)),
        )
        .order_by_asc(UserCol::Name)
        .limit(SEARCH_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn get_user(
    state: &AppState,
    caller: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    caller.ensure_self_or_admin(id)?;
    let model = find_user(state, id).await?;
    Ok(ApiResponse::success("User", User::from(model), None))
}

pub async fn update_user(
    state: &AppState,
    caller: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    caller.ensure_self_or_admin(id)?;
    if payload.role.is_some() && !caller.is_admin() {
        return Err(AppError::Forbidden);
    }
    payload.validate()?;
    if let Some(phone) = payload.phone.as_deref().filter(|p| !p.is_empty()) {
        validate_phone(phone).map_err(|_| {
            AppError::validation("telefone must contain exactly 11 digits")
        })?;
    }

    let existing = find_user(state, id).await?;

    let mut active: users::ActiveModel = existing.clone().into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(email) = payload.email {
        let email = email.trim().to_lowercase();
        if email != existing.email {
            let taken = Users::find()
                .filter(UserCol::Email.eq(email.as_str()))
                .filter(UserCol::Id.ne(id))
                .one(&state.orm)
                .await?;
            if taken.is_some() {
                return Err(AppError::Conflict("Email is already taken".to_string()));
            }
        }
        active.email = Set(email);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone).filter(|p| !p.is_empty()));
    }
    if let Some(password) = payload.password {
        active.password_hash = Set(hash_password(&password)?);
    }
    if let Some(role) = payload.role {
        active.role = Set(role);
    }
    active.updated_at = Set(Utc::now().into());

    let user = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        caller.user_id,
        "user_update",
        "users",
        serde_json::json!({ "user_id": user.id, "role": user.role }),
    )
    .await;

    Ok(ApiResponse::success("User updated", User::from(user), None))
}

pub async fn delete_user(state: &AppState, admin: &AuthUser, id: Uuid) -> AppResult<()> {
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(id))
        .count(&state.orm)
        .await?;
    if orders > 0 {
        return Err(AppError::Conflict(
            "User has orders and cannot be deleted".into(),
        ));
    }

    let result = Users::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("User"));
    }

    audit::record(
        &state.orm,
        admin.user_id,
        "user_delete",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(())
}

pub async fn reset_password(
    state: &AppState,
    caller: &AuthUser,
    id: Uuid,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<PasswordChanged>> {
    caller.ensure_self_or_admin(id)?;
    payload.validate()?;
    let existing = find_user(state, id).await?;

    let mut active: users::ActiveModel = existing.into();
    active.password_hash = Set(hash_password(&payload.new_password)?);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        caller.user_id,
        "user_reset_password",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Password updated",
        PasswordChanged { user_id: id },
        None,
    ))
}
