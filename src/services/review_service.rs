use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Select, Set,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::reviews::{CreateReviewRequest, RatingCount, ReviewList, UpdateReviewRequest},
    entity::{
        products::{self, Column as ProductCol, Entity as Products},
        reviews::{self, Column as ReviewCol, Entity as Reviews},
        users::{self, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    response::{ApiResponse, Meta},
    state::AppState,
};

async fn with_relations(state: &AppState, rows: Vec<reviews::Model>) -> AppResult<Vec<Review>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let user_ids: Vec<Uuid> = rows.iter().map(|r| r.user_id).collect();
    let product_ids: Vec<Uuid> = rows.iter().map(|r| r.product_id).collect();

    let users: HashMap<Uuid, users::Model> = Users::find()
        .filter(UserCol::Id.is_in(user_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let products: HashMap<Uuid, products::Model> = Products::find()
        .filter(ProductCol::Id.is_in(product_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| {
            let user = users.get(&row.user_id);
            let product = products.get(&row.product_id);
            Review::from_entity(row, user, product)
        })
        .collect())
}

async fn list(state: &AppState, select: Select<Reviews>) -> AppResult<ApiResponse<ReviewList>> {
    let rows = select
        .order_by_desc(ReviewCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let items = with_relations(state, rows).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

async fn find_review(state: &AppState, id: Uuid) -> AppResult<reviews::Model> {
    Reviews::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Review"))
}

/// The rating is checked before anything touches the database.
pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    payload.validate()?;
    let (Some(product_id), Some(rating)) = (payload.product_id, payload.rating) else {
        return Err(AppError::validation("produtoId and nota are required"));
    };

    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let review = reviews::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(product.id),
        rating: Set(rating),
        comment: Set(payload.comment.filter(|c| !c.trim().is_empty())),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    tracing::debug!(review_id = %review.id, product_id = %product.id, rating, "review created");
    Ok(ApiResponse::success(
        "Review created",
        Review::from_entity(review, None, Some(&product)),
        None,
    ))
}

pub async fn list_reviews(state: &AppState) -> AppResult<ApiResponse<ReviewList>> {
    list(state, Reviews::find()).await
}

pub async fn list_product_reviews(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<ReviewList>> {
    list(state, Reviews::find().filter(ReviewCol::ProductId.eq(product_id))).await
}

pub async fn list_user_reviews(
    state: &AppState,
    caller: &AuthUser,
    user_id: Uuid,
) -> AppResult<ApiResponse<ReviewList>> {
    caller.ensure_self_or_admin(user_id)?;
    list(state, Reviews::find().filter(ReviewCol::UserId.eq(user_id))).await
}

pub async fn update_review(
    state: &AppState,
    caller: &AuthUser,
    id: Uuid,
    payload: UpdateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    payload.validate()?;
    let rating = payload
        .rating
        .ok_or_else(|| AppError::validation("nota is required"))?;

    let review = find_review(state, id).await?;
    if review.user_id != caller.user_id {
        return Err(AppError::Forbidden);
    }

    let mut active: reviews::ActiveModel = review.into();
    active.rating = Set(rating);
    if let Some(comment) = payload.comment {
        active.comment = Set(Some(comment).filter(|c| !c.trim().is_empty()));
    }
    active.updated_at = Set(Utc::now().into());
    let review = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Review updated",
        Review::from_entity(review, None, None),
        None,
    ))
}

pub async fn delete_review(state: &AppState, caller: &AuthUser, id: Uuid) -> AppResult<()> {
    let review = find_review(state, id).await?;
    if review.user_id != caller.user_id && !caller.is_admin() {
        return Err(AppError::Forbidden);
    }
    Reviews::delete_by_id(review.id).exec(&state.orm).await?;
    Ok(())
}

/// Count of reviews per rating, highest rating first.
pub async fn rating_distribution(state: &AppState) -> AppResult<ApiResponse<Vec<RatingCount>>> {
    let rows = sqlx::query_as::<_, RatingCount>(
        r#"
        SELECT rating, COUNT(*) AS count
        FROM reviews
        GROUP BY rating
        ORDER BY rating DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    let meta = Meta::total(rows.len());
    Ok(ApiResponse::success("Rating distribution", rows, Some(meta)))
}
