use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::products::{
        BulkCreateRequest, BulkFailure, BulkResult, BulkSuccess, CreateProductRequest,
        ProductList, UpdateProductRequest,
    },
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        products::{self, Column, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

const SEARCH_LIMIT: u64 = 10;

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let window = query.pagination().requested();
    let mut condition = Condition::all();

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let sort_col = match ProductSortBy::parse(query.sort_by.as_deref()) {
        ProductSortBy::Name => Column::Name,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::UpdatedAt => Column::UpdatedAt,
    };
    let order = SortOrder::parse(query.order.as_deref());

    let finder = Products::find()
        .filter(condition)
        .order_by(sort_col, order.to_orm())
        .order_by_asc(Column::Id);

    let (items, meta) = match window {
        Some((page, limit, offset)) => {
            let total = finder.clone().count(&state.orm).await? as i64;
            let rows = finder
                .limit(limit as u64)
                .offset(offset as u64)
                .all(&state.orm)
                .await?;
            (rows, Meta::new(page, limit, total))
        }
        None => {
            let rows = finder.all(&state.orm).await?;
            let meta = Meta::total(rows.len());
            (rows, meta)
        }
    };
    let items = items.into_iter().map(Product::from).collect();

    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn search_products(state: &AppState, term: &str) -> AppResult<ApiResponse<ProductList>> {
    let pattern = format!("%{term}%");
    let items: Vec<Product> = Products::find()
        .filter(Expr::col(Column::Name).ilike(pattern))
        .order_by_asc(Column::Name)
        .limit(SEARCH_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    Ok(ApiResponse::success("Product", Product::from(product), None))
}

async fn insert_product(state: &AppState, payload: CreateProductRequest) -> AppResult<products::Model> {
    let product = products::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description.filter(|d| !d.trim().is_empty())),
        price: Set(payload.price),
        image_url: Set(payload.image_url.filter(|u| !u.trim().is_empty())),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;
    Ok(product)
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    payload.validate()?;
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("nome is required"));
    }
    let product = insert_product(state, payload).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

/// Rows are independent: one bad line never blocks the others.
pub async fn create_products_bulk(
    state: &AppState,
    user: &AuthUser,
    payload: BulkCreateRequest,
) -> AppResult<ApiResponse<BulkResult>> {
    if payload.products.is_empty() {
        return Err(AppError::validation(
            "produtos must contain at least one product",
        ));
    }

    let total = payload.products.len();
    let mut successes = Vec::new();
    let mut failures = Vec::new();

    for (index, row) in payload.products.into_iter().enumerate() {
        // Line 1 of the source file is the header.
        let line = index + 2;
        let name = row.display_name();
        let outcome = match row.into_request() {
            Ok(request) => insert_product(state, request)
                .await
                .map_err(|err| match err {
                    AppError::OrmError(_) | AppError::DbError(_) => {
                        tracing::warn!(error = ?err, line, "bulk product insert failed");
                        "Failed to save product".to_string()
                    }
                    other => other.to_string(),
                }),
            Err(message) => Err(message),
        };

        match outcome {
            Ok(product) => successes.push(BulkSuccess {
                line,
                name,
                product: Product::from(product),
            }),
            Err(error) => failures.push(BulkFailure { line, name, error }),
        }
    }

    audit::record(
        &state.orm,
        user.user_id,
        "product_bulk_create",
        "products",
        serde_json::json!({ "created": successes.len(), "failed": failures.len() }),
    )
    .await;

    let message = format!(
        "Processing finished: {} created, {} failed",
        successes.len(),
        failures.len()
    );
    Ok(ApiResponse::success(
        message,
        BulkResult {
            successes,
            failures,
            total,
        },
        None,
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    payload.validate()?;
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let mut active: products::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("nome must not be empty"));
        }
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description).filter(|d| !d.trim().is_empty()));
    }
    if let Some(price) = payload.price {
        active.price = Set(Some(price));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url).filter(|u| !u.trim().is_empty()));
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<()> {
    let ordered = OrderItems::find()
        .filter(OrderItemCol::ProductId.eq(id))
        .count(&state.orm)
        .await?;
    if ordered > 0 {
        return Err(AppError::Conflict(
            "Product appears in orders and cannot be deleted".into(),
        ));
    }

    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::not_found("Product"));
    }

    audit::record(
        &state.orm,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(())
}
