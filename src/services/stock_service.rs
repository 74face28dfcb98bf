use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::stock::{CreateStockRequest, StockList, UpdateStockRequest},
    entity::{
        products::{self, Column as ProductCol, Entity as Products},
        stock_records::{self, Column as StockCol, Entity as StockRecords},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::StockRecord,
    response::{ApiResponse, Meta},
    state::AppState,
};

async fn with_products(
    state: &AppState,
    rows: Vec<stock_records::Model>,
) -> AppResult<Vec<StockRecord>> {
    let product_ids: Vec<Uuid> = rows.iter().map(|r| r.product_id).collect();
    let products: HashMap<Uuid, products::Model> = if product_ids.is_empty() {
        HashMap::new()
    } else {
        Products::find()
            .filter(ProductCol::Id.is_in(product_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|row| {
            let product = products.get(&row.product_id);
            StockRecord::from_entity(row, product)
        })
        .collect())
}

fn clean_location(location: Option<String>) -> Option<String> {
    location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

pub async fn list_stock(state: &AppState) -> AppResult<ApiResponse<StockList>> {
    let rows = StockRecords::find()
        .order_by_asc(StockCol::ProductId)
        .order_by_asc(StockCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let items = with_products(state, rows).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Stock", StockList { items }, Some(meta)))
}

pub async fn stock_for_product(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<StockList>> {
    let rows = StockRecords::find()
        .filter(StockCol::ProductId.eq(product_id))
        .order_by_asc(StockCol::CreatedAt)
        .all(&state.orm)
        .await?;
    if rows.is_empty() {
        return Err(AppError::not_found("Stock for this product"));
    }
    let items = with_products(state, rows).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Stock", StockList { items }, Some(meta)))
}

pub async fn create_stock(
    state: &AppState,
    admin: &AuthUser,
    payload: CreateStockRequest,
) -> AppResult<ApiResponse<StockRecord>> {
    payload.validate()?;
    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let record = stock_records::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        quantity: Set(payload.quantity),
        location: Set(clean_location(payload.location)),
        restock_date: Set(payload.restock_date.map(Into::into)),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        admin.user_id,
        "stock_create",
        "stock_records",
        serde_json::json!({ "stock_id": record.id, "product_id": product.id, "quantity": record.quantity }),
    )
    .await;

    Ok(ApiResponse::success(
        "Stock record created",
        StockRecord::from_entity(record, Some(&product)),
        None,
    ))
}

pub async fn update_stock(
    state: &AppState,
    admin: &AuthUser,
    id: Uuid,
    payload: UpdateStockRequest,
) -> AppResult<ApiResponse<StockRecord>> {
    payload.validate()?;
    let quantity = payload
        .quantity
        .ok_or_else(|| AppError::validation("quantidade is required"))?;

    let record = StockRecords::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Stock record"))?;

    let mut active: stock_records::ActiveModel = record.into();
    active.quantity = Set(quantity);
    if payload.location.is_some() {
        active.location = Set(clean_location(payload.location));
    }
    if let Some(restock_date) = payload.restock_date {
        active.restock_date = Set(Some(restock_date.into()));
    }
    active.updated_at = Set(Utc::now().into());
    let record = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        admin.user_id,
        "stock_update",
        "stock_records",
        serde_json::json!({ "stock_id": record.id, "quantity": record.quantity }),
    )
    .await;

    let product = Products::find_by_id(record.product_id).one(&state.orm).await?;
    Ok(ApiResponse::success(
        "Stock record updated",
        StockRecord::from_entity(record, product.as_ref()),
        None,
    ))
}

pub async fn delete_stock(state: &AppState, admin: &AuthUser, id: Uuid) -> AppResult<()> {
    let result = StockRecords::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Stock record"));
    }

    audit::record(
        &state.orm,
        admin.user_id,
        "stock_delete",
        "stock_records",
        serde_json::json!({ "stock_id": id }),
    )
    .await;

    Ok(())
}
