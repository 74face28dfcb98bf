use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Select, Set};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::sales::{CreateSaleRequest, SaleList, SalesStats, TopSellingProduct, UpdateSaleRequest},
    entity::{
        products::Entity as Products,
        sale_records::{self, Column as SaleCol, Entity as SaleRecords},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::SaleRecord,
    response::{ApiResponse, Meta},
    state::AppState,
};

const TOP_PRODUCTS: i64 = 5;

async fn list(
    state: &AppState,
    select: Select<SaleRecords>,
    empty_as_not_found: Option<&str>,
) -> AppResult<ApiResponse<SaleList>> {
    let items: Vec<SaleRecord> = select
        .order_by_desc(SaleCol::SaleDate)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(SaleRecord::from)
        .collect();

    if items.is_empty() {
        if let Some(resource) = empty_as_not_found {
            return Err(AppError::not_found(resource));
        }
    }

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Sales", SaleList { items }, Some(meta)))
}

pub async fn list_sales(state: &AppState) -> AppResult<ApiResponse<SaleList>> {
    list(state, SaleRecords::find(), None).await
}

pub async fn sales_for_product(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<SaleList>> {
    list(
        state,
        SaleRecords::find().filter(SaleCol::ProductId.eq(product_id)),
        Some("Sales for this product"),
    )
    .await
}

pub async fn sales_for_order(
    state: &AppState,
    order_id: Uuid,
) -> AppResult<ApiResponse<SaleList>> {
    list(
        state,
        SaleRecords::find().filter(SaleCol::OrderId.eq(order_id)),
        Some("Sales for this order"),
    )
    .await
}

pub async fn sales_stats(state: &AppState) -> AppResult<ApiResponse<SalesStats>> {
    let (sale_count, items_sold, revenue): (i64, i64, Decimal) = sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COALESCE(SUM(quantity), 0)::BIGINT,
               COALESCE(SUM(quantity * unit_price), 0)::NUMERIC(12, 2)
        FROM sale_records
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let top_products = sqlx::query_as::<_, TopSellingProduct>(
        r#"
        SELECT product_id,
               product_name,
               SUM(quantity)::BIGINT AS quantity_sold,
               SUM(quantity * unit_price)::NUMERIC(12, 2) AS revenue
        FROM sale_records
        GROUP BY product_id, product_name
        ORDER BY quantity_sold DESC, product_name ASC
        LIMIT $1
        "#,
    )
    .bind(TOP_PRODUCTS)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Sales statistics",
        SalesStats {
            sale_count,
            items_sold,
            revenue,
            top_products,
        },
        None,
    ))
}

pub async fn create_sale(
    state: &AppState,
    staff: &AuthUser,
    payload: CreateSaleRequest,
) -> AppResult<ApiResponse<SaleRecord>> {
    payload.validate()?;
    let (Some(product_id), Some(quantity), Some(unit_price), Some(sale_date), Some(order_id)) = (
        payload.product_id,
        payload.quantity,
        payload.unit_price,
        payload.sale_date,
        payload.order_id,
    ) else {
        return Err(AppError::validation("Required fields are missing"));
    };

    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    let product_name = payload
        .product_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| product.name.clone());

    let sale = sale_records::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        product_name: Set(product_name),
        quantity: Set(quantity),
        unit_price: Set(unit_price),
        sale_date: Set(sale_date.into()),
        order_id: Set(order_id),
        ..Default::default()
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        staff.user_id,
        "sale_create",
        "sale_records",
        serde_json::json!({ "sale_id": sale.id, "order_id": order_id }),
    )
    .await;

    Ok(ApiResponse::success("Sale recorded", SaleRecord::from(sale), None))
}

pub async fn update_sale(
    state: &AppState,
    staff: &AuthUser,
    id: Uuid,
    payload: UpdateSaleRequest,
) -> AppResult<ApiResponse<SaleRecord>> {
    payload.validate()?;
    let sale = SaleRecords::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Sale record"))?;

    let mut active: sale_records::ActiveModel = sale.into();
    if let Some(product_id) = payload.product_id {
        active.product_id = Set(product_id);
    }
    if let Some(name) = payload.product_name {
        active.product_name = Set(name.trim().to_string());
    }
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(unit_price) = payload.unit_price {
        active.unit_price = Set(unit_price);
    }
    if let Some(sale_date) = payload.sale_date {
        active.sale_date = Set(sale_date.into());
    }
    if let Some(order_id) = payload.order_id {
        active.order_id = Set(order_id);
    }
    active.updated_at = Set(Utc::now().into());
    let sale = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        staff.user_id,
        "sale_update",
        "sale_records",
        serde_json::json!({ "sale_id": sale.id }),
    )
    .await;

    Ok(ApiResponse::success("Sale updated", SaleRecord::from(sale), None))
}
