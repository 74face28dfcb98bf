use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    domain::{
        address::validate_delivery_address,
        pricing::{LineItem, price_lines},
        stock::{StockSlot, StockUpdate, plan_withdrawal},
    },
    dto::orders::{DirectOrderItem, DirectOrderRequest, DuplicateOrderRequest, OrderWithItems},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::Entity as Orders,
        products::Entity as Products,
        stock_records::{self, Column as StockCol, Entity as StockRecords},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    notify::{OrderEvent, publish_best_effort},
    response::ApiResponse,
    services::order_service::{insert_order, reload_or_snapshot},
    state::AppState,
};

/// Sum quantities of repeated products, keeping first-seen order.
fn merge_items(items: &[DirectOrderItem]) -> AppResult<Vec<(Uuid, i32)>> {
    let mut merged: Vec<(Uuid, i32)> = Vec::with_capacity(items.len());
    for item in items {
        match merged.iter_mut().find(|(id, _)| *id == item.product_id) {
            Some((product_id, quantity)) => {
                *quantity = quantity.checked_add(item.quantity).ok_or_else(|| {
                    AppError::validation(format!("Quantity too large for product {product_id}"))
                })?;
            }
            None => merged.push((item.product_id, item.quantity)),
        }
    }
    Ok(merged)
}

/// Lock a product's stock records and plan the withdrawal of `quantity`.
async fn reserve_stock<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    product_name: &str,
    quantity: i32,
) -> AppResult<Vec<StockUpdate>> {
    let slots: Vec<StockSlot> = StockRecords::find()
        .filter(StockCol::ProductId.eq(product_id))
        .order_by_asc(StockCol::CreatedAt)
        .order_by_asc(StockCol::Id)
        .lock(LockType::Update)
        .all(db)
        .await?
        .into_iter()
        .map(|record| StockSlot {
            record_id: record.id,
            quantity: record.quantity,
        })
        .collect();

    plan_withdrawal(&slots, quantity).map_err(|err| {
        AppError::validation(format!(
            "Insufficient stock for product {product_name}. Available: {}",
            err.available
        ))
    })
}

async fn apply_stock<C: ConnectionTrait>(db: &C, updates: &[StockUpdate]) -> AppResult<()> {
    for update in updates {
        stock_records::ActiveModel {
            id: Set(update.record_id),
            quantity: Set(update.quantity),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .update(db)
        .await?;
    }
    Ok(())
}

/// Staff-placed order: explicit user, address and items, decrementing
/// tracked stock in the same transaction.
async fn place(
    state: &AppState,
    staff: &AuthUser,
    user_id: Uuid,
    delivery_address: Value,
    items: &[DirectOrderItem],
    notes: Option<String>,
) -> AppResult<OrderWithItems> {
    validate_delivery_address(&delivery_address)?;
    if items.is_empty() {
        return Err(AppError::validation("itens must contain at least one item"));
    }

    let txn = state.orm.begin().await?;

    Users::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let merged = merge_items(items)?;
    let mut line_items = Vec::with_capacity(merged.len());
    for (product_id, quantity) in &merged {
        let product = Products::find_by_id(*product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {product_id}")))?;
        line_items.push(LineItem {
            product_id: product.id,
            product_name: product.name,
            quantity: *quantity,
            unit_price: product.price,
        });
    }
    let (lines, total) = price_lines(&line_items)?;

    let mut stock_updates = Vec::new();
    for item in &line_items {
        stock_updates
            .extend(reserve_stock(&txn, item.product_id, &item.product_name, item.quantity).await?);
    }

    let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    let (order, placed_items) =
        insert_order(&txn, user_id, total, delivery_address, notes, &lines).await?;
    apply_stock(&txn, &stock_updates).await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        user_id = %user_id,
        staff_id = %staff.user_id,
        %total,
        stock_records = stock_updates.len(),
        "order placed by staff"
    );

    publish_best_effort(
        state.notifier.as_ref(),
        OrderEvent::OrderCreated {
            order_id: order.id,
            user_id: order.user_id,
            total_amount: order.total_amount,
            status: order.status,
            created_by_staff: true,
        },
    );
    audit::record(
        &state.orm,
        staff.user_id,
        "order_place_direct",
        "orders",
        serde_json::json!({ "order_id": order.id, "user_id": user_id, "total": total }),
    )
    .await;

    Ok(reload_or_snapshot(&state.orm, order, placed_items, true).await)
}

pub async fn create_direct_order(
    state: &AppState,
    staff: &AuthUser,
    payload: DirectOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    validate_delivery_address(&payload.delivery_address)?;
    payload.validate()?;

    let order = place(
        state,
        staff,
        payload.user_id,
        payload.delivery_address,
        &payload.items,
        payload.notes,
    )
    .await?;
    Ok(ApiResponse::success("Order created", order, None))
}

/// Re-place an existing order's items at today's prices.
pub async fn duplicate_order(
    state: &AppState,
    staff: &AuthUser,
    id: Uuid,
    payload: DuplicateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let original = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;
    let items: Vec<DirectOrderItem> = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(original.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|item| DirectOrderItem {
            product_id: item.product_id,
            quantity: item.quantity,
        })
        .collect();

    let user_id = payload.user_id.unwrap_or(original.user_id);
    let address = payload
        .delivery_address
        .unwrap_or_else(|| original.delivery_address.clone());
    let notes = format!("Duplicated from order #{}", original.id);

    let order = place(state, staff, user_id, address, &items, Some(notes)).await?;
    Ok(ApiResponse::success("Order duplicated", order, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_products_are_merged() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let items = [
            DirectOrderItem { product_id: a, quantity: 2 },
            DirectOrderItem { product_id: b, quantity: 1 },
            DirectOrderItem { product_id: a, quantity: 3 },
        ];
        assert_eq!(merge_items(&items).unwrap(), vec![(a, 5), (b, 1)]);
    }

    #[test]
    fn merged_quantity_past_i32_max_is_a_validation_error() {
        let a = Uuid::new_v4();
        let items = [
            DirectOrderItem { product_id: a, quantity: i32::MAX },
            DirectOrderItem { product_id: a, quantity: 1 },
        ];
        assert!(matches!(merge_items(&items), Err(AppError::Validation(_))));
    }
}
