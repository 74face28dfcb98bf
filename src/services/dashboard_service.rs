use rust_decimal::Decimal;

use crate::{
    domain::{OrderStatus, Role},
    dto::dashboard::{DashboardSummary, StatusCount, TopOrderedProduct},
    error::AppResult,
    response::ApiResponse,
    state::AppState,
};

const TOP_PRODUCTS: i64 = 5;

/// Read-only aggregates over orders, items and users.
pub async fn summary(state: &AppState) -> AppResult<ApiResponse<DashboardSummary>> {
    let (order_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(&state.pool)
        .await?;

    let (revenue,): (Decimal,) = sqlx::query_as(
        "SELECT COALESCE(SUM(total_amount), 0)::NUMERIC(12, 2) FROM orders WHERE status <> $1",
    )
    .bind(OrderStatus::Cancelado.as_str())
    .fetch_one(&state.pool)
    .await?;

    let per_status: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status")
            .fetch_all(&state.pool)
            .await?;
    // Every status is reported, including the ones with no orders.
    let orders_by_status = OrderStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: per_status
                .iter()
                .find(|(name, _)| name == status.as_str())
                .map(|(_, count)| *count)
                .unwrap_or(0),
        })
        .collect();

    let top_products = sqlx::query_as::<_, TopOrderedProduct>(
        r#"
        SELECT p.id AS product_id,
               p.name AS name,
               SUM(oi.quantity)::BIGINT AS quantity_ordered
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        JOIN products p ON p.id = oi.product_id
        WHERE o.status <> $1
        GROUP BY p.id, p.name
        ORDER BY quantity_ordered DESC, p.name ASC
        LIMIT $2
        "#,
    )
    .bind(OrderStatus::Cancelado.as_str())
    .bind(TOP_PRODUCTS)
    .fetch_all(&state.pool)
    .await?;

    let (customer_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = $1")
        .bind(Role::Cliente.as_str())
        .fetch_one(&state.pool)
        .await?;

    Ok(ApiResponse::success(
        "Dashboard summary",
        DashboardSummary {
            order_count,
            revenue,
            orders_by_status,
            top_products,
            customer_count,
        },
        None,
    ))
}
