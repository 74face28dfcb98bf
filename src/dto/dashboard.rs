use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::OrderStatus;

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: OrderStatus,
    #[serde(rename = "quantidade")]
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct TopOrderedProduct {
    #[serde(rename = "produtoId")]
    pub product_id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "quantidadePedida")]
    pub quantity_ordered: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    #[serde(rename = "totalPedidos")]
    pub order_count: i64,
    #[serde(rename = "receitaTotal")]
    pub revenue: Decimal,
    #[serde(rename = "pedidosPorStatus")]
    pub orders_by_status: Vec<StatusCount>,
    #[serde(rename = "produtosMaisPedidos")]
    pub top_products: Vec<TopOrderedProduct>,
    #[serde(rename = "totalClientes")]
    pub customer_count: i64,
}
