use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::non_negative_money;
use crate::models::SaleRecord;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSaleRequest {
    #[serde(rename = "produtoId")]
    #[validate(required(message = "required"))]
    pub product_id: Option<Uuid>,
    /// Defaults to the product's current name.
    #[serde(rename = "nomeProduto", default)]
    pub product_name: Option<String>,
    #[serde(rename = "quantidade")]
    #[validate(
        required(message = "required"),
        range(min = 1, message = "must be greater than 0")
    )]
    pub quantity: Option<i32>,
    #[serde(rename = "precoUnitario")]
    #[validate(required(message = "required"), custom(function = "non_negative_money"))]
    pub unit_price: Option<Decimal>,
    #[serde(rename = "dataVenda")]
    #[validate(required(message = "required"))]
    pub sale_date: Option<DateTime<Utc>>,
    #[serde(rename = "pedidoId")]
    #[validate(required(message = "required"))]
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSaleRequest {
    #[serde(rename = "produtoId")]
    pub product_id: Option<Uuid>,
    #[serde(rename = "nomeProduto")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub product_name: Option<String>,
    #[serde(rename = "quantidade")]
    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub quantity: Option<i32>,
    #[serde(rename = "precoUnitario")]
    #[validate(custom(function = "non_negative_money"))]
    pub unit_price: Option<Decimal>,
    #[serde(rename = "dataVenda")]
    pub sale_date: Option<DateTime<Utc>>,
    #[serde(rename = "pedidoId")]
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleList {
    pub items: Vec<SaleRecord>,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct TopSellingProduct {
    #[serde(rename = "produtoId")]
    pub product_id: Uuid,
    #[serde(rename = "nomeProduto")]
    pub product_name: String,
    #[serde(rename = "quantidadeVendida")]
    pub quantity_sold: i64,
    #[serde(rename = "receita")]
    pub revenue: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesStats {
    #[serde(rename = "totalVendas")]
    pub sale_count: i64,
    #[serde(rename = "itensVendidos")]
    pub items_sold: i64,
    #[serde(rename = "receitaTotal")]
    pub revenue: Decimal,
    #[serde(rename = "produtosMaisVendidos")]
    pub top_products: Vec<TopSellingProduct>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_requires_every_reference() {
        let req: CreateSaleRequest = serde_json::from_value(json!({
            "produtoId": Uuid::new_v4(),
            "quantidade": 2
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("unit_price"));
        assert!(fields.contains_key("sale_date"));
        assert!(fields.contains_key("order_id"));
        assert!(!fields.contains_key("product_name"));
    }

    #[test]
    fn negative_price_is_rejected() {
        let req = UpdateSaleRequest {
            unit_price: Some(Decimal::new(-100, 2)),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
