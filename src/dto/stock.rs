use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::StockRecord;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStockRequest {
    #[serde(rename = "produtoId")]
    pub product_id: Uuid,
    #[serde(rename = "quantidade")]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub quantity: i32,
    #[serde(rename = "localizacao", default)]
    #[validate(length(max = 100, message = "must have at most 100 characters"))]
    pub location: Option<String>,
    #[serde(rename = "dataReposicao", default)]
    pub restock_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStockRequest {
    #[serde(rename = "quantidade")]
    #[validate(
        required(message = "required"),
        range(min = 0, message = "must not be negative")
    )]
    pub quantity: Option<i32>,
    #[serde(rename = "localizacao", default)]
    #[validate(length(max = 100, message = "must have at most 100 characters"))]
    pub location: Option<String>,
    #[serde(rename = "dataReposicao", default)]
    pub restock_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockList {
    pub items: Vec<StockRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quantity_may_be_zero_but_not_negative() {
        let zero: CreateStockRequest =
            serde_json::from_value(json!({ "produtoId": Uuid::new_v4(), "quantidade": 0 })).unwrap();
        assert!(zero.validate().is_ok());

        let negative: CreateStockRequest =
            serde_json::from_value(json!({ "produtoId": Uuid::new_v4(), "quantidade": -3 }))
                .unwrap();
        assert!(negative.validate().is_err());
    }

    #[test]
    fn update_requires_quantity() {
        let req: UpdateStockRequest =
            serde_json::from_value(json!({ "localizacao": "Freezer 2" })).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("quantity"));
    }
}
