use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Order, OrderItem, UserSummary};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    #[serde(rename = "enderecoEntrega", default)]
    #[schema(value_type = Object)]
    pub delivery_address: Value,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// Admin edit. Status here bypasses the lifecycle rules.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EditOrderRequest {
    #[serde(rename = "enderecoEntrega")]
    #[schema(value_type = Option<Object>)]
    pub delivery_address: Option<Value>,
    pub status: Option<String>,
    #[serde(rename = "observacoes")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct DirectOrderItem {
    #[serde(rename = "produtoId")]
    pub product_id: Uuid,
    #[serde(rename = "quantidade")]
    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DirectOrderRequest {
    #[serde(rename = "usuarioId")]
    pub user_id: Uuid,
    #[serde(rename = "enderecoEntrega", default)]
    #[schema(value_type = Object)]
    pub delivery_address: Value,
    #[serde(rename = "itens", default)]
    #[validate(length(min = 1, message = "at least one item is required"), nested)]
    pub items: Vec<DirectOrderItem>,
    #[serde(rename = "observacoes", default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DuplicateOrderRequest {
    #[serde(rename = "usuarioId")]
    pub user_id: Option<Uuid>,
    #[serde(rename = "enderecoEntrega")]
    #[schema(value_type = Option<Object>)]
    pub delivery_address: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    #[serde(rename = "pedido")]
    pub order: Order,
    #[serde(rename = "itens")]
    pub items: Vec<OrderItem>,
    #[serde(rename = "usuario", skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderWithItems>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direct_order_requires_items_with_positive_quantity() {
        let empty: DirectOrderRequest = serde_json::from_value(json!({
            "usuarioId": Uuid::new_v4(),
            "enderecoEntrega": { "rua": "A" },
            "itens": []
        }))
        .unwrap();
        assert!(empty.validate().is_err());

        let zero: DirectOrderRequest = serde_json::from_value(json!({
            "usuarioId": Uuid::new_v4(),
            "enderecoEntrega": { "rua": "A" },
            "itens": [{ "produtoId": Uuid::new_v4(), "quantidade": 0 }]
        }))
        .unwrap();
        assert!(zero.validate().is_err());

        let ok: DirectOrderRequest = serde_json::from_value(json!({
            "usuarioId": Uuid::new_v4(),
            "enderecoEntrega": { "rua": "A" },
            "itens": [{ "produtoId": Uuid::new_v4(), "quantidade": 2 }]
        }))
        .unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn missing_address_deserializes_as_null() {
        let req: PlaceOrderRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.delivery_address.is_null());
    }
}
