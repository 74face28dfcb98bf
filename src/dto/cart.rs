use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddToCartRequest {
    #[serde(rename = "produtoId")]
    pub product_id: Uuid,
    #[serde(rename = "quantidade", default = "one")]
    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCartItemRequest {
    #[serde(rename = "quantidade")]
    #[validate(range(min = 1, message = "must be greater than 0"))]
    pub quantity: i32,
}

fn one() -> i32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_defaults_to_one() {
        let req: AddToCartRequest =
            serde_json::from_value(serde_json::json!({ "produtoId": Uuid::nil() })).unwrap();
        assert_eq!(req.quantity, 1);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn zero_quantity_is_invalid() {
        let req = UpdateCartItemRequest { quantity: 0 };
        assert!(req.validate().is_err());
    }
}
