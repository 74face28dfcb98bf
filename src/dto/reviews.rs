use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::Review;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    #[serde(rename = "produtoId")]
    #[validate(required(message = "required"))]
    pub product_id: Option<Uuid>,
    #[serde(rename = "nota")]
    #[validate(
        required(message = "required"),
        range(min = 1, max = 5, message = "must be between 1 and 5")
    )]
    pub rating: Option<i32>,
    #[serde(rename = "comentario", default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReviewRequest {
    #[serde(rename = "nota")]
    #[validate(
        required(message = "required"),
        range(min = 1, max = 5, message = "must be between 1 and 5")
    )]
    pub rating: Option<i32>,
    /// Absent keeps the current comment.
    #[serde(rename = "comentario", default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewList {
    pub items: Vec<Review>,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct RatingCount {
    #[serde(rename = "nota")]
    pub rating: i32,
    #[serde(rename = "quantidade")]
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create(rating: serde_json::Value) -> CreateReviewRequest {
        serde_json::from_value(json!({
            "produtoId": Uuid::new_v4(),
            "nota": rating,
            "comentario": "Muito bom"
        }))
        .unwrap()
    }

    #[test]
    fn rating_must_be_between_one_and_five() {
        for ok in 1..=5 {
            assert!(create(json!(ok)).validate().is_ok(), "nota {ok}");
        }
        for bad in [0, 6, -1] {
            let errors = create(json!(bad)).validate().unwrap_err();
            assert!(errors.field_errors().contains_key("rating"), "nota {bad}");
        }
    }

    #[test]
    fn rating_is_required() {
        let req: CreateReviewRequest =
            serde_json::from_value(json!({ "produtoId": Uuid::new_v4() })).unwrap();
        assert!(req.validate().is_err());
    }
}
