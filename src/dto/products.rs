use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::{dto::non_negative_money, models::Product};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[serde(rename = "nome")]
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    /// A product without a price is listed but cannot be sold.
    #[serde(rename = "preco", default)]
    #[validate(custom(function = "non_negative_money"))]
    pub price: Option<Decimal>,
    #[serde(rename = "imagemUrl", default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[serde(rename = "nome")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "preco")]
    #[validate(custom(function = "non_negative_money"))]
    pub price: Option<Decimal>,
    #[serde(rename = "imagemUrl")]
    pub image_url: Option<String>,
}

/// One line of a CSV import, already split into fields by the client.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BulkProductRow {
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    /// Number or numeric string.
    #[serde(rename = "preco", default)]
    #[schema(value_type = Option<String>)]
    pub price: Option<Value>,
    #[serde(rename = "imagemUrl", default)]
    pub image_url: Option<String>,
}

impl BulkProductRow {
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Nome não informado")
            .to_string()
    }

    /// Imported rows must carry a name and a numeric, non-negative price.
    pub fn into_request(self) -> Result<CreateProductRequest, String> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| "Nome é obrigatório".to_string())?
            .to_string();

        let price = match &self.price {
            Some(Value::Number(n)) => n.to_string().parse::<Decimal>().ok(),
            Some(Value::String(s)) => s.trim().replace(',', ".").parse::<Decimal>().ok(),
            _ => None,
        }
        .ok_or_else(|| "Preço deve ser um número válido".to_string())?;
        if price.is_sign_negative() && !price.is_zero() {
            return Err("Preço não pode ser negativo".to_string());
        }

        let trimmed = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };

        Ok(CreateProductRequest {
            name,
            description: trimmed(self.description),
            price: Some(price.round_dp(2)),
            image_url: trimmed(self.image_url),
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkCreateRequest {
    #[serde(rename = "produtos", default)]
    pub products: Vec<BulkProductRow>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkSuccess {
    #[serde(rename = "linha")]
    pub line: usize,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "produto")]
    pub product: Product,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkFailure {
    #[serde(rename = "linha")]
    pub line: usize,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "erro")]
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkResult {
    #[serde(rename = "sucessos")]
    pub successes: Vec<BulkSuccess>,
    #[serde(rename = "erros")]
    pub failures: Vec<BulkFailure>,
    pub total: usize,
}

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_wire_names() {
        let req: CreateProductRequest = serde_json::from_value(serde_json::json!({
            "nome": "Sorvete de Flocos",
            "descricao": "Pote 1L",
            "preco": 24.9,
            "imagemUrl": "/img/flocos.png"
        }))
        .unwrap();
        assert_eq!(req.name, "Sorvete de Flocos");
        assert_eq!(req.price, Some("24.9".parse().unwrap()));
        assert!(req.validate().is_ok());
    }

    fn row(value: serde_json::Value) -> BulkProductRow {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn bulk_rows_need_name_and_numeric_price() {
        let ok = row(serde_json::json!({ "nome": " Picolé ", "preco": "4,50" }))
            .into_request()
            .unwrap();
        assert_eq!(ok.name, "Picolé");
        assert_eq!(ok.price, Some("4.50".parse().unwrap()));

        let numeric = row(serde_json::json!({ "nome": "Casquinha", "preco": 7 }))
            .into_request()
            .unwrap();
        assert_eq!(numeric.price, Some(Decimal::from(7)));

        let nameless = row(serde_json::json!({ "preco": 3 }));
        assert_eq!(nameless.display_name(), "Nome não informado");
        assert_eq!(nameless.into_request().unwrap_err(), "Nome é obrigatório");

        let bad_price = row(serde_json::json!({ "nome": "Açaí", "preco": "abc" }));
        assert!(bad_price.into_request().is_err());
        assert!(row(serde_json::json!({ "nome": "Açaí" })).into_request().is_err());
    }

    #[test]
    fn rejects_blank_name_and_negative_price() {
        let req = CreateProductRequest {
            name: String::new(),
            description: None,
            price: Some("-1".parse().unwrap()),
            image_url: None,
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("price"));
    }
}
