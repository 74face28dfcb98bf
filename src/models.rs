use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{OrderStatus, Role},
    entity::{cart_items, order_items, orders, products, reviews, sale_records, stock_records, users},
};

/// Public view of a user. The password hash never leaves the service layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    #[serde(rename = "preco")]
    pub price: Option<Decimal>,
    #[serde(rename = "imagemUrl")]
    pub image_url: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "preco")]
    pub price: Option<Decimal>,
    #[serde(rename = "imagemUrl")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    #[serde(rename = "produtoId")]
    pub product_id: Uuid,
    #[serde(rename = "quantidade")]
    pub quantity: i32,
    #[serde(rename = "precoUnitario")]
    pub unit_price: Decimal,
    #[serde(rename = "produto")]
    pub product: Option<ProductSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    #[serde(rename = "usuarioId")]
    pub user_id: Uuid,
    #[serde(rename = "itens")]
    pub items: Vec<CartItem>,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    #[serde(rename = "usuarioId")]
    pub user_id: Uuid,
    #[serde(rename = "valorTotal")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    #[serde(rename = "enderecoEntrega")]
    #[schema(value_type = Object)]
    pub delivery_address: Value,
    #[serde(rename = "observacoes")]
    pub notes: Option<String>,
    #[serde(rename = "dataPedido")]
    pub ordered_at: DateTime<Utc>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    #[serde(rename = "pedidoId")]
    pub order_id: Uuid,
    #[serde(rename = "produtoId")]
    pub product_id: Uuid,
    #[serde(rename = "quantidade")]
    pub quantity: i32,
    #[serde(rename = "precoUnitario")]
    pub unit_price: Decimal,
    #[serde(rename = "produto")]
    pub product: Option<ProductSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    #[serde(rename = "usuarioId")]
    pub user_id: Uuid,
    #[serde(rename = "produtoId")]
    pub product_id: Uuid,
    #[serde(rename = "nota")]
    pub rating: i32,
    #[serde(rename = "comentario")]
    pub comment: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "usuario", skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(rename = "produto", skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockRecord {
    pub id: Uuid,
    #[serde(rename = "produtoId")]
    pub product_id: Uuid,
    #[serde(rename = "quantidade")]
    pub quantity: i32,
    #[serde(rename = "localizacao")]
    pub location: Option<String>,
    #[serde(rename = "dataReposicao")]
    pub restock_date: Option<DateTime<Utc>>,
    #[serde(rename = "produto", skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaleRecord {
    pub id: Uuid,
    #[serde(rename = "produtoId")]
    pub product_id: Uuid,
    #[serde(rename = "nomeProduto")]
    pub product_name: String,
    #[serde(rename = "quantidade")]
    pub quantity: i32,
    #[serde(rename = "precoUnitario")]
    pub unit_price: Decimal,
    #[serde(rename = "dataVenda")]
    pub sale_date: DateTime<Utc>,
    #[serde(rename = "pedidoId")]
    pub order_id: Uuid,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<&users::Model> for UserSummary {
    fn from(model: &users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            email: model.email.clone(),
            phone: model.phone.clone(),
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            image_url: model.image_url,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<&products::Model> for ProductSummary {
    fn from(model: &products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            price: model.price,
            image_url: model.image_url.clone(),
        }
    }
}

impl CartItem {
    pub fn from_entity(model: cart_items::Model, product: Option<&products::Model>) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            product: product.map(ProductSummary::from),
        }
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            total_amount: model.total_amount,
            status: model.status,
            delivery_address: model.delivery_address,
            notes: model.notes,
            ordered_at: model.ordered_at.with_timezone(&Utc),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl OrderItem {
    pub fn from_entity(model: order_items::Model, product: Option<&products::Model>) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            product: product.map(ProductSummary::from),
        }
    }
}

impl Review {
    pub fn from_entity(
        model: reviews::Model,
        user: Option<&users::Model>,
        product: Option<&products::Model>,
    ) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
            user: user.map(UserSummary::from),
            product: product.map(ProductSummary::from),
        }
    }
}

impl StockRecord {
    pub fn from_entity(model: stock_records::Model, product: Option<&products::Model>) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            quantity: model.quantity,
            location: model.location,
            restock_date: model.restock_date.map(|dt| dt.with_timezone(&Utc)),
            product: product.map(ProductSummary::from),
        }
    }
}

impl From<sale_records::Model> for SaleRecord {
    fn from(model: sale_records::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            product_name: model.product_name,
            quantity: model.quantity,
            unit_price: model.unit_price,
            sale_date: model.sale_date.with_timezone(&Utc),
            order_id: model.order_id,
        }
    }
}
