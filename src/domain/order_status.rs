use std::{fmt, str::FromStr};

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of an order.
///
/// ```text
/// pendente -> processando | enviado | entregue | cancelado
/// processando -> enviado | cancelado
/// enviado -> entregue | cancelado
/// ```
///
/// `entregue` and `cancelado` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pendente")]
    Pendente,
    #[sea_orm(string_value = "processando")]
    Processando,
    #[sea_orm(string_value = "enviado")]
    Enviado,
    #[sea_orm(string_value = "entregue")]
    Entregue,
    #[sea_orm(string_value = "cancelado")]
    Cancelado,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pendente,
        OrderStatus::Processando,
        OrderStatus::Enviado,
        OrderStatus::Entregue,
        OrderStatus::Cancelado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pendente => "pendente",
            OrderStatus::Processando => "processando",
            OrderStatus::Enviado => "enviado",
            OrderStatus::Entregue => "entregue",
            OrderStatus::Cancelado => "cancelado",
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match self {
            Pendente => matches!(next, Processando | Enviado | Entregue | Cancelado),
            Processando => matches!(next, Enviado | Cancelado),
            Enviado => matches!(next, Entregue | Cancelado),
            Entregue | Cancelado => false,
        }
    }

    /// Owners may only withdraw an order nobody has started working on.
    pub fn is_self_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pendente)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid order status: {0}")]
pub struct InvalidStatus(pub String);

impl FromStr for OrderStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}
