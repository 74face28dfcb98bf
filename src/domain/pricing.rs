use rust_decimal::Decimal;
use uuid::Uuid;

/// A line of an order before it is persisted: what was asked for and what
/// the product costs right now.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Product {0} has no price defined")]
    MissingPrice(String),
    #[error("Quantity for product {0} must be greater than 0")]
    InvalidQuantity(String),
    #[error("Order has no items")]
    Empty,
}

/// A line whose price has been checked; safe to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl PricedLine {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Freeze unit prices and compute `Σ quantity × unit_price`.
pub fn price_lines(items: &[LineItem]) -> Result<(Vec<PricedLine>, Decimal), PricingError> {
    if items.is_empty() {
        return Err(PricingError::Empty);
    }

    let mut lines = Vec::with_capacity(items.len());
    let mut total = Decimal::ZERO;
    for item in items {
        if item.quantity <= 0 {
            return Err(PricingError::InvalidQuantity(item.product_name.clone()));
        }
        let unit_price = item
            .unit_price
            .ok_or_else(|| PricingError::MissingPrice(item.product_name.clone()))?;
        let line = PricedLine {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price,
        };
        total += line.subtotal();
        lines.push(line);
    }

    Ok((lines, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn item(name: &str, quantity: i32, price: Option<Decimal>) -> LineItem {
        LineItem {
            product_id: Uuid::new_v4(),
            product_name: name.to_string(),
            quantity,
            unit_price: price,
        }
    }

    #[test]
    fn sums_quantity_times_unit_price() {
        let items = vec![
            item("Sorvete de Morango", 2, Some(d("10.00"))),
            item("Picolé de Limão", 1, Some(d("5.00"))),
        ];
        let (lines, total) = price_lines(&items).unwrap();
        assert_eq!(total, d("25.00"));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn keeps_cents_exact() {
        let items = vec![item("Casquinha", 3, Some(d("0.10")))];
        let (_, total) = price_lines(&items).unwrap();
        assert_eq!(total, d("0.30"));
    }

    #[test]
    fn rejects_product_without_price() {
        let items = vec![
            item("Açaí", 1, Some(d("12.50"))),
            item("Sabor do Mês", 1, None),
        ];
        assert_eq!(
            price_lines(&items),
            Err(PricingError::MissingPrice("Sabor do Mês".into()))
        );
    }

    #[test]
    fn rejects_empty_and_non_positive_quantities() {
        assert_eq!(price_lines(&[]), Err(PricingError::Empty));
        let items = vec![item("Milkshake", 0, Some(d("15.00")))];
        assert!(matches!(
            price_lines(&items),
            Err(PricingError::InvalidQuantity(_))
        ));
    }
}
