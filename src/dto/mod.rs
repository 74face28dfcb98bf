pub mod cart;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod sales;
pub mod stock;
pub mod users;

use rust_decimal::Decimal;
use validator::ValidationError;

pub(crate) fn non_negative_money(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative").with_message("must not be negative".into()));
    }
    Ok(())
}
