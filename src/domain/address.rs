use serde_json::Value;

use crate::error::AppError;

/// A delivery address is a structured object with at least one field.
/// Strings, arrays and `{}` are rejected.
pub fn validate_delivery_address(address: &Value) -> Result<(), AppError> {
    match address {
        Value::Object(fields) if !fields.is_empty() => Ok(()),
        _ => Err(AppError::validation(
            "Delivery address is required and must be a non-empty object",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_structured_address() {
        let address = json!({ "rua": "Av. Paulista", "numero": "1000", "cidade": "São Paulo" });
        assert!(validate_delivery_address(&address).is_ok());
    }

    #[test]
    fn rejects_empty_or_unstructured_address() {
        for address in [json!({}), json!(null), json!("Rua A, 10"), json!([]), json!(42)] {
            assert!(
                matches!(validate_delivery_address(&address), Err(AppError::Validation(_))),
                "{address} should be rejected"
            );
        }
    }
}
