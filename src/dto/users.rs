use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{domain::Role, models::User};

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct RegisterRequest {
    #[serde(rename = "nome")]
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[validate(email(message = "invalid e-mail"))]
    pub email: String,
    #[serde(rename = "telefone", default)]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[serde(rename = "senha")]
    #[validate(length(min = 6, message = "must have at least 6 characters"))]
    pub password: String,
}

/// Registration through the admin panel, which may pick the role.
#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct AdminCreateUserRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub user: RegisterRequest,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "usuario")]
    pub user: User,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
}

/// Present fields overwrite; absent fields keep the stored value.
#[derive(Deserialize, Debug, Default, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(rename = "nome")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "invalid e-mail"))]
    pub email: Option<String>,
    /// An empty string clears the phone.
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    #[serde(rename = "senha")]
    #[validate(length(min = 6, message = "must have at least 6 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
}

#[derive(Deserialize, Debug, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[serde(rename = "novaSenha")]
    #[validate(length(min = 6, message = "must have at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PasswordChanged {
    #[serde(rename = "userId")]
    pub user_id: uuid::Uuid,
}

/// Brazilian phone numbers: DDD plus eight or nine digits, digits only.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.len() == 11 && phone.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("phone").with_message("must contain exactly 11 digits".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(phone: Option<&str>, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Maria".into(),
            email: "maria@example.com".into(),
            phone: phone.map(str::to_string),
            password: password.into(),
        }
    }

    #[test]
    fn phone_must_have_eleven_digits() {
        assert!(validate_phone("11987654321").is_ok());
        assert!(validate_phone("1198765432").is_err());
        assert!(validate_phone("(11)98765-4321").is_err());
    }

    #[test]
    fn registration_rules() {
        assert!(register(Some("11987654321"), "segredo").validate().is_ok());
        assert!(register(None, "segredo").validate().is_ok());
        assert!(register(Some("123"), "segredo").validate().is_err());
        assert!(register(None, "12345").validate().is_err());
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(UpdateUserRequest::default().validate().is_ok());
        let blank_name = UpdateUserRequest {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(blank_name.validate().is_err());
    }
}
