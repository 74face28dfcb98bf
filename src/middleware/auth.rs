use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{
    domain::Role,
    dto::users::Claims,
    error::AppError,
    state::AppState,
};

/// Identity resolved from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Owner of the resource or any staff member.
    pub fn ensure_owner_or_staff(&self, owner_id: Uuid) -> Result<(), AppError> {
        if self.user_id == owner_id || self.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn ensure_self_or_admin(&self, user_id: Uuid) -> Result<(), AppError> {
        if self.user_id == user_id || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role,
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(*user);
        }

        let app_state = AppState::from_ref(state);
        let user = decode_token(bearer_token(parts)?, &app_state.config.jwt_secret)?;
        parts.extensions.insert(user);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth_service::issue_token;

    #[test]
    fn issued_tokens_decode_to_the_same_identity() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, Role::Operador, "segredo-de-teste", 1).unwrap();
        let user = decode_token(&token, "segredo-de-teste").unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.role, Role::Operador);
        assert!(user.is_staff());
        assert!(!user.is_admin());
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = issue_token(Uuid::new_v4(), Role::Cliente, "um", 1).unwrap();
        let err = decode_token(&token, "outro").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn ownership_checks() {
        let owner = Uuid::new_v4();
        let cliente = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Cliente,
        };
        let operador = AuthUser {
            user_id: Uuid::new_v4(),
            role: Role::Operador,
        };
        assert!(matches!(
            cliente.ensure_owner_or_staff(owner),
            Err(AppError::Forbidden)
        ));
        assert!(operador.ensure_owner_or_staff(owner).is_ok());
        assert!(operador.ensure_self_or_admin(owner).is_err());
        assert!(cliente.ensure_self_or_admin(cliente.user_id).is_ok());
    }
}
