use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    domain::Role,
    error::AppError,
    middleware::auth::AuthUser,
    state::AppState,
};

/// A named set of roles allowed through a route.
pub trait RoleGate: Send + Sync + 'static {
    fn allows(role: Role) -> bool;
}

/// admin or operador.
pub struct StaffOnly;

impl RoleGate for StaffOnly {
    fn allows(role: Role) -> bool {
        role.is_staff()
    }
}

pub struct AdminOnly;

impl RoleGate for AdminOnly {
    fn allows(role: Role) -> bool {
        role.is_admin()
    }
}

/// Extractor that authenticates the caller and rejects roles outside `G`
/// before the handler body runs.
pub struct RequireRole<G: RoleGate>(pub AuthUser, pub PhantomData<G>);

impl<G, S> FromRequestParts<S> for RequireRole<G>
where
    G: RoleGate,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !G::allows(user.role) {
            tracing::debug!(user_id = %user.user_id, role = %user.role, "role gate rejected request");
            return Err(AppError::Forbidden);
        }
        Ok(RequireRole(user, PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gates_admit_expected_roles() {
        assert!(StaffOnly::allows(Role::Admin));
        assert!(StaffOnly::allows(Role::Operador));
        assert!(!StaffOnly::allows(Role::Cliente));
        assert!(AdminOnly::allows(Role::Admin));
        assert!(!AdminOnly::allows(Role::Operador));
    }
}
