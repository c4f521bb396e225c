use axum::{
    extract::{FromRef, FromRequestParts},
    http::header,
};
use uuid::Uuid;

use crate::{domain::UserRole, error::AppError, security::decode_access_token, state::AppState};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

pub fn ensure_role(user: &AuthUser, role: UserRole) -> Result<(), AppError> {
    ensure_any_role(user, &[role])
}

pub fn ensure_any_role(user: &AuthUser, roles: &[UserRole]) -> Result<(), AppError> {
    if !roles.contains(&user.role) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, UserRole::Admin)
}

/// Resolves a bearer token into the caller's identity.
pub fn authenticate(secret: &str, token: &str) -> Result<AuthUser, AppError> {
    let claims = decode_access_token(secret, token)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;
    let role = UserRole::parse(&claims.role)
        .ok_or_else(|| AppError::Unauthorized("Invalid role in token".into()))?;
    Ok(AuthUser { user_id, role })
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?
            .trim();

        let app_state = AppState::from_ref(state);
        authenticate(&app_state.config.jwt_secret, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::issue_access_token;

    #[test]
    fn role_guards() {
        let driver = AuthUser {
            user_id: Uuid::new_v4(),
            role: UserRole::Delivery,
        };
        assert!(ensure_role(&driver, UserRole::Delivery).is_ok());
        assert!(matches!(ensure_admin(&driver), Err(AppError::Forbidden)));
        assert!(ensure_any_role(&driver, &[UserRole::Admin, UserRole::Delivery]).is_ok());
    }

    #[test]
    fn authenticate_reads_subject_and_role() {
        let id = Uuid::new_v4();
        let token = issue_access_token("s3cret", id, UserRole::Admin, 5).unwrap();
        let user = authenticate("s3cret", &token).unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.role, UserRole::Admin);
        assert!(authenticate("other", &token).is_err());
    }
}
