//! Authentication middleware and role extractors for Axum

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::domain::UserRole;
use crate::infrastructure::crypto::jwt::{verify_token, Claims, JwtConfig};
use crate::interfaces::http::common::ApiError;

const MISSING_TOKEN: &str = "Missing token";
const INVALID_TOKEN: &str = "Invalid or expired token";
const ADMIN_ONLY: &str = "Admin only";

/// Authenticated caller, taken from verified JWT claims
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id(),
            name: claims.name.clone(),
            email: claims.email.clone(),
            role: claims.role(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// `Bearer <token>`, or the bare token when the prefix is missing
fn extract_token(auth_header: &str) -> Option<&str> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .unwrap_or(auth_header)
        .trim();
    (!token.is_empty()).then_some(token)
}

/// JWT authentication middleware.
///
/// On success the [`AuthenticatedUser`] is stored in the request
/// extensions for the extractors below.
pub async fn auth_middleware(
    State(jwt_config): State<JwtConfig>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_token)
        .map(str::to_string);

    let Some(token) = token else {
        return ApiError::unauthorized(MISSING_TOKEN).into_response();
    };

    match verify_token(&token, &jwt_config) {
        Ok(claims) => {
            request
                .extensions_mut()
                .insert(AuthenticatedUser::from_claims(&claims));
            next.run(request).await
        }
        Err(e) => {
            debug!("Rejected token: {}", e);
            ApiError::unauthorized(INVALID_TOKEN).into_response()
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))
    }
}

/// Extractor that only admits callers with the `admin` role (403 otherwise)
#[derive(Clone, Debug)]
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::forbidden(ADMIN_ONLY));
        }
        Ok(RequireAdmin(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_prefix_is_optional() {
        assert_eq!(extract_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_token("abc.def"), Some("abc.def"));
        assert_eq!(extract_token("Bearer "), None);
        assert_eq!(extract_token(""), None);
    }
}
