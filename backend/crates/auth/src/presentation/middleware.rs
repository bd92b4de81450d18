//! Auth Middleware
//!
//! Bearer-token guards for protected routes.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::Response;
use platform::token::{SessionClaims, TokenSigner};

use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

const BEARER_PREFIX: &str = "Bearer ";

/// Requires a valid `Authorization: Bearer <token>` header.
///
/// The validated [`SessionClaims`] are stored in request extensions.
pub async fn require_auth(
    State(signer): State<Arc<TokenSigner>>,
    mut req: Request<Body>,
    next: Next,
) -> AuthResult<Response> {
    let token = bearer_token(req.headers()).ok_or(AuthError::MissingToken)?;
    let claims = signer.validate(token)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Requires the claims set by [`require_auth`] to carry the admin role.
pub async fn require_admin(req: Request<Body>, next: Next) -> AuthResult<Response> {
    let claims = req
        .extensions()
        .get::<SessionClaims>()
        .ok_or(AuthError::MissingToken)?;

    if !UserRole::from_code(&claims.role).is_admin() {
        tracing::warn!(user_id = %claims.user_id, "Admin route denied");
        return Err(AuthError::AdminRequired);
    }

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
