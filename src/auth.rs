use axum::{
    extract::{FromRef, FromRequestParts, Request},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::errors::ErrorKind;

use crate::{
    error::ApiError,
    token::{Identity, TokenError, TokenService},
};

/// AuthUser Extractor Result
///
/// The verified identity of the caller. Handlers receive it as an argument and
/// pass the inner [`Identity`] to the services for ownership checks.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

/// AuthUser Extractor Implementation
///
/// 1. Reuse: if `require_auth` already verified this request, take its result.
/// 2. Token Extraction: `Authorization: Bearer <token>`.
/// 3. Verification: signature and expiry via the [`TokenService`].
///
/// Rejection: `Unauthenticated` (401) when the header is absent, `Forbidden` (403)
/// when it is present but malformed, tampered with or expired. No database is
/// consulted; the token alone carries the identity.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| ApiError::Unauthenticated("Missing token".to_string()))?;

        let token = header_value
            .to_str()
            .ok()
            .and_then(|value| {
                value
                    .strip_prefix("Bearer ")
                    .or_else(|| value.strip_prefix("bearer "))
            })
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(invalid_token)?;

        let tokens = TokenService::from_ref(state);
        let claims = tokens.verify(token).map_err(|err| {
            match &err {
                TokenError::InvalidToken(inner)
                    if matches!(inner.kind(), ErrorKind::ExpiredSignature) =>
                {
                    tracing::debug!("rejected expired token");
                }
                other => tracing::debug!("rejected token: {}", other),
            }
            invalid_token()
        })?;

        Ok(AuthUser(claims.identity()))
    }
}

fn invalid_token() -> ApiError {
    ApiError::Forbidden("Invalid token".to_string())
}

/// require_auth
///
/// Route layer for the authenticated router. Extracting `AuthUser` rejects the
/// request before it reaches a handler; on success the identity is stored in the
/// request extensions so the handler's own extractor does not verify twice.
pub async fn require_auth(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}
