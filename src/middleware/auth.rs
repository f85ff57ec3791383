use crate::{
    error::AppError,
    models::{user, User},
    utils::JwtService,
};
use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
    Extension,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// The authenticated caller, resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

/// JWT authentication middleware
///
/// Verifies the bearer token, checks the account still exists and is not
/// soft-deleted, and adds the caller to the request extensions.
pub async fn auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    Extension(jwt): Extension<JwtService>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers).ok_or(AppError::Unauthorized)?;

    let claims = jwt
        .decode_token(&token)
        .map_err(|_| AppError::Unauthorized)?;
    let user_id = claims.user_id().ok_or(AppError::Unauthorized)?;

    let user = User::find_by_id(user_id)
        .filter(user::Column::Deleted.eq(false))
        .one(&db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        username: user.username,
    });

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, HeaderValue};

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer abc.def.ghi")).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn other_schemes_are_ignored() {
        assert!(extract_bearer_token(&headers_with("Basic dXNlcjpwYXNz")).is_none());
    }

    #[test]
    fn empty_bearer_is_ignored() {
        assert!(extract_bearer_token(&headers_with("Bearer ")).is_none());
        assert!(extract_bearer_token(&HeaderMap::new()).is_none());
    }
}
