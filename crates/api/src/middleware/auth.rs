//! Authentication extractors.
//!
//! Requests authenticate with an `Authorization: Token <key>` header; the
//! key is resolved against the token store on every request.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Extractor that requires an authenticated account.
///
/// Rejects with 401 when the header is missing, malformed, or names an
/// unknown token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized("Authentication credentials were not provided.".to_owned())
            })?;

        let token = parse_token_header(header).ok_or_else(|| {
            AppError::Unauthorized("Invalid authorization header.".to_owned())
        })?;

        let user = UserRepository::new(state.pool())
            .get_by_token(token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid token.".to_owned()))?;

        Ok(Self(user))
    }
}

/// Extract the key from an `Authorization: Token <key>` header value.
fn parse_token_header(header: &str) -> Option<&str> {
    let rest = header.strip_prefix("Token ")?;
    let token = rest.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::parse_token_header;

    #[test]
    fn test_parses_token_scheme() {
        assert_eq!(
            parse_token_header("Token abc123"),
            Some("abc123")
        );
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert_eq!(parse_token_header("Bearer abc123"), None);
        assert_eq!(parse_token_header("abc123"), None);
        assert_eq!(parse_token_header("Token "), None);
        assert_eq!(parse_token_header(""), None);
    }
}
