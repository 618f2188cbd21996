use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::auth::{AppState, verify_token};
use crate::error::ApiError;

/// Extract and validate the bearer token from the Authorization header.
/// A missing token is 401, a token that fails verification is 403.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or(ApiError::MissingToken)?;

    let claims = verify_token(&state.auth, token)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// The credential after the scheme, if non-empty. The scheme itself is not
/// checked, so `Basic abc` yields a token that then fails verification.
fn bearer_token(value: &str) -> Option<&str> {
    value
        .split_once(' ')
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), Some("abc"));
        assert_eq!(bearer_token("abc"), None);
    }
}
