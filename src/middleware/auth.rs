use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{decode_jwt, Claims};
use crate::error::ApiError;
use crate::types::SubscriptionTier;

/// Authenticated user context extracted from JWT. Carries claim-time state
/// only; handlers that gate on tier re-read the user row for fresh data.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub tier: SubscriptionTier,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            tier: claims.tier.parse().unwrap_or(SubscriptionTier::Free),
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let claims = decode_jwt(&token).map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let auth_user = AuthUser::from(claims);
    tracing::debug!(
        user_id = %auth_user.user_id,
        email = %auth_user.email,
        tier = %auth_user.tier,
        "authenticated request"
    );
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        let token = extract_jwt_from_headers(&headers_with("Bearer abc.def.ghi")).unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_header() {
        let err = extract_jwt_from_headers(&HeaderMap::new()).unwrap_err();
        assert!(err.contains("Missing"));
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        let err = extract_jwt_from_headers(&headers_with("Basic dXNlcjpwYXNz")).unwrap_err();
        assert!(err.contains("Bearer"));
    }

    #[test]
    fn rejects_empty_token() {
        let err = extract_jwt_from_headers(&headers_with("Bearer   ")).unwrap_err();
        assert!(err.contains("Empty"));
    }

    #[test]
    fn claims_with_unknown_tier_default_to_free() {
        let claims = Claims::new(Uuid::new_v4(), "a@example.com".to_string(), "vip".to_string());
        let user = AuthUser::from(claims);
        assert_eq!(user.tier, SubscriptionTier::Free);
    }
}
