use crate::error::ServiceError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

/// API key authentication middleware
///
/// Open when no key is configured. Otherwise the key must arrive in the
/// `apikey` header or as `Authorization: Bearer <key>`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let Some(expected) = state.config.api_key() else {
        return Ok(next.run(request).await);
    };

    match request_key(&headers) {
        Some(key) if key == expected => Ok(next.run(request).await),
        _ => Err(ServiceError::Unauthorized),
    }
}

fn request_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(key) = headers.get("apikey").and_then(|v| v.to_str().ok()) {
        return Some(key.trim());
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_key_sources() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_key(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer k1"));
        assert_eq!(request_key(&headers), Some("k1"));

        headers.insert("apikey", HeaderValue::from_static("k2"));
        assert_eq!(request_key(&headers), Some("k2"));
    }

    #[test]
    fn test_basic_auth_is_not_a_key() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(request_key(&headers), None);
    }
}
