//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use uuid::Uuid;

use super::error::ApiError;
use super::server::AppState;
use crate::models::ValidationError;

/// Extract and validate a UUID from path
pub struct ValidUuid(pub Uuid);

impl<S> FromRequestParts<S> for ValidUuid
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "id" }))?;

        let uuid = Uuid::parse_str(&id).map_err(|_| {
            ApiError::Validation(ValidationError::InvalidFormat {
                field: "id",
                reason: "invalid UUID format",
            })
        })?;

        Ok(Self(uuid))
    }
}

/// Client address: first `x-forwarded-for` entry, then `x-real-ip`, else `unknown`
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        Self(forwarded.or_else(real_ip).unwrap_or("unknown").to_string())
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// `User-Agent` header, empty when absent
pub struct ClientUserAgent(pub String);

impl ClientUserAgent {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let agent = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        Self(agent.to_string())
    }
}

impl<S> FromRequestParts<S> for ClientUserAgent
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// Bearer token matching `server.admin_token`.
///
/// With no token configured every admin request is refused.
pub struct AdminAuth;

impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let expected = state
            .site
            .server
            .admin_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Unauthorized)?;

        let presented = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(ApiError::Unauthorized)?;

        if presented != expected {
            tracing::warn!("rejected admin request with wrong token");
            return Err(ApiError::Unauthorized);
        }
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn forwarded_for_first_entry_wins() {
        let h = headers(&[
            ("x-forwarded-for", "203.0.113.9, 10.0.0.1"),
            ("x-real-ip", "10.0.0.2"),
        ]);
        assert_eq!(ClientIp::from_headers(&h).0, "203.0.113.9");
    }

    #[test]
    fn falls_back_to_real_ip_then_unknown() {
        let h = headers(&[("x-real-ip", "198.51.100.4")]);
        assert_eq!(ClientIp::from_headers(&h).0, "198.51.100.4");
        assert_eq!(ClientIp::from_headers(&HeaderMap::new()).0, "unknown");
    }

    #[test]
    fn missing_user_agent_is_empty() {
        assert_eq!(ClientUserAgent::from_headers(&HeaderMap::new()).0, "");
        let h = headers(&[("user-agent", "Mozilla/5.0")]);
        assert_eq!(ClientUserAgent::from_headers(&h).0, "Mozilla/5.0");
    }
}
