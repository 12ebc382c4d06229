//! Route handlers organized by resource

pub mod admin;
pub mod claims;
pub mod feedback;
pub mod health;
pub mod home;
pub mod listings;
pub mod nearby;
pub mod reviews;
pub mod search;
pub mod sitemaps;

use axum::http::header;
use axum::response::{IntoResponse, Response};

/// Attach a `Cache-Control` header to any response body.
pub(crate) fn cached(cache_control: &'static str, body: impl IntoResponse) -> Response {
    ([(header::CACHE_CONTROL, cache_control)], body).into_response()
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    /// Send a request through the router and decode the JSON body.
    pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let response = app.oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, json)
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("valid request")
    }

    pub fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request")
    }
}
