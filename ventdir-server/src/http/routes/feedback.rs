//! Problem reports about listings

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::post, Json, Router};

use super::reviews::SubmitResponse;
use crate::db::FeedbackRepo;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::FeedbackRequest;

/// POST /api/feedback
async fn create_feedback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let feedback = req.validate()?;
    FeedbackRepo::new(&state.pool).create(&feedback).await?;

    tracing::info!(location_id = ?feedback.location_id, "feedback recorded");
    Ok((StatusCode::CREATED, Json(SubmitResponse { success: true })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/feedback", post(create_feedback))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::http::routes::testing::{post_json, send};
    use crate::http::test_support::app;

    #[tokio::test]
    async fn empty_feedback_is_400() {
        let body = json!({"feedback": "   ", "email": null});
        let (status, _, body) = send(app(), post_json("/api/feedback", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "feedback cannot be empty");
    }

    #[tokio::test]
    async fn bad_email_is_400() {
        let body = json!({"feedback": "Closed for good", "email": "nope"});
        let (status, _, _) = send(app(), post_json("/api/feedback", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
