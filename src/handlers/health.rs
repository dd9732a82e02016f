//! Health and root endpoints
//!
//! Simple liveness checks for monitoring and load balancers.

use axum::Json;
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Root API response
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// GET /api/health
pub async fn handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// GET /api
pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok",
        message: "API is working!",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_handler_returns_healthy() {
        let Json(body) = handler().await;
        assert_eq!(body.status, "healthy");
    }

    #[tokio::test]
    async fn test_root_handler() {
        let Json(body) = root_handler().await;
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"status": "ok", "message": "API is working!"})
        );
    }
}
