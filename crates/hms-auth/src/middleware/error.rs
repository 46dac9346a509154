//! Error response handling for authentication middleware.
//!
//! Implements `IntoResponse` for `AuthError`. Bodies are
//! generic: the internal failure message is logged, never returned.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AuthError;

/// `WWW-Authenticate` challenge sent with every 401.
const BEARER_CHALLENGE: &str = "Bearer realm=\"hms\"";

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_code(&self);

        let body = match &self {
            AuthError::Authentication { .. } => error_json("Authentication required"),
            AuthError::Authorization { required_roles } => json!({
                "error": "Insufficient permissions",
                "required_roles": required_roles,
            }),
            other => {
                tracing::error!(
                    category = %other.category(),
                    error = %other,
                    "Request failed with server error"
                );
                error_json("Internal server error")
            }
        };

        let mut headers = HeaderMap::new();
        if status == StatusCode::UNAUTHORIZED {
            headers.insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(BEARER_CHALLENGE),
            );
        }

        (status, headers, Json(body)).into_response()
    }
}

/// Maps an error to its HTTP status.
fn status_code(error: &AuthError) -> StatusCode {
    match error {
        AuthError::Authentication { .. } => StatusCode::UNAUTHORIZED,
        AuthError::Authorization { .. } => StatusCode::FORBIDDEN,
        AuthError::AuditWrite { .. }
        | AuthError::Storage { .. }
        | AuthError::IdentityProvider { .. }
        | AuthError::Configuration { .. }
        | AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the `{"error": ...}` body used by every auth error response.
#[must_use]
pub fn error_json(message: &str) -> serde_json::Value {
    json!({ "error": message })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_authentication_response() {
        let response = AuthError::authentication("credential not verified").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer realm=\"hms\""
        );

        let json = body_json(response).await;
        assert_eq!(json, json!({ "error": "Authentication required" }));
    }

    #[tokio::test]
    async fn test_authorization_response_lists_roles() {
        let response = AuthError::authorization(["admin", "manager"]).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));

        let json = body_json(response).await;
        assert_eq!(json["error"], "Insufficient permissions");
        assert_eq!(json["required_roles"], json!(["admin", "manager"]));
    }

    #[tokio::test]
    async fn test_server_error_hides_details() {
        let response = AuthError::storage("relation \"profiles\" does not exist").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json, json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn test_audit_failure_is_server_error() {
        let response = AuthError::audit_write("insert failed").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
