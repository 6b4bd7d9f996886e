use crate::application::{AuthError, ServiceError, ToolRunError};
use crate::infrastructure::RepositoryError;
use crate::tools::ToolError;
use axum::http::StatusCode;

/// Maps service failures to a status and body. `fallback` is the message shown
/// for internal errors, whose details stay in the logs.
pub(super) fn map_service_error(err: &ServiceError, fallback: &str) -> (StatusCode, serde_json::Value) {
    match err {
        ServiceError::NotFound(what) | ServiceError::Repository(RepositoryError::NotFound(what)) => (
            StatusCode::NOT_FOUND,
            serde_json::json!({ "error": format!("Not found: {}", what) }),
        ),
        ServiceError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg }))
        }
        ServiceError::Repository(RepositoryError::Conflict(what)) => (
            StatusCode::CONFLICT,
            serde_json::json!({ "error": format!("Already exists: {}", what) }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "error": fallback }),
        ),
    }
}

pub(super) fn map_auth_error(err: &AuthError) -> (StatusCode, serde_json::Value) {
    match err {
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            serde_json::json!({ "error": "Invalid email or password" }),
        ),
        AuthError::Session(_) => (
            StatusCode::UNAUTHORIZED,
            serde_json::json!({ "error": "Invalid or expired session token" }),
        ),
        AuthError::Service(e) => map_service_error(e, "Login failed"),
    }
}

pub(super) fn map_tool_run_error(err: &ToolRunError) -> (StatusCode, serde_json::Value) {
    match err {
        ToolRunError::Denied(access) => (
            StatusCode::FORBIDDEN,
            serde_json::json!({
                "error": "Access to this tool is not available on your plan",
                "access": access,
            }),
        ),
        ToolRunError::Tool(ToolError::InvalidInput(msg) | ToolError::Unsupported(msg)) => {
            (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg }))
        }
        ToolRunError::Tool(ToolError::Output(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "error": "Tool failed to produce output" }),
        ),
        ToolRunError::Service(e) => map_service_error(e, "Failed to run tool"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ToolAccessInfo;

    #[test]
    fn not_found_and_validation_are_client_errors() {
        let (status, _) = map_service_error(&ServiceError::NotFound("plan".into()), "x");
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = map_service_error(&ServiceError::Validation("bad".into()), "x");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad");

        let conflict = ServiceError::Repository(RepositoryError::Conflict("email".into()));
        assert_eq!(map_service_error(&conflict, "x").0, StatusCode::CONFLICT);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = ServiceError::Repository(RepositoryError::InvalidData("role".into()));
        let (status, body) = map_service_error(&err, "Failed to list users");
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to list users");
    }

    #[test]
    fn denied_run_carries_access_info() {
        let (status, body) = map_tool_run_error(&ToolRunError::Denied(ToolAccessInfo::blocked(3)));
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["access"]["has_access"], false);
        assert_eq!(body["access"]["current_usage"], 3);
    }

    #[test]
    fn bad_tool_input_is_bad_request() {
        let err = ToolRunError::Tool(ToolError::InvalidInput("amount".into()));
        assert_eq!(map_tool_run_error(&err).0, StatusCode::BAD_REQUEST);
        assert_eq!(
            map_auth_error(&AuthError::InvalidCredentials).0,
            StatusCode::UNAUTHORIZED
        );
    }
}
