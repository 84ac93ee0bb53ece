use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::models::{AuthErrorCode, AuthFailure};
use domain::services::listing::ViewError;
use persistence::StoreError;
use serde::Serialize;
use thiserror::Error;

use crate::services::ServiceError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error: {} invalid field(s)", .0.len())]
    InvalidFields(Vec<ValidationDetail>),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// A store query needs an index that does not exist yet.
    #[error("Precondition failed: {message}")]
    MissingIndex {
        message: String,
        create_url: Option<String>,
    },

    /// The identity provider rejected a signup or login.
    #[error("Authentication failed: {0}")]
    Auth(AuthFailure),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    create_index_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

fn auth_status(code: AuthErrorCode) -> StatusCode {
    match code {
        AuthErrorCode::EmailAlreadyInUse => StatusCode::CONFLICT,
        AuthErrorCode::WeakPassword => StatusCode::BAD_REQUEST,
        AuthErrorCode::UserDisabled => StatusCode::FORBIDDEN,
        AuthErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        AuthErrorCode::UserNotFound
        | AuthErrorCode::WrongPassword
        | AuthErrorCode::InvalidCredential => StatusCode::UNAUTHORIZED,
        AuthErrorCode::Unknown => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut details = None;
        let mut create_index_url = None;

        let (status, error_code, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::InvalidFields(fields) => {
                let message = match fields.as_slice() {
                    [single] => format!("{}: {}", single.field, single.message),
                    many => format!("{} validation errors", many.len()),
                };
                details = Some(fields);
                (StatusCode::BAD_REQUEST, "validation_error", message)
            }
            ApiError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large", msg)
            }
            ApiError::MissingIndex {
                message,
                create_url,
            } => {
                create_index_url = create_url;
                (StatusCode::PRECONDITION_FAILED, "missing_index", message)
            }
            ApiError::Auth(failure) => (
                auth_status(failure.code),
                failure.code.as_str(),
                failure.message,
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please try again later.".into(),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg)
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
            create_index_url,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Store { operation, source } => match source {
                StoreError::PermissionDenied { path, .. } => ApiError::Forbidden(format!(
                    "Permission denied while trying to {}. Check the access rules for '{}'.",
                    operation, path
                )),
                StoreError::MissingIndex {
                    create_url, path, ..
                } => ApiError::MissingIndex {
                    message: format!(
                        "The query to {} on '{}' requires an index that does not exist yet",
                        operation, path
                    ),
                    create_url,
                },
                StoreError::NotFound { path, id } => {
                    ApiError::NotFound(format!("No record '{}' in '{}'", id, path))
                }
                other => ApiError::Internal(format!("Failed to {}: {}", operation, other)),
            },
            ServiceError::Blob { operation, source } => {
                ApiError::Internal(format!("Failed to {}: {}", operation, source))
            }
            ServiceError::Validation(errors) => errors.into(),
            ServiceError::Invalid(msg) => ApiError::Validation(msg),
            ServiceError::Upstream(msg) => ApiError::ServiceUnavailable(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::InvalidFields(details)
    }
}

impl From<validator::ValidationError> for ApiError {
    fn from(error: validator::ValidationError) -> Self {
        ApiError::Validation(
            error
                .message
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string()),
        )
    }
}

impl From<ViewError> for ApiError {
    fn from(err: ViewError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<AuthFailure> for ApiError {
    fn from(failure: AuthFailure) -> Self {
        ApiError::Auth(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::Validate;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn store_error(source: StoreError) -> ApiError {
        ServiceError::Store {
            operation: "fetch payments".to_string(),
            source,
        }
        .into()
    }

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::PayloadTooLarge("x".into()), StatusCode::PAYLOAD_TOO_LARGE),
            (ApiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_permission_denied_names_operation_and_path() {
        let error = store_error(StoreError::PermissionDenied {
            path: "payments".into(),
            message: "Missing or insufficient permissions.".into(),
        });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = body_json(response).await;
        assert_eq!(body["error"], "forbidden");
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("fetch payments"));
        assert!(message.contains("'payments'"));
    }

    #[tokio::test]
    async fn test_missing_index_carries_link() {
        let error = store_error(StoreError::MissingIndex {
            path: "payments".into(),
            message: "The query requires an index".into(),
            create_url: Some("https://console.example/indexes?create=1".into()),
        });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);

        let body = body_json(response).await;
        assert_eq!(body["error"], "missing_index");
        assert_eq!(body["create_index_url"], "https://console.example/indexes?create=1");
    }

    #[tokio::test]
    async fn test_backend_error_is_hidden() {
        let error = store_error(StoreError::Backend("socket closed".into()));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let error = store_error(StoreError::not_found("notices", "n1"));
        assert!(matches!(error, ApiError::NotFound(ref m) if m.contains("n1")));
    }

    #[tokio::test]
    async fn test_auth_failure_body_uses_code() {
        let error = ApiError::Auth(AuthFailure::new(AuthErrorCode::EmailAlreadyInUse));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["error"], "email_already_in_use");
        assert!(!body["message"].as_str().unwrap().is_empty());
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(auth_status(AuthErrorCode::WrongPassword), StatusCode::UNAUTHORIZED);
        assert_eq!(auth_status(AuthErrorCode::WeakPassword), StatusCode::BAD_REQUEST);
        assert_eq!(auth_status(AuthErrorCode::TooManyRequests), StatusCode::TOO_MANY_REQUESTS);
    }

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(range(min = 1, message = "Count must be positive"))]
        count: u32,
    }

    #[tokio::test]
    async fn test_validation_errors_list_fields() {
        let probe = Probe {
            name: String::new(),
            count: 0,
        };
        let error: ApiError = probe.validate().unwrap_err().into();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        let details = body["details"].as_array().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0]["field"], "count");
        assert_eq!(details[1]["field"], "name");
        assert_eq!(body["message"], "2 validation errors");
    }

    #[test]
    fn test_view_error_is_validation() {
        let error: ApiError = ViewError::UnknownSortField {
            field: "colour".into(),
            allowed: "title".into(),
        }
        .into();
        assert!(matches!(error, ApiError::Validation(ref m) if m.contains("colour")));
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            format!("{}", ApiError::Unauthorized("test".to_string())),
            "Unauthorized: test"
        );
        assert_eq!(format!("{}", ApiError::RateLimited), "Rate limited");
        assert_eq!(
            format!("{}", ApiError::Internal("test".to_string())),
            "Internal error: test"
        );
    }
}
