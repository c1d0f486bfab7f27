use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Error type returned by every handler. Converted into a JSON body of the
/// shape `{"error": ..., "details": ...?}` with the matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unprocessable(String),
    /// Expected failure whose message is worth surfacing at 500, unlike the
    /// generic `Internal` mask.
    #[error("{0}")]
    Fatal(String),
    /// The model replied with something that survived no parse attempt.
    /// The raw text is kept for the response details outside production.
    #[error("Invalid response from model")]
    UpstreamInvalid { raw: String },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

/// True when the underlying store error is a unique-constraint violation,
/// so read-then-write guards can downgrade a lost race to a conflict.
pub fn is_unique_violation(e: &anyhow::Error) -> bool {
    e.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn expose_details() -> bool {
    std::env::var("APP_ENV")
        .map(|v| v != "production")
        .unwrap_or(true)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, None),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, None),
            ApiError::Unprocessable(_) => (StatusCode::UNPROCESSABLE_ENTITY, None),
            ApiError::Fatal(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
            ApiError::UpstreamInvalid { raw } => {
                tracing::error!(raw_len = raw.len(), "unparseable model reply");
                let details = expose_details().then(|| raw.clone());
                (StatusCode::INTERNAL_SERVER_ERROR, details)
            }
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                let details = expose_details().then(|| e.to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, details)
            }
        };

        let error = match &self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_variants() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                ApiError::BadRequest("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Unauthorized("nope".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                ApiError::Unprocessable("invalid".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::UpstreamInvalid { raw: "???".into() },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn internal_error_message_is_generic() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused"));
        assert_eq!(err.to_string(), "connection refused");
        // but the response body hides it behind a generic message
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
