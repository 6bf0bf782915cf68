use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fleetops_core::DomainError;
use serde_json::json;
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request collides with existing scheduled work
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        conflicts: serde_json::Value,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Database error" }),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Conflict { message, conflicts } => (
                StatusCode::CONFLICT,
                json!({ "error": message, "conflicts": conflicts }),
            ),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                (StatusCode::BAD_REQUEST, json!({ "error": "Invalid JSON" }))
            }
            AppError::Domain(e) => (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() })),
        };

        (status, Json(body)).into_response()
    }
}

/// Convert a stored row into its domain type, treating bad stored values as internal errors
pub(crate) fn from_row<R, T>(row: R) -> Result<T, AppError>
where
    R: TryInto<T, Error = DomainError>,
{
    row.try_into()
        .map_err(|e: DomainError| AppError::Internal(format!("Corrupt row: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = vec![
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::Conflict {
                    message: "x".into(),
                    conflicts: json!([]),
                },
                StatusCode::CONFLICT,
            ),
            (AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::Domain(DomainError::MissingField("pickup_date")),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
