use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rotor_core::error::RotorError;

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self(anyhow::anyhow!(msg.into()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<RotorError>() {
            Some(RotorError::EmptyMessage) => StatusCode::BAD_REQUEST,
            Some(RotorError::ConditionNotFound(_)) => StatusCode::NOT_FOUND,
            Some(
                RotorError::Dataset(_)
                | RotorError::Persistence(_)
                | RotorError::InvalidConfig(_)
                | RotorError::Io(_)
                | RotorError::Yaml(_)
                | RotorError::Json(_),
            )
            | None => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
