use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Datei nicht gefunden: {0}")]
    NotFound(String),

    #[error("Pipeline-Fehler")]
    Pipeline { details: String },

    #[error("Ein unerwarteter Fehler ist aufgetreten")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, String::new()),
            ApiError::NotFound(name) => (
                StatusCode::NOT_FOUND,
                "Datei nicht gefunden".to_string(),
                name,
            ),
            ApiError::Pipeline { details } => {
                tracing::error!("Pipeline-Fehler: {}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Pipeline-Fehler".to_string(),
                    details,
                )
            }
            ApiError::Internal(details) => {
                tracing::error!("Interner Fehler: {}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ein unerwarteter Fehler ist aufgetreten".to_string(),
                    details,
                )
            }
        };

        (status, Json(json!({ "error": error, "details": details }))).into_response()
    }
}
