use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub const INTAKE_FAILED: &str = "Algo salió mal.";
pub const INVALID_PAYLOAD: &str = "Solicitud inválida.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Intake(#[from] consultoria_shared::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidPayload(reason) => {
                tracing::warn!(reason = %reason, "rejected contact payload");
                (StatusCode::BAD_REQUEST, INVALID_PAYLOAD)
            }
            AppError::Intake(err) => {
                tracing::error!(error = ?err, "contact intake failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTAKE_FAILED)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
