use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use serde_json::{Map, Value, json};

use crate::{error::AppError, routes::AppState};

pub const RECEIVED: &str = "Formulario recibido con éxito!";

/// POST / and POST /contact - store the submitted form as one document.
///
/// The payload is not validated beyond being a JSON object.
#[tracing::instrument(skip_all)]
pub async fn action(
    State(app_state): State<AppState>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(fields) =
        payload.map_err(|rejection| AppError::InvalidPayload(rejection.body_text()))?;

    app_state.intake.intake(fields).await?;

    Ok(Json(json!({ "message": RECEIVED })))
}
