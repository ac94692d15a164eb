use crate::models::StatusResponse;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::error::{detail_response, AppError};

/// `GET /`: liveness of the relay itself.
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse::ok("Plant Care Assistant API is running"))
}

/// `GET /test`: end-to-end reachability of the provider.
pub async fn test_connection(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, AppError> {
    state
        .relay
        .test_connection()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    Ok(Json(StatusResponse::success("Connection successful")))
}

pub async fn not_found() -> impl IntoResponse {
    detail_response(StatusCode::NOT_FOUND, "Not Found")
}
