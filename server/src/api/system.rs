use axum::{extract::State, Json};
use tracing::error;

use super::{error::AppError, AppState};
use crate::probe::SystemInfo;

/// GET /api/system-info: live host snapshot for the dashboard.
pub async fn info(State(state): State<AppState>) -> Result<Json<SystemInfo>, AppError> {
    let probe = state.probe.clone();
    let info = tokio::task::spawn_blocking(move || probe.system_info())
        .await
        .map_err(|e| AppError::Internal(format!("host probe task failed: {e}")))?
        .map_err(|e| {
            error!("Error fetching system info: {e:#}");
            AppError::Internal("Failed to fetch system information".to_string())
        })?;
    Ok(Json(info))
}
