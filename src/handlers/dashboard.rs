use axum::{extract::State, Json};

use super::ApiError;
use crate::services::dashboard::Dashboard;
use crate::state::AppState;

/// GET /api/dashboard
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, ApiError> {
  let sessions = state.history.list().map_err(ApiError::History)?;
  Ok(Json(Dashboard::build(&sessions)))
}
