pub mod dashboard;
pub mod normalize;
pub mod sessions;

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{get, post},
  Json, Router,
};
use serde_json::json;

use crate::normalizer::ParseFailure;
use crate::services::{GenerationError, HistoryError};
use crate::state::AppState;
use crate::validation::SessionFormError;

pub use dashboard::dashboard;
pub use normalize::normalize_response;
pub use sessions::{
  create_session, form_options, get_session, list_sessions, regenerate_session, session_page,
};

/// Message shown when a response yields no usable lesson plan
pub const UNREADABLE_RESPONSE_MESSAGE: &str =
  "No se pudo interpretar la respuesta de la IA. Intenta nuevamente.";

/// Handler failures, rendered as `{"error": <user message>}`
#[derive(Debug)]
pub enum ApiError {
  InvalidForm(Vec<SessionFormError>),
  Generation(GenerationError),
  /// Lenient parsing produced an empty record
  UnreadableResponse,
  Parse(ParseFailure),
  History(HistoryError),
  NotFound,
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::InvalidForm(_) | ApiError::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Generation(GenerationError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Generation(GenerationError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
      ApiError::Generation(_) | ApiError::UnreadableResponse => StatusCode::BAD_GATEWAY,
      ApiError::History(_) => StatusCode::INTERNAL_SERVER_ERROR,
      ApiError::NotFound => StatusCode::NOT_FOUND,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match &self {
      ApiError::InvalidForm(errors) => json!({
        "error": errors
          .first()
          .map(|e| e.user_message())
          .unwrap_or("Formulario inválido"),
        "details": errors,
      }),
      ApiError::Generation(err) => {
        tracing::warn!("Generation failed: {}", err);
        json!({ "error": err.user_message() })
      }
      ApiError::UnreadableResponse => json!({ "error": UNREADABLE_RESPONSE_MESSAGE }),
      ApiError::Parse(failure) => {
        tracing::info!("Strict normalization failed: {}", failure);
        let ParseFailure::StrictModeExhausted { attempts, .. } = failure;
        json!({ "error": failure.user_message(), "attempts": attempts })
      }
      ApiError::History(err) => {
        tracing::error!("{}", err);
        json!({ "error": "Historial de sesiones no disponible" })
      }
      ApiError::NotFound => json!({ "error": "Sesión no encontrada" }),
    };
    (status, Json(body)).into_response()
  }
}

/// All routes of the application
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/api/options", get(form_options))
    .route("/api/sessions", get(list_sessions).post(create_session))
    .route("/api/sessions/{id}", get(get_session))
    .route("/api/sessions/{id}/regenerate", post(regenerate_session))
    .route("/sessions/{id}", get(session_page))
    .route("/api/normalize", post(normalize_response))
    .route("/api/dashboard", get(dashboard))
    .with_state(state)
}
