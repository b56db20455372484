//! Session generation and history handlers.

use askama::Template;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{Html, IntoResponse, Response},
  Json,
};
use serde::Serialize;

use super::ApiError;
use crate::domain::session::{
  COMPETENCIAS_NACIONALES, CONTEXTOS_LOCALES, HORAS_RANGE, MINUTES_PER_CLASS_HOUR,
};
use crate::domain::session::distribution_summary;
use crate::domain::{Ciclo, LessonPlanRecord, SessionEdit, SessionRequest};
use crate::normalizer::{self, NormalizeMode, heuristic};
use crate::prompt::build_generation_message;
use crate::services::SavedSession;
use crate::services::dashboard::format_session_date;
use crate::state::AppState;
use crate::validation::validate_session_request;

// ============================================================================
// Form options
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CicloOption {
  pub value: &'static str,
  pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HorasRange {
  pub min: u8,
  pub max: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormOptions {
  pub competencias: Vec<&'static str>,
  pub ciclos: Vec<CicloOption>,
  pub contextos: Vec<&'static str>,
  pub horas: HorasRange,
  pub minutes_per_hour: u32,
}

/// GET /api/options
pub async fn form_options() -> Json<FormOptions> {
  Json(FormOptions {
    competencias: COMPETENCIAS_NACIONALES.to_vec(),
    ciclos: Ciclo::ALL
      .iter()
      .map(|c| CicloOption {
        value: c.as_str(),
        description: c.description(),
      })
      .collect(),
    contextos: CONTEXTOS_LOCALES.to_vec(),
    horas: HorasRange {
      min: *HORAS_RANGE.start(),
      max: *HORAS_RANGE.end(),
    },
    minutes_per_hour: MINUTES_PER_CLASS_HOUR,
  })
}

// ============================================================================
// Generation
// ============================================================================

/// JSON strategies first, then the text parser; an empty result is a failure.
///
/// A JSON object that maps to an empty plan (for example a stray `{}` inside
/// a plain-text lesson) does not hide a lesson the text parser can read.
fn interpret_response(raw: &str) -> Result<(LessonPlanRecord, &'static str), ApiError> {
  match normalizer::normalize(raw, NormalizeMode::Strict) {
    Ok(response) => {
      let strategy = response.strategy_name();
      let plan = response.into_lesson_plan();
      if !plan.is_empty() {
        return Ok((plan, strategy));
      }
      tracing::debug!("JSON from {} strategy has no lesson fields; parsing as text", strategy);
    }
    Err(failure) => tracing::debug!("{}; parsing as text", failure),
  }

  let parsed = heuristic::parse(raw);
  if parsed.record.is_empty() {
    tracing::warn!(
      "Generation response produced no lesson data ({} bytes, {} lines unmatched)",
      raw.len(),
      parsed.unmatched_lines
    );
    return Err(ApiError::UnreadableResponse);
  }

  Ok((parsed.record, "heuristic"))
}

/// Validate, prompt the generator, interpret its answer and store the session
async fn generate_session(
  state: &AppState,
  request: SessionRequest,
) -> Result<SavedSession, ApiError> {
  validate_session_request(&request).map_err(ApiError::InvalidForm)?;

  let message = build_generation_message(&request);
  let raw = state
    .generator
    .generate(&message, &request)
    .await
    .map_err(ApiError::Generation)?;

  let (plan, strategy) = interpret_response(&raw)?;
  let saved = state
    .history
    .insert(request, plan, strategy)
    .map_err(ApiError::History)?;

  tracing::info!(
    "Generated session {} for '{}' via {} strategy",
    saved.id,
    saved.request.tema,
    strategy
  );
  Ok(saved)
}

/// POST /api/sessions
pub async fn create_session(
  State(state): State<AppState>,
  Json(request): Json<SessionRequest>,
) -> Result<(StatusCode, Json<SavedSession>), ApiError> {
  let saved = generate_session(&state, request).await?;
  Ok((StatusCode::CREATED, Json(saved)))
}

/// POST /api/sessions/{id}/regenerate
///
/// Edits the stored form (absent fields keep their value) and generates a new
/// session from it. The original session stays in the history.
pub async fn regenerate_session(
  State(state): State<AppState>,
  Path(id): Path<u64>,
  Json(edit): Json<SessionEdit>,
) -> Result<(StatusCode, Json<SavedSession>), ApiError> {
  let original = state
    .history
    .get(id)
    .map_err(ApiError::History)?
    .ok_or(ApiError::NotFound)?;

  tracing::debug!("Regenerating session {}", id);
  let saved = generate_session(&state, edit.apply_to(original.request)).await?;
  Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /api/sessions
pub async fn list_sessions(
  State(state): State<AppState>,
) -> Result<Json<Vec<SavedSession>>, ApiError> {
  let sessions = state.history.list().map_err(ApiError::History)?;
  Ok(Json(sessions))
}

/// GET /api/sessions/{id}
pub async fn get_session(
  State(state): State<AppState>,
  Path(id): Path<u64>,
) -> Result<Json<SavedSession>, ApiError> {
  state
    .history
    .get(id)
    .map_err(ApiError::History)?
    .map(Json)
    .ok_or(ApiError::NotFound)
}

// ============================================================================
// Result page
// ============================================================================

pub struct FieldRow {
  pub label: &'static str,
  pub value: String,
}

#[derive(Template)]
#[template(path = "session.html")]
pub struct SessionTemplate {
  pub title: String,
  pub tema: String,
  pub ciclo: &'static str,
  pub ciclo_description: &'static str,
  pub contexto: String,
  pub horas_clase: u8,
  pub total_minutes: u32,
  pub competencias: Vec<String>,
  pub materiales: String,
  pub created_label: String,
  pub fields: Vec<FieldRow>,
  pub distribution: String,
  pub step_count: usize,
  pub plan: LessonPlanRecord,
  pub has_content: bool,
}

impl From<&SavedSession> for SessionTemplate {
  fn from(session: &SavedSession) -> Self {
    let plan = session.plan.clone();
    let fields = [
      ("Tema", &plan.topic),
      ("Competencia", &plan.competency),
      ("Duración", &plan.duration),
      ("Contexto", &plan.context),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
      value.as_ref().map(|value| FieldRow {
        label,
        value: value.clone(),
      })
    })
    .collect();

    Self {
      title: plan
        .title
        .clone()
        .unwrap_or_else(|| session.request.tema.clone()),
      tema: session.request.tema.clone(),
      ciclo: session.request.ciclo.as_str(),
      ciclo_description: session.request.ciclo.description(),
      contexto: session.request.contexto.clone(),
      horas_clase: session.request.horas_clase,
      total_minutes: session.request.total_minutes(),
      competencias: session.request.competencias_seleccionadas.clone(),
      materiales: session.request.materiales_disponibles.clone(),
      created_label: format_session_date(session.created_at),
      fields,
      distribution: plan
        .hour_distribution
        .clone()
        .unwrap_or_else(|| distribution_summary(session.request.horas_clase)),
      step_count: plan.item_count(),
      has_content: !plan.is_empty(),
      plan,
    }
  }
}

/// GET /sessions/{id}
pub async fn session_page(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
  let session = match state.history.get(id) {
    Ok(Some(session)) => session,
    Ok(None) => {
      return (StatusCode::NOT_FOUND, Html("<p>Sesión no encontrada</p>".to_string()))
        .into_response();
    }
    Err(e) => {
      tracing::error!("{}", e);
      return (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html("<p>Historial no disponible</p>".to_string()),
      )
        .into_response();
    }
  };

  let template = SessionTemplate::from(&session);
  Html(template.render().unwrap_or_default()).into_response()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::DidacticProcess;
  use crate::services::SessionHistory;
  use crate::testing::SAMPLE_LESSON_TEXT;

  fn request() -> SessionRequest {
    SessionRequest {
      tema: "Proporcionalidad".into(),
      competencias_seleccionadas: vec!["Resuelve problemas de cantidad".into()],
      ciclo: Ciclo::VII,
      contexto: "Comercial".into(),
      horas_clase: 3,
      materiales_disponibles: "calculadoras".into(),
    }
  }

  #[test]
  fn test_interpret_prefers_json() {
    let (plan, strategy) = interpret_response(r#"{"tema": "Proporcionalidad"}"#).unwrap();
    assert_eq!(strategy, "direct");
    assert_eq!(plan.topic.as_deref(), Some("Proporcionalidad"));
  }

  #[test]
  fn test_interpret_falls_back_to_text() {
    let (plan, strategy) = interpret_response(SAMPLE_LESSON_TEXT).unwrap();
    assert_eq!(strategy, "heuristic");
    assert_eq!(plan.didactic_processes.len(), 2);
  }

  #[test]
  fn test_interpret_rejects_json_without_lesson_fields() {
    assert!(matches!(
      interpret_response(r#"{"status": "queued"}"#),
      Err(ApiError::UnreadableResponse)
    ));
  }

  #[test]
  fn test_interpret_ignores_empty_object_inside_text_lesson() {
    let raw = format!("{}\n- Registrar datos como {{}}", SAMPLE_LESSON_TEXT);
    let (plan, strategy) = interpret_response(&raw).unwrap();
    assert_eq!(strategy, "heuristic");
    assert_eq!(plan.didactic_processes.len(), 2);
    assert_eq!(plan.title.as_deref(), Some("Sesión de Fracciones"));
  }

  #[test]
  fn test_interpret_text_lesson_quoting_json_example() {
    let raw = "📘 Sesión de Datos\n1. Inicio\n- Leer el registro {\"edad\": 12}";
    let (plan, strategy) = interpret_response(raw).unwrap();
    assert_eq!(strategy, "heuristic");
    assert_eq!(plan.didactic_processes[0].items, vec!["Leer el registro {\"edad\": 12}"]);
  }

  #[test]
  fn test_template_without_plan_shows_notice() {
    let history = SessionHistory::new();
    let saved = history
      .insert(request(), LessonPlanRecord::default(), "heuristic")
      .unwrap();
    let html = SessionTemplate::from(&saved).render().unwrap();
    assert!(html.contains("<title>Proporcionalidad</title>"));
    assert!(html.contains("No hay información disponible"));
    assert!(html.contains("3 h (135 min)"));
    assert!(html.contains("Distribución en 3 horas"));
  }

  #[test]
  fn test_template_renders_materials_activities_and_distribution() {
    let history = SessionHistory::new();
    let plan = LessonPlanRecord {
      topic: Some("Proporcionalidad".into()),
      hour_distribution: Some("Hora 1: problema de precios".into()),
      suggested_materials: vec!["Afiches de ofertas".into()],
      contextualized_activities: vec!["Comparar precios del mercado".into()],
      didactic_processes: vec![DidacticProcess {
        heading: "Inicio".into(),
        items: vec!["Situación".into(), "Preguntas".into()],
      }],
      ..Default::default()
    };
    let saved = history.insert(request(), plan, "direct").unwrap();
    let template = SessionTemplate::from(&saved);
    assert_eq!(template.step_count, 2);

    let html = template.render().unwrap();
    assert!(html.contains("Materiales didácticos sugeridos"));
    assert!(html.contains("Afiches de ofertas"));
    assert!(html.contains("Actividades contextualizadas"));
    assert!(html.contains("Comparar precios del mercado"));
    assert!(html.contains("Hora 1: problema de precios"));
    assert!(!html.contains("Distribución en 3 horas"));
  }

  #[test]
  fn test_template_escapes_generated_text() {
    let history = SessionHistory::new();
    let plan = LessonPlanRecord {
      topic: Some("<script>alert(1)</script>".into()),
      ..Default::default()
    };
    let saved = history.insert(request(), plan, "direct").unwrap();
    let template = SessionTemplate::from(&saved);
    assert_eq!(template.fields.len(), 1);
    let html = template.render().unwrap();
    assert!(!html.contains("<script>"));
    assert!(html.contains("&#60;script&#62;"));
  }
}
