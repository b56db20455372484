//! Session form validation.
//!
//! Every problem is reported at once so the form can highlight all fields
//! that still need input.

use serde::Serialize;

use crate::domain::SessionRequest;
use crate::domain::session::{COMPETENCIAS_NACIONALES, CONTEXTOS_LOCALES, HORAS_RANGE};

/// A single problem with a submitted session form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "detail", rename_all = "snake_case")]
pub enum SessionFormError {
  MissingTopic,
  MissingCompetency,
  UnknownCompetency(String),
  DuplicateCompetency(String),
  MissingContext,
  UnknownContext(String),
  HoursOutOfRange(u8),
  MissingMaterials,
}

impl std::fmt::Display for SessionFormError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SessionFormError::MissingTopic => write!(f, "Topic is required"),
      SessionFormError::MissingCompetency => write!(f, "At least one competency is required"),
      SessionFormError::UnknownCompetency(c) => write!(f, "Unknown competency: {}", c),
      SessionFormError::DuplicateCompetency(c) => write!(f, "Competency selected twice: {}", c),
      SessionFormError::MissingContext => write!(f, "Context is required"),
      SessionFormError::UnknownContext(c) => write!(f, "Unknown context: {}", c),
      SessionFormError::HoursOutOfRange(h) => write!(
        f,
        "Class hours must be between {} and {}, got {}",
        HORAS_RANGE.start(),
        HORAS_RANGE.end(),
        h
      ),
      SessionFormError::MissingMaterials => write!(f, "Available materials are required"),
    }
  }
}

impl SessionFormError {
  /// Message shown next to the form
  pub fn user_message(&self) -> &'static str {
    match self {
      SessionFormError::MissingTopic
      | SessionFormError::MissingCompetency
      | SessionFormError::MissingContext
      | SessionFormError::MissingMaterials => "Completa todos los campos para generar la sesión",
      SessionFormError::UnknownCompetency(_) => "Selecciona competencias del currículo nacional",
      SessionFormError::DuplicateCompetency(_) => "Cada competencia solo puede seleccionarse una vez",
      SessionFormError::UnknownContext(_) => "Selecciona un contexto social de la lista",
      SessionFormError::HoursOutOfRange(_) => "Las horas de clase deben estar entre 1 y 6",
    }
  }
}

impl std::error::Error for SessionFormError {}

/// Check a submitted form, collecting every problem found
pub fn validate_session_request(request: &SessionRequest) -> Result<(), Vec<SessionFormError>> {
  let mut errors = Vec::new();

  if request.tema.trim().is_empty() {
    errors.push(SessionFormError::MissingTopic);
  }

  if request.competencias_seleccionadas.is_empty() {
    errors.push(SessionFormError::MissingCompetency);
  }
  let mut seen: Vec<&str> = Vec::new();
  for competencia in &request.competencias_seleccionadas {
    let competencia = competencia.trim();
    if !COMPETENCIAS_NACIONALES.contains(&competencia) {
      errors.push(SessionFormError::UnknownCompetency(competencia.to_string()));
    } else if seen.contains(&competencia) {
      errors.push(SessionFormError::DuplicateCompetency(competencia.to_string()));
    } else {
      seen.push(competencia);
    }
  }

  let contexto = request.contexto.trim();
  if contexto.is_empty() {
    errors.push(SessionFormError::MissingContext);
  } else if !CONTEXTOS_LOCALES.contains(&contexto) {
    errors.push(SessionFormError::UnknownContext(contexto.to_string()));
  }

  if !HORAS_RANGE.contains(&request.horas_clase) {
    errors.push(SessionFormError::HoursOutOfRange(request.horas_clase));
  }

  if request.materiales_disponibles.trim().is_empty() {
    errors.push(SessionFormError::MissingMaterials);
  }

  if errors.is_empty() {
    Ok(())
  } else {
    Err(errors)
  }
}
