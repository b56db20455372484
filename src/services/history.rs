//! In-memory history of generated sessions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{LessonPlanRecord, SessionRequest};

/// A generated session kept for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSession {
  pub id: u64,
  pub created_at: DateTime<Utc>,
  pub request: SessionRequest,
  pub plan: LessonPlanRecord,
  /// Normalizer strategy that produced `plan`
  pub strategy: String,
}

/// Error returned when the history lock cannot be acquired
#[derive(Debug)]
pub struct HistoryError;

impl std::fmt::Display for HistoryError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Session history unavailable")
  }
}

impl std::error::Error for HistoryError {}

struct HistoryInner {
  next_id: u64,
  sessions: Vec<SavedSession>,
}

/// Shared, cloneable session store
#[derive(Clone)]
pub struct SessionHistory {
  inner: Arc<Mutex<HistoryInner>>,
}

impl Default for SessionHistory {
  fn default() -> Self {
    Self {
      inner: Arc::new(Mutex::new(HistoryInner {
        next_id: 1,
        sessions: Vec::new(),
      })),
    }
  }
}

impl SessionHistory {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<MutexGuard<'_, HistoryInner>, HistoryError> {
    self.inner.lock().map_err(|_: PoisonError<_>| {
      tracing::error!("Session history mutex poisoned");
      HistoryError
    })
  }

  /// Store a new session and return it with its assigned id
  pub fn insert(
    &self,
    request: SessionRequest,
    plan: LessonPlanRecord,
    strategy: &str,
  ) -> Result<SavedSession, HistoryError> {
    let mut inner = self.lock()?;
    let session = SavedSession {
      id: inner.next_id,
      created_at: Utc::now(),
      request,
      plan,
      strategy: strategy.to_string(),
    };
    inner.next_id += 1;
    inner.sessions.push(session.clone());
    Ok(session)
  }

  /// All sessions, newest first
  pub fn list(&self) -> Result<Vec<SavedSession>, HistoryError> {
    let inner = self.lock()?;
    Ok(inner.sessions.iter().rev().cloned().collect())
  }

  pub fn get(&self, id: u64) -> Result<Option<SavedSession>, HistoryError> {
    let inner = self.lock()?;
    Ok(inner.sessions.iter().find(|s| s.id == id).cloned())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Ciclo;

  fn request(tema: &str) -> SessionRequest {
    SessionRequest {
      tema: tema.into(),
      competencias_seleccionadas: vec!["Resuelve problemas de cantidad".into()],
      ciclo: Ciclo::VII,
      contexto: "Urbano".into(),
      horas_clase: 1,
      materiales_disponibles: "proyector".into(),
    }
  }

  #[test]
  fn test_ids_increase_and_list_is_newest_first() {
    let history = SessionHistory::new();
    let first = history
      .insert(request("Fracciones"), LessonPlanRecord::default(), "direct")
      .unwrap();
    let second = history
      .insert(request("Porcentajes"), LessonPlanRecord::default(), "heuristic")
      .unwrap();
    assert_eq!((first.id, second.id), (1, 2));

    let listed = history.list().unwrap();
    let temas: Vec<&str> = listed.iter().map(|s| s.request.tema.as_str()).collect();
    assert_eq!(temas, vec!["Porcentajes", "Fracciones"]);
  }

  #[test]
  fn test_get_by_id() {
    let history = SessionHistory::new();
    let saved = history
      .insert(request("Fracciones"), LessonPlanRecord::default(), "fenced")
      .unwrap();
    assert_eq!(history.get(saved.id).unwrap(), Some(saved));
    assert_eq!(history.get(99).unwrap(), None);
  }

  #[test]
  fn test_clones_share_storage() {
    let history = SessionHistory::new();
    let clone = history.clone();
    clone
      .insert(request("Fracciones"), LessonPlanRecord::default(), "direct")
      .unwrap();
    assert_eq!(history.list().unwrap().len(), 1);
  }
}
