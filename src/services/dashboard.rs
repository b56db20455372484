//! Teacher dashboard statistics

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use serde::Serialize;
use std::collections::HashSet;

use super::history::SavedSession;
use crate::domain::session::MINUTES_PER_CLASS_HOUR;

/// Planning time a generated session saves the teacher
pub const MINUTES_SAVED_PER_SESSION: u64 = MINUTES_PER_CLASS_HOUR as u64;

/// Dates are shown in Peru time (UTC-5, no daylight saving)
const LIMA_OFFSET_SECS: i32 = -5 * 3600;

const MONTHS_ES: [&str; 12] = [
  "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
  pub total_sessions: usize,
  pub minutes_saved: u64,
  pub time_saved_label: String,
  pub competencies_used: usize,
  pub contexts_used: usize,
}

impl DashboardStats {
  pub fn from_sessions(sessions: &[SavedSession]) -> Self {
    let total_sessions = sessions.len();
    let minutes_saved = total_sessions as u64 * MINUTES_SAVED_PER_SESSION;

    let competencies: HashSet<&str> = sessions
      .iter()
      .flat_map(|s| s.request.competencias_seleccionadas.iter())
      .map(|c| c.trim())
      .collect();

    let contexts: HashSet<&str> = sessions
      .iter()
      .map(|s| s.request.contexto.trim())
      .filter(|c| !c.is_empty())
      .collect();

    Self {
      total_sessions,
      minutes_saved,
      time_saved_label: format_time_saved(minutes_saved),
      competencies_used: competencies.len(),
      contexts_used: contexts.len(),
    }
  }
}

/// Row of the session history table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
  pub id: u64,
  pub title: Option<String>,
  pub tema: String,
  pub ciclo: String,
  pub contexto: String,
  pub horas_clase: u8,
  /// Steps across all didactic processes
  pub step_count: usize,
  pub created_label: String,
}

impl From<&SavedSession> for SessionSummary {
  fn from(session: &SavedSession) -> Self {
    Self {
      id: session.id,
      title: session.plan.title.clone(),
      tema: session.request.tema.clone(),
      ciclo: session.request.ciclo.as_str().to_string(),
      contexto: session.request.contexto.clone(),
      horas_clase: session.request.horas_clase,
      step_count: session.plan.item_count(),
      created_label: format_session_date(session.created_at),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
  pub stats: DashboardStats,
  pub sessions: Vec<SessionSummary>,
}

impl Dashboard {
  /// `sessions` is expected newest first, as returned by the history
  pub fn build(sessions: &[SavedSession]) -> Self {
    Self {
      stats: DashboardStats::from_sessions(sessions),
      sessions: sessions.iter().map(SessionSummary::from).collect(),
    }
  }
}

/// "2h 15m"
pub fn format_time_saved(minutes: u64) -> String {
  format!("{}h {}m", minutes / 60, minutes % 60)
}

/// "15 oct, 10:30" in Lima time
pub fn format_session_date(dt: DateTime<Utc>) -> String {
  let Some(offset) = FixedOffset::east_opt(LIMA_OFFSET_SECS) else {
    return "N/A".to_string();
  };
  let local = dt.with_timezone(&offset);
  format!(
    "{} {}, {:02}:{:02}",
    local.day(),
    MONTHS_ES[local.month0() as usize],
    local.hour(),
    local.minute()
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Ciclo, DidacticProcess, LessonPlanRecord, SessionRequest};
  use chrono::TimeZone;

  fn saved(id: u64, competencias: &[&str], contexto: &str) -> SavedSession {
    SavedSession {
      id,
      created_at: Utc.with_ymd_and_hms(2025, 10, 15, 15, 30, 0).unwrap(),
      request: SessionRequest {
        tema: format!("Tema {}", id),
        competencias_seleccionadas: competencias.iter().map(|c| c.to_string()).collect(),
        ciclo: Ciclo::VI,
        contexto: contexto.into(),
        horas_clase: 2,
        materiales_disponibles: "pizarra".into(),
      },
      plan: LessonPlanRecord::default(),
      strategy: "heuristic".into(),
    }
  }

  #[test]
  fn test_stats_count_distinct_values() {
    let sessions = vec![
      saved(1, &["Resuelve problemas de cantidad"], "Rural"),
      saved(
        2,
        &[
          "Resuelve problemas de cantidad",
          "Resuelve problemas de gestión de datos e incertidumbre",
        ],
        "Rural",
      ),
      saved(3, &[], "Pesquero"),
      saved(4, &[], ""),
    ];
    let stats = DashboardStats::from_sessions(&sessions);
    assert_eq!(stats.total_sessions, 4);
    assert_eq!(stats.minutes_saved, 180);
    assert_eq!(stats.time_saved_label, "3h 0m");
    assert_eq!(stats.competencies_used, 2);
    assert_eq!(stats.contexts_used, 2);
  }

  #[test]
  fn test_empty_dashboard() {
    let dashboard = Dashboard::build(&[]);
    assert_eq!(dashboard.stats.total_sessions, 0);
    assert_eq!(dashboard.stats.time_saved_label, "0h 0m");
    assert!(dashboard.sessions.is_empty());
  }

  #[test]
  fn test_time_saved_label() {
    assert_eq!(format_time_saved(45), "0h 45m");
    assert_eq!(format_time_saved(135), "2h 15m");
  }

  #[test]
  fn test_session_date_in_lima_time() {
    let dt = Utc.with_ymd_and_hms(2025, 10, 15, 15, 30, 0).unwrap();
    assert_eq!(format_session_date(dt), "15 oct, 10:30");

    // Crosses midnight back into the previous day
    let early = Utc.with_ymd_and_hms(2025, 1, 1, 2, 5, 0).unwrap();
    assert_eq!(format_session_date(early), "31 dic, 21:05");
  }

  #[test]
  fn test_summary_rows() {
    let dashboard = Dashboard::build(&[saved(7, &[], "Minero")]);
    let row = &dashboard.sessions[0];
    assert_eq!(row.id, 7);
    assert_eq!(row.ciclo, "VI");
    assert_eq!(row.created_label, "15 oct, 10:30");
    assert_eq!(row.step_count, 0);
  }

  #[test]
  fn test_summary_counts_steps() {
    let mut session = saved(3, &[], "Urbano");
    session.plan.didactic_processes = vec![
      DidacticProcess {
        heading: "Inicio".into(),
        items: vec!["Saludo".into(), "Problema".into()],
      },
      DidacticProcess {
        heading: "Cierre".into(),
        items: vec!["Metacognición".into()],
      },
    ];
    let row = SessionSummary::from(&session);
    assert_eq!(row.step_count, 3);
  }
}
