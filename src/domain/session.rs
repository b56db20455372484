use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// National mathematics competencies a session can target
pub const COMPETENCIAS_NACIONALES: [&str; 4] = [
  "Resuelve problemas de cantidad",
  "Resuelve problemas de regularidad, equivalencia y cambios",
  "Resuelve problemas de forma, movimiento y localización",
  "Resuelve problemas de gestión de datos e incertidumbre",
];

/// Social contexts offered in the form
pub const CONTEXTOS_LOCALES: [&str; 7] = [
  "Urbano",
  "Rural",
  "Agrícola",
  "Pesquero",
  "Comercial",
  "Minero",
  "Turístico",
];

/// Length of one pedagogical class hour
pub const MINUTES_PER_CLASS_HOUR: u32 = 45;

/// Class hours a single session may span
pub const HORAS_RANGE: RangeInclusive<u8> = 1..=6;

/// Secondary-school grade cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ciclo {
  VI,
  VII,
}

impl Ciclo {
  pub const ALL: [Ciclo; 2] = [Ciclo::VI, Ciclo::VII];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::VI => "VI",
      Self::VII => "VII",
    }
  }

  pub fn description(&self) -> &'static str {
    match self {
      Self::VI => "1º y 2º de secundaria (11-13 años)",
      Self::VII => "3º, 4º y 5º de secundaria (14-17 años)",
    }
  }

  /// Expected achievement level used when describing the competency
  pub fn expected_level(&self) -> &'static str {
    match self {
      Self::VI => "Los estudiantes desarrollan habilidades básicas y fundamentales",
      Self::VII => "Los estudiantes consolidan y profundizan sus competencias matemáticas",
    }
  }
}

/// Form submitted by a teacher to request a lesson session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
  pub tema: String,
  pub competencias_seleccionadas: Vec<String>,
  pub ciclo: Ciclo,
  pub contexto: String,
  pub horas_clase: u8,
  pub materiales_disponibles: String,
}

impl SessionRequest {
  pub fn total_minutes(&self) -> u32 {
    u32::from(self.horas_clase) * MINUTES_PER_CLASS_HOUR
  }
}

/// Changes to a stored form before generating again; absent fields are kept
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionEdit {
  pub tema: Option<String>,
  pub competencias_seleccionadas: Option<Vec<String>>,
  pub ciclo: Option<Ciclo>,
  pub contexto: Option<String>,
  pub horas_clase: Option<u8>,
  pub materiales_disponibles: Option<String>,
}

impl SessionEdit {
  pub fn apply_to(self, base: SessionRequest) -> SessionRequest {
    SessionRequest {
      tema: self.tema.unwrap_or(base.tema),
      competencias_seleccionadas: self
        .competencias_seleccionadas
        .unwrap_or(base.competencias_seleccionadas),
      ciclo: self.ciclo.unwrap_or(base.ciclo),
      contexto: self.contexto.unwrap_or(base.contexto),
      horas_clase: self.horas_clase.unwrap_or(base.horas_clase),
      materiales_disponibles: self
        .materiales_disponibles
        .unwrap_or(base.materiales_disponibles),
    }
  }
}

/// Minutes assigned to each phase of the methodological sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseMinutes {
  pub inicio: u32,
  pub desarrollo: u32,
  pub cierre: u32,
}

impl PhaseMinutes {
  /// 20% / 60% / 20% split of the session, rounded up
  pub fn for_hours(horas: u8) -> Self {
    let total = u32::from(horas) * MINUTES_PER_CLASS_HOUR;
    Self {
      inicio: ceil_percent(total, 20),
      desarrollo: ceil_percent(total, 60),
      cierre: ceil_percent(total, 20),
    }
  }
}

fn ceil_percent(total: u32, percent: u32) -> u32 {
  (total * percent).div_ceil(100)
}

/// Human-readable distribution of the sequence across the class hours
pub fn distribution_summary(horas: u8) -> String {
  if horas <= 1 {
    return "Sesión única de 45 minutos: Inicio (10 min), Desarrollo (30 min), Cierre (5 min)"
      .to_string();
  }

  let hours: Vec<String> = (1..=horas)
    .map(|hora| {
      let label = if hora == 1 {
        "Problematización y familiarización"
      } else if hora == horas {
        "Reflexión y cierre"
      } else {
        "Desarrollo de estrategias"
      };
      format!("Hora {}: {}", hora, label)
    })
    .collect();

  format!("Distribución en {} horas: {}", horas, hours.join(", "))
}
