//! Response normalization for the generation service.
//!
//! Turns the raw body returned by the generation webhook into structured data
//! using an ordered fallback chain; the first strategy that succeeds wins:
//!
//! 1. direct JSON decode of the whole body
//! 2. JSON inside a markdown code fence
//! 3. JSON between the first `{` and the last `}`
//! 4. heuristic line parsing of plain-text lesson plans (lenient mode only)
//!
//! Normalization is pure and linear in the input length. Malformed input is
//! never a panic: lenient mode always yields a record, strict mode reports
//! [`ParseFailure::StrictModeExhausted`].

pub mod heuristic;
pub mod json;
pub mod mapping;

pub use heuristic::HeuristicParse;
pub use json::{JsonDocument, JsonStrategy, MalformedJson};

use crate::domain::LessonPlanRecord;

/// Whether the heuristic text parser may be used as a last resort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizeMode {
  /// Always produce a record, parsing text heuristically if needed
  #[default]
  Lenient,
  /// JSON strategies only; fail if none decodes an object
  Strict,
}

impl NormalizeMode {
  pub fn from_strict_flag(strict: bool) -> Self {
    if strict { Self::Strict } else { Self::Lenient }
  }
}

/// Most specific structure that could be recovered from a response
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResponse {
  /// An object decoded by one of the JSON strategies, unchanged
  Json(JsonDocument),
  /// A record recovered by the line parser
  Text(HeuristicParse),
}

impl NormalizedResponse {
  pub fn strategy_name(&self) -> &'static str {
    match self {
      Self::Json(doc) => doc.strategy.as_str(),
      Self::Text(_) => "heuristic",
    }
  }

  /// Typed view used by the presentation layer
  pub fn to_lesson_plan(&self) -> LessonPlanRecord {
    match self {
      Self::Json(doc) => LessonPlanRecord::from_generic(&doc.record),
      Self::Text(parsed) => parsed.record.clone(),
    }
  }

  pub fn into_lesson_plan(self) -> LessonPlanRecord {
    match self {
      Self::Json(doc) => LessonPlanRecord::from_generic(&doc.record),
      Self::Text(parsed) => parsed.record,
    }
  }
}

/// Normalization failure, only produced in strict mode
#[derive(Debug, Clone, PartialEq)]
pub enum ParseFailure {
  /// None of the JSON strategies produced an object
  StrictModeExhausted {
    raw: String,
    attempts: Vec<MalformedJson>,
  },
}

impl std::fmt::Display for ParseFailure {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ParseFailure::StrictModeExhausted { raw, attempts } => {
        write!(f, "No JSON object in response ({} bytes)", raw.len())?;
        for attempt in attempts {
          write!(f, "; {}", attempt)?;
        }
        Ok(())
      }
    }
  }
}

impl ParseFailure {
  /// Returns a user-facing message without echoing the raw response.
  pub fn user_message(&self) -> &'static str {
    match self {
      ParseFailure::StrictModeExhausted { .. } => {
        "No se pudo interpretar la respuesta de la IA. Intenta nuevamente."
      }
    }
  }

  pub fn raw(&self) -> &str {
    match self {
      ParseFailure::StrictModeExhausted { raw, .. } => raw,
    }
  }
}

impl std::error::Error for ParseFailure {}

/// Normalize a generation response in the given mode
pub fn normalize(raw: &str, mode: NormalizeMode) -> Result<NormalizedResponse, ParseFailure> {
  match mode {
    NormalizeMode::Strict => normalize_strict(raw).map(NormalizedResponse::Json),
    NormalizeMode::Lenient => Ok(normalize_lenient(raw)),
  }
}

/// JSON strategies only
pub fn normalize_strict(raw: &str) -> Result<JsonDocument, ParseFailure> {
  json::decode(raw).map_err(|attempts| ParseFailure::StrictModeExhausted {
    raw: raw.to_string(),
    attempts,
  })
}

/// Full fallback chain; never fails
pub fn normalize_lenient(raw: &str) -> NormalizedResponse {
  match json::decode(raw) {
    Ok(doc) => NormalizedResponse::Json(doc),
    Err(attempts) => {
      tracing::debug!(
        "No JSON in response ({} attempts failed), parsing as text",
        attempts.len()
      );
      NormalizedResponse::Text(heuristic::parse(raw))
    }
  }
}
