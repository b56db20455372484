//! Mapping from the generator's free-form JSON to [`LessonPlanRecord`].
//!
//! The external payload changes between generator versions, so each field
//! accepts several key names and several value shapes. Only the fields the
//! presentation layer reads are mapped; everything else is left in the
//! generic record.

use serde_json::Value;

use super::{NormalizedResponse, heuristic, normalize_lenient};
use crate::domain::{DidacticProcess, GenericRecord, LessonPlanRecord};

static TITLE_KEYS: &[&str] = &["title", "titulo", "título", "nombreSesion", "sessionTitle"];
static TOPIC_KEYS: &[&str] = &["topic", "tema"];
static COMPETENCY_KEYS: &[&str] = &[
  "competency",
  "competencia",
  "competencias",
  "competenciasSeleccionadas",
  "competenciaDescripcion",
];
static DURATION_KEYS: &[&str] = &["duration", "duracion", "duración"];
static DISTRIBUTION_KEYS: &[&str] = &["hourDistribution", "distribucionHoras", "distribucion"];
static CONTEXT_KEYS: &[&str] = &["context", "contexto"];
static PROCESS_KEYS: &[&str] = &[
  "didacticProcesses",
  "procesos",
  "procesosDidacticos",
  "secuenciaMetodologica",
];
static CRITERIA_KEYS: &[&str] = &[
  "evaluationCriteria",
  "criterios",
  "criteriosEvaluacion",
  "evaluacion",
];
static MATERIAL_KEYS: &[&str] = &[
  "suggestedMaterials",
  "materialesDidacticosSugeridos",
  "materialesSugeridos",
];
static ACTIVITY_KEYS: &[&str] = &[
  "contextualizedActivities",
  "actividadesContextualizadas",
  "actividades",
];

// Inside a process object
static HEADING_KEYS: &[&str] = &["heading", "titulo", "title", "nombre", "fase"];
static ITEM_KEYS: &[&str] = &["items", "actividades", "pasos", "descripcion"];

/// Keys under which webhooks wrap the model's raw text
static TEXT_KEYS: &[&str] = &["output", "text", "respuesta", "response", "content", "message"];

impl LessonPlanRecord {
  /// Build a typed record from whatever object the generator returned.
  ///
  /// If no known field is present but the object wraps a text payload, that
  /// text is normalized once more (one level deep).
  pub fn from_generic(record: &GenericRecord) -> Self {
    map_generic(record, true)
  }
}

fn map_generic(record: &GenericRecord, unwrap_text: bool) -> LessonPlanRecord {
  let mapped = LessonPlanRecord {
    title: first_text(record, TITLE_KEYS),
    topic: first_text(record, TOPIC_KEYS),
    competency: first_text(record, COMPETENCY_KEYS),
    duration: first_text(record, DURATION_KEYS),
    context: first_text(record, CONTEXT_KEYS),
    hour_distribution: first_text(record, DISTRIBUTION_KEYS),
    didactic_processes: first_value(record, PROCESS_KEYS)
      .map(value_processes)
      .unwrap_or_default(),
    evaluation_criteria: first_value(record, CRITERIA_KEYS)
      .map(value_list)
      .unwrap_or_default(),
    suggested_materials: first_value(record, MATERIAL_KEYS)
      .map(value_list)
      .unwrap_or_default(),
    contextualized_activities: first_value(record, ACTIVITY_KEYS)
      .map(value_list)
      .unwrap_or_default(),
  };

  if !mapped.is_empty() || !unwrap_text {
    return mapped;
  }

  let Some(text) = first_value(record, TEXT_KEYS).and_then(Value::as_str) else {
    return mapped;
  };

  tracing::debug!("Generic record has no lesson fields, normalizing wrapped text");
  match normalize_lenient(text) {
    NormalizedResponse::Json(doc) => map_generic(&doc.record, false),
    NormalizedResponse::Text(parsed) => parsed.record,
  }
}

fn first_value<'a>(record: &'a GenericRecord, keys: &[&str]) -> Option<&'a Value> {
  keys
    .iter()
    .filter_map(|key| record.get(*key))
    .find(|value| !value.is_null())
}

fn first_text(record: &GenericRecord, keys: &[&str]) -> Option<String> {
  first_value(record, keys).and_then(value_text)
}

/// Scalar rendering; arrays are joined with "; "
fn value_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => {
      let s = s.trim();
      (!s.is_empty()).then(|| s.to_string())
    }
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Array(values) => {
      let parts: Vec<String> = values.iter().filter_map(value_text).collect();
      (!parts.is_empty()).then(|| parts.join("; "))
    }
    Value::Null | Value::Object(_) => None,
  }
}

/// List rendering; a multi-line string becomes one entry per bullet line
fn value_list(value: &Value) -> Vec<String> {
  match value {
    Value::Array(values) => values.iter().filter_map(value_text).collect(),
    Value::String(s) => s
      .lines()
      .map(|line| {
        let line = line.trim();
        line
          .strip_prefix("- ")
          .or_else(|| line.strip_prefix("• "))
          .unwrap_or(line)
          .trim()
      })
      .filter(|line| !line.is_empty())
      .map(str::to_string)
      .collect(),
    other => value_text(other).into_iter().collect(),
  }
}

fn value_processes(value: &Value) -> Vec<DidacticProcess> {
  match value {
    Value::Array(values) => values.iter().filter_map(array_process).collect(),
    // {"inicio": "...", "desarrollo": "...", "cierre": "..."}
    Value::Object(phases) => phases
      .iter()
      .map(|(phase, body)| DidacticProcess {
        heading: capitalize(phase),
        items: value_list(body),
      })
      .collect(),
    Value::String(text) => heuristic::parse(text).record.didactic_processes,
    _ => Vec::new(),
  }
}

fn array_process(value: &Value) -> Option<DidacticProcess> {
  match value {
    Value::Object(fields) => {
      let heading = first_text(fields, HEADING_KEYS);
      let items = first_value(fields, ITEM_KEYS)
        .map(value_list)
        .unwrap_or_default();
      if heading.is_none() && items.is_empty() {
        return None;
      }
      Some(DidacticProcess {
        heading: heading.unwrap_or_default(),
        items,
      })
    }
    other => value_text(other).map(DidacticProcess::new),
  }
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
