use serde::{Deserialize, Serialize};

/// Arbitrary JSON object returned by the generation service.
///
/// Key order is preserved so a decoded object can be handed back unchanged.
pub type GenericRecord = serde_json::Map<String, serde_json::Value>;

/// A numbered instructional phase ("Inicio", "Desarrollo", ...) and its steps
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DidacticProcess {
  pub heading: String,
  pub items: Vec<String>,
}

impl DidacticProcess {
  pub fn new(heading: impl Into<String>) -> Self {
    Self {
      heading: heading.into(),
      items: Vec::new(),
    }
  }
}

/// Normalized lesson plan handed to the presentation layer.
///
/// Every field is optional: the generator may omit anything, and an
/// all-empty record means "no information available" rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlanRecord {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub topic: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub competency: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub duration: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub context: Option<String>,
  /// How the sequence is spread over the class hours
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hour_distribution: Option<String>,
  #[serde(default)]
  pub didactic_processes: Vec<DidacticProcess>,
  #[serde(default)]
  pub evaluation_criteria: Vec<String>,
  #[serde(default)]
  pub suggested_materials: Vec<String>,
  /// Activities adapted to the selected local context
  #[serde(default)]
  pub contextualized_activities: Vec<String>,
}

impl LessonPlanRecord {
  /// True when nothing at all could be recovered
  pub fn is_empty(&self) -> bool {
    self.title.is_none()
      && self.topic.is_none()
      && self.competency.is_none()
      && self.duration.is_none()
      && self.context.is_none()
      && self.hour_distribution.is_none()
      && self.didactic_processes.is_empty()
      && self.evaluation_criteria.is_empty()
      && self.suggested_materials.is_empty()
      && self.contextualized_activities.is_empty()
  }

  /// Total number of instructional steps across all processes
  pub fn item_count(&self) -> usize {
    self.didactic_processes.iter().map(|p| p.items.len()).sum()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_record_is_empty() {
    assert!(LessonPlanRecord::default().is_empty());
  }

  #[test]
  fn test_record_with_only_criteria_is_not_empty() {
    let record = LessonPlanRecord {
      evaluation_criteria: vec!["Resuelve con material concreto".into()],
      ..Default::default()
    };
    assert!(!record.is_empty());
  }

  #[test]
  fn test_serializes_camel_case_and_skips_absent_fields() {
    let mut inicio = DidacticProcess::new("Inicio");
    inicio.items.push("Presentar el problema".into());
    let record = LessonPlanRecord {
      topic: Some("Fracciones".into()),
      didactic_processes: vec![inicio],
      ..Default::default()
    };

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["topic"], "Fracciones");
    assert_eq!(json["didacticProcesses"][0]["heading"], "Inicio");
    assert_eq!(json["evaluationCriteria"], serde_json::json!([]));
    assert!(json.get("title").is_none());
    assert_eq!(record.item_count(), 1);
  }
}
