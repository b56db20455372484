use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::domain::{GenericRecord, LessonPlanRecord};
use crate::normalizer::{self, NormalizeMode, NormalizedResponse};

#[derive(Debug, Default, Deserialize)]
pub struct NormalizeQuery {
  /// Disable the text fallback
  #[serde(default)]
  pub strict: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeResult {
  pub strategy: &'static str,
  /// Decoded object as received, for JSON strategies
  #[serde(skip_serializing_if = "Option::is_none")]
  pub record: Option<GenericRecord>,
  pub lesson_plan: LessonPlanRecord,
  pub is_empty: bool,
  /// Lines the text parser did not recognize
  #[serde(skip_serializing_if = "Option::is_none")]
  pub unmatched_lines: Option<usize>,
}

impl From<NormalizedResponse> for NormalizeResult {
  fn from(response: NormalizedResponse) -> Self {
    let strategy = response.strategy_name();
    let lesson_plan = response.to_lesson_plan();
    let is_empty = lesson_plan.is_empty();
    match response {
      NormalizedResponse::Json(doc) => Self {
        strategy,
        record: Some(doc.record),
        lesson_plan,
        is_empty,
        unmatched_lines: None,
      },
      NormalizedResponse::Text(parsed) => Self {
        strategy,
        record: None,
        lesson_plan,
        is_empty,
        unmatched_lines: Some(parsed.unmatched_lines),
      },
    }
  }
}

/// Normalize an arbitrary generation response body.
///
/// POST /api/normalize?strict=true|false
pub async fn normalize_response(
  Query(query): Query<NormalizeQuery>,
  body: String,
) -> Result<Json<NormalizeResult>, ApiError> {
  let mode = NormalizeMode::from_strict_flag(query.strict);
  let response = normalizer::normalize(&body, mode).map_err(ApiError::Parse)?;
  Ok(Json(NormalizeResult::from(response)))
}
