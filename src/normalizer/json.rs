//! JSON extraction strategies.
//!
//! Generation services answer with bare JSON, JSON inside a markdown fence,
//! or JSON surrounded by chatter. Each strategy only accepts a JSON object.

use serde::Serialize;
use serde_json::Value;

use crate::domain::GenericRecord;

/// Which extraction strategy produced a decoded object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonStrategy {
  /// The whole payload is a JSON object
  Direct,
  /// Object found inside a ```json fence
  Fenced,
  /// Object found between the first `{` and the last `}`
  Embedded,
}

impl JsonStrategy {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Direct => "direct",
      Self::Fenced => "fenced",
      Self::Embedded => "embedded",
    }
  }
}

/// A single strategy that did not yield an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedJson {
  pub strategy: JsonStrategy,
  pub message: String,
}

impl MalformedJson {
  fn new(strategy: JsonStrategy, message: impl Into<String>) -> Self {
    Self {
      strategy,
      message: message.into(),
    }
  }
}

impl std::fmt::Display for MalformedJson {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} strategy: {}", self.strategy.as_str(), self.message)
  }
}

/// Decoded object together with the strategy that found it
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDocument {
  pub record: GenericRecord,
  pub strategy: JsonStrategy,
}

/// Run the three JSON strategies in order; first success wins.
///
/// On failure every attempt is returned for diagnostics.
pub fn decode(raw: &str) -> Result<JsonDocument, Vec<MalformedJson>> {
  let mut attempts = Vec::with_capacity(3);

  match decode_object(raw) {
    Ok(record) => return Ok(found(record, JsonStrategy::Direct)),
    Err(message) => attempts.push(MalformedJson::new(JsonStrategy::Direct, message)),
  }

  match find_fenced_block(raw) {
    Some(block) => match decode_object(block) {
      Ok(record) => return Ok(found(record, JsonStrategy::Fenced)),
      Err(message) => attempts.push(MalformedJson::new(JsonStrategy::Fenced, message)),
    },
    None => attempts.push(MalformedJson::new(JsonStrategy::Fenced, "no code fence found")),
  }

  match find_embedded_object(raw) {
    Some(candidate) => match decode_object(candidate) {
      Ok(record) => return Ok(found(record, JsonStrategy::Embedded)),
      Err(message) => attempts.push(MalformedJson::new(JsonStrategy::Embedded, message)),
    },
    None => attempts.push(MalformedJson::new(JsonStrategy::Embedded, "no braces found")),
  }

  Err(attempts)
}

fn found(record: GenericRecord, strategy: JsonStrategy) -> JsonDocument {
  tracing::debug!("Decoded generation response via {} strategy", strategy.as_str());
  JsonDocument { record, strategy }
}

fn decode_object(text: &str) -> Result<GenericRecord, String> {
  match serde_json::from_str::<Value>(text) {
    Ok(Value::Object(record)) => Ok(record),
    Ok(other) => Err(format!("expected a JSON object, found {}", value_kind(&other))),
    Err(e) => Err(e.to_string()),
  }
}

fn value_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// Body of the first triple-backtick fence, with an optional `json` tag removed
pub fn find_fenced_block(raw: &str) -> Option<&str> {
  let start = raw.find("```")?;
  let mut body = &raw[start + 3..];

  if body
    .get(..4)
    .is_some_and(|tag| tag.eq_ignore_ascii_case("json"))
  {
    body = &body[4..];
  }

  let end = body.find("```")?;
  Some(body[..end].trim())
}

/// Text from the first `{` to the last `}` inclusive
pub fn find_embedded_object(raw: &str) -> Option<&str> {
  let start = raw.find('{')?;
  let end = raw.rfind('}')?;
  if end > start {
    Some(&raw[start..=end])
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fenced_block_with_tag() {
    let input = "Aquí está:\n```json\n{\"tema\": \"Fracciones\"}\n```\nSaludos";
    assert_eq!(find_fenced_block(input), Some(r#"{"tema": "Fracciones"}"#));
  }

  #[test]
  fn test_fenced_block_without_tag() {
    let input = "```\n{\"a\": 1}\n```";
    assert_eq!(find_fenced_block(input), Some(r#"{"a": 1}"#));
  }

  #[test]
  fn test_fenced_block_uppercase_tag() {
    let input = "```JSON {\"a\": 1}```";
    assert_eq!(find_fenced_block(input), Some(r#"{"a": 1}"#));
  }

  #[test]
  fn test_unterminated_fence_is_not_a_block() {
    assert_eq!(find_fenced_block("```json\n{\"a\": 1}"), None);
  }

  #[test]
  fn test_embedded_object_bounds() {
    assert_eq!(
      find_embedded_object("here you go: {\"a\":1} thanks"),
      Some(r#"{"a":1}"#)
    );
    assert_eq!(find_embedded_object("} backwards {"), None);
    assert_eq!(find_embedded_object("no braces"), None);
  }

  #[test]
  fn test_direct_array_is_rejected() {
    let attempts = decode("[1, 2, 3]").unwrap_err();
    assert_eq!(attempts.len(), 3);
    assert_eq!(attempts[0].strategy, JsonStrategy::Direct);
    assert!(attempts[0].message.contains("an array"));
  }

  #[test]
  fn test_malformed_fence_falls_through_to_embedded() {
    let input = "```json\nnot valid\n```\nfinal: {\"ok\": true}";
    let doc = decode(input).unwrap();
    assert_eq!(doc.strategy, JsonStrategy::Embedded);
    assert_eq!(doc.record["ok"], Value::Bool(true));
  }

  #[test]
  fn test_object_inside_array_found_by_embedded() {
    let doc = decode("[{\"a\": 1}]").unwrap();
    assert_eq!(doc.strategy, JsonStrategy::Embedded);
    assert_eq!(doc.record["a"], 1);
  }
}
