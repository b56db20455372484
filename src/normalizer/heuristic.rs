//! Line-based parser for plain-text lesson plans.
//!
//! Legacy generation responses are not JSON but loosely structured prose:
//!
//! ```text
//! 📘 Sesión de Fracciones
//! Tema: Fracciones equivalentes
//! 1. Inicio
//! - Presentar el problema
//! ✅ Criterios
//! - Identifica fracciones equivalentes
//! ```
//!
//! Lines are matched against an ordered rule table; the first rule whose
//! predicate holds handles the line. The parser moves forward only and never
//! leaves criteria mode once it has entered it.

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::domain::{DidacticProcess, LessonPlanRecord};

const TITLE_MARKER: &str = "📘";
const CRITERIA_MARKER: &str = "✅";
const ITEM_PREFIX: &str = "- ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  Topic,
  Competency,
  Duration,
  Context,
}

static FIELD_PREFIXES: &[(&str, Field)] = &[
  ("Tema:", Field::Topic),
  ("Competencia:", Field::Competency),
  ("Duración:", Field::Duration),
  ("Duracion:", Field::Duration),
  ("Contexto:", Field::Context),
];

/// Result of parsing free text, with line accounting for observability
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeuristicParse {
  pub record: LessonPlanRecord,
  /// Non-blank lines handled by a rule
  pub matched_lines: usize,
  /// Non-blank lines no rule recognized
  pub unmatched_lines: usize,
}

#[derive(Debug)]
enum ParserState {
  /// Before the first numbered heading
  Preamble,
  /// A heading is open and collects `- ` items
  InGroup(DidacticProcess),
  /// After the criteria marker; terminal, `- ` lines become criteria
  InCriteria,
}

struct LineParser {
  state: ParserState,
  record: LessonPlanRecord,
}

/// A trimmed, non-blank input line
struct Line<'a> {
  text: &'a str,
  /// First non-blank line of the input
  is_first: bool,
}

struct LineRule {
  name: &'static str,
  matches: fn(&LineParser, &Line) -> bool,
  apply: fn(&mut LineParser, &Line),
}

/// Evaluated top to bottom for every line; order is precedence
static RULES: &[LineRule] = &[
  LineRule {
    name: "title",
    matches: |_, line| line.is_first && line.text.starts_with(TITLE_MARKER),
    apply: |parser, line| {
      parser.record.title = non_empty(&line.text[TITLE_MARKER.len()..]);
    },
  },
  LineRule {
    name: "field",
    matches: |_, line| field_prefix(line.text).is_some(),
    apply: |parser, line| {
      if let Some((field, value)) = field_prefix(line.text) {
        parser.set_field(field, non_empty(value));
      }
    },
  },
  LineRule {
    name: "heading",
    matches: |_, line| strip_ordinal(line.text).is_some(),
    apply: |parser, line| {
      if let Some(rest) = strip_ordinal(line.text) {
        parser.open_group(heading_text(rest));
      }
    },
  },
  LineRule {
    name: "item",
    matches: |parser, line| {
      line.text.starts_with(ITEM_PREFIX) && matches!(parser.state, ParserState::InGroup(_))
    },
    apply: |parser, line| {
      if let ParserState::InGroup(group) = &mut parser.state {
        group.items.push(line.text[ITEM_PREFIX.len()..].trim().to_string());
      }
    },
  },
  LineRule {
    name: "criteria",
    matches: |_, line| line.text.starts_with(CRITERIA_MARKER),
    apply: |parser, _| parser.enter_criteria(),
  },
  LineRule {
    name: "criterion",
    matches: |parser, line| line.text.starts_with(ITEM_PREFIX) && parser.in_criteria(),
    apply: |parser, line| {
      parser
        .record
        .evaluation_criteria
        .push(line.text[ITEM_PREFIX.len()..].trim().to_string());
    },
  },
];

impl LineParser {
  fn new() -> Self {
    Self {
      state: ParserState::Preamble,
      record: LessonPlanRecord::default(),
    }
  }

  fn in_criteria(&self) -> bool {
    matches!(self.state, ParserState::InCriteria)
  }

  fn set_field(&mut self, field: Field, value: Option<String>) {
    let slot = match field {
      Field::Topic => &mut self.record.topic,
      Field::Competency => &mut self.record.competency,
      Field::Duration => &mut self.record.duration,
      Field::Context => &mut self.record.context,
    };
    *slot = value;
  }

  /// Append the open group (if any) and move to `next`
  fn transition(&mut self, next: ParserState) {
    if let ParserState::InGroup(group) = std::mem::replace(&mut self.state, next) {
      self.record.didactic_processes.push(group);
    }
  }

  /// In criteria mode the heading is appended directly and stays item-less
  fn open_group(&mut self, heading: String) {
    let group = DidacticProcess::new(heading);
    if self.in_criteria() {
      self.record.didactic_processes.push(group);
    } else {
      self.transition(ParserState::InGroup(group));
    }
  }

  fn enter_criteria(&mut self) {
    self.transition(ParserState::InCriteria);
  }

  fn finish(mut self) -> LessonPlanRecord {
    self.transition(ParserState::InCriteria);
    self.record
  }
}

/// Parse loosely structured text into a lesson plan.
///
/// Never fails: input without any recognizable line yields an empty record.
pub fn parse(raw: &str) -> HeuristicParse {
  let normalized: String = raw.nfc().collect();
  let mut parser = LineParser::new();
  let mut matched_lines = 0;
  let mut unmatched_lines = 0;
  let mut seen_content = false;

  for text in normalized.lines().map(str::trim) {
    if text.is_empty() {
      continue;
    }
    let line = Line {
      text,
      is_first: !seen_content,
    };
    seen_content = true;

    match RULES.iter().find(|rule| (rule.matches)(&parser, &line)) {
      Some(rule) => {
        (rule.apply)(&mut parser, &line);
        matched_lines += 1;
        tracing::trace!("Line matched {} rule: {}", rule.name, line.text);
      }
      None => unmatched_lines += 1,
    }
  }

  let record = parser.finish();

  tracing::debug!(
    "Heuristic parse: {} processes, {} criteria, {} lines matched, {} unmatched",
    record.didactic_processes.len(),
    record.evaluation_criteria.len(),
    matched_lines,
    unmatched_lines
  );
  if matched_lines == 0 && unmatched_lines > 0 {
    tracing::warn!(
      "Generation response had no recognizable structure ({} lines ignored)",
      unmatched_lines
    );
  }

  HeuristicParse {
    record,
    matched_lines,
    unmatched_lines,
  }
}

fn field_prefix(line: &str) -> Option<(Field, &str)> {
  FIELD_PREFIXES
    .iter()
    .find_map(|(prefix, field)| line.strip_prefix(*prefix).map(|rest| (*field, rest)))
}

/// Remainder after a leading `<digits>.`
fn strip_ordinal(line: &str) -> Option<&str> {
  let digits = line.bytes().take_while(u8::is_ascii_digit).count();
  if digits == 0 {
    return None;
  }
  line[digits..].strip_prefix('.')
}

fn heading_text(rest: &str) -> String {
  let rest = rest.trim();
  rest.strip_suffix(':').unwrap_or(rest).trim().to_string()
}

fn non_empty(value: &str) -> Option<String> {
  let value = value.trim();
  if value.is_empty() {
    None
  } else {
    Some(value.to_string())
  }
}
