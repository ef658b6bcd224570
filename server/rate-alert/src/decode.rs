//! Decode event batches. Any malformed entry fails the whole batch.

use crate::error::EngineError;
use crate::types::Event;

/// A JSON array of events, e.g. `[{"type": 2, "time": 10, "Content": "..."}]`.
pub fn from_json(input: &str) -> Result<Vec<Event>, EngineError> {
  serde_json::from_str(input).map_err(|e| EngineError::parse(format!("event batch: {}", e)))
}

/// One event per line; blank lines are skipped.
pub fn from_json_lines(input: &str) -> Result<Vec<Event>, EngineError> {
  input
    .lines()
    .enumerate()
    .filter(|(_, line)| !line.trim().is_empty())
    .map(|(idx, line)| {
      serde_json::from_str(line.trim())
        .map_err(|e| EngineError::parse(format!("line {}: {}", idx + 1, e)))
    })
    .collect()
}

/// Array when the input starts with `[`, JSON lines otherwise.
pub fn decode(input: &str) -> Result<Vec<Event>, EngineError> {
  if input.trim_start().starts_with('[') {
    from_json(input)
  } else {
    from_json_lines(input)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::Category;

  #[test]
  fn decodes_array_batch() {
    let events = decode(
      r#"[
        {"type": 0, "time": 1629395400, "Content": "started"},
        {"type": 2, "time": 1629395450, "Content": "db down"}
      ]"#,
    )
    .unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].category, Category::Critical);
    assert_eq!(events[1].content, "db down");
  }

  #[test]
  fn decodes_lines_and_skips_blanks() {
    let input = "{\"type\": \"warning\", \"time\": 1}\n\n  \n{\"type\": 1, \"time\": 2}\n";
    let events = decode(input).unwrap();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.category == Category::Warning));
  }

  #[test]
  fn bad_line_fails_fast_with_line_number() {
    let input = "{\"type\": 0, \"time\": 1}\n{\"type\": 7, \"time\": 2}\n";
    let err = decode(input).unwrap_err();
    assert!(err.to_string().contains("line 2"), "{}", err);
  }

  #[test]
  fn malformed_array_is_rejected() {
    assert!(from_json(r#"[{"type": 0}]"#).is_err());
  }
}
