//! Core types for the rate alert engine (JSON contracts + internal models).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Logical time shared by event timestamps, windows, cooldowns and `now`.
///
/// One unit everywhere; the binary reads it as Unix seconds.
pub type Tick = i64;

// ---------------------------------------------------------------------------
// Category (closed, ordered partition key)
// ---------------------------------------------------------------------------

/// Class of a log event. Ordered by severity; ordinals match the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "CategoryRepr")]
pub enum Category {
  Info,
  Warning,
  Critical,
  Blocker,
}

impl Category {
  pub fn from_ordinal(n: u64) -> Option<Self> {
    match n {
      0 => Some(Self::Info),
      1 => Some(Self::Warning),
      2 => Some(Self::Critical),
      3 => Some(Self::Blocker),
      _ => None,
    }
  }

  /// Accepts a name (case-insensitive, common aliases) or an ordinal.
  pub fn parse(s: &str) -> Option<Self> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u64>() {
      return Self::from_ordinal(n);
    }
    match s.to_ascii_lowercase().as_str() {
      "info" | "informational" => Some(Self::Info),
      "warning" | "warn" => Some(Self::Warning),
      "critical" | "crit" => Some(Self::Critical),
      "blocker" => Some(Self::Blocker),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Info => "info",
      Self::Warning => "warning",
      Self::Critical => "critical",
      Self::Blocker => "blocker",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryRepr {
  Ordinal(u64),
  Name(String),
}

impl TryFrom<CategoryRepr> for Category {
  type Error = String;

  fn try_from(repr: CategoryRepr) -> Result<Self, Self::Error> {
    match repr {
      CategoryRepr::Ordinal(n) => {
        Self::from_ordinal(n).ok_or_else(|| format!("unknown category ordinal {}", n))
      }
      CategoryRepr::Name(s) => Self::parse(&s).ok_or_else(|| format!("unknown category {:?}", s)),
    }
  }
}

// ---------------------------------------------------------------------------
// Event (inbound contract)
// ---------------------------------------------------------------------------

/// One decoded log event. Unknown fields are silently ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  #[serde(rename = "type")]
  pub category: Category,
  #[serde(rename = "time")]
  pub timestamp: Tick,
  #[serde(default, alias = "Content")]
  pub content: String,
}

impl Event {
  pub fn new(category: Category, timestamp: Tick, content: impl Into<String>) -> Self {
    Self {
      category,
      timestamp,
      content: content.into(),
    }
  }
}

// ---------------------------------------------------------------------------
// Policy (per-category configuration)
// ---------------------------------------------------------------------------

/// Alerting policy for one category. Validated on construction and on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyDraft")]
pub struct Policy {
  category: Category,
  frequency_threshold: u32,
  window: Tick,
  cooldown: Tick,
}

impl Policy {
  /// Rejects a zero threshold, a non-positive window and a negative cooldown.
  pub fn new(
    category: Category,
    frequency_threshold: u32,
    window: Tick,
    cooldown: Tick,
  ) -> Result<Self, EngineError> {
    if frequency_threshold == 0 {
      return Err(EngineError::validation(
        "frequency_threshold",
        "must be at least 1",
      ));
    }
    if window <= 0 {
      return Err(EngineError::validation("window", "must be positive"));
    }
    if cooldown < 0 {
      return Err(EngineError::validation("cooldown", "must not be negative"));
    }
    Ok(Self {
      category,
      frequency_threshold,
      window,
      cooldown,
    })
  }

  pub fn category(&self) -> Category {
    self.category
  }

  pub fn frequency_threshold(&self) -> u32 {
    self.frequency_threshold
  }

  pub fn window(&self) -> Tick {
    self.window
  }

  pub fn cooldown(&self) -> Tick {
    self.cooldown
  }

  /// Start of the trailing window ending at `now`.
  pub fn window_start(&self, now: Tick) -> Tick {
    now.saturating_sub(self.window)
  }
}

/// Textual form used by the config resource: `[ critical, 10, 100, 100 ]`.
impl fmt::Display for Policy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "[ {}, {}, {}, {} ]",
      self.category, self.frequency_threshold, self.window, self.cooldown
    )
  }
}

/// Policy as decoded, before validation. Accepts the field aliases of older
/// config files (`frequency`, `duration`, `wait_time`).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PolicyDraft {
  pub category: Category,
  #[serde(alias = "frequency")]
  pub frequency_threshold: i64,
  #[serde(alias = "duration", alias = "window_duration")]
  pub window: Tick,
  #[serde(alias = "wait_time")]
  pub cooldown: Tick,
}

impl PolicyDraft {
  pub fn validate(self) -> Result<Policy, EngineError> {
    let frequency = u32::try_from(self.frequency_threshold)
      .map_err(|_| EngineError::validation("frequency_threshold", "out of range"))?;
    Policy::new(self.category, frequency, self.window, self.cooldown)
  }
}

impl TryFrom<PolicyDraft> for Policy {
  type Error = EngineError;

  fn try_from(draft: PolicyDraft) -> Result<Self, Self::Error> {
    draft.validate()
  }
}

// ---------------------------------------------------------------------------
// Bus payloads
// ---------------------------------------------------------------------------

/// Fired when a category's trailing-window count meets its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdCrossing {
  pub category: Category,
  pub cooldown: Tick,
  /// Evaluation instant the crossing was observed at.
  pub at: Tick,
}

/// Everything the processor publishes on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
  ThresholdCrossing(ThresholdCrossing),
  BatchComplete { processed: usize, at: Tick },
}

// ---------------------------------------------------------------------------
// Output types (JSON contract, what we emit)
// ---------------------------------------------------------------------------

/// One topic notification that went out (cooldown elapsed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertSummary {
  pub alert_id: String,
  pub category: Category,
  pub at: Tick,
  pub cooldown: Tick,
  pub recipients: Vec<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub failed: Vec<String>,
}
