//! Structured error types for the rate alert engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("parse: {0}")]
  Parse(String),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),
}

impl EngineError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn parse(msg: impl Into<String>) -> Self {
    Self::Parse(msg.into())
  }
}

/// Delivery failure reported by a bus subscriber or a topic member.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
  #[error("{recipient} rejected notification: {reason}")]
  Rejected { recipient: String, reason: String },

  #[error("{failed} of {attempted} recipients failed")]
  Partial { failed: usize, attempted: usize },
}

impl NotifyError {
  pub fn rejected(recipient: &str, reason: impl Into<String>) -> Self {
    Self::Rejected {
      recipient: recipient.to_string(),
      reason: reason.into(),
    }
  }
}
