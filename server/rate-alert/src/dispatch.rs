//! Alert dispatcher: maps threshold crossings to topics and debounces fan-out.
//!
//! Each [`Topic`] remembers when it last notified its members. A crossing
//! notifies a topic only when `at - last_notified > cooldown`; a crossing at
//! exactly the cooldown boundary is suppressed.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::bus::Subscriber;
use crate::config::TopicSpec;
use crate::error::NotifyError;
use crate::types::{AlertSummary, Category, Signal, ThresholdCrossing, Tick};

// ---------------------------------------------------------------------------
// Recipients
// ---------------------------------------------------------------------------

/// A topic member that can be told a category crossed its threshold.
pub trait Recipient: Send + Sync + fmt::Debug {
  fn name(&self) -> &str;

  fn notify(&self, crossing: &ThresholdCrossing) -> Result<(), NotifyError>;
}

/// A person subscribed to a topic. Delivery (mail, push) happens elsewhere.
#[derive(Debug, Clone)]
pub struct User {
  id: Uuid,
  name: String,
}

impl User {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      id: Uuid::new_v4(),
      name: name.into(),
    }
  }

  pub fn id(&self) -> Uuid {
    self.id
  }
}

impl Recipient for User {
  fn name(&self) -> &str {
    &self.name
  }

  fn notify(&self, crossing: &ThresholdCrossing) -> Result<(), NotifyError> {
    info!(
      user = %self.name,
      id = %self.id,
      category = %crossing.category,
      "user notified"
    );
    Ok(())
  }
}

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

/// Subscribers interested in one category.
#[derive(Debug, Clone)]
pub struct Topic {
  category: Category,
  members: Vec<Arc<dyn Recipient>>,
  last_notified: Tick,
}

impl Topic {
  pub fn new(category: Category, members: Vec<Arc<dyn Recipient>>) -> Self {
    Self {
      category,
      members,
      last_notified: 0,
    }
  }

  pub fn with_last_notified(mut self, at: Tick) -> Self {
    self.last_notified = at;
    self
  }

  /// Topic of [`User`]s built from a roster entry.
  pub fn from_spec(spec: &TopicSpec) -> Self {
    let members = spec
      .members
      .iter()
      .map(|name| Arc::new(User::new(name.as_str())) as Arc<dyn Recipient>)
      .collect();
    Self::new(spec.category, members).with_last_notified(spec.last_notified)
  }

  pub fn category(&self) -> Category {
    self.category
  }

  pub fn members(&self) -> &[Arc<dyn Recipient>] {
    &self.members
  }

  pub fn last_notified(&self) -> Tick {
    self.last_notified
  }

  /// Strictly greater: the boundary instant is still inside the cooldown.
  pub fn cooldown_elapsed(&self, at: Tick, cooldown: Tick) -> bool {
    at.saturating_sub(self.last_notified) > cooldown
  }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Bus subscriber that owns every topic's `last_notified`.
#[derive(Debug, Default)]
pub struct AlertDispatcher {
  topics: Mutex<Vec<Topic>>,
  sent: Mutex<Vec<AlertSummary>>,
}

impl AlertDispatcher {
  pub fn new(topics: Vec<Topic>) -> Self {
    Self {
      topics: Mutex::new(topics),
      sent: Mutex::new(Vec::new()),
    }
  }

  pub fn from_specs(specs: &[TopicSpec]) -> Self {
    Self::new(specs.iter().map(Topic::from_spec).collect())
  }

  pub fn add_topic(&self, topic: Topic) {
    self.topics.lock().push(topic);
  }

  /// `last_notified` of each topic for `category`, in roster order.
  pub fn last_notified(&self, category: Category) -> Vec<Tick> {
    self
      .topics
      .lock()
      .iter()
      .filter(|t| t.category == category)
      .map(|t| t.last_notified)
      .collect()
  }

  /// Summaries produced since the last call.
  pub fn take_sent(&self) -> Vec<AlertSummary> {
    std::mem::take(&mut *self.sent.lock())
  }

  /// Notify every eligible topic for the crossing's category.
  ///
  /// All members of an eligible topic are attempted even when some fail; the
  /// topic's cooldown restarts regardless. Failures are reported afterwards.
  pub fn dispatch(&self, crossing: &ThresholdCrossing) -> Result<Vec<AlertSummary>, NotifyError> {
    // Claim eligible topics under the lock, notify outside it.
    let eligible: Vec<(usize, Vec<Arc<dyn Recipient>>)> = {
      let mut topics = self.topics.lock();
      topics
        .iter_mut()
        .enumerate()
        .filter(|(_, t)| t.category == crossing.category)
        .filter_map(|(idx, topic)| {
          if topic.cooldown_elapsed(crossing.at, crossing.cooldown) {
            topic.last_notified = crossing.at;
            Some((idx, topic.members.clone()))
          } else {
            info!(
              category = %topic.category,
              last_notified = topic.last_notified,
              cooldown = crossing.cooldown,
              at = crossing.at,
              "cooldown not elapsed; notification suppressed"
            );
            None
          }
        })
        .collect()
    };

    let mut summaries = Vec::with_capacity(eligible.len());
    let mut attempted = 0;
    let mut failed_total = 0;
    for (idx, members) in eligible {
      let mut recipients = Vec::with_capacity(members.len());
      let mut failed = Vec::new();
      for member in &members {
        attempted += 1;
        match member.notify(crossing) {
          Ok(()) => recipients.push(member.name().to_string()),
          Err(e) => {
            warn!(recipient = member.name(), error = %e, "recipient notification failed");
            failed.push(member.name().to_string());
          }
        }
      }
      failed_total += failed.len();
      info!(
        category = %crossing.category,
        notified = recipients.len(),
        "subscribers notified that category exceeded its limit"
      );
      summaries.push(AlertSummary {
        alert_id: alert_id(crossing, idx),
        category: crossing.category,
        at: crossing.at,
        cooldown: crossing.cooldown,
        recipients,
        failed,
      });
    }

    self.sent.lock().extend(summaries.iter().cloned());

    if failed_total > 0 {
      return Err(NotifyError::Partial {
        failed: failed_total,
        attempted,
      });
    }
    Ok(summaries)
  }
}

impl Subscriber<Signal> for AlertDispatcher {
  fn name(&self) -> &str {
    "alert-dispatcher"
  }

  fn notify(&self, payload: &Signal) -> Result<(), NotifyError> {
    match payload {
      Signal::ThresholdCrossing(crossing) => self.dispatch(crossing).map(|_| ()),
      _ => Ok(()),
    }
  }
}

/// Stable alert id: hash of category + topic position + instant.
fn alert_id(crossing: &ThresholdCrossing, topic_idx: usize) -> String {
  let mut hasher = blake3::Hasher::new();
  hasher.update(crossing.category.as_str().as_bytes());
  hasher.update(b"|");
  hasher.update(&topic_idx.to_le_bytes());
  hasher.update(b"|");
  hasher.update(&crossing.at.to_le_bytes());
  let hex = hasher.finalize().to_hex();
  format!("alert-{}", &hex[..16])
}
