//! Audit subscriber: keeps every signal seen on the bus.

use parking_lot::Mutex;
use tracing::debug;

use crate::bus::Subscriber;
use crate::error::NotifyError;
use crate::types::Signal;

#[derive(Debug, Default)]
pub struct AuditTrail {
  entries: Mutex<Vec<Signal>>,
}

impl AuditTrail {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn entries(&self) -> Vec<Signal> {
    self.entries.lock().clone()
  }

  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl Subscriber<Signal> for AuditTrail {
  fn name(&self) -> &str {
    "audit"
  }

  fn notify(&self, payload: &Signal) -> Result<(), NotifyError> {
    debug!(?payload, "audit");
    self.entries.lock().push(payload.clone());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::engine::Engine;
  use crate::types::{Category, Event};

  #[test]
  fn records_crossings_and_completion_in_order() {
    let mut engine = Engine::with_defaults();
    let audit = Arc::new(AuditTrail::new());
    engine.bus().subscribe(audit.clone());

    // Critical default: 10 events within 100 ticks.
    let events: Vec<_> = (0..10).map(|t| Event::new(Category::Critical, t, "")).collect();
    engine.run(&events, 10);

    let entries = audit.entries();
    assert_eq!(entries.len(), 2);
    assert!(matches!(entries[0], Signal::ThresholdCrossing(_)));
    assert_eq!(entries[1], Signal::BatchComplete { processed: 10, at: 10 });
  }

  #[test]
  fn unsubscribed_audit_stops_recording() {
    let mut engine = Engine::with_defaults();
    let audit = Arc::new(AuditTrail::new());
    engine.bus().subscribe(audit.clone());
    assert!(engine.bus().unsubscribe(&audit));
    engine.run(&[Event::new(Category::Info, 1, "")], 1);
    assert!(audit.is_empty());
  }
}
