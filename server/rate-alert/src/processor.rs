//! Event processor: persist, evaluate the trailing window, signal crossings.

use tracing::{debug, info};

use crate::bus::{Bus, Delivery, FireReport};
use crate::config::ConfigProvider;
use crate::store::EventStore;
use crate::types::{Category, Event, Signal, ThresholdCrossing, Tick};

/// What happened to a single event after it was persisted.
#[derive(Debug, Clone)]
pub enum Evaluation {
  /// No policy for the category; nothing evaluated.
  Unconfigured,
  /// Window count stayed under the threshold.
  Below { count: usize, threshold: u32 },
  /// Threshold met; the crossing was fired on the bus.
  Crossed {
    crossing: ThresholdCrossing,
    fired: FireReport,
  },
}

/// Totals for one batch.
#[derive(Debug, Clone, Default)]
pub struct ProcessReport {
  pub processed: usize,
  pub unconfigured: usize,
  pub crossings: Vec<ThresholdCrossing>,
  /// Failed deliveries across every fire in the batch.
  pub failures: Vec<Delivery>,
}

impl ProcessReport {
  pub fn crossings_for(&self, category: Category) -> usize {
    self
      .crossings
      .iter()
      .filter(|c| c.category == category)
      .count()
  }

  fn absorb(&mut self, report: FireReport) {
    self
      .failures
      .extend(report.deliveries.into_iter().filter(|d| d.outcome.is_err()));
  }
}

/// Sole writer of the event store.
#[derive(Debug, Default)]
pub struct Processor {
  store: EventStore,
}

impl Processor {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn store(&self) -> &EventStore {
    &self.store
  }

  /// Persist one event and evaluate its category's policy at `now`.
  pub fn process_event(
    &mut self,
    event: &Event,
    provider: &dyn ConfigProvider,
    bus: &Bus<Signal>,
    now: Tick,
  ) -> Evaluation {
    self.store.persist(event);

    let policy = match provider.fetch(event.category) {
      Some(p) => p,
      None => {
        debug!(category = %event.category, "no policy; skipping evaluation");
        return Evaluation::Unconfigured;
      }
    };

    let window_start = policy.window_start(now);
    let count = self.store.count_since(event.category, window_start);
    debug!(
      category = %event.category,
      now,
      window_start,
      count,
      "window evaluated"
    );

    let threshold = policy.frequency_threshold();
    if count < threshold as usize {
      return Evaluation::Below { count, threshold };
    }

    let crossing = ThresholdCrossing {
      category: event.category,
      cooldown: policy.cooldown(),
      at: now,
    };
    info!(category = %event.category, count, threshold, "threshold crossed");
    let fired = bus.fire(&Signal::ThresholdCrossing(crossing));
    Evaluation::Crossed { crossing, fired }
  }

  /// Process a batch in order with a single `now`, then fire `BatchComplete`.
  pub fn process(
    &mut self,
    events: &[Event],
    provider: &dyn ConfigProvider,
    bus: &Bus<Signal>,
    now: Tick,
  ) -> ProcessReport {
    let mut report = ProcessReport::default();
    for event in events {
      report.processed += 1;
      match self.process_event(event, provider, bus, now) {
        Evaluation::Unconfigured => report.unconfigured += 1,
        Evaluation::Below { .. } => {}
        Evaluation::Crossed { crossing, fired } => {
          report.crossings.push(crossing);
          report.absorb(fired);
        }
      }
    }
    let done = bus.fire(&Signal::BatchComplete {
      processed: report.processed,
      at: now,
    });
    report.absorb(done);
    report
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use super::*;
  use crate::bus::Subscriber;
  use crate::config::PolicyTable;
  use crate::error::NotifyError;
  use crate::types::Policy;

  #[derive(Default)]
  struct Recorder(Mutex<Vec<Signal>>);

  impl Subscriber<Signal> for Recorder {
    fn notify(&self, payload: &Signal) -> Result<(), NotifyError> {
      self.0.lock().push(payload.clone());
      Ok(())
    }
  }

  fn setup(policy: Option<Policy>) -> (PolicyTable, Bus<Signal>, Arc<Recorder>) {
    let table = PolicyTable::from_policies(policy);
    let bus: Bus<Signal> = Bus::new();
    let recorder = Arc::new(Recorder::default());
    bus.subscribe(recorder.clone());
    (table, bus, recorder)
  }

  fn crossings(recorder: &Recorder) -> Vec<ThresholdCrossing> {
    recorder
      .0
      .lock()
      .iter()
      .filter_map(|s| match s {
        Signal::ThresholdCrossing(c) => Some(*c),
        _ => None,
      })
      .collect()
  }

  #[test]
  fn fires_once_threshold_is_met() {
    let policy = Policy::new(Category::Critical, 3, 100, 50).unwrap();
    let (table, bus, recorder) = setup(Some(policy));
    let mut processor = Processor::new();

    let events: Vec<_> = [10, 20, 30]
      .iter()
      .map(|&t| Event::new(Category::Critical, t, "db down"))
      .collect();

    let first = processor.process_event(&events[0], &table, &bus, 30);
    assert!(matches!(first, Evaluation::Below { count: 1, threshold: 3 }));
    processor.process_event(&events[1], &table, &bus, 30);
    assert!(crossings(&recorder).is_empty());

    let third = processor.process_event(&events[2], &table, &bus, 30);
    assert!(matches!(third, Evaluation::Crossed { .. }));
    assert_eq!(
      crossings(&recorder),
      vec![ThresholdCrossing {
        category: Category::Critical,
        cooldown: 50,
        at: 30
      }]
    );
  }

  #[test]
  fn events_outside_window_do_not_count() {
    let policy = Policy::new(Category::Warning, 2, 10, 0).unwrap();
    let (table, bus, recorder) = setup(Some(policy));
    let mut processor = Processor::new();
    let events = vec![
      Event::new(Category::Warning, 1, ""),
      Event::new(Category::Warning, 95, ""),
    ];

    let report = processor.process(&events, &table, &bus, 100);
    assert_eq!(report.processed, 2);
    assert!(report.crossings.is_empty());
    assert!(crossings(&recorder).is_empty());
  }

  #[test]
  fn missing_policy_never_crosses() {
    let (table, bus, recorder) = setup(None);
    let mut processor = Processor::new();
    let events: Vec<_> = (0..500).map(|t| Event::new(Category::Blocker, t, "")).collect();

    let report = processor.process(&events, &table, &bus, 499);
    assert_eq!(report.unconfigured, 500);
    assert!(crossings(&recorder).is_empty());
    // Still persisted.
    assert_eq!(processor.store().count_since(Category::Blocker, 0), 500);
  }

  #[test]
  fn batch_ends_with_completion_signal() {
    let policy = Policy::new(Category::Info, 1, 10, 0).unwrap();
    let (table, bus, recorder) = setup(Some(policy));
    let mut processor = Processor::new();

    let report = processor.process(&[Event::new(Category::Info, 5, "")], &table, &bus, 5);
    assert_eq!(report.crossings_for(Category::Info), 1);
    assert!(report.failures.is_empty());
    let last = recorder.0.lock().last().cloned();
    assert_eq!(last, Some(Signal::BatchComplete { processed: 1, at: 5 }));
  }

  #[test]
  fn every_event_past_threshold_fires() {
    let policy = Policy::new(Category::Critical, 2, 100, 0).unwrap();
    let (table, bus, recorder) = setup(Some(policy));
    let mut processor = Processor::new();
    let events: Vec<_> = (1..=4).map(|t| Event::new(Category::Critical, t, "")).collect();

    let report = processor.process(&events, &table, &bus, 10);
    assert_eq!(report.crossings.len(), 3);
    assert_eq!(crossings(&recorder).len(), 3);
  }
}
