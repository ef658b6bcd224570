//! Core engine: wires policies, store, bus and dispatcher together.

use std::sync::Arc;

use crate::bus::Bus;
use crate::clock::Clock;
use crate::config::{ConfigProvider, Settings};
use crate::dispatch::{AlertDispatcher, Topic};
use crate::processor::{Evaluation, ProcessReport, Processor};
use crate::store::EventStore;
use crate::types::{AlertSummary, Event, Signal, Tick};

/// Result of one batch run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
  pub process: ProcessReport,
  /// Topic notifications that went out during the run.
  pub alerts: Vec<AlertSummary>,
}

/// Result of one live event.
#[derive(Debug, Clone)]
pub struct EventReport {
  pub evaluation: Evaluation,
  /// Topic notifications the event caused.
  pub alerts: Vec<AlertSummary>,
}

/// The rate alert engine. Holds in-memory state across events and runs.
pub struct Engine {
  provider: Box<dyn ConfigProvider>,
  processor: Processor,
  bus: Bus<Signal>,
  dispatcher: Arc<AlertDispatcher>,
}

impl Engine {
  /// The dispatcher is the first bus subscriber.
  pub fn new(provider: impl ConfigProvider + 'static, topics: Vec<Topic>) -> Self {
    let dispatcher = Arc::new(AlertDispatcher::new(topics));
    let bus: Bus<Signal> = Bus::new();
    bus.subscribe(dispatcher.clone());
    Self {
      provider: Box::new(provider),
      processor: Processor::new(),
      bus,
      dispatcher,
    }
  }

  pub fn from_settings(settings: &Settings) -> Self {
    let topics = settings.topics.iter().map(Topic::from_spec).collect();
    Self::new(settings.policy_table(), topics)
  }

  pub fn with_defaults() -> Self {
    Self::from_settings(&Settings::stub())
  }

  /// Register further subscribers (audit, analytics) here.
  pub fn bus(&self) -> &Bus<Signal> {
    &self.bus
  }

  pub fn dispatcher(&self) -> &Arc<AlertDispatcher> {
    &self.dispatcher
  }

  pub fn store(&self) -> &EventStore {
    self.processor.store()
  }

  /// Process a single event at `now`. Live callers pass a fresh `now` per event.
  pub fn process_event(&mut self, event: &Event, now: Tick) -> EventReport {
    self.dispatcher.take_sent();
    let evaluation = self
      .processor
      .process_event(event, self.provider.as_ref(), &self.bus, now);
    EventReport {
      evaluation,
      alerts: self.dispatcher.take_sent(),
    }
  }

  /// Process a batch with one evaluation instant.
  pub fn run(&mut self, events: &[Event], now: Tick) -> RunReport {
    // Summaries left by direct dispatcher use belong to no run.
    self.dispatcher.take_sent();
    let process = self
      .processor
      .process(events, self.provider.as_ref(), &self.bus, now);
    RunReport {
      process,
      alerts: self.dispatcher.take_sent(),
    }
  }

  pub fn run_with_clock(&mut self, events: &[Event], clock: &dyn Clock) -> RunReport {
    self.run(events, clock.now())
  }
}
