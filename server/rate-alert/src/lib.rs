//! Rate Alert Engine: deterministic, rule-based alerting on event frequency.
//!
//! Ingests timestamped log events, indexes them by category, counts events in
//! a trailing window against per-category policies, and fans threshold
//! crossings out to topic members, debounced by a per-topic cooldown.
//!
//! No DB, no network; pure computation + in-memory state. Time is an explicit
//! `now` cursor passed into every evaluation.

pub mod audit;
pub mod bus;
pub mod clock;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod processor;
pub mod store;
pub mod types;

pub use bus::{Bus, FireReport, Subscriber};
pub use config::{ConfigProvider, PolicyTable, Settings, SharedPolicyTable};
pub use dispatch::{AlertDispatcher, Recipient, Topic, User};
pub use engine::{Engine, EventReport, RunReport};
pub use error::{EngineError, NotifyError};
pub use types::{
  AlertSummary, Category, Event, Policy, PolicyDraft, Signal, ThresholdCrossing, Tick,
};
