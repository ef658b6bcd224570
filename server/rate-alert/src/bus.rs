//! Synchronous publish/subscribe bus.
//!
//! Subscribers are delivered to in registration order, on the caller's thread.
//! A failing subscriber never stops delivery to the ones after it; every
//! outcome is collected into the returned [`FireReport`].
//!
//! The bus holds `Arc`s to its subscribers but does not manage their lifetime:
//! registration and removal are explicit. Duplicate registrations are kept and
//! each receives its own delivery.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::error::NotifyError;

/// Receives payloads fired on a [`Bus`].
pub trait Subscriber<P>: Send + Sync {
  /// Short name used in logs and delivery reports.
  fn name(&self) -> &str {
    std::any::type_name::<Self>()
  }

  fn notify(&self, payload: &P) -> Result<(), NotifyError>;
}

/// Outcome of delivering one payload to one subscriber.
#[derive(Debug, Clone)]
pub struct Delivery {
  pub subscriber: String,
  pub outcome: Result<(), NotifyError>,
}

/// Per-subscriber outcomes of a single `fire`.
#[derive(Debug, Clone, Default)]
pub struct FireReport {
  pub deliveries: Vec<Delivery>,
}

impl FireReport {
  pub fn attempted(&self) -> usize {
    self.deliveries.len()
  }

  pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
    self.deliveries.iter().filter(|d| d.outcome.is_err())
  }

  pub fn is_clean(&self) -> bool {
    self.failures().next().is_none()
  }
}

pub struct Bus<P> {
  subscribers: RwLock<Vec<Arc<dyn Subscriber<P>>>>,
}

impl<P> Bus<P> {
  pub fn new() -> Self {
    Self {
      subscribers: RwLock::new(Vec::new()),
    }
  }

  pub fn subscribe(&self, subscriber: Arc<dyn Subscriber<P>>) {
    self.subscribers.write().push(subscriber);
  }

  /// Remove the first registration of this exact subscriber instance.
  ///
  /// Returns `false` (and changes nothing) when it is not registered.
  pub fn unsubscribe<S: Subscriber<P> + ?Sized>(&self, subscriber: &Arc<S>) -> bool {
    let mut subs = self.subscribers.write();
    let target = Arc::as_ptr(subscriber);
    match subs
      .iter()
      .position(|s| std::ptr::addr_eq(Arc::as_ptr(s), target))
    {
      Some(idx) => {
        subs.remove(idx);
        true
      }
      None => false,
    }
  }

  /// Deliver `payload` to every subscriber registered when the call starts.
  pub fn fire(&self, payload: &P) -> FireReport {
    // Snapshot so subscribers may (un)subscribe while being notified.
    let subscribers: Vec<_> = self.subscribers.read().clone();
    let mut report = FireReport::default();
    for sub in subscribers {
      let outcome = sub.notify(payload);
      if let Err(e) = &outcome {
        warn!(subscriber = sub.name(), error = %e, "delivery failed");
      }
      report.deliveries.push(Delivery {
        subscriber: sub.name().to_string(),
        outcome,
      });
    }
    report
  }

  pub fn len(&self) -> usize {
    self.subscribers.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl<P> Default for Bus<P> {
  fn default() -> Self {
    Self::new()
  }
}

impl<P> fmt::Debug for Bus<P> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Bus").field("subscribers", &self.len()).finish()
  }
}
