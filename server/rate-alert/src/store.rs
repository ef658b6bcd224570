//! Append-only timestamp index keyed by category.
//!
//! Each category keeps its timestamps twice: in arrival order (provenance) and
//! in a sorted copy maintained on insert, so window queries are a binary search.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{Category, Event, Tick};

#[derive(Debug, Clone, Default)]
struct Series {
  timeline: Vec<Tick>,
  sorted: Vec<Tick>,
}

impl Series {
  fn push(&mut self, ts: Tick) {
    self.timeline.push(ts);
    // In-order arrivals land at the end.
    let at = self.sorted.partition_point(|&t| t <= ts);
    self.sorted.insert(at, ts);
  }

  fn since(&self, since: Tick) -> &[Tick] {
    let start = self.sorted.partition_point(|&t| t < since);
    &self.sorted[start..]
  }
}

/// In-memory event index. Written only by the processor.
#[derive(Debug, Default)]
pub struct EventStore {
  series: HashMap<Category, Series>,
}

impl EventStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append the event's timestamp under its category.
  pub fn persist(&mut self, event: &Event) {
    debug!(category = %event.category, timestamp = event.timestamp, "persist");
    self.series.entry(event.category).or_default().push(event.timestamp);
  }

  /// All stored timestamps for `category` that are `>= since`, ascending.
  ///
  /// Unknown categories yield an empty slice.
  pub fn query(&self, category: Category, since: Tick) -> &[Tick] {
    self
      .series
      .get(&category)
      .map(|s| s.since(since))
      .unwrap_or(&[])
  }

  pub fn count_since(&self, category: Category, since: Tick) -> usize {
    self.query(category, since).len()
  }

  /// Timestamps for `category` in arrival order.
  pub fn timeline(&self, category: Category) -> &[Tick] {
    self
      .series
      .get(&category)
      .map(|s| s.timeline.as_slice())
      .unwrap_or(&[])
  }

  /// Total number of stored events across categories.
  pub fn len(&self) -> usize {
    self.series.values().map(|s| s.timeline.len()).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  fn store_with(category: Category, stamps: &[Tick]) -> EventStore {
    let mut store = EventStore::new();
    for &ts in stamps {
      store.persist(&Event::new(category, ts, ""));
    }
    store
  }

  #[test]
  fn unknown_category_is_empty() {
    let store = store_with(Category::Info, &[1, 2, 3]);
    assert!(store.query(Category::Blocker, 0).is_empty());
    assert!(store.timeline(Category::Blocker).is_empty());
  }

  #[test]
  fn query_bound_is_inclusive() {
    let store = store_with(Category::Critical, &[10, 20, 30]);
    assert_eq!(store.query(Category::Critical, 20), &[20, 30]);
    assert_eq!(store.count_since(Category::Critical, 31), 0);
    assert_eq!(store.count_since(Category::Critical, -70), 3);
  }

  #[test]
  fn timeline_keeps_arrival_order() {
    let store = store_with(Category::Warning, &[30, 10, 20]);
    assert_eq!(store.timeline(Category::Warning), &[30, 10, 20]);
    assert_eq!(store.query(Category::Warning, 0), &[10, 20, 30]);
    assert_eq!(store.len(), 3);
  }

  #[test]
  fn categories_are_partitioned() {
    let mut store = store_with(Category::Info, &[1, 2]);
    store.persist(&Event::new(Category::Critical, 5, "x"));
    assert_eq!(store.count_since(Category::Info, 0), 2);
    assert_eq!(store.count_since(Category::Critical, 0), 1);
  }

  proptest! {
    #[test]
    fn query_is_idempotent(stamps in prop::collection::vec(-1000i64..1000, 0..64), t in -1200i64..1200) {
      let store = store_with(Category::Info, &stamps);
      prop_assert_eq!(store.count_since(Category::Info, t), store.count_since(Category::Info, t));
    }

    #[test]
    fn window_is_monotonic(stamps in prop::collection::vec(-1000i64..1000, 0..64), a in -1200i64..1200, b in -1200i64..1200) {
      let store = store_with(Category::Info, &stamps);
      let (t1, t2) = if a <= b { (a, b) } else { (b, a) };
      prop_assert!(store.count_since(Category::Info, t1) >= store.count_since(Category::Info, t2));
    }

    #[test]
    fn sorted_index_matches_linear_scan(stamps in prop::collection::vec(-1000i64..1000, 0..64), t in -1200i64..1200) {
      let store = store_with(Category::Info, &stamps);
      let expected = stamps.iter().filter(|&&s| s >= t).count();
      prop_assert_eq!(store.count_since(Category::Info, t), expected);
    }
  }
}
