//! Source of the evaluation instant (`now`).

use chrono::Utc;

use crate::types::Tick;

pub trait Clock {
  fn now(&self) -> Tick;
}

/// Always the same instant. Used for batch replay and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Tick);

impl Clock for FixedClock {
  fn now(&self) -> Tick {
    self.0
  }
}

/// Wall clock, in Unix seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> Tick {
    Utc::now().timestamp()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fixed_clock_does_not_advance() {
    let clock = FixedClock(1629395509);
    assert_eq!(clock.now(), clock.now());
  }

  #[test]
  fn system_clock_is_after_2021() {
    assert!(SystemClock.now() > 1629395509);
  }
}
