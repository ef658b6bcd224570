//! Shared application state.

use rate_alert::{PolicyTable, SharedPolicyTable};

#[derive(Debug, Clone, Default)]
pub struct AppState {
  pub policies: SharedPolicyTable,
}

impl AppState {
  pub fn new(table: PolicyTable) -> Self {
    Self {
      policies: SharedPolicyTable::new(table),
    }
  }
}
