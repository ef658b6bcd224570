//! Policy lookup and engine settings with sane defaults.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::{Category, Policy, Tick};

/// Synchronous read side of policy storage. Absent means "do not evaluate".
pub trait ConfigProvider: Send + Sync {
  fn fetch(&self, category: Category) -> Option<Policy>;
}

/// In-memory policy table, at most one policy per category.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
  policies: BTreeMap<Category, Policy>,
}

impl PolicyTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Later policies for the same category replace earlier ones.
  pub fn from_policies(policies: impl IntoIterator<Item = Policy>) -> Self {
    let mut table = Self::new();
    for p in policies {
      table.upsert(p);
    }
    table
  }

  /// Create or replace; returns the previous policy if there was one.
  pub fn upsert(&mut self, policy: Policy) -> Option<Policy> {
    self.policies.insert(policy.category(), policy)
  }

  pub fn get(&self, category: Category) -> Option<Policy> {
    self.policies.get(&category).copied()
  }

  /// All policies ordered by category.
  pub fn all(&self) -> Vec<Policy> {
    self.policies.values().copied().collect()
  }

  pub fn len(&self) -> usize {
    self.policies.len()
  }

  pub fn is_empty(&self) -> bool {
    self.policies.is_empty()
  }
}

impl ConfigProvider for PolicyTable {
  fn fetch(&self, category: Category) -> Option<Policy> {
    self.get(category)
  }
}

/// Policy table shared between the config resource and the engine.
#[derive(Debug, Clone, Default)]
pub struct SharedPolicyTable(Arc<RwLock<PolicyTable>>);

impl SharedPolicyTable {
  pub fn new(table: PolicyTable) -> Self {
    Self(Arc::new(RwLock::new(table)))
  }

  pub fn upsert(&self, policy: Policy) -> Option<Policy> {
    self.0.write().upsert(policy)
  }

  pub fn get(&self, category: Category) -> Option<Policy> {
    self.0.read().get(category)
  }

  pub fn all(&self) -> Vec<Policy> {
    self.0.read().all()
  }
}

impl ConfigProvider for SharedPolicyTable {
  fn fetch(&self, category: Category) -> Option<Policy> {
    self.get(category)
  }
}

// ---------------------------------------------------------------------------
// Settings file
// ---------------------------------------------------------------------------

/// Subscriber roster entry: the members of one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSpec {
  pub category: Category,
  pub members: Vec<String>,
  #[serde(default)]
  pub last_notified: Tick,
}

impl TopicSpec {
  pub fn new(category: Category, members: &[&str]) -> Self {
    Self {
      category,
      members: members.iter().map(|m| m.to_string()).collect(),
      last_notified: 0,
    }
  }
}

/// Policies plus the topic roster, as loaded from a JSON settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
  #[serde(default)]
  pub policies: Vec<Policy>,
  #[serde(default)]
  pub topics: Vec<TopicSpec>,
}

impl Settings {
  /// Built-in policies and roster. Blocker has no policy.
  pub fn stub() -> Self {
    let policy = |c, f, d, w| Policy::new(c, f, d, w).ok();
    Self {
      policies: [
        policy(Category::Info, 100, 100, 100),
        policy(Category::Critical, 10, 100, 100),
        policy(Category::Warning, 20, 100, 100),
      ]
      .into_iter()
      .flatten()
      .collect(),
      topics: vec![
        TopicSpec::new(Category::Info, &["ram", "sam", "dam"]),
        TopicSpec::new(Category::Critical, &["dibya", "jyoti", "hazra"]),
        TopicSpec::new(Category::Warning, &["dibya", "jyoti", "hazra"]),
      ],
    }
  }

  /// Parse settings, rejecting duplicate policies for one category.
  pub fn from_json(s: &str) -> Result<Self, EngineError> {
    let settings: Settings = serde_json::from_str(s)?;
    let mut seen = Vec::with_capacity(settings.policies.len());
    for p in &settings.policies {
      if seen.contains(&p.category()) {
        return Err(EngineError::validation(
          "policies",
          &format!("duplicate policy for {}", p.category()),
        ));
      }
      seen.push(p.category());
    }
    Ok(settings)
  }

  pub fn load(path: &Path) -> Result<Self, EngineError> {
    let raw = std::fs::read_to_string(path)?;
    Self::from_json(&raw)
  }

  pub fn policy_table(&self) -> PolicyTable {
    PolicyTable::from_policies(self.policies.iter().copied())
  }
}
