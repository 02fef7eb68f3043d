//! Access validation policies consulted before any store access.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::AccessError;
use crate::index::ScopeCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
  Read,
  Write,
  Remove,
}

impl fmt::Display for AccessKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      AccessKind::Read => "read",
      AccessKind::Write => "write",
      AccessKind::Remove => "remove",
    };
    write!(f, "{name}")
  }
}

/// What a caller is asking to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
  pub kind: AccessKind,
  pub transactional: bool,
  pub categories: BTreeSet<ScopeCategory>,
}

impl AccessRequest {
  pub fn new(kind: AccessKind, transactional: bool, categories: impl IntoIterator<Item = ScopeCategory>) -> Self {
    Self {
      kind,
      transactional,
      categories: categories.into_iter().collect(),
    }
  }
}

/// Decides whether a request may proceed.
pub trait AccessPolicy: Send + Sync {
  fn validate(&self, request: &AccessRequest) -> Result<(), AccessError>;
}

/// Allows everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitAll;

impl AccessPolicy for PermitAll {
  fn validate(&self, _request: &AccessRequest) -> Result<(), AccessError> {
    Ok(())
  }
}

/// A configured deny rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
  pub category: ScopeCategory,
  pub kinds: Vec<AccessKind>,
}

/// Denies listed access kinds per category; everything else is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulePolicy {
  denied: BTreeMap<ScopeCategory, BTreeSet<AccessKind>>,
}

impl RulePolicy {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_rules(rules: &[AccessRule]) -> Self {
    rules.iter().fold(Self::new(), |policy, rule| {
      rule.kinds.iter().fold(policy, |policy, kind| policy.deny(rule.category, *kind))
    })
  }

  pub fn deny(mut self, category: ScopeCategory, kind: AccessKind) -> Self {
    self.denied.entry(category).or_default().insert(kind);
    self
  }

  pub fn is_denied(&self, category: ScopeCategory, kind: AccessKind) -> bool {
    self.denied.get(&category).is_some_and(|kinds| kinds.contains(&kind))
  }
}

impl AccessPolicy for RulePolicy {
  fn validate(&self, request: &AccessRequest) -> Result<(), AccessError> {
    match request.categories.iter().find(|c| self.is_denied(**c, request.kind)) {
      Some(category) => Err(AccessError::Denied {
        category: *category,
        access: request.kind,
      }),
      None => Ok(()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn permit_all_allows_anything() {
    let request = AccessRequest::new(AccessKind::Remove, false, [ScopeCategory::Transient]);
    assert!(PermitAll.validate(&request).is_ok());
  }

  #[test]
  fn rule_policy_denies_listed_kind_only() {
    let policy = RulePolicy::new().deny(ScopeCategory::History, AccessKind::Write);
    let write = AccessRequest::new(AccessKind::Write, true, [ScopeCategory::Theme, ScopeCategory::History]);
    let read = AccessRequest::new(AccessKind::Read, true, [ScopeCategory::History]);

    assert!(matches!(
      policy.validate(&write),
      Err(AccessError::Denied {
        category: ScopeCategory::History,
        access: AccessKind::Write
      })
    ));
    assert!(policy.validate(&read).is_ok());
  }

  #[test]
  fn from_rules_collects_every_kind() {
    let rules: Vec<AccessRule> = serde_json::from_str(
      r#"[{"category": "transient", "kinds": ["read", "write", "remove"]}, {"category": "feature", "kinds": ["remove"]}]"#,
    )
    .unwrap();
    let policy = RulePolicy::from_rules(&rules);
    assert!(policy.is_denied(ScopeCategory::Transient, AccessKind::Read));
    assert!(policy.is_denied(ScopeCategory::Feature, AccessKind::Remove));
    assert!(!policy.is_denied(ScopeCategory::Feature, AccessKind::Read));
  }
}
