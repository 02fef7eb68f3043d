//! In-memory record store.
//!
//! The store is the complete persistable unit: sections hold sparse numbered
//! scopes, scopes hold path-keyed byte records.
//!
//! # Layout
//!
//! ```text
//! RecordStore
//! └── Section (closed enum)
//!     └── scope index (u32, created on first write)
//!         └── path → payload bytes
//! ```
//!
//! All operations are synchronous and have no failure mode beyond "not found".

mod scope;
mod section;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use scope::Scope;
pub use section::{Section, SectionKind, UnknownSection};

/// The tree of sections, scopes and records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStore {
  sections: BTreeMap<Section, BTreeMap<u32, Scope>>,
}

impl RecordStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Drop every record in the scope.
  pub fn clear(&mut self, section: Section, scope: u32) {
    self.take_scope(section, scope);
  }

  pub fn contains(&self, section: Section, scope: u32, path: &str) -> bool {
    self.scope(section, scope).is_some_and(|s| s.contains(path))
  }

  pub fn read_raw(&self, section: Section, scope: u32, path: &str) -> Option<&[u8]> {
    self.scope(section, scope).and_then(|s| s.get(path))
  }

  /// Insert or replace a record, creating the scope if needed.
  pub fn write(&mut self, section: Section, scope: u32, path: &str, payload: &[u8]) {
    self
      .sections
      .entry(section)
      .or_default()
      .entry(scope)
      .or_default()
      .write(path, payload);
  }

  pub fn remove(&mut self, section: Section, scope: u32, path: &str) -> bool {
    self
      .sections
      .get_mut(&section)
      .and_then(|scopes| scopes.get_mut(&scope))
      .is_some_and(|s| s.remove(path))
  }

  /// Exchange the entire contents of two scopes.
  ///
  /// A scope that does not exist swaps as an empty one.
  pub fn swap_scopes(&mut self, section_a: Section, scope_a: u32, section_b: Section, scope_b: u32) {
    if (section_a, scope_a) == (section_b, scope_b) {
      return;
    }
    let first = self.take_scope(section_a, scope_a);
    let second = self.take_scope(section_b, scope_b);
    self.put_scope(section_a, scope_a, second);
    self.put_scope(section_b, scope_b, first);
  }

  /// Replace the destination scope with a deep copy of the source scope.
  pub fn copy_scope(&mut self, src_section: Section, src_scope: u32, dst_section: Section, dst_scope: u32) {
    if (src_section, src_scope) == (dst_section, dst_scope) {
      return;
    }
    let copy = self.scope(src_section, src_scope).cloned();
    self.take_scope(dst_section, dst_scope);
    self.put_scope(dst_section, dst_scope, copy);
  }

  /// Record paths of a scope, sorted.
  pub fn manifest(&self, section: Section, scope: u32) -> Vec<String> {
    self.scope(section, scope).map(Scope::paths).unwrap_or_default()
  }

  /// Total payload bytes held by a scope.
  pub fn usage(&self, section: Section, scope: u32) -> usize {
    self.scope(section, scope).map_or(0, Scope::usage)
  }

  pub fn scope(&self, section: Section, scope: u32) -> Option<&Scope> {
    self.sections.get(&section).and_then(|scopes| scopes.get(&scope))
  }

  /// Sections that currently hold at least one scope.
  pub fn sections(&self) -> Vec<Section> {
    self.sections.keys().copied().collect()
  }

  /// Scope indices present in a section, ascending.
  pub fn scopes(&self, section: Section) -> Vec<u32> {
    self
      .sections
      .get(&section)
      .map(|scopes| scopes.keys().copied().collect())
      .unwrap_or_default()
  }

  pub fn is_empty(&self) -> bool {
    self.sections.is_empty()
  }

  fn take_scope(&mut self, section: Section, scope: u32) -> Option<Scope> {
    let scopes = self.sections.get_mut(&section)?;
    let taken = scopes.remove(&scope);
    if scopes.is_empty() {
      self.sections.remove(&section);
    }
    taken
  }

  fn put_scope(&mut self, section: Section, index: u32, scope: Option<Scope>) {
    if let Some(scope) = scope {
      self.sections.entry(section).or_default().insert(index, scope);
    }
  }
}
