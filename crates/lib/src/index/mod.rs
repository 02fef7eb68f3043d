//! Scope indexing: semantic identifiers to `(section, scope)` coordinates.
//!
//! - Client categories map to a section through a static table. Categories
//!   stored in the shared client data section use their ordinal as the scope;
//!   the rest resolve the scope through the registry.
//! - Host per-round data maps to a section and uses its ordinal directly.
//! - Configuration and configuration profiles pick the section from the
//!   configuration scope kind and always resolve through the registry.
//!
//! When the caller passes no identifier, theme-indexed sections use the current
//! theme and payvar-indexed sections the current paytable. Extensions are never
//! defaulted.

mod category;
mod registry;

use std::fmt;

use thiserror::Error;

use crate::store::{Section, SectionKind};

pub use category::{ConfigScope, HostScope, ScopeCategory};
pub use registry::{Registry, RegistryIndex, ThemeEntry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("unsupported scope: {0}")]
  UnsupportedScope(String),

  #[error("unsupported: {0}")]
  Unsupported(String),

  #[error("{kind} `{id}` is not registered")]
  UnknownIdentifier { kind: &'static str, id: String },
}

/// A concrete storage location for a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coordinate {
  pub section: Section,
  pub scope: u32,
}

impl Coordinate {
  pub fn new(section: Section, scope: u32) -> Self {
    Self { section, scope }
  }
}

impl fmt::Display for Coordinate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.section, self.scope)
  }
}

/// The active game identifiers used when a caller omits one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameContext {
  pub theme: Option<String>,
  pub paytable: Option<String>,
}

/// Resolves categories and identifiers to coordinates.
pub struct ScopeIndexer {
  registry: Box<dyn RegistryIndex>,
  context: GameContext,
}

impl fmt::Debug for ScopeIndexer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ScopeIndexer").field("context", &self.context).finish_non_exhaustive()
  }
}

impl ScopeIndexer {
  pub fn new(registry: impl RegistryIndex + 'static) -> Self {
    Self {
      registry: Box::new(registry),
      context: GameContext::default(),
    }
  }

  /// Record the active theme and paytable.
  pub fn update_context(&mut self, theme: impl Into<String>, paytable: impl Into<String>) {
    self.context = GameContext {
      theme: Some(theme.into()),
      paytable: Some(paytable.into()),
    };
  }

  pub fn set_context(&mut self, context: GameContext) {
    self.context = context;
  }

  pub fn clear_context(&mut self) {
    self.context = GameContext::default();
  }

  pub fn context(&self) -> &GameContext {
    &self.context
  }

  pub fn registry(&self) -> &dyn RegistryIndex {
    self.registry.as_ref()
  }

  /// Coordinate of client critical data.
  pub fn client_coordinate(&self, category: ScopeCategory, identifier: Option<&str>) -> Result<Coordinate, IndexError> {
    let section = category
      .section()
      .ok_or_else(|| IndexError::UnsupportedScope(format!("category {category} has no section mapping")))?;
    let scope = if section == Section::ClientData {
      category.ordinal()
    } else {
      self.registry_scope(section, identifier)?
    };
    Ok(Coordinate::new(section, scope))
  }

  /// Coordinate of host-owned per-round data.
  pub fn host_coordinate(&self, host: HostScope) -> Result<Coordinate, IndexError> {
    let section = host
      .section()
      .ok_or_else(|| IndexError::UnsupportedScope(format!("host scope {host} has no section mapping")))?;
    Ok(Coordinate::new(section, host.ordinal()))
  }

  pub fn config_coordinate(&self, config: ConfigScope, identifier: Option<&str>) -> Result<Coordinate, IndexError> {
    let section = config.configuration_section();
    Ok(Coordinate::new(section, self.registry_scope(section, identifier)?))
  }

  pub fn config_profile_coordinate(
    &self,
    config: ConfigScope,
    identifier: Option<&str>,
  ) -> Result<Coordinate, IndexError> {
    let section = config.profile_section();
    Ok(Coordinate::new(section, self.registry_scope(section, identifier)?))
  }

  fn registry_scope(&self, section: Section, identifier: Option<&str>) -> Result<u32, IndexError> {
    let (kind, id, index) = match section.kind() {
      SectionKind::Theme => {
        let id = defaulted("theme", identifier, self.context.theme.as_deref())?;
        ("theme", id, self.registry.theme_index(id)?)
      }
      SectionKind::Payvar => {
        let id = defaulted("paytable", identifier, self.context.paytable.as_deref())?;
        ("payvar", id, self.registry.payvar_index(id)?)
      }
      SectionKind::Extension => {
        let id = identifier
          .ok_or_else(|| IndexError::InvalidArgument("extension identifier is required".to_string()))?;
        ("extension", id, self.registry.extension_index(id)?)
      }
      SectionKind::Ordinal => {
        return Err(IndexError::UnsupportedScope(format!(
          "section {section} is not indexed by registry"
        )));
      }
    };
    index.ok_or_else(|| IndexError::UnknownIdentifier {
      kind,
      id: id.to_string(),
    })
  }
}

fn defaulted<'a>(kind: &str, identifier: Option<&'a str>, current: Option<&'a str>) -> Result<&'a str, IndexError> {
  identifier
    .or(current)
    .ok_or_else(|| IndexError::InvalidArgument(format!("no {kind} identifier given and no current {kind} set")))
}
