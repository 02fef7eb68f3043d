//! Data categories callers address, and the static tables mapping them to sections.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::store::Section;

/// Client critical data categories.
///
/// The declaration order is the ordinal: categories stored in
/// [`Section::ClientData`] use it as their reserved scope slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeCategory {
  GameCycle,
  Feature,
  Player,
  Theme,
  Payvar,
  Extension,
  History,
  ThemeAnalytics,
  PayvarAnalytics,
  /// Volatile data the host never persists.
  Transient,
}

/// Host-owned per-round data. The ordinal is the scope index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostScope {
  GameCycle,
  Meters,
  Progressive,
  Bonus,
  /// Presentation state lives with the host UI and has no storage.
  Presentation,
}

/// Which registry entity a configuration item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigScope {
  Payvar,
  Theme,
  Extension,
}

const CLIENT_SECTIONS: &[(ScopeCategory, Section)] = &[
  (ScopeCategory::GameCycle, Section::ClientData),
  (ScopeCategory::Feature, Section::ClientData),
  (ScopeCategory::Player, Section::ClientData),
  (ScopeCategory::Theme, Section::ThemeCriticalData),
  (ScopeCategory::Payvar, Section::PayvarCriticalData),
  (ScopeCategory::Extension, Section::ExtensionCriticalData),
  (ScopeCategory::History, Section::History),
  (ScopeCategory::ThemeAnalytics, Section::ThemeAnalytics),
  (ScopeCategory::PayvarAnalytics, Section::PayvarAnalytics),
];

const HOST_SECTIONS: &[(HostScope, Section)] = &[
  (HostScope::GameCycle, Section::HostData),
  (HostScope::Meters, Section::Meters),
  (HostScope::Progressive, Section::Progressive),
  (HostScope::Bonus, Section::HostData),
];

impl ScopeCategory {
  pub const ALL: [ScopeCategory; 10] = [
    ScopeCategory::GameCycle,
    ScopeCategory::Feature,
    ScopeCategory::Player,
    ScopeCategory::Theme,
    ScopeCategory::Payvar,
    ScopeCategory::Extension,
    ScopeCategory::History,
    ScopeCategory::ThemeAnalytics,
    ScopeCategory::PayvarAnalytics,
    ScopeCategory::Transient,
  ];

  pub fn ordinal(self) -> u32 {
    self as u32
  }

  pub fn section(self) -> Option<Section> {
    CLIENT_SECTIONS
      .iter()
      .find(|(category, _)| *category == self)
      .map(|(_, section)| *section)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      ScopeCategory::GameCycle => "game_cycle",
      ScopeCategory::Feature => "feature",
      ScopeCategory::Player => "player",
      ScopeCategory::Theme => "theme",
      ScopeCategory::Payvar => "payvar",
      ScopeCategory::Extension => "extension",
      ScopeCategory::History => "history",
      ScopeCategory::ThemeAnalytics => "theme_analytics",
      ScopeCategory::PayvarAnalytics => "payvar_analytics",
      ScopeCategory::Transient => "transient",
    }
  }
}

impl HostScope {
  pub fn ordinal(self) -> u32 {
    self as u32
  }

  pub fn section(self) -> Option<Section> {
    HOST_SECTIONS
      .iter()
      .find(|(scope, _)| *scope == self)
      .map(|(_, section)| *section)
  }
}

impl ConfigScope {
  pub fn configuration_section(self) -> Section {
    match self {
      ConfigScope::Payvar => Section::PayvarConfiguration,
      ConfigScope::Theme => Section::ThemeConfiguration,
      ConfigScope::Extension => Section::ExtensionConfiguration,
    }
  }

  pub fn profile_section(self) -> Section {
    match self {
      ConfigScope::Payvar => Section::PayvarConfigurationProfile,
      ConfigScope::Theme => Section::ThemeConfigurationProfile,
      ConfigScope::Extension => Section::ExtensionConfigurationProfile,
    }
  }
}

impl fmt::Display for ScopeCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl fmt::Display for HostScope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{self:?}")
  }
}

impl fmt::Display for ConfigScope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{self:?}")
  }
}

impl FromStr for ScopeCategory {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
    ScopeCategory::ALL
      .into_iter()
      .find(|category| category.as_str() == normalized)
      .ok_or_else(|| format!("unknown scope category: {s}"))
  }
}
