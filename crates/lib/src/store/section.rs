//! The closed set of top-level store partitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A top-level partition of the store.
///
/// Scopes inside a section are numbered. How that number is chosen depends on
/// the section's [`SectionKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
  /// Shared client data; each client category owns one reserved slot.
  ClientData,
  Meters,
  HostData,
  Progressive,
  History,
  ThemeCriticalData,
  PayvarCriticalData,
  ExtensionCriticalData,
  ThemeAnalytics,
  PayvarAnalytics,
  ThemeConfiguration,
  PayvarConfiguration,
  ExtensionConfiguration,
  ThemeConfigurationProfile,
  PayvarConfigurationProfile,
  ExtensionConfigurationProfile,
}

/// How the scope index within a section is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
  /// Scope index is the ordinal of the owning category.
  Ordinal,
  /// Scope index is the registry index of a theme.
  Theme,
  /// Scope index is the packed registry index of a payvar.
  Payvar,
  /// Scope index is the registry index of an extension.
  Extension,
}

impl Section {
  pub const ALL: [Section; 16] = [
    Section::ClientData,
    Section::Meters,
    Section::HostData,
    Section::Progressive,
    Section::History,
    Section::ThemeCriticalData,
    Section::PayvarCriticalData,
    Section::ExtensionCriticalData,
    Section::ThemeAnalytics,
    Section::PayvarAnalytics,
    Section::ThemeConfiguration,
    Section::PayvarConfiguration,
    Section::ExtensionConfiguration,
    Section::ThemeConfigurationProfile,
    Section::PayvarConfigurationProfile,
    Section::ExtensionConfigurationProfile,
  ];

  pub fn kind(self) -> SectionKind {
    match self {
      Section::ClientData | Section::Meters | Section::HostData | Section::Progressive => SectionKind::Ordinal,
      Section::History
      | Section::ThemeCriticalData
      | Section::ThemeAnalytics
      | Section::ThemeConfiguration
      | Section::ThemeConfigurationProfile => SectionKind::Theme,
      Section::PayvarCriticalData
      | Section::PayvarAnalytics
      | Section::PayvarConfiguration
      | Section::PayvarConfigurationProfile => SectionKind::Payvar,
      Section::ExtensionCriticalData | Section::ExtensionConfiguration | Section::ExtensionConfigurationProfile => {
        SectionKind::Extension
      }
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Section::ClientData => "client_data",
      Section::Meters => "meters",
      Section::HostData => "host_data",
      Section::Progressive => "progressive",
      Section::History => "history",
      Section::ThemeCriticalData => "theme_critical_data",
      Section::PayvarCriticalData => "payvar_critical_data",
      Section::ExtensionCriticalData => "extension_critical_data",
      Section::ThemeAnalytics => "theme_analytics",
      Section::PayvarAnalytics => "payvar_analytics",
      Section::ThemeConfiguration => "theme_configuration",
      Section::PayvarConfiguration => "payvar_configuration",
      Section::ExtensionConfiguration => "extension_configuration",
      Section::ThemeConfigurationProfile => "theme_configuration_profile",
      Section::PayvarConfigurationProfile => "payvar_configuration_profile",
      Section::ExtensionConfigurationProfile => "extension_configuration_profile",
    }
  }
}

impl fmt::Display for Section {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Error returned when parsing an unknown section name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown section: {0}")]
pub struct UnknownSection(pub String);

impl FromStr for Section {
  type Err = UnknownSection;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
    Section::ALL
      .into_iter()
      .find(|section| section.as_str() == normalized)
      .ok_or_else(|| UnknownSection(s.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn names_roundtrip_through_from_str() {
    for section in Section::ALL {
      assert_eq!(section.as_str().parse::<Section>().unwrap(), section);
    }
  }

  #[test]
  fn from_str_accepts_dashes_and_case() {
    assert_eq!("Client-Data".parse::<Section>().unwrap(), Section::ClientData);
  }

  #[test]
  fn from_str_rejects_unknown() {
    assert_eq!("nope".parse::<Section>(), Err(UnknownSection("nope".to_string())));
  }

  #[test]
  fn serde_name_matches_display() {
    let json = serde_json::to_string(&Section::PayvarConfigurationProfile).unwrap();
    assert_eq!(json, "\"payvar_configuration_profile\"");
  }

  #[test]
  fn kinds_partition_sections() {
    assert_eq!(Section::ClientData.kind(), SectionKind::Ordinal);
    assert_eq!(Section::History.kind(), SectionKind::Theme);
    assert_eq!(Section::PayvarAnalytics.kind(), SectionKind::Payvar);
    assert_eq!(Section::ExtensionConfiguration.kind(), SectionKind::Extension);
  }
}
