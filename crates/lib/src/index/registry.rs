//! Registry metadata: resolves theme, payvar and extension identifiers to indices.

use serde::{Deserialize, Serialize};

use super::IndexError;
use crate::consts::PAYVAR_THEME_SHIFT;

/// Resolves identifiers to stable small integers.
///
/// `Ok(None)` means the identifier is not registered. An empty identifier is
/// always `InvalidArgument`.
pub trait RegistryIndex: Send + Sync {
  fn theme_index(&self, id: &str) -> Result<Option<u32>, IndexError>;
  fn payvar_index(&self, id: &str) -> Result<Option<u32>, IndexError>;
  fn extension_index(&self, id: &str) -> Result<Option<u32>, IndexError>;
}

/// A registered theme and its payvars, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeEntry {
  pub id: String,
  #[serde(default)]
  pub payvars: Vec<String>,
}

/// Registry loaded from configuration.
///
/// Ordinals are list positions. Payvar indices pack the owning theme's
/// ordinal into the high 16 bits so numbering stays independent per theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
  #[serde(default)]
  pub themes: Vec<ThemeEntry>,
  /// `None` when no extension registry is configured.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub extensions: Option<Vec<String>>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_theme<I, S>(mut self, id: &str, payvars: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.themes.push(ThemeEntry {
      id: id.to_string(),
      payvars: payvars.into_iter().map(Into::into).collect(),
    });
    self
  }

  pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.extensions = Some(extensions.into_iter().map(Into::into).collect());
    self
  }
}

fn require_id(kind: &'static str, id: &str) -> Result<(), IndexError> {
  if id.is_empty() {
    return Err(IndexError::InvalidArgument(format!("{kind} identifier is empty")));
  }
  Ok(())
}

fn position<S: AsRef<str>>(items: &[S], id: &str) -> Option<u32> {
  items
    .iter()
    .position(|item| item.as_ref() == id)
    .and_then(|i| u32::try_from(i).ok())
}

impl RegistryIndex for Registry {
  fn theme_index(&self, id: &str) -> Result<Option<u32>, IndexError> {
    require_id("theme", id)?;
    Ok(self.themes.iter().position(|t| t.id == id).and_then(|i| u32::try_from(i).ok()))
  }

  fn payvar_index(&self, id: &str) -> Result<Option<u32>, IndexError> {
    require_id("payvar", id)?;
    let limit = 1u32 << PAYVAR_THEME_SHIFT;
    for (theme_ordinal, theme) in self.themes.iter().enumerate() {
      if let Some(payvar_ordinal) = position(theme.payvars.as_slice(), id) {
        let theme_ordinal = u32::try_from(theme_ordinal).unwrap_or(u32::MAX);
        if theme_ordinal >= limit || payvar_ordinal >= limit {
          return Err(IndexError::Unsupported(format!(
            "payvar {id} at theme {theme_ordinal}, position {payvar_ordinal} does not fit a packed index"
          )));
        }
        return Ok(Some((theme_ordinal << PAYVAR_THEME_SHIFT) | payvar_ordinal));
      }
    }
    Ok(None)
  }

  fn extension_index(&self, id: &str) -> Result<Option<u32>, IndexError> {
    require_id("extension", id)?;
    let extensions = self
      .extensions
      .as_ref()
      .ok_or_else(|| IndexError::Unsupported("no extension registry is configured".to_string()))?;
    Ok(position(extensions.as_slice(), id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn registry() -> Registry {
    Registry::new()
      .with_theme("dragon", ["dragon-88", "dragon-92"])
      .with_theme("tiger", ["tiger-90", "tiger-94", "tiger-96"])
  }

  #[test]
  fn theme_index_is_list_position() {
    let registry = registry();
    assert_eq!(registry.theme_index("dragon").unwrap(), Some(0));
    assert_eq!(registry.theme_index("tiger").unwrap(), Some(1));
    assert_eq!(registry.theme_index("phoenix").unwrap(), None);
  }

  #[test]
  fn payvar_index_packs_theme_ordinal() {
    let registry = registry();
    assert_eq!(registry.payvar_index("dragon-92").unwrap(), Some(1));
    assert_eq!(registry.payvar_index("tiger-96").unwrap(), Some((1 << 16) | 2));
    assert_eq!(registry.payvar_index("tiger-99").unwrap(), None);
  }

  #[test]
  fn empty_identifier_is_invalid() {
    let registry = registry();
    assert!(matches!(registry.theme_index(""), Err(IndexError::InvalidArgument(_))));
    assert!(matches!(registry.payvar_index(""), Err(IndexError::InvalidArgument(_))));
    assert!(matches!(registry.extension_index(""), Err(IndexError::InvalidArgument(_))));
  }

  #[test]
  fn extensions_without_registry_are_unsupported() {
    assert!(matches!(
      registry().extension_index("jackpot"),
      Err(IndexError::Unsupported(_))
    ));
  }

  #[test]
  fn extension_index_is_list_position() {
    let registry = registry().with_extensions(["jackpot", "mystery"]);
    assert_eq!(registry.extension_index("mystery").unwrap(), Some(1));
    assert_eq!(registry.extension_index("other").unwrap(), None);
  }

  #[test]
  fn deserializes_from_json() {
    let json = r#"{"themes":[{"id":"dragon","payvars":["dragon-88"]}],"extensions":["jackpot"]}"#;
    let registry: Registry = serde_json::from_str(json).unwrap();
    assert_eq!(registry.payvar_index("dragon-88").unwrap(), Some(0));
    assert_eq!(registry.extension_index("jackpot").unwrap(), Some(0));
  }
}
