//! Engine configuration, read from `arcana.toml` and `ARCANA_*` variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use arcana_enrich::SynergyParams;
use config::{ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  pub store_path:     PathBuf,
  /// Bulk card file (a JSON array of printings).
  pub corpus_path:    PathBuf,
  /// Directory holding the rule files. Built-in rules when unset.
  pub rules_dir:      Option<PathBuf>,
  pub merge_existing: bool,
  pub force:          bool,
  pub synergy:        SynergyParams,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      store_path:     PathBuf::from("arcana.db"),
      corpus_path:    PathBuf::from("default-cards.json"),
      rules_dir:      None,
      merge_existing: true,
      force:          false,
      synergy:        SynergyParams::default(),
    }
  }
}

impl EngineConfig {
  /// Layer the optional config file under `ARCANA_*` environment variables.
  /// Nested keys use `__`, e.g. `ARCANA_SYNERGY__MIN_LIFT`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let builder = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("ARCANA")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      );
    Self::build(builder)
  }

  fn build(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
    builder
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise EngineConfig")
  }

  /// Copy with a leading `~` expanded in every path.
  pub fn expanded(mut self) -> Self {
    self.store_path = expand_tilde(&self.store_path);
    self.corpus_path = expand_tilde(&self.corpus_path);
    self.rules_dir = self.rules_dir.as_deref().map(expand_tilde);
    self
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::{File, FileFormat};

  use super::*;

  fn from_toml(toml: &str) -> EngineConfig {
    EngineConfig::build(
      config::Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
    )
    .unwrap()
  }

  #[test]
  fn missing_file_gives_defaults() {
    let cfg = EngineConfig::build(
      config::Config::builder()
        .add_source(File::from(Path::new("/nonexistent/arcana.toml")).required(false)),
    )
    .unwrap();
    assert_eq!(cfg, EngineConfig::default());
  }

  #[test]
  fn synergy_table_overrides_single_fields() {
    let cfg = from_toml(
      r#"
      store_path = "/tmp/tags.db"
      merge_existing = false

      [synergy]
      min_lift = 2.0
      max_cards = 10
      "#,
    );
    assert_eq!(cfg.store_path, PathBuf::from("/tmp/tags.db"));
    assert!(!cfg.merge_existing);
    assert_eq!(cfg.synergy.min_lift, 2.0);
    assert_eq!(cfg.synergy.max_cards, 10);
    assert_eq!(cfg.synergy.min_count, SynergyParams::default().min_count);
  }

  #[test]
  fn tilde_is_expanded_only_at_the_start() {
    let plain = Path::new("/var/lib/arcana.db");
    assert_eq!(expand_tilde(plain), plain);
    let odd = Path::new("data/~/arcana.db");
    assert_eq!(expand_tilde(odd), odd);
  }
}
