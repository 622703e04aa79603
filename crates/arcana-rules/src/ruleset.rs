//! Loading and compiling the declarative rule files.
//!
//! A [`RuleSet`] is compiled once and then shared by reference with every
//! classifier. A missing or malformed rule file never fails the run: the
//! affected rule family is simply empty and its classifier matches nothing.

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

use crate::normalize::{Normalization, Normalizer, TokenPattern};

pub const NORMALIZATION_FILE: &str = "normalization.json";
pub const ROLE_RULES_FILE: &str = "role_rules.json";
pub const SUBROLE_RULES_FILE: &str = "subrole_rules.json";
pub const CORE_ROLE_RULES_FILE: &str = "core_roles.json";

const BUILTIN_NORMALIZATION: &str = include_str!("../rules/normalization.json");
const BUILTIN_ROLE_RULES: &str = include_str!("../rules/role_rules.json");
const BUILTIN_SUBROLE_RULES: &str = include_str!("../rules/subrole_rules.json");
const BUILTIN_CORE_ROLE_RULES: &str = include_str!("../rules/core_roles.json");

/// Sub-role categories whose parent role differs from the category name.
const SUBROLE_PARENT_ALIASES: &[(&str, &str)] = &[("land types", "ramp")];

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Why a rule file could not be used. Only ever logged.
#[derive(Debug, Error)]
enum RuleFileError {
  #[error("cannot read {path:?}: {source}")]
  Read {
    path:   PathBuf,
    source: std::io::Error,
  },

  #[error("cannot parse {name}: {source}")]
  Parse {
    name:   String,
    source: serde_json::Error,
  },
}

// ─── Raw file shapes ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct RawRoleRule {
  #[serde(default)]
  keywords: Vec<String>,
}

type RawRoleRules = BTreeMap<String, RawRoleRule>;

type RawSubRoleRules = BTreeMap<String, BTreeMap<String, Vec<String>>>;

#[derive(Debug, Default, Deserialize)]
struct RawCoreRoleFile {
  #[serde(default)]
  roles: Vec<RawCoreRoleRule>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCoreRoleRule {
  #[serde(default)]
  role:     String,
  #[serde(default)]
  requires: Vec<String>,
  #[serde(default)]
  optional: Vec<String>,
  #[serde(default)]
  excludes: Vec<String>,
}

// ─── Compiled rules ──────────────────────────────────────────────────────────

/// A role assigned when any of its keywords matches.
#[derive(Debug, Clone)]
pub struct RoleRule {
  pub role:     String,
  pub keywords: Vec<TokenPattern>,
}

/// A sub-role (`parent:sub`) assigned when any of its keywords matches.
#[derive(Debug, Clone)]
pub struct SubRoleRule {
  pub parent_role: String,
  pub sub_role:    String,
  pub keywords:    Vec<TokenPattern>,
}

impl SubRoleRule {
  pub fn key(&self) -> String {
    format!("{}:{}", self.parent_role, self.sub_role)
  }
}

/// A core role, gated on requires/excludes. `optional` tokens are compiled
/// and kept but never consulted when matching.
#[derive(Debug, Clone)]
pub struct CoreRoleRule {
  pub role:     String,
  pub requires: Vec<TokenPattern>,
  pub optional: Vec<TokenPattern>,
  pub excludes: Vec<TokenPattern>,
}

impl CoreRoleRule {
  pub fn matches(&self, normalized: &str) -> bool {
    self.requires.iter().all(|rx| rx.is_match(normalized))
      && !self.excludes.iter().any(|rx| rx.is_match(normalized))
  }
}

/// The immutable, compiled rule configuration.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
  pub normalizer: Normalizer,
  pub roles:      Vec<RoleRule>,
  pub sub_roles:  Vec<SubRoleRule>,
  pub core_roles: Vec<CoreRoleRule>,
}

/// Raw rule documents, one per file. `None` means the file was unavailable.
#[derive(Debug, Clone, Default)]
pub struct RuleSources {
  pub normalization: Option<String>,
  pub roles:         Option<String>,
  pub sub_roles:     Option<String>,
  pub core_roles:    Option<String>,
}

impl RuleSet {
  /// A rule set with default normalisation and no rules at all.
  pub fn empty() -> Self { Self::default() }

  /// The rule files shipped with this crate.
  pub fn builtin() -> Self {
    Self::from_sources(RuleSources {
      normalization: Some(BUILTIN_NORMALIZATION.to_owned()),
      roles:         Some(BUILTIN_ROLE_RULES.to_owned()),
      sub_roles:     Some(BUILTIN_SUBROLE_RULES.to_owned()),
      core_roles:    Some(BUILTIN_CORE_ROLE_RULES.to_owned()),
    })
  }

  /// Load the four rule files from `dir`. Each unreadable file is logged and
  /// treated as empty.
  pub fn load_dir(dir: impl AsRef<Path>) -> Self {
    let dir = dir.as_ref();
    Self::from_sources(RuleSources {
      normalization: read_rule_file(&dir.join(NORMALIZATION_FILE)),
      roles:         read_rule_file(&dir.join(ROLE_RULES_FILE)),
      sub_roles:     read_rule_file(&dir.join(SUBROLE_RULES_FILE)),
      core_roles:    read_rule_file(&dir.join(CORE_ROLE_RULES_FILE)),
    })
  }

  /// Compile rule documents. Malformed documents yield empty rule families.
  pub fn from_sources(sources: RuleSources) -> Self {
    let normalization: Normalization =
      parse_or_default(NORMALIZATION_FILE, sources.normalization.as_deref());
    let raw_roles: RawRoleRules =
      parse_or_default(ROLE_RULES_FILE, sources.roles.as_deref());
    let raw_sub_roles: RawSubRoleRules =
      parse_or_default(SUBROLE_RULES_FILE, sources.sub_roles.as_deref());
    let raw_core: RawCoreRoleFile =
      parse_or_default(CORE_ROLE_RULES_FILE, sources.core_roles.as_deref());

    let rule_set = Self {
      normalizer: Normalizer::new(normalization),
      roles:      compile_roles(raw_roles),
      sub_roles:  compile_sub_roles(raw_sub_roles),
      core_roles: compile_core_roles(raw_core),
    };

    tracing::debug!(
      roles = rule_set.roles.len(),
      sub_roles = rule_set.sub_roles.len(),
      core_roles = rule_set.core_roles.len(),
      "compiled rule set"
    );
    rule_set
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn read_rule_file(path: &Path) -> Option<String> {
  match std::fs::read_to_string(path) {
    Ok(contents) => Some(contents),
    Err(source) => {
      let err = RuleFileError::Read { path: path.to_path_buf(), source };
      tracing::warn!("rule file unavailable, using empty rules: {err}");
      None
    }
  }
}

fn parse_or_default<T: DeserializeOwned + Default>(
  name: &str,
  raw: Option<&str>,
) -> T {
  let Some(raw) = raw else {
    return T::default();
  };
  match serde_json::from_str(raw) {
    Ok(parsed) => parsed,
    Err(source) => {
      let err = RuleFileError::Parse { name: name.to_owned(), source };
      tracing::warn!("rule file malformed, using empty rules: {err}");
      T::default()
    }
  }
}

fn compile_roles(raw: RawRoleRules) -> Vec<RoleRule> {
  raw
    .into_iter()
    .filter_map(|(role, rule)| {
      let role = role.trim().to_lowercase();
      (!role.is_empty()).then(|| RoleRule {
        role,
        keywords: TokenPattern::literal_all(&rule.keywords),
      })
    })
    .collect()
}

fn compile_sub_roles(raw: RawSubRoleRules) -> Vec<SubRoleRule> {
  let mut out = Vec::new();
  for (category, groups) in raw {
    let category = category.trim().to_lowercase();
    let parent_role = SUBROLE_PARENT_ALIASES
      .iter()
      .find(|(alias, _)| *alias == category)
      .map(|(_, parent)| (*parent).to_owned())
      .unwrap_or(category);
    for (sub_role, keywords) in groups {
      let sub_role = sub_role.trim().to_lowercase();
      if sub_role.is_empty() {
        continue;
      }
      out.push(SubRoleRule {
        parent_role: parent_role.clone(),
        sub_role,
        keywords: TokenPattern::literal_all(&keywords),
      });
    }
  }
  out
}

fn compile_core_roles(raw: RawCoreRoleFile) -> Vec<CoreRoleRule> {
  raw
    .roles
    .into_iter()
    .filter_map(|entry| {
      let role = entry.role.trim().to_lowercase();
      (!role.is_empty()).then(|| CoreRoleRule {
        role,
        requires: TokenPattern::compile_all(&entry.requires),
        optional: TokenPattern::compile_all(&entry.optional),
        excludes: TokenPattern::compile_all(&entry.excludes),
      })
    })
    .collect()
}
