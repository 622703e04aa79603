//! Functional role and sub-role classification.
//!
//! Roles come from three layers over the normalised card text: the keyword
//! lists in the role rule file, a fixed set of contextual phrase checks, and
//! a catch-all `utility` role when nothing else matched. Lands bypass the
//! text layers entirely and are described by their land tags instead.

use std::collections::BTreeSet;

use arcana_core::{card::ClassifiableText, tag::CardRoleSet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{land::land_tags, normalize::contains_word, ruleset::RuleSet};

pub const ROLE_LAND: &str = "land";
pub const ROLE_UTILITY: &str = "utility";

/// Order in which a primary role is chosen from a role set.
pub const PRIMARY_ROLE_PRIORITY: &[&str] = &[
  "removal",
  "ramp",
  "draw",
  "tutor",
  "recursion",
  "tokens",
  "protection",
  "counterspells",
  "lifegain",
  "combat",
  "sacrifice outlet",
  "stax",
  ROLE_UTILITY,
];

// ─── Assignment ──────────────────────────────────────────────────────────────

/// The roles derived for (or stored against) one card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
  pub roles:     BTreeSet<String>,
  /// Keyed `parent:sub`.
  pub sub_roles: BTreeSet<String>,
  pub primary:   Option<String>,
}

impl RoleAssignment {
  pub fn into_card_roles(self, card_id: Uuid) -> CardRoleSet {
    CardRoleSet {
      card_id,
      roles: self.roles,
      sub_roles: self.sub_roles,
      primary: self.primary,
    }
  }
}

impl From<CardRoleSet> for RoleAssignment {
  fn from(set: CardRoleSet) -> Self {
    Self {
      roles:     set.roles,
      sub_roles: set.sub_roles,
      primary:   set.primary,
    }
  }
}

/// The first role of [`PRIMARY_ROLE_PRIORITY`] present in `roles`, else the
/// smallest role in the set.
pub fn primary_role(roles: &BTreeSet<String>) -> Option<String> {
  PRIMARY_ROLE_PRIORITY
    .iter()
    .find(|candidate| roles.contains(**candidate))
    .map(|candidate| (*candidate).to_owned())
    .or_else(|| roles.first().cloned())
}

/// Merge freshly derived roles onto what a card already had.
///
/// Roles and sub-roles are unioned, so tags never shrink through a merge. An
/// existing primary wins over the derived one, and whichever primary is
/// chosen is always part of the role set.
pub fn merge_roles(
  existing: Option<RoleAssignment>,
  derived: RoleAssignment,
) -> RoleAssignment {
  let Some(existing) = existing else {
    return with_primary_in_roles(derived);
  };

  let mut merged = existing;
  merged.roles.extend(derived.roles);
  merged.sub_roles.extend(derived.sub_roles);
  merged.primary = merged.primary.or(derived.primary);
  with_primary_in_roles(merged)
}

fn with_primary_in_roles(mut assignment: RoleAssignment) -> RoleAssignment {
  if let Some(primary) = &assignment.primary {
    assignment.roles.insert(primary.clone());
  }
  assignment
}

// ─── Classifier ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct RoleClassifier<'r> {
  rules: &'r RuleSet,
}

impl<'r> RoleClassifier<'r> {
  pub fn new(rules: &'r RuleSet) -> Self { Self { rules } }

  pub fn classify(&self, card: &ClassifiableText) -> RoleAssignment {
    if card.is_land() {
      return land_assignment(card);
    }

    let text = self.rules.normalizer.normalize_card(
      &card.name,
      &card.type_line,
      &card.oracle_text,
    );
    let roles = self.roles_for_text(&text);
    let sub_roles = self.sub_roles_for_text(&text);
    let primary = primary_role(&roles);
    RoleAssignment { roles, sub_roles, primary }
  }

  /// Roles for already-normalised text.
  pub fn roles_for_text(&self, text: &str) -> BTreeSet<String> {
    let mut roles: BTreeSet<String> = self
      .rules
      .roles
      .iter()
      .filter(|rule| rule.keywords.iter().any(|kw| kw.is_match(text)))
      .map(|rule| rule.role.clone())
      .collect();

    roles.extend(contextual_roles(text).into_iter().map(str::to_owned));

    if roles.is_empty() && !text.is_empty() {
      roles.insert(ROLE_UTILITY.to_owned());
    }
    roles
  }

  pub fn sub_roles_for_text(&self, text: &str) -> BTreeSet<String> {
    if text.is_empty() {
      return BTreeSet::new();
    }
    self
      .rules
      .sub_roles
      .iter()
      .filter(|rule| rule.keywords.iter().any(|kw| kw.is_match(text)))
      .map(|rule| rule.key())
      .collect()
  }
}

fn land_assignment(card: &ClassifiableText) -> RoleAssignment {
  let roles = BTreeSet::from([ROLE_LAND.to_owned()]);
  let sub_roles = land_tags(card)
    .into_iter()
    .map(|tag| format!("{ROLE_LAND}:{}", tag.to_lowercase()))
    .collect();
  RoleAssignment {
    primary: primary_role(&roles),
    roles,
    sub_roles,
  }
}

/// Hand-written phrase checks layered over the keyword rules. Any number of
/// them may fire.
fn contextual_roles(text: &str) -> Vec<&'static str> {
  let has = |phrase: &str| text.contains(phrase);
  let mut roles = Vec::new();

  if has("counter target spell") || (has("counter target") && has("spell")) {
    roles.push("counterspells");
  }
  if has("create") && has("token") {
    roles.push("tokens");
  }
  if has("add {") || has("mana pool") || has("untap target land") {
    roles.push("ramp");
  }
  if has("search your library") {
    roles.push("tutor");
  }
  if has("return target") && has("graveyard") {
    roles.push("recursion");
  }
  if has("draw") && has("card") {
    roles.push("draw");
  }
  if has("destroy target")
    || has("exile target")
    || has("sacrifice target")
    || contains_word(text, "fight")
    || contains_word(text, "fights")
    || (has("deals damage equal to its power") && has("target creature"))
  {
    roles.push("removal");
  }
  if has("indestructible")
    || has("hexproof")
    || contains_word(text, "ward")
    || has("prevent all damage")
    || has("phase out")
    || (has("exile target") && has("return"))
  {
    roles.push("protection");
  }
  if has("lifelink") || has("gain life") {
    roles.push("lifegain");
  }
  if has("sacrifice a creature")
    || has("sacrifice another creature")
    || has("sacrifice a permanent")
  {
    roles.push("sacrifice outlet");
  }
  if has("each player can't") || has("players can't") || has("don't untap") {
    roles.push("stax");
  }
  if has("creatures you control get")
    || has("whenever this creature attacks")
    || has("extra combat")
  {
    roles.push("combat");
  }
  roles
}
