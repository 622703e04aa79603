//! Core-role classification: requires/excludes gated rules with their own
//! vocabulary, stored as human-readable labels.

use std::collections::BTreeSet;

use arcana_core::card::ClassifiableText;

use crate::ruleset::RuleSet;

#[derive(Debug, Clone, Copy)]
pub struct CoreRoleClassifier<'r> {
  rules: &'r RuleSet,
}

impl<'r> CoreRoleClassifier<'r> {
  pub fn new(rules: &'r RuleSet) -> Self { Self { rules } }

  /// Matching core-role labels for a card, deduplicated.
  pub fn classify(&self, card: &ClassifiableText) -> BTreeSet<String> {
    let text = self.rules.normalizer.normalize_card(
      &card.name,
      &card.type_line,
      &card.oracle_text,
    );
    self
      .role_keys_for_text(&text)
      .iter()
      .map(|key| core_role_label(key))
      .filter(|label| !label.is_empty())
      .collect()
  }

  /// Raw rule keys matching already-normalised text.
  pub fn role_keys_for_text(&self, text: &str) -> BTreeSet<String> {
    if text.is_empty() {
      return BTreeSet::new();
    }
    self
      .rules
      .core_roles
      .iter()
      .filter(|rule| rule.matches(text))
      .map(|rule| rule.role.clone())
      .collect()
  }
}

/// `mana_rock` → `Mana Rock`. Underscores and hyphens become spaces, then
/// each alphabetic run is capitalised.
pub fn core_role_label(key: &str) -> String {
  let spaced = key.replace(['_', '-'], " ");
  let mut out = String::with_capacity(spaced.len());
  let mut in_word = false;
  for ch in spaced.chars() {
    if ch.is_alphabetic() {
      if in_word {
        out.extend(ch.to_lowercase());
      } else {
        out.extend(ch.to_uppercase());
      }
      in_word = true;
    } else {
      out.push(ch);
      in_word = false;
    }
  }
  out.trim().to_owned()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ruleset::RuleSources;

  #[test]
  fn labels_are_title_cased() {
    assert_eq!(core_role_label("mana_rock"), "Mana Rock");
    assert_eq!(core_role_label("sac-outlet"), "Sac Outlet");
    assert_eq!(core_role_label("BOARD_WIPE"), "Board Wipe");
    assert_eq!(core_role_label("  "), "");
  }

  #[test]
  fn requires_all_and_excludes_any() {
    let rules = RuleSet::from_sources(RuleSources {
      core_roles: Some(
        r#"{"roles": [
          {"role": "mana_rock", "requires": ["artifact", "add {"], "excludes": ["creature"]}
        ]}"#
          .into(),
      ),
      ..RuleSources::default()
    });
    let classifier = CoreRoleClassifier::new(&rules);

    let signet = ClassifiableText::new("Arcane Signet", "{T}: Add one mana of any color.", "Artifact");
    assert!(classifier.classify(&signet).is_empty());

    let stone = ClassifiableText::new("Mind Stone", "{T}: Add {C}.", "Artifact");
    assert_eq!(classifier.classify(&stone), BTreeSet::from(["Mana Rock".to_owned()]));

    let golem = ClassifiableText::new("Palladium Myr", "{T}: Add {C}{C}.", "Artifact Creature — Myr");
    assert!(classifier.classify(&golem).is_empty());
  }

  #[test]
  fn duplicate_rule_keys_collapse_to_one_label() {
    let rules = RuleSet::builtin();
    let wrath = ClassifiableText::new(
      "Hour of Reckoning",
      "Destroy all creatures. Exile all graveyards.",
      "Sorcery",
    );
    let labels = CoreRoleClassifier::new(&rules).classify(&wrath);
    assert_eq!(labels.iter().filter(|l| *l == "Board Wipe").count(), 1);
  }

  #[test]
  fn builtin_mana_rock() {
    let rules = RuleSet::builtin();
    let stone = ClassifiableText::new("Mind Stone", "{T}: Add {C}.", "Artifact");
    assert!(CoreRoleClassifier::new(&rules).classify(&stone).contains("Mana Rock"));
  }

  #[test]
  fn empty_text_matches_nothing() {
    let rules = RuleSet::from_sources(RuleSources {
      core_roles: Some(r#"{"roles": [{"role": "anything"}]}"#.into()),
      ..RuleSources::default()
    });
    let classifier = CoreRoleClassifier::new(&rules);
    assert!(classifier.classify(&ClassifiableText::default()).is_empty());
    assert_eq!(classifier.role_keys_for_text("some text").len(), 1);
  }
}
