//! Full classification of one card identity.
//!
//! [`Classifier`] ties the individual classifiers together: it picks the
//! canonical printing, builds its [`ClassifiableText`], and derives roles,
//! keywords, typals, core roles, evergreen keywords, and deck tags. It has no
//! side effects, so the orchestrator and the `classify` command share it.

use std::collections::BTreeSet;

use arcana_core::card::{ClassifiableText, Printing};
use serde::Serialize;

use crate::{
  core_role::CoreRoleClassifier,
  deck_tags::{
    DeckTagSignals, collect_keywords, collect_typals, derive_deck_tags, derive_evergreen,
    ensure_fallback_tag,
  },
  land::{LandClassification, classify_land},
  print::{classifiable_text, select_best_print},
  roles::{RoleAssignment, RoleClassifier},
  ruleset::RuleSet,
};

/// Everything derived for one identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
  pub identity:        String,
  pub text:            ClassifiableText,
  /// Normalised rules text (reminder text removed) used for evergreen and
  /// deck-tag detection.
  pub normalized_text: String,
  pub roles:           RoleAssignment,
  pub keywords:        BTreeSet<String>,
  pub typals:          BTreeSet<String>,
  pub core_roles:      BTreeSet<String>,
  pub evergreen:       BTreeSet<String>,
  pub deck_tags:       BTreeSet<String>,
  pub land:            Option<LandClassification>,
}

#[derive(Debug, Clone, Copy)]
pub struct Classifier<'r> {
  rules:      &'r RuleSet,
  roles:      RoleClassifier<'r>,
  core_roles: CoreRoleClassifier<'r>,
}

impl<'r> Classifier<'r> {
  pub fn new(rules: &'r RuleSet) -> Self {
    Self {
      rules,
      roles: RoleClassifier::new(rules),
      core_roles: CoreRoleClassifier::new(rules),
    }
  }

  pub fn roles(&self) -> &RoleClassifier<'r> { &self.roles }

  /// Classify an identity from all of its printings. Returns `None` when
  /// there is no printing to classify.
  pub fn classify_identity(
    &self,
    identity: &str,
    printings: &[Printing],
  ) -> Option<Classification> {
    let best = select_best_print(printings)?;
    let text = classifiable_text(best);
    let keywords = collect_keywords(printings);
    let typals = collect_typals(printings);
    Some(self.classify_text(identity, text, keywords, typals))
  }

  /// Classify prepared text with already collected keywords and typals.
  pub fn classify_text(
    &self,
    identity: &str,
    text: ClassifiableText,
    keywords: BTreeSet<String>,
    typals: BTreeSet<String>,
  ) -> Classification {
    let roles = self.roles.classify(&text);
    let land = classify_land(&text);
    let land_tags = land.as_ref().map(LandClassification::all_tags).unwrap_or_default();

    let normalized_text = self.rules.normalizer.normalize(&text.oracle_text);
    let evergreen = derive_evergreen(&normalized_text, &keywords, &land_tags);
    let core_roles = self.core_roles.classify(&text);

    let deck_tags = derive_deck_tags(DeckTagSignals {
      oracle_text: &normalized_text,
      type_line:   &text.type_line,
      keywords:    &keywords,
      typals:      &typals,
      roles:       &roles.roles,
    });
    let deck_tags = ensure_fallback_tag(deck_tags, &core_roles, &evergreen);

    Classification {
      identity: identity.to_owned(),
      text,
      normalized_text,
      roles,
      keywords,
      typals,
      core_roles,
      evergreen,
      deck_tags,
      land,
    }
  }
}
