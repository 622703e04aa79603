//! The oracle enrichment run.
//!
//! Classifies every identity in the corpus, builds the seven oracle tag
//! tables (and, when possible, the synergy tables) in memory, then hands them
//! to the store in a single atomic replace. Nothing is written unless the
//! whole build succeeds.

use arcana_core::{
  corpus::{Corpus, SourceVersion},
  store::TagStore,
  tag::{
    CoreRoleTag, DECK_TAG_VERSION, DeckTag, EvergreenTag, KeywordTag, OracleTagBatch,
    RoleTag, SOURCE_CORE_ROLE, SOURCE_CORPUS, SOURCE_DERIVED, SubRoleTag, TagTable,
    TypalTag,
  },
};
use arcana_rules::{
  Classification, Classifier, RuleSet, roles::ROLE_UTILITY, taxonomy,
};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::{
  Error, Result,
  summary::{EnrichmentStatus, EnrichmentSummary, SkipReason, SynergySummary},
  synergy::{SynergyParams, mine_synergies},
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnrichmentOptions {
  /// Rebuild even when every stored deck-tag row is already current.
  pub force:   bool,
  pub synergy: SynergyParams,
}

/// The in-memory result of classifying a whole corpus.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OracleTagBuild {
  pub batch:   OracleTagBatch,
  pub scanned: usize,
  /// Identities with no printing to classify.
  pub skipped: usize,
}

/// Classify every corpus entry into tag rows.
///
/// An entry with a blank identity is fatal and reported with its position.
pub fn build_oracle_tags(
  corpus: &Corpus,
  rules: &RuleSet,
  source_version: &SourceVersion,
) -> arcana_core::Result<OracleTagBuild> {
  let classifier = Classifier::new(rules);
  let mut build = OracleTagBuild::default();

  for (position, entry) in corpus.iter().enumerate() {
    if entry.identity.trim().is_empty() {
      return Err(arcana_core::Error::MissingIdentity(position));
    }
    build.scanned += 1;

    let Some(classification) = classifier.classify_identity(&entry.identity, &entry.printings)
    else {
      debug!(identity = %entry.identity, "no printings; skipping");
      build.skipped += 1;
      continue;
    };
    push_rows(&mut build.batch, &classification, source_version.as_str());
  }
  Ok(build)
}

fn push_rows(batch: &mut OracleTagBatch, c: &Classification, source_version: &str) {
  let identity = || c.identity.clone();

  batch.role_tags.extend(c.roles.roles.iter().map(|role| RoleTag {
    identity:   identity(),
    role:       role.clone(),
    is_primary: c.roles.primary.as_ref() == Some(role),
    source:     SOURCE_DERIVED.to_owned(),
  }));

  batch.sub_role_tags.extend(c.roles.sub_roles.iter().map(|key| {
    let (parent, sub) = key.split_once(':').unwrap_or(("", key.as_str()));
    SubRoleTag {
      identity:    identity(),
      parent_role: if parent.is_empty() { ROLE_UTILITY } else { parent }.to_owned(),
      sub_role:    sub.to_owned(),
      source:      SOURCE_DERIVED.to_owned(),
    }
  }));

  batch.keyword_tags.extend(c.keywords.iter().map(|keyword| KeywordTag {
    identity: identity(),
    keyword:  keyword.clone(),
    source:   SOURCE_CORPUS.to_owned(),
  }));

  batch.typal_tags.extend(c.typals.iter().map(|typal| TypalTag {
    identity: identity(),
    typal:    typal.clone(),
    source:   SOURCE_DERIVED.to_owned(),
  }));

  batch.core_role_tags.extend(c.core_roles.iter().map(|role| CoreRoleTag {
    identity: identity(),
    role:     role.clone(),
    source:   SOURCE_CORE_ROLE.to_owned(),
  }));

  batch.deck_tags.extend(c.deck_tags.iter().map(|tag| DeckTag {
    identity:       identity(),
    tag:            tag.clone(),
    category:       taxonomy::category_of(tag).map(str::to_owned),
    source:         SOURCE_DERIVED.to_owned(),
    version:        DECK_TAG_VERSION,
    source_version: source_version.to_owned(),
  }));

  batch.evergreen_tags.extend(c.evergreen.iter().map(|keyword| EvergreenTag {
    identity: identity(),
    keyword:  keyword.clone(),
    source:   SOURCE_DERIVED.to_owned(),
  }));
}

/// Rebuild every oracle tag table from the corpus.
///
/// Returns [`EnrichmentStatus::Skipped`] without touching the store when the
/// corpus is empty, and [`EnrichmentStatus::UpToDate`] when `force` is off
/// and every stored deck-tag row already matches the current version and
/// source version.
pub async fn recompute_oracle_enrichment<S: TagStore>(
  store: &S,
  corpus: &Corpus,
  rules: &RuleSet,
  source_version: &SourceVersion,
  options: &EnrichmentOptions,
) -> Result<EnrichmentStatus> {
  if corpus.is_empty() {
    warn!("card corpus unavailable; skipping oracle enrichment");
    return Ok(EnrichmentStatus::Skipped {
      reason: SkipReason::CacheUnavailable,
    });
  }

  if !options.force {
    let currency = store
      .deck_tag_currency(DECK_TAG_VERSION, source_version.as_str().to_owned())
      .await
      .map_err(Error::store)?;
    if currency.is_fully_current() {
      info!(
        rows = currency.total,
        %source_version,
        "deck tags already current; skipping oracle enrichment"
      );
      return Ok(EnrichmentStatus::UpToDate {
        deck_tag_version:        DECK_TAG_VERSION,
        deck_tag_source_version: source_version.to_string(),
      });
    }
  }

  let OracleTagBuild { batch, scanned, skipped } =
    build_oracle_tags(corpus, rules, source_version)?;

  let synergies = (!batch.deck_tags.is_empty()
    && (!batch.core_role_tags.is_empty() || !batch.evergreen_tags.is_empty()))
  .then(|| {
    mine_synergies(
      &batch.deck_tags,
      &batch.core_role_tags,
      &batch.evergreen_tags,
      &options.synergy,
    )
  });
  let synergy_summary = synergies
    .as_ref()
    .map(|s| SynergySummary::of(batch.deck_tags.len(), s));

  let summary = EnrichmentSummary {
    identities_scanned:      scanned,
    identities_skipped:      skipped,
    role_tags:               batch.count(TagTable::RoleTags),
    sub_role_tags:           batch.count(TagTable::SubRoleTags),
    keyword_tags:            batch.count(TagTable::KeywordTags),
    typal_tags:              batch.count(TagTable::TypalTags),
    core_role_tags:          batch.count(TagTable::CoreRoleTags),
    deck_tags:               batch.count(TagTable::DeckTags),
    evergreen_tags:          batch.count(TagTable::EvergreenTags),
    synergies:               synergy_summary,
    deck_tag_version:        DECK_TAG_VERSION,
    deck_tag_source_version: source_version.to_string(),
  };

  store.replace_oracle_tags(batch, synergies).await.map_err(|e| {
    error!(error = %e, "oracle enrichment write failed; previous tags kept");
    Error::store(e)
  })?;

  info!(
    scanned = summary.identities_scanned,
    skipped = summary.identities_skipped,
    deck_tags = summary.deck_tags,
    core_role_tags = summary.core_role_tags,
    "oracle enrichment complete"
  );
  Ok(EnrichmentStatus::Ok(summary))
}
