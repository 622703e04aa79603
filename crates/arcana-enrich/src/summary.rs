//! Serializable results of the enrichment jobs.

use arcana_core::synergy::SynergyBatch;
use serde::Serialize;

/// Row counts written by a synergy computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SynergySummary {
  /// Deck-tag rows the computation was based on.
  pub deck_tags:  usize,
  pub core_roles: usize,
  pub evergreen:  usize,
  pub cards:      usize,
}

impl SynergySummary {
  pub fn of(deck_tags: usize, batch: &SynergyBatch) -> Self {
    Self {
      deck_tags,
      core_roles: batch.core_roles.len(),
      evergreen: batch.evergreen.len(),
      cards: batch.cards.len(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
  CacheUnavailable,
}

/// Per-table row counts of a completed enrichment run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentSummary {
  pub identities_scanned:      usize,
  pub identities_skipped:      usize,
  pub role_tags:               usize,
  pub sub_role_tags:           usize,
  pub keyword_tags:            usize,
  pub typal_tags:              usize,
  pub core_role_tags:          usize,
  pub deck_tags:               usize,
  pub evergreen_tags:          usize,
  pub synergies:               Option<SynergySummary>,
  pub deck_tag_version:        u32,
  pub deck_tag_source_version: String,
}

/// Outcome of [`recompute_oracle_enrichment`](crate::recompute_oracle_enrichment).
///
/// Serializes with a `status` field: `ok`, `skipped`, or `up_to_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnrichmentStatus {
  Ok(EnrichmentSummary),
  Skipped { reason: SkipReason },
  UpToDate {
    deck_tag_version:        u32,
    deck_tag_source_version: String,
  },
}

impl EnrichmentStatus {
  pub fn summary(&self) -> Option<&EnrichmentSummary> {
    match self {
      Self::Ok(summary) => Some(summary),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleSyncSummary {
  pub cards_scanned:     usize,
  pub roles_written:     usize,
  pub sub_roles_written: usize,
  /// Whether existing role links were merged rather than overwritten.
  pub merged_existing:   bool,
}
