//! Enrichment jobs over a [`TagStore`](arcana_core::store::TagStore).
//!
//! Three jobs are exposed: the oracle enrichment run, the standalone
//! synergy recompute, and owned-card role sync. Each one is generic over the
//! store backend and returns a serializable summary.

pub mod enrichment;
pub mod error;
pub mod role_sync;
pub mod summary;
pub mod synergy;

#[cfg(test)]
pub(crate) mod testing;

pub use enrichment::{EnrichmentOptions, build_oracle_tags, recompute_oracle_enrichment};
pub use error::{Error, Result};
pub use role_sync::recompute_all_roles;
pub use summary::{
  EnrichmentStatus, EnrichmentSummary, RoleSyncSummary, SkipReason, SynergySummary,
};
pub use synergy::{SynergyParams, mine_synergies, recompute_deck_tag_synergies};
