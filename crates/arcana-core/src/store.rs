//! The `TagStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `arcana-store-sqlite`).
//! The enrichment jobs depend on this abstraction, not on any concrete
//! backend.
//!
//! Every `replace_*` method is all-or-nothing: either the named tables end up
//! holding exactly the supplied rows, or they are left exactly as they were
//! and an error is returned. Tables are never updated in place.

use std::future::Future;

use uuid::Uuid;

use crate::{
  card::OwnedCard,
  synergy::SynergyBatch,
  tag::{CardRoleSet, CoreRoleTag, DeckTag, EvergreenTag, OracleTagBatch, TagTable},
};

// ─── Deck tag currency ───────────────────────────────────────────────────────

/// How many stored deck-tag rows match the engine's current expectations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeckTagCurrency {
  pub total:   usize,
  pub current: usize,
}

impl DeckTagCurrency {
  /// True when rows exist and every one of them is current.
  pub fn is_fully_current(&self) -> bool {
    self.total > 0 && self.current == self.total
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an Arcana tag store backend.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait TagStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Oracle tags ───────────────────────────────────────────────────────

  /// Atomically replace the contents of all seven oracle tag tables. When
  /// `synergies` is given, the three synergy tables are replaced within the
  /// same unit of work.
  fn replace_oracle_tags(
    &self,
    batch: OracleTagBatch,
    synergies: Option<SynergyBatch>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Read back the full contents of the seven oracle tag tables.
  fn oracle_tags(
    &self,
  ) -> impl Future<Output = Result<OracleTagBatch, Self::Error>> + Send + '_;

  /// Deck-tag rows whose `version` and `source_version` both match.
  fn current_deck_tags(
    &self,
    version: u32,
    source_version: String,
  ) -> impl Future<Output = Result<Vec<DeckTag>, Self::Error>> + Send + '_;

  fn deck_tag_currency(
    &self,
    version: u32,
    source_version: String,
  ) -> impl Future<Output = Result<DeckTagCurrency, Self::Error>> + Send + '_;

  fn core_role_tags(
    &self,
  ) -> impl Future<Output = Result<Vec<CoreRoleTag>, Self::Error>> + Send + '_;

  fn evergreen_tags(
    &self,
  ) -> impl Future<Output = Result<Vec<EvergreenTag>, Self::Error>> + Send + '_;

  // ── Synergies ─────────────────────────────────────────────────────────

  /// Atomically replace the contents of the three synergy tables.
  fn replace_synergies(
    &self,
    batch: SynergyBatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn synergies(
    &self,
  ) -> impl Future<Output = Result<SynergyBatch, Self::Error>> + Send + '_;

  // ── Owned records ─────────────────────────────────────────────────────

  /// Register an owned card record. Normally written by the collection
  /// layer; exposed for fixtures and imports.
  fn add_owned_card(
    &self,
    card: OwnedCard,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn owned_cards(
    &self,
  ) -> impl Future<Output = Result<Vec<OwnedCard>, Self::Error>> + Send + '_;

  /// The roles currently linked to one owned card, or `None` if it has none.
  fn card_roles(
    &self,
    card_id: Uuid,
  ) -> impl Future<Output = Result<Option<CardRoleSet>, Self::Error>> + Send + '_;

  /// Atomically replace every owned-card role and sub-role link.
  fn replace_card_roles(
    &self,
    sets: Vec<CardRoleSet>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Introspection ─────────────────────────────────────────────────────

  fn count_rows(
    &self,
    table: TagTable,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
