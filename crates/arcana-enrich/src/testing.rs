//! An in-memory `TagStore` for exercising the jobs without a database.

use std::{
  collections::BTreeMap,
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use arcana_core::{
  card::OwnedCard,
  store::{DeckTagCurrency, TagStore},
  synergy::SynergyBatch,
  tag::{CardRoleSet, CoreRoleTag, DeckTag, EvergreenTag, OracleTagBatch, TagTable},
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("injected write failure")]
pub struct InjectedFailure;

#[derive(Debug, Default)]
struct State {
  oracle:     OracleTagBatch,
  synergies:  SynergyBatch,
  owned:      Vec<OwnedCard>,
  card_roles: BTreeMap<Uuid, CardRoleSet>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  state:       Mutex<State>,
  fail_writes: AtomicBool,
  writes:      AtomicUsize,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Make every subsequent `replace_*` call fail without changing state.
  pub fn fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::SeqCst); }

  /// Successful `replace_*` calls so far.
  pub fn write_count(&self) -> usize { self.writes.load(Ordering::SeqCst) }

  pub fn seed_oracle_tags(&self, batch: OracleTagBatch) {
    self.state.lock().unwrap().oracle = batch;
  }

  fn write<T>(&self, apply: impl FnOnce(&mut State) -> T) -> Result<T, InjectedFailure> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(InjectedFailure);
    }
    let out = apply(&mut self.state.lock().unwrap());
    self.writes.fetch_add(1, Ordering::SeqCst);
    Ok(out)
  }

  fn read<T>(&self, view: impl FnOnce(&State) -> T) -> Result<T, InjectedFailure> {
    Ok(view(&self.state.lock().unwrap()))
  }
}

fn is_current(tag: &DeckTag, version: u32, source_version: &str) -> bool {
  tag.version == version && tag.source_version == source_version
}

impl TagStore for MemoryStore {
  type Error = InjectedFailure;

  async fn replace_oracle_tags(
    &self,
    batch: OracleTagBatch,
    synergies: Option<SynergyBatch>,
  ) -> Result<(), Self::Error> {
    self.write(|state| {
      state.oracle = batch;
      if let Some(synergies) = synergies {
        state.synergies = synergies;
      }
    })
  }

  async fn oracle_tags(&self) -> Result<OracleTagBatch, Self::Error> {
    self.read(|state| state.oracle.clone())
  }

  async fn current_deck_tags(
    &self,
    version: u32,
    source_version: String,
  ) -> Result<Vec<DeckTag>, Self::Error> {
    self.read(|state| {
      state
        .oracle
        .deck_tags
        .iter()
        .filter(|t| is_current(t, version, &source_version))
        .cloned()
        .collect()
    })
  }

  async fn deck_tag_currency(
    &self,
    version: u32,
    source_version: String,
  ) -> Result<DeckTagCurrency, Self::Error> {
    self.read(|state| DeckTagCurrency {
      total:   state.oracle.deck_tags.len(),
      current: state
        .oracle
        .deck_tags
        .iter()
        .filter(|t| is_current(t, version, &source_version))
        .count(),
    })
  }

  async fn core_role_tags(&self) -> Result<Vec<CoreRoleTag>, Self::Error> {
    self.read(|state| state.oracle.core_role_tags.clone())
  }

  async fn evergreen_tags(&self) -> Result<Vec<EvergreenTag>, Self::Error> {
    self.read(|state| state.oracle.evergreen_tags.clone())
  }

  async fn replace_synergies(&self, batch: SynergyBatch) -> Result<(), Self::Error> {
    self.write(|state| state.synergies = batch)
  }

  async fn synergies(&self) -> Result<SynergyBatch, Self::Error> {
    self.read(|state| state.synergies.clone())
  }

  async fn add_owned_card(&self, card: OwnedCard) -> Result<(), Self::Error> {
    self.write(|state| state.owned.push(card))
  }

  async fn owned_cards(&self) -> Result<Vec<OwnedCard>, Self::Error> {
    self.read(|state| state.owned.clone())
  }

  async fn card_roles(&self, card_id: Uuid) -> Result<Option<CardRoleSet>, Self::Error> {
    self.read(|state| state.card_roles.get(&card_id).cloned())
  }

  async fn replace_card_roles(&self, sets: Vec<CardRoleSet>) -> Result<(), Self::Error> {
    self.write(|state| {
      state.card_roles = sets
        .into_iter()
        .filter(|set| !set.roles.is_empty() || !set.sub_roles.is_empty())
        .map(|set| (set.card_id, set))
        .collect();
    })
  }

  async fn count_rows(&self, table: TagTable) -> Result<usize, Self::Error> {
    self.read(|state| match table {
      TagTable::DeckTagCoreRoleSynergy => state.synergies.core_roles.len(),
      TagTable::DeckTagEvergreenSynergy => state.synergies.evergreen.len(),
      TagTable::DeckTagCardSynergy => state.synergies.cards.len(),
      _ => state.oracle.count(table),
    })
  }
}
