//! Deck-tag synergy mining.
//!
//! For every deck tag, the identities carrying it form a base set. Core roles
//! and evergreen keywords that are over-represented in the base set relative
//! to the whole universe are selected by lift. Cards are then scored by
//! membership in the base set and by how many selected attributes they hold.
//!
//! The miner is a pure function over rows; [`recompute_deck_tag_synergies`]
//! wraps it with store reads and the atomic replace.

use std::collections::{BTreeMap, BTreeSet};

use arcana_core::{
  corpus::SourceVersion,
  store::TagStore,
  synergy::{
    DeckTagCardSynergy, DeckTagCoreRoleSynergy, DeckTagEvergreenSynergy, SOURCE_SYNERGY,
    SynergyBatch,
  },
  tag::{CoreRoleTag, DECK_TAG_VERSION, DeckTag, EvergreenTag},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{Error, Result, summary::SynergySummary};

// ─── Parameters ──────────────────────────────────────────────────────────────

/// Thresholds and weights of the miner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynergyParams {
  /// Minimum base-set holders for an attribute to be considered.
  pub min_count:           usize,
  /// Minimum lift for an attribute to be selected.
  pub min_lift:            f64,
  pub max_core_roles:      usize,
  pub max_evergreen:       usize,
  pub max_cards:           usize,
  pub tag_bonus:           f64,
  pub core_role_weight:    f64,
  pub evergreen_weight:    f64,
  pub min_card_score:      f64,
  /// Selected attributes a card outside the base set must hold.
  pub min_outside_matches: usize,
}

impl Default for SynergyParams {
  fn default() -> Self {
    Self {
      min_count:           3,
      min_lift:            1.15,
      max_core_roles:      12,
      max_evergreen:       20,
      max_cards:           150,
      tag_bonus:           1.5,
      core_role_weight:    1.0,
      evergreen_weight:    0.7,
      min_card_score:      2.0,
      min_outside_matches: 2,
    }
  }
}

// ─── Indexes ─────────────────────────────────────────────────────────────────

/// Attribute holders in both directions.
#[derive(Debug, Default)]
struct AttributeIndex<'a> {
  by_identity: BTreeMap<&'a str, BTreeSet<&'a str>>,
  by_value:    BTreeMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> AttributeIndex<'a> {
  fn build(rows: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
    let mut index = Self::default();
    for (identity, value) in rows {
      if identity.is_empty() || value.is_empty() {
        continue;
      }
      index.by_identity.entry(identity).or_default().insert(value);
      index.by_value.entry(value).or_default().insert(identity);
    }
    index
  }

  fn of(&self, identity: &str) -> Option<&BTreeSet<&'a str>> {
    self.by_identity.get(identity)
  }

  fn holders(&self, value: &str) -> Option<&BTreeSet<&'a str>> { self.by_value.get(value) }
}

/// An attribute chosen for a deck tag.
#[derive(Debug, Clone, PartialEq)]
struct Selected<'a> {
  value: &'a str,
  lift:  f64,
  count: usize,
}

fn round4(value: f64) -> f64 { (value * 10_000.0).round() / 10_000.0 }

/// Attributes over-represented in `base`, best lift first.
fn select_attributes<'a>(
  base: &BTreeSet<&'a str>,
  index: &AttributeIndex<'a>,
  universe: usize,
  limit: usize,
  params: &SynergyParams,
) -> Vec<Selected<'a>> {
  let mut counts: BTreeMap<&'a str, usize> = BTreeMap::new();
  for identity in base {
    for value in index.of(identity).into_iter().flatten() {
      *counts.entry(*value).or_default() += 1;
    }
  }

  let base_len = base.len() as f64;
  let universe = universe as f64;
  let mut selected: Vec<Selected<'a>> = counts
    .into_iter()
    .filter(|&(_, count)| count >= params.min_count)
    .filter_map(|(value, count)| {
      let global = index.holders(value).map_or(0, BTreeSet::len);
      if global == 0 {
        return None;
      }
      let lift = (count as f64 / base_len) / (global as f64 / universe);
      (lift >= params.min_lift).then_some(Selected { value, lift, count })
    })
    .collect();

  selected.sort_by(|a, b| {
    b.lift
      .total_cmp(&a.lift)
      .then(b.count.cmp(&a.count))
      .then(a.value.cmp(b.value))
  });
  selected.truncate(limit);
  selected
}

/// A card scored against one deck tag.
#[derive(Debug)]
struct ScoredCard<'a> {
  identity:        &'a str,
  score:           f64,
  role_matches:    usize,
  keyword_matches: usize,
}

fn matches_in(attributes: Option<&BTreeSet<&str>>, selected: &BTreeSet<&str>) -> usize {
  attributes.map_or(0, |held| held.intersection(selected).count())
}

// ─── Miner ───────────────────────────────────────────────────────────────────

/// Compute the three synergy tables from deck-tag, core-role, and evergreen
/// rows. The result depends only on the input rows and `params`.
pub fn mine_synergies(
  deck_tags: &[DeckTag],
  core_roles: &[CoreRoleTag],
  evergreen: &[EvergreenTag],
  params: &SynergyParams,
) -> SynergyBatch {
  let mut by_tag: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
  for row in deck_tags {
    if row.identity.is_empty() || row.tag.is_empty() {
      continue;
    }
    by_tag.entry(&row.tag).or_default().insert(&row.identity);
  }

  let roles = AttributeIndex::build(
    core_roles.iter().map(|r| (r.identity.as_str(), r.role.as_str())),
  );
  let keywords = AttributeIndex::build(
    evergreen.iter().map(|r| (r.identity.as_str(), r.keyword.as_str())),
  );

  let universe: BTreeSet<&str> = by_tag
    .values()
    .flatten()
    .chain(roles.by_identity.keys())
    .chain(keywords.by_identity.keys())
    .copied()
    .collect();
  let universe = universe.len().max(1);

  let mut batch = SynergyBatch::default();
  for (tag, base) in &by_tag {
    let selected_roles =
      select_attributes(base, &roles, universe, params.max_core_roles, params);
    let selected_keywords =
      select_attributes(base, &keywords, universe, params.max_evergreen, params);

    batch.core_roles.extend(selected_roles.iter().map(|s| DeckTagCoreRoleSynergy {
      deck_tag: (*tag).to_owned(),
      role:     s.value.to_owned(),
      weight:   round4(s.lift),
      source:   SOURCE_SYNERGY.to_owned(),
    }));
    batch.evergreen.extend(selected_keywords.iter().map(|s| DeckTagEvergreenSynergy {
      deck_tag: (*tag).to_owned(),
      keyword:  s.value.to_owned(),
      weight:   round4(s.lift),
      source:   SOURCE_SYNERGY.to_owned(),
    }));

    let role_set: BTreeSet<&str> = selected_roles.iter().map(|s| s.value).collect();
    let keyword_set: BTreeSet<&str> = selected_keywords.iter().map(|s| s.value).collect();

    let mut candidates: BTreeSet<&str> = base.clone();
    for role in &role_set {
      candidates.extend(roles.holders(role).into_iter().flatten());
    }
    for keyword in &keyword_set {
      candidates.extend(keywords.holders(keyword).into_iter().flatten());
    }

    let mut scored: Vec<ScoredCard> = candidates
      .into_iter()
      .filter_map(|identity| {
        let in_base = base.contains(identity);
        let role_matches = matches_in(roles.of(identity), &role_set);
        let keyword_matches = matches_in(keywords.of(identity), &keyword_set);
        if !in_base && role_matches + keyword_matches < params.min_outside_matches {
          return None;
        }
        let score = if in_base { params.tag_bonus } else { 0.0 }
          + params.core_role_weight * role_matches as f64
          + params.evergreen_weight * keyword_matches as f64;
        (score >= params.min_card_score).then_some(ScoredCard {
          identity,
          score,
          role_matches,
          keyword_matches,
        })
      })
      .collect();

    scored.sort_by(|a, b| {
      b.score
        .total_cmp(&a.score)
        .then(b.role_matches.cmp(&a.role_matches))
        .then(b.keyword_matches.cmp(&a.keyword_matches))
        .then(a.identity.cmp(b.identity))
    });
    scored.truncate(params.max_cards);

    batch.cards.extend(scored.into_iter().map(|card| DeckTagCardSynergy {
      deck_tag: (*tag).to_owned(),
      identity: card.identity.to_owned(),
      weight:   round4(card.score),
      source:   SOURCE_SYNERGY.to_owned(),
    }));
  }

  debug!(
    deck_tags = by_tag.len(),
    universe,
    core_roles = batch.core_roles.len(),
    evergreen = batch.evergreen.len(),
    cards = batch.cards.len(),
    "mined deck tag synergies"
  );
  batch
}

// ─── Standalone recompute ────────────────────────────────────────────────────

/// Recompute the synergy tables from the current deck-tag rows in the store.
///
/// With no current deck-tag rows the synergy tables are left untouched and a
/// zeroed summary is returned.
pub async fn recompute_deck_tag_synergies<S: TagStore>(
  store: &S,
  source_version: &SourceVersion,
  params: &SynergyParams,
) -> Result<SynergySummary> {
  let deck_tags = store
    .current_deck_tags(DECK_TAG_VERSION, source_version.as_str().to_owned())
    .await
    .map_err(Error::store)?;
  if deck_tags.is_empty() {
    warn!(%source_version, "no current deck tags; synergy tables left unchanged");
    return Ok(SynergySummary::default());
  }

  let core_roles = store.core_role_tags().await.map_err(Error::store)?;
  let evergreen = store.evergreen_tags().await.map_err(Error::store)?;

  let batch = mine_synergies(&deck_tags, &core_roles, &evergreen, params);
  let summary = SynergySummary::of(deck_tags.len(), &batch);

  store.replace_synergies(batch).await.map_err(|e| {
    error!(error = %e, "failed to replace synergy tables");
    Error::store(e)
  })?;

  info!(
    deck_tags = summary.deck_tags,
    core_roles = summary.core_roles,
    evergreen = summary.evergreen,
    cards = summary.cards,
    "recomputed deck tag synergies"
  );
  Ok(summary)
}

#[cfg(test)]
mod tests {
  use arcana_core::tag::{SOURCE_CORE_ROLE, SOURCE_DERIVED};

  use super::*;
  use crate::testing::MemoryStore;

  fn deck_tag(identity: &str, tag: &str) -> DeckTag {
    DeckTag {
      identity:       identity.into(),
      tag:            tag.into(),
      category:       None,
      source:         SOURCE_DERIVED.into(),
      version:        DECK_TAG_VERSION,
      source_version: "v1".into(),
    }
  }

  fn core_role(identity: &str, role: &str) -> CoreRoleTag {
    CoreRoleTag {
      identity: identity.into(),
      role:     role.into(),
      source:   SOURCE_CORE_ROLE.into(),
    }
  }

  fn evergreen(identity: &str, keyword: &str) -> EvergreenTag {
    EvergreenTag {
      identity: identity.into(),
      keyword:  keyword.into(),
      source:   SOURCE_DERIVED.into(),
    }
  }

  /// Ten `Aristocrats` identities, `holders_in_base` of which are sac
  /// outlets, plus one outside sac outlet, in a universe of 1000.
  fn aristocrats_fixture(
    holders_in_base: usize,
  ) -> (Vec<DeckTag>, Vec<CoreRoleTag>, Vec<EvergreenTag>) {
    let base: Vec<String> = (0..10).map(|i| format!("base-{i}")).collect();
    let others: Vec<String> = (0..990).map(|i| format!("other-{i:03}")).collect();

    let deck_tags = base.iter().map(|id| deck_tag(id, "Aristocrats")).collect();
    let mut roles: Vec<CoreRoleTag> = base
      .iter()
      .take(holders_in_base)
      .map(|id| core_role(id, "Sac Outlet"))
      .collect();
    roles.push(core_role(&others[0], "Sac Outlet"));
    let keywords = others.iter().map(|id| evergreen(id, "vigilance")).collect();
    (deck_tags, roles, keywords)
  }

  // ─── Lift selection ─────────────────────────────────────────────────────

  #[test]
  fn over_represented_role_is_selected_with_its_lift() {
    let (tags, roles, keywords) = aristocrats_fixture(4);
    let batch = mine_synergies(&tags, &roles, &keywords, &SynergyParams::default());

    assert_eq!(batch.core_roles, vec![DeckTagCoreRoleSynergy {
      deck_tag: "Aristocrats".into(),
      role:     "Sac Outlet".into(),
      weight:   80.0,
      source:   SOURCE_SYNERGY.into(),
    }]);
    assert!(batch.evergreen.is_empty());
  }

  #[test]
  fn below_support_floor_emits_nothing() {
    let (tags, roles, keywords) = aristocrats_fixture(2);
    let batch = mine_synergies(&tags, &roles, &keywords, &SynergyParams::default());
    assert!(batch.core_roles.is_empty());
    assert!(batch.cards.is_empty());
  }

  #[test]
  fn attribute_spread_evenly_is_not_selected() {
    let ids: Vec<String> = (0..20).map(|i| format!("c{i:02}")).collect();
    let tags: Vec<DeckTag> = ids.iter().take(10).map(|id| deck_tag(id, "Tokens")).collect();
    let roles: Vec<CoreRoleTag> = ids.iter().map(|id| core_role(id, "Token Maker")).collect();
    let batch = mine_synergies(&tags, &roles, &[], &SynergyParams::default());
    assert!(batch.core_roles.is_empty());
  }

  #[test]
  fn selections_are_capped_and_tie_broken_by_name() {
    let base: Vec<String> = (0..3).map(|i| format!("b{i}")).collect();
    let tags: Vec<DeckTag> = base.iter().map(|id| deck_tag(id, "Toolbox")).collect();
    let mut roles = Vec::new();
    for r in 0..15 {
      for id in &base {
        roles.push(core_role(id, &format!("Role {r:02}")));
      }
    }
    // Pad the universe so the lift clears the floor.
    let filler: Vec<EvergreenTag> = (0..10)
      .map(|i| evergreen(&format!("f{i}"), "reach"))
      .collect();

    let batch = mine_synergies(&tags, &roles, &filler, &SynergyParams::default());
    let selected: Vec<&str> = batch.core_roles.iter().map(|s| s.role.as_str()).collect();
    let expected: Vec<String> = (0..12).map(|r| format!("Role {r:02}")).collect();
    assert_eq!(selected, expected);
  }

  // ─── Card scoring ───────────────────────────────────────────────────────

  #[test]
  fn base_cards_need_a_selected_attribute_to_score() {
    let (tags, roles, keywords) = aristocrats_fixture(4);
    let batch = mine_synergies(&tags, &roles, &keywords, &SynergyParams::default());

    let cards: Vec<(&str, f64)> = batch
      .cards
      .iter()
      .map(|c| (c.identity.as_str(), c.weight))
      .collect();
    // The outside holder has a single match and is dropped; base cards
    // without the role score 1.5 and are dropped.
    assert_eq!(cards, vec![
      ("base-0", 2.5),
      ("base-1", 2.5),
      ("base-2", 2.5),
      ("base-3", 2.5),
    ]);
  }

  #[test]
  fn outside_cards_with_two_matches_are_included() {
    let base: Vec<String> = (0..4).map(|i| format!("b{i}")).collect();
    let mut tags: Vec<DeckTag> = base.iter().map(|id| deck_tag(id, "Lifegain")).collect();
    let mut roles = Vec::new();
    let mut keywords = Vec::new();
    for id in &base {
      roles.push(core_role(id, "Lifegain"));
      roles.push(core_role(id, "Drain"));
      keywords.push(evergreen(id, "lifelink"));
    }
    roles.push(core_role("outsider", "Lifegain"));
    roles.push(core_role("outsider", "Drain"));
    roles.push(core_role("single", "Lifegain"));
    for i in 0..20 {
      tags.push(deck_tag(&format!("z{i}"), "Zombies"));
    }

    let batch = mine_synergies(&tags, &roles, &keywords, &SynergyParams::default());
    let lifegain: Vec<(&str, f64)> = batch
      .cards
      .iter()
      .filter(|c| c.deck_tag == "Lifegain")
      .map(|c| (c.identity.as_str(), c.weight))
      .collect();
    assert_eq!(lifegain, vec![
      ("b0", 4.2),
      ("b1", 4.2),
      ("b2", 4.2),
      ("b3", 4.2),
      ("outsider", 2.0),
    ]);
  }

  #[test]
  fn evergreen_selection_keeps_top_twenty_by_name() {
    let base: Vec<String> = (0..3).map(|i| format!("b{i}")).collect();
    let tags: Vec<DeckTag> = base.iter().map(|id| deck_tag(id, "Flyers")).collect();
    let mut keywords = Vec::new();
    for k in 0..25 {
      for id in &base {
        keywords.push(evergreen(id, &format!("kw {k:02}")));
      }
    }
    for i in 0..10 {
      keywords.push(evergreen(&format!("f{i}"), "reach"));
    }

    let batch = mine_synergies(&tags, &[], &keywords, &SynergyParams::default());
    let selected: Vec<&str> = batch.evergreen.iter().map(|s| s.keyword.as_str()).collect();
    let expected: Vec<String> = (0..20).map(|k| format!("kw {k:02}")).collect();
    assert_eq!(selected, expected);
    assert!(batch.evergreen.iter().all(|s| s.weight == 4.3333));

    // 1.5 for the tag plus 0.7 for each of the twenty kept keywords.
    assert!(batch.cards.iter().all(|c| c.weight == 15.5));
  }

  #[test]
  fn card_list_is_capped_at_one_hundred_fifty() {
    let base: Vec<String> = (0..200).map(|i| format!("m{i:03}")).collect();
    let tags: Vec<DeckTag> = base.iter().map(|id| deck_tag(id, "Go Wide")).collect();
    let mut roles: Vec<CoreRoleTag> = base.iter().map(|id| core_role(id, "Anthem")).collect();
    roles.extend(base.iter().skip(195).map(|id| core_role(id, "Token Maker")));
    let filler: Vec<EvergreenTag> = (0..200)
      .map(|i| evergreen(&format!("f{i:03}"), "reach"))
      .collect();

    let batch = mine_synergies(&tags, &roles, &filler, &SynergyParams::default());
    assert_eq!(batch.cards.len(), 150);

    let cards: Vec<(&str, f64)> = batch
      .cards
      .iter()
      .map(|c| (c.identity.as_str(), c.weight))
      .collect();
    let mut expected: Vec<(String, f64)> =
      (195..200).map(|i| (format!("m{i:03}"), 3.5)).collect();
    expected.extend((0..145).map(|i| (format!("m{i:03}"), 2.5)));
    let expected: Vec<(&str, f64)> = expected.iter().map(|(id, w)| (id.as_str(), *w)).collect();
    assert_eq!(cards, expected);
    assert!(!batch.cards.iter().any(|c| c.identity == "m145"));
  }

  #[test]
  fn equal_scores_order_by_role_then_keyword_matches_then_identity() {
    let base: Vec<String> = (0..5).map(|i| format!("b{i}")).collect();
    let tags: Vec<DeckTag> = base.iter().map(|id| deck_tag(id, "Tribal")).collect();

    let mut roles: Vec<CoreRoleTag> = base.iter().map(|id| core_role(id, "Lord")).collect();
    roles.push(core_role("x-two", "Lord"));
    roles.push(core_role("x-mix", "Lord"));
    for id in ["b2", "b3", "b4", "x-two"] {
      roles.push(core_role(id, "Elf"));
    }

    let mut keywords: Vec<EvergreenTag> = ["b2", "b3", "b4", "x-mix"]
      .into_iter()
      .map(|id| evergreen(id, "ward"))
      .collect();
    keywords.extend((0..30).map(|i| evergreen(&format!("f{i:02}"), "reach")));

    let params = SynergyParams {
      tag_bonus: 1.0,
      evergreen_weight: 1.0,
      max_cards: 6,
      ..SynergyParams::default()
    };
    let batch = mine_synergies(&tags, &roles, &keywords, &params);

    let cards: Vec<(&str, f64)> = batch
      .cards
      .iter()
      .map(|c| (c.identity.as_str(), c.weight))
      .collect();
    assert_eq!(cards, vec![
      ("b2", 4.0),
      ("b3", 4.0),
      ("b4", 4.0),
      ("x-two", 2.0),
      ("x-mix", 2.0),
      ("b0", 2.0),
    ]);
  }

  #[test]
  fn empty_input_mines_nothing() {
    let batch = mine_synergies(&[], &[], &[], &SynergyParams::default());
    assert!(batch.is_empty());
  }

  // ─── Store wrapper ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn no_current_deck_tags_leaves_synergies_untouched() {
    let store = MemoryStore::new();
    let existing = SynergyBatch {
      cards: vec![DeckTagCardSynergy {
        deck_tag: "Burn".into(),
        identity: "bolt".into(),
        weight:   2.5,
        source:   SOURCE_SYNERGY.into(),
      }],
      ..SynergyBatch::default()
    };
    store.replace_synergies(existing.clone()).await.unwrap();

    let summary = recompute_deck_tag_synergies(
      &store,
      &SourceVersion::from("v1"),
      &SynergyParams::default(),
    )
    .await
    .unwrap();

    assert_eq!(summary, SynergySummary::default());
    assert_eq!(store.synergies().await.unwrap(), existing);
  }

  #[tokio::test]
  async fn recompute_reads_only_current_deck_tags() {
    let store = MemoryStore::new();
    let (mut tags, roles, keywords) = aristocrats_fixture(4);
    for tag in tags.iter_mut().skip(5) {
      tag.source_version = "stale".into();
    }
    store.seed_oracle_tags(arcana_core::tag::OracleTagBatch {
      deck_tags: tags,
      core_role_tags: roles,
      evergreen_tags: keywords,
      ..Default::default()
    });

    let summary = recompute_deck_tag_synergies(
      &store,
      &SourceVersion::from("v1"),
      &SynergyParams::default(),
    )
    .await
    .unwrap();

    assert_eq!(summary.deck_tags, 5);
    assert_eq!(summary.core_roles, 1);
    assert_eq!(store.synergies().await.unwrap().core_roles.len(), 1);
  }
}
