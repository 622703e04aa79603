//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::BTreeSet;

use arcana_core::{
  card::OwnedCard,
  store::{DeckTagCurrency, TagStore},
  synergy::{DeckTagCardSynergy, DeckTagCoreRoleSynergy, SOURCE_SYNERGY, SynergyBatch},
  tag::{
    CardRoleSet, CoreRoleTag, DECK_TAG_VERSION, DeckTag, EvergreenTag, KeywordTag,
    OracleTagBatch, RoleTag, SOURCE_CORE_ROLE, SOURCE_CORPUS, SOURCE_DERIVED, SubRoleTag,
    TagTable, TypalTag,
  },
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn deck_tag(identity: &str, tag: &str, source_version: &str) -> DeckTag {
  DeckTag {
    identity:       identity.into(),
    tag:            tag.into(),
    category:       Some("Play Patterns and Win Conditions".into()),
    source:         SOURCE_DERIVED.into(),
    version:        DECK_TAG_VERSION,
    source_version: source_version.into(),
  }
}

fn batch(source_version: &str) -> OracleTagBatch {
  OracleTagBatch {
    role_tags:      vec![
      RoleTag {
        identity:   "seer".into(),
        role:       "sacrifice outlet".into(),
        is_primary: true,
        source:     SOURCE_DERIVED.into(),
      },
      RoleTag {
        identity:   "seer".into(),
        role:       "draw".into(),
        is_primary: false,
        source:     SOURCE_DERIVED.into(),
      },
    ],
    sub_role_tags:  vec![SubRoleTag {
      identity:    "seer".into(),
      parent_role: "draw".into(),
      sub_role:    "scry".into(),
      source:      SOURCE_DERIVED.into(),
    }],
    keyword_tags:   vec![KeywordTag {
      identity: "seer".into(),
      keyword:  "Scry".into(),
      source:   SOURCE_CORPUS.into(),
    }],
    typal_tags:     vec![TypalTag {
      identity: "seer".into(),
      typal:    "vampire".into(),
      source:   SOURCE_DERIVED.into(),
    }],
    core_role_tags: vec![CoreRoleTag {
      identity: "seer".into(),
      role:     "Sac Outlet".into(),
      source:   SOURCE_CORE_ROLE.into(),
    }],
    deck_tags:      vec![
      deck_tag("seer", "Aristocrats", source_version),
      DeckTag {
        category: None,
        ..deck_tag("seer", "Vampires", source_version)
      },
    ],
    evergreen_tags: vec![EvergreenTag {
      identity: "seer".into(),
      keyword:  "flying".into(),
      source:   SOURCE_DERIVED.into(),
    }],
  }
}

fn synergies(weight: f64) -> SynergyBatch {
  SynergyBatch {
    core_roles: vec![DeckTagCoreRoleSynergy {
      deck_tag: "Aristocrats".into(),
      role:     "Sac Outlet".into(),
      weight,
      source:   SOURCE_SYNERGY.into(),
    }],
    evergreen:  vec![],
    cards:      vec![DeckTagCardSynergy {
      deck_tag: "Aristocrats".into(),
      identity: "seer".into(),
      weight:   2.5,
      source:   SOURCE_SYNERGY.into(),
    }],
  }
}

// ─── Oracle tags ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_store_is_empty() {
  let s = store().await;
  assert_eq!(s.oracle_tags().await.unwrap(), OracleTagBatch::default());
  assert_eq!(s.synergies().await.unwrap(), SynergyBatch::default());
  assert_eq!(s.count_rows(TagTable::DeckTags).await.unwrap(), 0);
}

#[tokio::test]
async fn replace_and_read_back_oracle_tags() {
  let s = store().await;
  s.replace_oracle_tags(batch("v1"), None).await.unwrap();
  assert_eq!(s.oracle_tags().await.unwrap(), batch("v1"));
  assert_eq!(s.count_rows(TagTable::RoleTags).await.unwrap(), 2);
  assert_eq!(s.count_rows(TagTable::DeckTags).await.unwrap(), 2);
}

#[tokio::test]
async fn replace_drops_rows_not_in_the_new_batch() {
  let s = store().await;
  s.replace_oracle_tags(batch("v1"), None).await.unwrap();

  let smaller = OracleTagBatch {
    deck_tags: vec![deck_tag("other", "Burn", "v2")],
    ..OracleTagBatch::default()
  };
  s.replace_oracle_tags(smaller.clone(), None).await.unwrap();

  assert_eq!(s.oracle_tags().await.unwrap(), smaller);
  assert_eq!(s.count_rows(TagTable::RoleTags).await.unwrap(), 0);
}

#[tokio::test]
async fn synergies_replaced_only_when_given() {
  let s = store().await;
  s.replace_oracle_tags(batch("v1"), Some(synergies(80.0))).await.unwrap();
  assert_eq!(s.synergies().await.unwrap(), synergies(80.0));

  s.replace_oracle_tags(batch("v1"), None).await.unwrap();
  assert_eq!(s.synergies().await.unwrap(), synergies(80.0));

  s.replace_oracle_tags(batch("v1"), Some(SynergyBatch::default()))
    .await
    .unwrap();
  assert_eq!(s.synergies().await.unwrap(), SynergyBatch::default());
}

#[tokio::test]
async fn failed_replace_leaves_previous_rows() {
  let s = store().await;
  s.replace_oracle_tags(batch("v1"), Some(synergies(80.0))).await.unwrap();

  // Duplicate (identity, keyword, source) violates the unique constraint
  // after the earlier tables have already been rewritten.
  let mut broken = batch("v2");
  broken.role_tags.clear();
  broken.evergreen_tags.push(broken.evergreen_tags[0].clone());

  let err = s
    .replace_oracle_tags(broken, Some(synergies(1.5)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Database(_)));

  assert_eq!(s.oracle_tags().await.unwrap(), batch("v1"));
  assert_eq!(s.synergies().await.unwrap(), synergies(80.0));
}

// ─── Deck tag currency ───────────────────────────────────────────────────────

#[tokio::test]
async fn current_deck_tags_match_version_and_source_version() {
  let s = store().await;
  let mut tags = batch("v1");
  tags.deck_tags.push(deck_tag("stale", "Aristocrats", "v0"));
  tags.deck_tags.push(DeckTag {
    version: DECK_TAG_VERSION + 1,
    ..deck_tag("future", "Aristocrats", "v1")
  });
  s.replace_oracle_tags(tags, None).await.unwrap();

  let current = s
    .current_deck_tags(DECK_TAG_VERSION, "v1".into())
    .await
    .unwrap();
  let identities: BTreeSet<&str> = current.iter().map(|t| t.identity.as_str()).collect();
  assert_eq!(identities, BTreeSet::from(["seer"]));
  assert_eq!(current.len(), 2);

  let currency = s
    .deck_tag_currency(DECK_TAG_VERSION, "v1".into())
    .await
    .unwrap();
  assert_eq!(currency, DeckTagCurrency { total: 4, current: 2 });
  assert!(!currency.is_fully_current());
}

#[tokio::test]
async fn empty_deck_tags_are_never_current() {
  let s = store().await;
  let currency = s
    .deck_tag_currency(DECK_TAG_VERSION, "v1".into())
    .await
    .unwrap();
  assert_eq!(currency, DeckTagCurrency::default());
  assert!(!currency.is_fully_current());
}

#[tokio::test]
async fn core_role_and_evergreen_reads() {
  let s = store().await;
  s.replace_oracle_tags(batch("v1"), None).await.unwrap();
  assert_eq!(s.core_role_tags().await.unwrap(), batch("v1").core_role_tags);
  assert_eq!(s.evergreen_tags().await.unwrap(), batch("v1").evergreen_tags);
}

// ─── Synergies ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn replace_synergies_leaves_oracle_tags_alone() {
  let s = store().await;
  s.replace_oracle_tags(batch("v1"), Some(synergies(80.0))).await.unwrap();
  s.replace_synergies(synergies(3.25)).await.unwrap();

  assert_eq!(s.synergies().await.unwrap(), synergies(3.25));
  assert_eq!(s.oracle_tags().await.unwrap(), batch("v1"));
  assert_eq!(s.count_rows(TagTable::DeckTagCardSynergy).await.unwrap(), 1);
}

// ─── Owned records ───────────────────────────────────────────────────────────

fn role_set(card_id: Uuid, roles: &[&str], sub_roles: &[&str], primary: &str) -> CardRoleSet {
  CardRoleSet {
    card_id,
    roles: roles.iter().map(|r| (*r).to_owned()).collect(),
    sub_roles: sub_roles.iter().map(|r| (*r).to_owned()).collect(),
    primary: Some(primary.to_owned()),
  }
}

#[tokio::test]
async fn owned_cards_round_trip() {
  let s = store().await;
  let mut card = OwnedCard::new("Sol Ring");
  card.oracle_id = Some("sol".into());
  card.set_code = Some("c21".into());
  card.collector_number = Some("263".into());
  s.add_owned_card(card.clone()).await.unwrap();
  s.add_owned_card(OwnedCard::new("Forest")).await.unwrap();

  let cards = s.owned_cards().await.unwrap();
  assert_eq!(cards.len(), 2);
  assert_eq!(cards[0], card);
}

#[tokio::test]
async fn card_roles_missing_returns_none() {
  let s = store().await;
  assert!(s.card_roles(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn replace_card_roles_rewrites_every_link() {
  let s = store().await;
  let a = OwnedCard::new("Sol Ring");
  let b = OwnedCard::new("Demonic Tutor");
  s.add_owned_card(a.clone()).await.unwrap();
  s.add_owned_card(b.clone()).await.unwrap();

  s.replace_card_roles(vec![
    role_set(a.card_id, &["ramp"], &["ramp:mana rock"], "ramp"),
    role_set(b.card_id, &["tutor"], &[], "tutor"),
  ])
  .await
  .unwrap();

  let a_roles = s.card_roles(a.card_id).await.unwrap().unwrap();
  assert_eq!(a_roles, role_set(a.card_id, &["ramp"], &["ramp:mana rock"], "ramp"));

  s.replace_card_roles(vec![role_set(
    a.card_id,
    &["ramp", "draw"],
    &[],
    "draw",
  )])
  .await
  .unwrap();

  let a_roles = s.card_roles(a.card_id).await.unwrap().unwrap();
  assert_eq!(a_roles.primary.as_deref(), Some("draw"));
  assert!(a_roles.sub_roles.is_empty());
  assert!(s.card_roles(b.card_id).await.unwrap().is_none());
}

#[tokio::test]
async fn roles_for_unknown_card_are_rejected_atomically() {
  let s = store().await;
  let card = OwnedCard::new("Sol Ring");
  s.add_owned_card(card.clone()).await.unwrap();
  s.replace_card_roles(vec![role_set(card.card_id, &["ramp"], &[], "ramp")])
    .await
    .unwrap();

  let err = s
    .replace_card_roles(vec![
      role_set(card.card_id, &["draw"], &[], "draw"),
      role_set(Uuid::new_v4(), &["tutor"], &[], "tutor"),
    ])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Database(_)));

  let roles = s.card_roles(card.card_id).await.unwrap().unwrap();
  assert_eq!(roles.primary.as_deref(), Some("ramp"));
}
