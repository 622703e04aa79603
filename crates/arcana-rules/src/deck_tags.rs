//! Deck-tag, evergreen keyword, typal, and keyword derivation.

use std::collections::BTreeSet;

use arcana_core::card::Printing;

use crate::{
  normalize::contains_word,
  taxonomy::{self, FALLBACK_DECK_TAG},
};

/// Keywords treated as always relevant.
pub const EVERGREEN_KEYWORDS: &[&str] = &[
  "deathtouch",
  "defender",
  "double strike",
  "enchant",
  "equip",
  "first strike",
  "flash",
  "flying",
  "goad",
  "haste",
  "hexproof",
  "indestructible",
  "lifelink",
  "menace",
  "protection",
  "reach",
  "trample",
  "vigilance",
  "ward",
];

/// Evergreen keywords whose rules-text form differs from the keyword.
const EVERGREEN_TEXT_FORMS: &[(&str, &[&str])] = &[
  ("protection", &["protection from"]),
  ("goad", &["goad", "goaded"]),
];

const TYPAL_TRIGGER_TYPES: &[&str] = &["creature", "tribal", "kindred"];

const TYPE_LINE_SKIP_TOKENS: &[&str] = &[
  "artifact",
  "battle",
  "basic",
  "creature",
  "enchantment",
  "instant",
  "kindred",
  "land",
  "legendary",
  "ongoing",
  "planeswalker",
  "scheme",
  "snow",
  "sorcery",
  "token",
  "tribal",
  "vanguard",
  "world",
];

// ─── Keywords & typals ───────────────────────────────────────────────────────

/// Trimmed, lowercased keywords across every printing.
pub fn collect_keywords(printings: &[Printing]) -> BTreeSet<String> {
  normalize_keywords(printings.iter().flat_map(|p| p.keywords.iter()))
}

fn normalize_keywords<'a>(values: impl IntoIterator<Item = &'a String>) -> BTreeSet<String> {
  values
    .into_iter()
    .map(|kw| kw.trim().to_lowercase())
    .filter(|kw| !kw.is_empty())
    .collect()
}

/// Typals from every type line (top-level and per face) of every printing.
pub fn collect_typals(printings: &[Printing]) -> BTreeSet<String> {
  let mut typals = BTreeSet::new();
  for printing in printings {
    let face_lines = printing.card_faces.iter().filter_map(|f| f.type_line.as_deref());
    for line in printing.type_line.as_deref().into_iter().chain(face_lines) {
      typals.extend(typals_from_type_line(line));
    }
  }
  typals
}

/// Subtypes of a creature, tribal, or kindred type line.
pub fn typals_from_type_line(type_line: &str) -> BTreeSet<String> {
  let Some((left, right)) = type_line
    .split_once('\u{2014}')
    .or_else(|| type_line.split_once(" - "))
  else {
    return BTreeSet::new();
  };

  let left = left.to_lowercase();
  if !TYPAL_TRIGGER_TYPES.iter().any(|t| left.contains(t)) {
    return BTreeSet::new();
  }

  right
    .split_whitespace()
    .filter(|token| token.chars().any(char::is_alphabetic))
    .map(str::to_lowercase)
    .filter(|token| !TYPE_LINE_SKIP_TOKENS.contains(&token.as_str()))
    .collect()
}

// ─── Evergreen ───────────────────────────────────────────────────────────────

/// Evergreen keywords from the keyword list, from word-bounded matches in
/// the normalised rules text, and every land tag.
pub fn derive_evergreen(
  normalized_oracle: &str,
  keywords: &BTreeSet<String>,
  land_tags: &[String],
) -> BTreeSet<String> {
  let mut evergreen: BTreeSet<String> = keywords
    .iter()
    .filter(|kw| EVERGREEN_KEYWORDS.contains(&kw.as_str()))
    .cloned()
    .collect();

  for &keyword in EVERGREEN_KEYWORDS {
    if evergreen.contains(keyword) {
      continue;
    }
    let forms = EVERGREEN_TEXT_FORMS
      .iter()
      .find(|(kw, _)| *kw == keyword)
      .map(|(_, forms)| *forms)
      .unwrap_or(std::slice::from_ref(&keyword));
    if forms.iter().any(|form| contains_word(normalized_oracle, form)) {
      evergreen.insert(keyword.to_owned());
    }
  }

  evergreen.extend(land_tags.iter().cloned());
  evergreen
}

// ─── Deck tags ───────────────────────────────────────────────────────────────

/// One explicit deck-tag rule. Any matching signal assigns the tag.
struct DeckTagRule {
  tag:       &'static str,
  keywords:  &'static [&'static str],
  text:      &'static [&'static str],
  type_line: &'static [&'static str],
  roles:     &'static [&'static str],
}

const fn rule(tag: &'static str) -> DeckTagRule {
  DeckTagRule { tag, keywords: &[], text: &[], type_line: &[], roles: &[] }
}

const DECK_TAG_RULES: &[DeckTagRule] = &[
  DeckTagRule { type_line: &["artifact"], ..rule("Artifacts") },
  DeckTagRule { type_line: &["aura"], ..rule("Auras") },
  DeckTagRule { type_line: &["equipment"], ..rule("Equipment") },
  DeckTagRule { type_line: &["planeswalker"], ..rule("Planeswalkers") },
  DeckTagRule { type_line: &["saga"], ..rule("Sagas") },
  DeckTagRule { type_line: &["shrine"], ..rule("Shrines") },
  DeckTagRule { type_line: &["battle"], ..rule("Battles") },
  DeckTagRule { type_line: &["curse"], ..rule("Curses") },
  DeckTagRule { type_line: &["legendary"], ..rule("Legendary Matters") },
  DeckTagRule { keywords: &["investigate"], text: &["clue token"], ..rule("Clues") },
  DeckTagRule { text: &["food token"], ..rule("Food") },
  DeckTagRule { text: &["blood token"], ..rule("Blood") },
  DeckTagRule { text: &["treasure token", "create a treasure"], ..rule("Treasure") },
  DeckTagRule { text: &["create a token", "token creature"], ..rule("Tokens") },
  DeckTagRule {
    text: &["gain life", "lifelink"],
    roles: &["lifegain"],
    ..rule("Lifegain")
  },
  DeckTagRule {
    text: &["opponent loses life", "each opponent loses life", "each player loses life"],
    ..rule("Lifedrain")
  },
  DeckTagRule { text: &["exchange life", "swap life"], ..rule("Life Exchange") },
  DeckTagRule { text: &["discard"], roles: &["discard"], ..rule("Discard") },
  DeckTagRule { text: &["discard a card", "discard your hand"], ..rule("Self-Discard") },
  DeckTagRule { text: &["graveyard"], roles: &["recursion"], ..rule("Graveyard") },
  DeckTagRule {
    text: &[
      "return target creature card from your graveyard to the battlefield",
      "reanimate",
    ],
    ..rule("Reanimator")
  },
  DeckTagRule { text: &["sacrifice"], roles: &["sacrifice outlet"], ..rule("Sacrifice") },
  DeckTagRule {
    text: &["draw a card", "draw two cards", "draw cards"],
    roles: &["draw"],
    ..rule("Card Draw")
  },
  DeckTagRule { roles: &["ramp"], ..rule("Ramp") },
  DeckTagRule { roles: &["stax"], ..rule("Stax") },
  DeckTagRule {
    text: &["hexproof", "indestructible", "ward", "protection from"],
    roles: &["protection"],
    ..rule("Protection")
  },
  DeckTagRule { roles: &["combat"], ..rule("Combat-Focused") },
  DeckTagRule {
    text: &["each player discards", "discard their hand", "then draws"],
    ..rule("Wheels")
  },
];

/// Roles that imply a deck tag on their own.
const ROLE_TO_TAG: &[(&str, &str)] = &[
  ("ramp", "Ramp"),
  ("draw", "Card Draw"),
  ("lifegain", "Lifegain"),
  ("discard", "Discard"),
  ("tokens", "Tokens"),
  ("stax", "Stax"),
  ("sacrifice outlet", "Sacrifice"),
  ("recursion", "Graveyard"),
  ("protection", "Protection"),
  ("combat", "Combat-Focused"),
  ("counterspells", "Control"),
  ("removal", "Control"),
];

/// Everything the deck-tag rules look at for one identity.
#[derive(Debug, Clone, Copy)]
pub struct DeckTagSignals<'a> {
  /// Normalised rules text.
  pub oracle_text: &'a str,
  pub type_line:   &'a str,
  pub keywords:    &'a BTreeSet<String>,
  pub typals:      &'a BTreeSet<String>,
  pub roles:       &'a BTreeSet<String>,
}

/// Canonical deck tags implied by the signals. May be empty; see
/// [`ensure_fallback_tag`].
pub fn derive_deck_tags(signals: DeckTagSignals<'_>) -> BTreeSet<String> {
  let type_line = signals.type_line.to_lowercase();
  let mut tags: BTreeSet<&'static str> = BTreeSet::new();

  tags.extend(
    taxonomy::all_deck_tags().filter(|tag| signals.keywords.contains(&tag.to_lowercase())),
  );

  tags.extend(signals.typals.iter().filter_map(|typal| taxonomy::tribal_tag(typal)));

  for rule in DECK_TAG_RULES {
    let hit = rule.keywords.iter().any(|kw| signals.keywords.contains(*kw))
      || rule.roles.iter().any(|role| signals.roles.contains(*role))
      || rule.type_line.iter().any(|token| type_line.contains(token))
      || rule.text.iter().any(|token| signals.oracle_text.contains(token));
    if hit {
      tags.insert(rule.tag);
    }
  }

  for (role, tag) in ROLE_TO_TAG {
    if signals.roles.contains(*role) {
      tags.insert(*tag);
    }
  }

  tags
    .into_iter()
    .filter(|tag| taxonomy::is_canonical(tag))
    .map(str::to_owned)
    .collect()
}

/// Give an otherwise undescribed identity the fallback tag. An identity
/// with any core role or evergreen keyword is left as is.
pub fn ensure_fallback_tag(
  deck_tags: BTreeSet<String>,
  core_roles: &BTreeSet<String>,
  evergreen: &BTreeSet<String>,
) -> BTreeSet<String> {
  if !deck_tags.is_empty() || !core_roles.is_empty() || !evergreen.is_empty() {
    return deck_tags;
  }
  BTreeSet::from([FALLBACK_DECK_TAG.to_owned()])
}
