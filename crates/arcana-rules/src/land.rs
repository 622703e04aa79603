//! Land classification.
//!
//! Lands get one primary category (e.g. "Shock Land") and a list of
//! secondary mechanic tags. Detection works on the raw lowercased rules
//! text of the land faces only, reminder text included, since several land
//! families are only distinguishable by it.

use std::{collections::BTreeSet, sync::LazyLock};

use arcana_core::card::ClassifiableText;
use regex::Regex;
use serde::{Deserialize, Serialize};

const BASIC_TYPES: &[(&str, &str)] = &[
  ("plains", "Plains"),
  ("island", "Island"),
  ("swamp", "Swamp"),
  ("mountain", "Mountain"),
  ("forest", "Forest"),
];

const SPECIAL_SUBTYPES: &[(&str, &str)] = &[
  ("gate", "Gate"),
  ("desert", "Desert"),
  ("lair", "Lair"),
  ("locus", "Locus"),
];

static MANA_SYMBOL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\{([WUBRG])\}").expect("valid regex"));
static LIFE_PAYMENT: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"pay\s+\d+\s+life|pay\s+life|lose\s+\d+\s+life").expect("valid regex")
});
static TWO_COLOR_ADD: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"add\s+\{[wubrg]\}\{[wubrg]\}").expect("valid regex"));
static PANORAMA: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\{1\}.*\{t\}.*sacrifice").expect("valid regex"));
static CHECK_LAND: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"enters the battlefield tapped unless you control.*(plains|island|swamp|mountain|forest).*or.*(plains|island|swamp|mountain|forest)",
  )
  .expect("valid regex")
});

/// The classification of one land card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandClassification {
  pub primary: String,
  pub tags:    Vec<String>,
}

impl LandClassification {
  /// Primary category followed by the tags, deduplicated case-insensitively.
  pub fn all_tags(&self) -> Vec<String> {
    dedup_tags(std::iter::once(self.primary.as_str()).chain(self.tags.iter().map(String::as_str)))
  }
}

/// Land tags for any card: empty for non-lands.
pub fn land_tags(card: &ClassifiableText) -> Vec<String> {
  classify_land(card).map(|c| c.all_tags()).unwrap_or_default()
}

// ─── Face selection ──────────────────────────────────────────────────────────

struct LandFaces {
  type_lines:        Vec<String>,
  text:              String,
  has_non_land_face: bool,
  land_face_count:   usize,
}

fn land_faces(card: &ClassifiableText) -> LandFaces {
  if !card.card_faces.is_empty() {
    let mut type_lines = Vec::new();
    let mut texts = Vec::new();
    let mut non_land = 0;
    let mut land = 0;
    for face in &card.card_faces {
      let face_type = face.type_line.as_deref().unwrap_or_default();
      if face_type.to_lowercase().contains("land") {
        land += 1;
        type_lines.push(face_type.to_owned());
        if let Some(text) = face.oracle_text.as_deref().filter(|t| !t.is_empty()) {
          texts.push(text);
        }
      } else if !face_type.is_empty() {
        non_land += 1;
      }
    }
    if land > 0 {
      let text = if texts.is_empty() {
        card.oracle_text.clone()
      } else {
        texts.join("\n")
      };
      return LandFaces {
        type_lines,
        text,
        has_non_land_face: non_land > 0,
        land_face_count: land,
      };
    }
  }

  let faces: Vec<&str> = if card.type_line.contains("//") {
    card
      .type_line
      .split("//")
      .map(str::trim)
      .filter(|f| !f.is_empty())
      .collect()
  } else {
    vec![card.type_line.trim()]
  };
  let (land, non_land): (Vec<&str>, Vec<&str>) = faces
    .into_iter()
    .filter(|f| !f.is_empty())
    .partition(|f| f.to_lowercase().contains("land"));

  LandFaces {
    land_face_count: land.len(),
    has_non_land_face: !non_land.is_empty(),
    type_lines: if land.is_empty() {
      vec![card.type_line.clone()]
    } else {
      land.into_iter().map(str::to_owned).collect()
    },
    text: card.oracle_text.clone(),
  }
}

fn split_type_line(type_line: &str) -> (&str, &str) {
  let split = type_line
    .split_once('\u{2014}')
    .or_else(|| type_line.split_once(" - "));
  match split {
    Some((left, right)) => (left.trim(), right.trim()),
    None => (type_line.trim(), ""),
  }
}

fn land_subtypes(type_lines: &[String]) -> BTreeSet<String> {
  let mut out = BTreeSet::new();
  for line in type_lines {
    let (left, right) = split_type_line(line);
    if !left.to_lowercase().contains("land") {
      continue;
    }
    out.extend(right.split_whitespace().map(str::to_owned));
  }
  out
}

// ─── Detectors ───────────────────────────────────────────────────────────────

fn basic_types_in(text: &str) -> usize {
  BASIC_TYPES.iter().filter(|(name, _)| text.contains(name)).count()
}

fn mana_colors(text: &str, produced_mana: &[String]) -> BTreeSet<char> {
  let mut colors = BTreeSet::new();
  for symbol in produced_mana {
    let symbol = symbol.to_uppercase();
    if symbol.len() == 1 && "WUBRG".contains(symbol.as_str()) {
      colors.extend(symbol.chars());
    }
  }
  for caps in MANA_SYMBOL.captures_iter(text) {
    if let Some(c) = caps[1].chars().next() {
      colors.insert(c.to_ascii_uppercase());
    }
  }
  colors
}

fn fetch_category(text: &str, life_payment: bool, enters_tapped: bool) -> Option<&'static str> {
  if !text.contains("search your library") {
    return None;
  }
  let basics = basic_types_in(text);
  if !text.contains("land card") && basics == 0 {
    return None;
  }
  if !text.contains("sacrifice") {
    return None;
  }
  if PANORAMA.is_match(text) && basics >= 3 {
    return Some("Panorama Fetch");
  }
  if life_payment {
    return Some("Fetch Land");
  }
  if enters_tapped && basics >= 2 {
    return Some("Slow Fetch");
  }
  Some("Sac-to-Search Land")
}

// ─── Classification ──────────────────────────────────────────────────────────

/// Classify a land card. Returns `None` for anything whose type line does
/// not mention "land".
pub fn classify_land(card: &ClassifiableText) -> Option<LandClassification> {
  if !card.is_land() {
    return None;
  }

  let faces = land_faces(card);
  let text = faces.text.to_lowercase();

  let subtypes = land_subtypes(&faces.type_lines);
  let basic_subtype_count = subtypes
    .iter()
    .filter(|s| BASIC_TYPES.iter().any(|(name, _)| *name == s.to_lowercase()))
    .count();

  let supertypes = faces.type_lines.join(" ").to_lowercase();
  let is_basic = supertypes.contains("basic");
  let is_snow = supertypes.contains("snow");

  let color_count = mana_colors(&faces.text, &card.produced_mana).len();
  let any_color = text.contains("any color") || text.contains("any colour");

  let enters_tapped =
    text.contains("enters the battlefield tapped") || text.contains("enters tapped");
  let conditional_untapped = enters_tapped
    && ((text.contains("unless") && text.contains("tapped"))
      || (text.contains("if you don't") && text.contains("tapped"))
      || (text.contains("you may reveal")
        && text.contains("from your hand")
        && text.contains("tapped")));
  let has_cycling = text.contains("cycling");
  let life_payment = LIFE_PAYMENT.is_match(&text)
    || text.contains("deals 1 damage to you")
    || text.contains("damage to you");
  let has_sacrifice = text.contains("sacrifice");
  let filter_mana = text.contains("any combination of")
    || (MANA_SYMBOL.is_match(&text) && TWO_COLOR_ADD.is_match(&text));
  let is_manland = text.contains("becomes a")
    && text.contains("creature")
    && text.contains("until end of turn");

  let is_pathway = faces.land_face_count >= 2 && !faces.has_non_land_face;
  let is_spell_mdfc = faces.land_face_count >= 1 && faces.has_non_land_face;
  let fetch = fetch_category(&text, life_payment, enters_tapped);

  let is_tri = basic_subtype_count >= 3 || (color_count >= 3 && !any_color);
  let is_dual = basic_subtype_count == 2 || (color_count == 2 && !any_color);

  let is_command_tower = text.contains("commander") && text.contains("any color");
  let is_vivid = text.contains("vivid")
    || (text.contains("charge counter") && text.contains("any color"));
  let is_city_of_brass =
    any_color && (life_payment || text.contains("damage to you"));
  let is_conditional_any = any_color
    && (text.contains("only to cast")
      || text.contains("that a land you control could produce")
      || text.contains("of a color among")
      || text.contains("an opponent controls"));
  let is_rainbow =
    any_color && !(is_command_tower || is_city_of_brass || is_vivid || is_conditional_any);

  let mut tags = Vec::new();
  for subtype in &subtypes {
    let lower = subtype.to_lowercase();
    if let Some((_, tag)) = BASIC_TYPES
      .iter()
      .chain(SPECIAL_SUBTYPES)
      .find(|(name, _)| *name == lower)
    {
      tags.push(*tag);
    }
  }
  for (present, tag) in [
    (is_snow, "Snow"),
    (has_cycling, "Cycling"),
    (life_payment, "Life Payment"),
    (enters_tapped, "Enters Tapped"),
    (conditional_untapped, "Conditional Untapped"),
    (has_sacrifice, "Sacrifice"),
    (filter_mana, "Filter Mana"),
  ] {
    if present {
      tags.push(tag);
    }
  }

  let primary = if is_basic {
    if is_snow { "Snow Basic" } else { "Basic Land" }
  } else if is_spell_mdfc {
    "Spell Land (MDFC)"
  } else if let Some(fetch) = fetch {
    fetch
  } else if is_manland {
    "Manland"
  } else if is_pathway {
    "Pathway"
  } else if is_tri {
    if text.contains("domain") || text.contains("basic land types among lands you control") {
      "Domain Land"
    } else if filter_mana {
      "Filter Tri-Land"
    } else if has_sacrifice && !text.contains("search your library") {
      "Sac Tri-Land"
    } else {
      "Tap Tri-Land"
    }
  } else if is_dual {
    dual_category(&text, enters_tapped, filter_mana, has_cycling)
  } else if is_command_tower {
    "Command Tower Style"
  } else if is_city_of_brass {
    "City of Brass Style"
  } else if is_vivid {
    "Vivid Land"
  } else if is_conditional_any {
    "Conditional Any-Color"
  } else if is_rainbow {
    "Rainbow Land"
  } else {
    utility_category(&text)
  };

  Some(LandClassification {
    primary: primary.to_owned(),
    tags:    dedup_tags(tags),
  })
}

fn dual_category(
  text: &str,
  enters_tapped: bool,
  filter_mana: bool,
  has_cycling: bool,
) -> &'static str {
  let tapped_and = |phrase: &str| enters_tapped && text.contains(phrase);
  if tapped_and("pay 2 life") {
    "Shock Land"
  } else if tapped_and("two or more basic lands") {
    "Battle Land"
  } else if tapped_and("two or fewer other lands") {
    "Fast Land"
  } else if (text.contains("deals 1 damage to you") || text.contains("you lose 1 life"))
    && text.contains("add")
  {
    "Pain Land"
  } else if CHECK_LAND.is_match(text) {
    "Check Land"
  } else if text.contains("reveal") && text.contains("from your hand") && text.contains("tapped")
  {
    "Reveal Land"
  } else if tapped_and("two or more other lands") {
    "Slow Land"
  } else if filter_mana {
    "Filter Land"
  } else if text.contains("scry 1") {
    "Scry Land"
  } else if text.contains("gain 1 life") {
    "Gain Land"
  } else if has_cycling {
    "Cycling Dual"
  } else if enters_tapped {
    "Tap Dual"
  } else {
    "True Dual"
  }
}

fn utility_category(text: &str) -> &'static str {
  if text.contains("graveyard") {
    "Graveyard Utility"
  } else if text.contains("create") && text.contains("token") {
    "Token / Creature Utility"
  } else if text.contains("draw") || text.contains("look at") || text.contains("add {c}{c}") {
    "Card Advantage Utility"
  } else if text.contains("destroy target")
    || text.contains("exile target")
    || text.contains("tap target")
    || text.contains("creatures can't")
    || text.contains("players can't")
  {
    "Hate / Control Utility"
  } else {
    "Card Advantage Utility"
  }
}

fn dedup_tags<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
  let mut seen = BTreeSet::new();
  let mut out = Vec::new();
  for item in items {
    let cleaned = item.trim();
    if cleaned.is_empty() || !seen.insert(cleaned.to_lowercase()) {
      continue;
    }
    out.push(cleaned.to_owned());
  }
  out
}
