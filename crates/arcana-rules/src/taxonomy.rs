//! The canonical deck-tag vocabulary, grouped by category.

use std::{collections::HashMap, sync::LazyLock};

pub const FALLBACK_DECK_TAG: &str = "Good Stuff";
pub const TRIBAL_CATEGORY: &str = "Tribal Themes";

/// Categories in display order, each with its tags.
pub const DECK_TAG_GROUPS: &[(&str, &[&str])] = &[
  ("Core Archetypes", &[
    "Aggro", "Big Mana", "cEDH", "Combo", "Control", "Creatureless", "Glass Cannon",
    "Good Stuff", "Midrange", "Prison", "Ramp", "Rock", "Stax", "Tempo", "Toolbox",
    "Voltron", "Zoo",
  ]),
  ("Mechanics and Resources", &[
    "+1/+1 Counters", "-1/-1 Counters", "Activated Abilities", "Affinity", "Anthems",
    "Auras", "Artifacts", "Blink", "Blood", "Bounce", "Card Draw", "Charge Counters",
    "Clones", "Clues", "Colorless", "Combat-Focused", "Convoke", "Counters", "Devotion",
    "Discard", "Energy", "Enchantress", "Equipment", "ETB", "Exile", "Explore",
    "Flashback", "Food", "Foretell", "Graveyard", "Historic", "Improvise", "Kicker",
    "Land Animation", "Land Destruction", "Landfall", "Lands Matter", "Lifegain",
    "Lifedrain", "Life Exchange", "Madness", "Modular", "Morph", "Mutate",
    "Oil Counters", "Pillow Fort", "Politics", "Populate", "Power Matters",
    "Proliferate", "Prowess", "Reanimator", "Sacrifice", "Self-Discard", "Self-Mill",
    "Spell Copy", "Spellslinger", "Storm", "Suspend", "Tap / Untap", "Tokens",
    "Topdeck", "Treasure", "Triggered Abilities", "Unblockable", "Warp", "Wheels",
    "X Spells",
  ]),
  (TRIBAL_CATEGORY, &[
    "Advisors", "Angels", "Apes", "Artificers", "Atogs", "Astartes", "Barbarians",
    "Bats", "Bears", "Beasts", "Birds", "Cats", "Cephalids", "Clerics", "Constructs",
    "Crabs", "Demons", "Devils", "Dinosaurs", "Dogs", "Dragons", "Drakes", "Druids",
    "Dwarves", "Eggs", "Elders", "Eldrazi", "Elementals", "Elephants", "Elves",
    "Faeries", "Foxes", "Frogs", "Fungi", "Giants", "Gnomes", "Goblins", "Golems",
    "Gorgons", "Griffins", "Halflings", "Hippogriffs", "Horses", "Humans", "Hydras",
    "Illusions", "Insects", "Kaheera Companion", "Keruga Companion", "Knights", "Kor",
    "Lhurgoyfs", "Lizards", "Lurrus Companion", "Merfolk", "Minotaurs", "Monkeys",
    "Monks", "Myr", "Necrons", "Ninjas", "Ogres", "Otters", "Oozes", "Orcs",
    "Phyrexians", "Phoenixes", "Pirates", "Praetors", "Rabbits", "Raccoons", "Rats",
    "Relentless Rats", "Rogues", "Samurai", "Scarecrows", "Servos", "Shades",
    "Shamans", "Sharks", "Skeletons", "Slivers", "Snakes", "Soldiers", "Specters",
    "Spiders", "Sphinxes", "Spirits", "Squid", "Squirrels", "Thopters", "Treefolk",
    "Turtles", "Vampires", "Warriors", "Werewolves", "Whales", "Wizards", "Wolves",
    "Wurms", "Zombies",
  ]),
  ("Special Card Synergies", &[
    "Adventures", "Attractions", "Battles", "Commander Matters", "Companions", "Crime",
    "Curses", "Dungeons", "Experience Counters", "Legendary Matters", "Monarch",
    "Multicolor Matters", "Planeswalkers", "Sagas", "Shrines", "Stickers", "The Ring",
  ]),
  ("Play Patterns and Win Conditions", &[
    "Ad Nauseam", "Aristocrats", "Blue Moon", "Burn", "Chaos", "Cheerios", "Flash",
    "Group Hug", "Group Slug", "Hatebears", "Infect", "Mill", "Politics",
    "Primal Surge", "Self-Damage", "Self-Destruct", "Stompy", "Turbo Fog",
  ]),
  ("Advanced / Experimental Mechanics", &[
    "Cascade", "Connive", "Delirium", "Descend", "Discover", "Evoke", "Exploit",
    "Heroic", "Paradox", "Surveil", "Unearth",
  ]),
  ("Keywords and Combat", &[
    "Deathtouch", "Defenders", "Double Strike", "Exalted", "Extra Combats",
    "First Strike", "Flying", "Haste", "Hexproof", "Indestructible", "Menace",
    "Ninjutsu", "Reach", "Shadow", "Skulk", "Trample", "Vigilance",
  ]),
  ("Flavor and Miscellaneous", &[
    "Aikido", "Color Hack", "Cute Tribes", "Dungeon", "Old School", "Type Hack",
    "Unnatural",
  ]),
];

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
  ("elves", "elf"),
  ("wolves", "wolf"),
  ("dwarves", "dwarf"),
  ("faeries", "faerie"),
  ("phyrexians", "phyrexian"),
  ("werewolves", "werewolf"),
  ("humans", "human"),
  ("sphinxes", "sphinx"),
  ("kraken", "kraken"),
];

/// Every canonical tag in category order. A tag listed in two categories is
/// yielded twice.
pub fn all_deck_tags() -> impl Iterator<Item = &'static str> {
  DECK_TAG_GROUPS.iter().flat_map(|(_, tags)| tags.iter().copied())
}

pub fn is_canonical(tag: &str) -> bool {
  all_deck_tags().any(|t| t == tag)
}

/// The first category listing `tag`.
pub fn category_of(tag: &str) -> Option<&'static str> {
  DECK_TAG_GROUPS
    .iter()
    .find(|(_, tags)| tags.contains(&tag))
    .map(|(category, _)| *category)
}

/// Naive English singular of a lowercased word.
pub fn singularize(word: &str) -> String {
  let lower = word.to_lowercase();
  if let Some((_, singular)) = IRREGULAR_PLURALS.iter().find(|(plural, _)| *plural == lower) {
    return (*singular).to_owned();
  }
  let len = lower.chars().count();
  if len > 3 && lower.ends_with("ies") {
    format!("{}y", &lower[..lower.len() - 3])
  } else if len > 3 && lower.ends_with("ves") {
    format!("{}f", &lower[..lower.len() - 3])
  } else if len > 3 && lower.ends_with("es") {
    lower[..lower.len() - 2].to_owned()
  } else if len > 2 && lower.ends_with('s') {
    lower[..lower.len() - 1].to_owned()
  } else {
    lower
  }
}

/// Lowercased tribal tag, its singular form, and its plural minus the final
/// `s` (so `zombie` finds `Zombies`) → canonical tribal tag.
static TRIBAL_LOOKUP: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
  let tribes = DECK_TAG_GROUPS
    .iter()
    .find(|(category, _)| *category == TRIBAL_CATEGORY)
    .map(|(_, tags)| *tags)
    .unwrap_or_default();

  let mut lookup = HashMap::new();
  for &tag in tribes {
    let key = tag.to_lowercase();
    let mut words: Vec<String> = key.split_whitespace().map(str::to_owned).collect();
    if let Some(last) = words.pop() {
      words.push(singularize(&last));
    }
    if let Some(stripped) = key.strip_suffix('s') {
      lookup.entry(stripped.to_owned()).or_insert(tag);
    }
    lookup.entry(words.join(" ")).or_insert(tag);
    lookup.insert(key, tag);
  }
  lookup
});

/// The tribal deck tag for a typal, e.g. `elf` → `Elves`.
pub fn tribal_tag(typal: &str) -> Option<&'static str> {
  TRIBAL_LOOKUP.get(typal.trim().to_lowercase().as_str()).copied()
}
