//! Role sync for owned card records.

use arcana_core::{
  card::{ClassifiableText, OwnedCard, Printing},
  corpus::Corpus,
  store::TagStore,
};
use arcana_rules::{
  RoleAssignment, RuleSet, merge_roles,
  print::{classifiable_text, select_best_print},
  roles::RoleClassifier,
};
use tracing::{debug, error, info};

use crate::{Error, Result, summary::RoleSyncSummary};

/// The corpus printing backing an owned record: the best printing of its
/// identity, else an exact set code and collector number match.
fn resolve_printing<'c>(corpus: &'c Corpus, card: &OwnedCard) -> Option<&'c Printing> {
  let by_identity = card
    .oracle_id
    .as_deref()
    .and_then(|id| corpus.printings_for(id))
    .and_then(|printings| select_best_print(printings).or_else(|| printings.first()));
  if by_identity.is_some() {
    return by_identity;
  }
  match (card.set_code.as_deref(), card.collector_number.as_deref()) {
    (Some(set), Some(number)) => corpus.find_by_set_number(set, number),
    _ => None,
  }
}

fn text_for(corpus: &Corpus, card: &OwnedCard) -> ClassifiableText {
  let type_line = card.type_line.clone().unwrap_or_default();
  let Some(printing) = resolve_printing(corpus, card) else {
    return ClassifiableText::bare(card.name.clone(), type_line);
  };

  let mut text = classifiable_text(printing);
  if text.name.is_empty() {
    text.name = card.name.clone();
  }
  if text.type_line.is_empty() {
    text.type_line = type_line;
  }
  text
}

/// Re-derive the roles of every owned card record and replace all role links
/// in one unit of work.
///
/// With `merge_existing`, stored roles are unioned with the derived ones and
/// an existing primary role is kept.
pub async fn recompute_all_roles<S: TagStore>(
  store: &S,
  corpus: &Corpus,
  rules: &RuleSet,
  merge_existing: bool,
) -> Result<RoleSyncSummary> {
  let classifier = RoleClassifier::new(rules);
  let cards = store.owned_cards().await.map_err(Error::store)?;

  let mut summary = RoleSyncSummary {
    merged_existing: merge_existing,
    ..RoleSyncSummary::default()
  };
  let mut sets = Vec::with_capacity(cards.len());

  for card in &cards {
    summary.cards_scanned += 1;
    let derived = classifier.classify(&text_for(corpus, card));

    let existing = if merge_existing {
      store
        .card_roles(card.card_id)
        .await
        .map_err(Error::store)?
        .map(RoleAssignment::from)
    } else {
      None
    };

    let assignment = merge_roles(existing, derived);
    debug!(card = %card.name, roles = ?assignment.roles, "derived card roles");
    summary.roles_written += assignment.roles.len();
    summary.sub_roles_written += assignment.sub_roles.len();
    sets.push(assignment.into_card_roles(card.card_id));
  }

  store.replace_card_roles(sets).await.map_err(|e| {
    error!(error = %e, "failed to replace card roles");
    Error::store(e)
  })?;

  info!(
    cards = summary.cards_scanned,
    roles = summary.roles_written,
    sub_roles = summary.sub_roles_written,
    merged = merge_existing,
    "role sync complete"
  );
  Ok(summary)
}
