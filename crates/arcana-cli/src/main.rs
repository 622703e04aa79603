//! `arcana`: run the card enrichment jobs against a local tag store.
//!
//! Reads `arcana.toml` (or the path given with `--config`), layered under
//! `ARCANA_*` environment variables, and prints each job's summary as JSON.
//!
//! ```
//! arcana enrich --force
//! arcana roles --no-merge
//! arcana synergies
//! arcana classify --identity 9f1c...
//! ```

mod config;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use arcana_core::corpus::{Corpus, SourceVersion};
use arcana_enrich::{
  EnrichmentOptions, recompute_all_roles, recompute_deck_tag_synergies,
  recompute_oracle_enrichment,
};
use arcana_rules::{Classifier, RuleSet};
use arcana_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;

#[derive(Parser)]
#[command(author, version, about = "Arcana card classification and synergy engine")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "arcana.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Rebuild every oracle tag table (and synergies) from the card corpus.
  Enrich {
    /// Rebuild even when the stored deck tags are current.
    #[arg(long)]
    force: bool,
  },

  /// Re-derive the roles of every owned card record.
  Roles {
    /// Overwrite existing role links instead of merging into them.
    #[arg(long)]
    no_merge: bool,
  },

  /// Recompute deck-tag synergies from the stored tags.
  Synergies,

  /// Print the full classification of one card identity. Writes nothing.
  Classify {
    #[arg(long)]
    identity: String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = EngineConfig::load(&cli.config)?.expanded();

  let rules = match &cfg.rules_dir {
    Some(dir) => RuleSet::load_dir(dir),
    None => RuleSet::builtin(),
  };

  match cli.command {
    Command::Enrich { force } => {
      let corpus = load_corpus(&cfg.corpus_path)?;
      let store = open_store(&cfg.store_path).await?;
      let options = EnrichmentOptions {
        force:   force || cfg.force,
        synergy: cfg.synergy.clone(),
      };
      let status = recompute_oracle_enrichment(
        &store,
        &corpus,
        &rules,
        &SourceVersion::of_path(&cfg.corpus_path),
        &options,
      )
      .await
      .context("oracle enrichment failed")?;
      print_json(&status)
    }

    Command::Roles { no_merge } => {
      let corpus = load_corpus(&cfg.corpus_path)?;
      let store = open_store(&cfg.store_path).await?;
      let summary = recompute_all_roles(&store, &corpus, &rules, cfg.merge_existing && !no_merge)
        .await
        .context("role sync failed")?;
      print_json(&summary)
    }

    Command::Synergies => {
      let store = open_store(&cfg.store_path).await?;
      let summary = recompute_deck_tag_synergies(
        &store,
        &SourceVersion::of_path(&cfg.corpus_path),
        &cfg.synergy,
      )
      .await
      .context("synergy recompute failed")?;
      print_json(&summary)
    }

    Command::Classify { identity } => {
      let corpus = load_corpus(&cfg.corpus_path)?;
      let printings = corpus
        .printings_for(&identity)
        .with_context(|| format!("identity {identity:?} not found in corpus"))?;
      let classification = Classifier::new(&rules)
        .classify_identity(&identity, printings)
        .with_context(|| format!("identity {identity:?} has no printings"))?;
      print_json(&classification)
    }
  }
}

/// Load the bulk card file. A missing file yields an empty corpus, which the
/// jobs report as unavailable.
fn load_corpus(path: &Path) -> anyhow::Result<Corpus> {
  if !path.exists() {
    tracing::warn!("card corpus not found at {path:?}");
    return Ok(Corpus::default());
  }
  let corpus =
    Corpus::load(path).with_context(|| format!("failed to load corpus from {path:?}"))?;
  tracing::info!(
    identities = corpus.len(),
    ungrouped = corpus.ungrouped(),
    "loaded card corpus"
  );
  Ok(corpus)
}

async fn open_store(path: &Path) -> anyhow::Result<SqliteStore> {
  SqliteStore::open(path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("failed to serialise output")?;
  println!("{json}");
  Ok(())
}
