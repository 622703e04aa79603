//! Error types for `arcana-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("corpus entry at position {0} has no card identity")]
  MissingIdentity(usize),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
