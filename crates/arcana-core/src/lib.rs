//! Core types and trait definitions for the Arcana oracle tagging engine.
//!
//! This crate is deliberately free of classifier logic and database
//! dependencies. It describes the card corpus the engine reads, the tag and
//! synergy rows it produces, and the [`store::TagStore`] abstraction those
//! rows are persisted through.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod card;
pub mod corpus;
pub mod error;
pub mod store;
pub mod synergy;
pub mod tag;

pub use error::{Error, Result};
