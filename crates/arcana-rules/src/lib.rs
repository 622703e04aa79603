//! Rule-driven card text classification.
//!
//! Everything in this crate is pure and synchronous. A [`RuleSet`] is
//! compiled once from the declarative rule files and shared by reference
//! with every classifier; classifying the same text under the same rules
//! always gives the same result.

pub mod classify;
pub mod core_role;
pub mod deck_tags;
pub mod land;
pub mod normalize;
pub mod print;
pub mod roles;
pub mod ruleset;
pub mod taxonomy;

pub use classify::{Classification, Classifier};
pub use roles::{RoleAssignment, merge_roles};
pub use ruleset::{RuleSet, RuleSources};
