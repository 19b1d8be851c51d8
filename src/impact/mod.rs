//! Change impact analysis
//!
//! Answers "which package directories must be retested?" for a set of
//! changed paths:
//! - Classification: each path is ignored, impacts its own directory, or
//!   alters it (see [`classify::RULES`])
//! - Fixture bubbling: fixture changes impact tested ancestors
//! - Reachability: packages depending on an altered directory are impacted
//! - Pruning: directories without buildable files are dropped

pub mod classify;
pub mod engine;
pub mod fixture;
pub mod tree;
pub mod types;

pub use classify::{Action, RULES, RuleKind, classify, classify_changes};
pub use engine::{ImpactEngine, PackageLocator, propagate};
pub use tree::ProjectTree;
pub use types::{Conventions, ImpactSets};
