//! Core import model for the oxitidy tools.
//!
//! This crate provides the front half of the formatting pipeline:
//! - Parsing import/re-export declarations from JS/TS source (via oxc)
//! - Classifying import records into configured groups
//! - Deduplicating and sorting named specifiers
//! - Oracle-driven filters for unused names and missing modules
//!
//! Everything here is synchronous and free of shared state; callers drive
//! parallelism by formatting files independently.

mod classifier;
mod filters;
mod parser;
mod specifiers;
mod types;

// Re-export public API
pub use classifier::{KindRanks, classify, normalize_groups};
pub use filters::{drop_missing, drop_unused};
pub use parser::{ParsedModule, default_source_type, parse_imports, source_type_for};
pub use specifiers::{SpecifierSort, dedup_specifiers, sort_specifiers};
pub use types::{
    ByteSpan, DEFAULT_GROUP_ORDER, Group, GroupBucket, GroupedImports, ImportKind, ImportRecord,
    ImportSpecifier,
};
