//! Configuration and alias resolution for the oxitidy formatter.
//!
//! One formatting request consumes exactly one [`EffectivePolicy`], produced
//! here by merging built-in defaults, a nearest-first chain of `.oxitidyrc`
//! files (with `extends` support), and host/workspace settings. The policy is
//! immutable once built; callers own caching and invalidation through
//! [`PolicyCache`].
//!
//! Path mappings come from explicit alias declarations and from tsconfig
//! `baseUrl`/`paths`, and drive the alias<->relative source rewriting.

mod aliases;
mod cache;
mod file;
mod policy;
mod resolver;

// Re-export public API
pub use aliases::{
    PathMapping, dedup_mappings, explicit_mappings, owning_root, to_alias, to_relative,
    tsconfig_mappings,
};
pub use cache::PolicyCache;
pub use file::{
    AliasMode, ConfigFile, FormatConfig, GroupConfig, ImportOrderConfig, PathResolutionConfig,
    QuoteStyle, SortSpec, TrailingComma,
};
pub use policy::{EffectivePolicy, FormatOptions, PathPolicy, into_policy};
pub use resolver::{CONFIG_FILE_NAMES, load_config, merge_config, resolve_policy};
