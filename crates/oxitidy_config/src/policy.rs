use log::{debug, warn};
use regex::Regex;
use std::path::{Path, PathBuf};

use oxitidy_core::{DEFAULT_GROUP_ORDER, Group, KindRanks, SpecifierSort, normalize_groups};

use crate::aliases::PathMapping;
use crate::file::{AliasMode, ConfigFile, GroupConfig, QuoteStyle, TrailingComma};

/// Concrete formatting knobs with every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    pub indent_width: usize,
    pub quote_style: QuoteStyle,
    pub trailing_comma: TrailingComma,
    /// `None` means no explicit max width is configured and nothing wraps.
    pub max_line_width: Option<usize>,
    pub specifier_sort: SpecifierSort,
    pub blank_lines_between_groups: usize,
    pub enforce_newline_after_imports: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            quote_style: QuoteStyle::Single,
            trailing_comma: TrailingComma::Always,
            max_line_width: None,
            specifier_sort: SpecifierSort::Length,
            blank_lines_between_groups: 1,
            enforce_newline_after_imports: true,
        }
    }
}

/// Alias rewriting inputs for one request.
#[derive(Debug, Clone, Default)]
pub struct PathPolicy {
    pub mode: Option<AliasMode>,
    /// Patterns with root-relative target templates, explicit aliases first.
    pub mappings: Vec<PathMapping>,
    pub preferred_aliases: Vec<String>,
    pub workspace_roots: Vec<PathBuf>,
}

/// The single, fully merged configuration one formatting call consumes.
/// Rebuilt fresh per request and immutable afterwards; sharing happens via
/// [`crate::PolicyCache`], keyed by config identity.
#[derive(Debug, Clone)]
pub struct EffectivePolicy {
    /// Compiled and normalized: ascending order, exactly one catch-all.
    pub groups: Vec<Group>,
    pub kind_ranks: KindRanks,
    pub format: FormatOptions,
    pub paths: PathPolicy,
    pub excluded_folders: Vec<String>,
}

impl Default for EffectivePolicy {
    fn default() -> Self {
        into_policy(ConfigFile::default(), Vec::new(), Vec::new())
    }
}

impl EffectivePolicy {
    /// Folder exclusion check offered to batch collaborators; the core never
    /// walks directories itself.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.excluded_folders.iter().any(|folder| path.contains(folder.as_str()))
    }

    /// All group names a header comment may carry, used to recognize output
    /// of a previous run.
    pub fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.name.clone()).collect()
    }
}

/// Convert a merged [`ConfigFile`] into the effective policy: compile group
/// matchers, apply defaults, clamp out-of-range values. `match` strings
/// compile here, at conversion time, never during merging.
pub fn into_policy(
    merged: ConfigFile,
    workspace_roots: Vec<PathBuf>,
    inferred_mappings: Vec<PathMapping>,
) -> EffectivePolicy {
    let groups = match &merged.groups {
        Some(configs) => convert_groups(configs),
        None => Vec::new(),
    };
    let groups = normalize_groups(&groups);

    let mut format = FormatOptions::default();
    if let Some(f) = &merged.format {
        if let Some(v) = f.indent_width {
            format.indent_width = v;
        }
        if let Some(v) = f.quote_style {
            format.quote_style = v;
        }
        if let Some(v) = f.trailing_comma {
            format.trailing_comma = v;
        }
        if let Some(v) = f.max_line_width {
            format.max_line_width = Some(v);
        }
        if let Some(v) = f.specifier_sort {
            format.specifier_sort = v.0;
        }
        if let Some(v) = f.blank_lines_between_groups {
            // Negative counts clamp to zero.
            format.blank_lines_between_groups = v.max(0) as usize;
        }
        if let Some(v) = f.enforce_newline_after_imports {
            format.enforce_newline_after_imports = v;
        }
    }

    let mut kind_ranks = KindRanks::default();
    if let Some(order) = &merged.import_order {
        if let Some(v) = order.side_effect {
            kind_ranks.side_effect = v;
        }
        if let Some(v) = order.default {
            kind_ranks.default = v;
        }
        if let Some(v) = order.namespace {
            kind_ranks.namespace = v;
        }
        if let Some(v) = order.named {
            kind_ranks.named = v;
        }
        if let Some(v) = order.type_only {
            kind_ranks.type_only = v;
        }
    }

    let mut paths = PathPolicy {
        mode: None,
        mappings: Vec::new(),
        preferred_aliases: Vec::new(),
        workspace_roots,
    };
    if let Some(resolution) = &merged.path_resolution {
        paths.mode = resolution.mode;
        if let Some(preferred) = &resolution.preferred_aliases {
            paths.preferred_aliases = preferred.clone();
        }
        if let Some(aliases) = &resolution.aliases {
            paths.mappings = crate::aliases::explicit_mappings(aliases);
        }
    }
    // Explicit aliases stay ahead of inferred build-tool mappings; dedup is
    // first-writer-wins on the pattern.
    paths.mappings.extend(inferred_mappings);
    paths.mappings = crate::aliases::dedup_mappings(paths.mappings);

    debug!(
        "Built effective policy: {} groups, {} path mappings",
        groups.len(),
        paths.mappings.len()
    );

    EffectivePolicy {
        groups,
        kind_ranks,
        format,
        paths,
        excluded_folders: merged.excluded_folders.unwrap_or_default(),
    }
}

fn convert_groups(configs: &[GroupConfig]) -> Vec<Group> {
    let mut out = Vec::with_capacity(configs.len());
    for config in configs {
        // Compatibility shim: `isDefault` is accepted as an alias for
        // `default`; `default` wins when both are present.
        let is_default = match (config.default, config.is_default) {
            (Some(default), Some(legacy)) => {
                if default != legacy {
                    warn!(
                        "Group '{}' sets both 'default' and deprecated 'isDefault'; using 'default'",
                        config.name
                    );
                }
                default
            }
            (Some(default), None) => default,
            (None, Some(legacy)) => legacy,
            (None, None) => false,
        };

        let matcher = match &config.pattern {
            Some(pattern) => match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    warn!("Skipping group '{}', invalid match pattern: {}", config.name, e);
                    continue;
                }
            },
            None => None,
        };

        out.push(Group {
            name: config.name.clone(),
            matcher,
            order: config.order.unwrap_or(DEFAULT_GROUP_ORDER),
            is_default,
        });
    }
    out
}
