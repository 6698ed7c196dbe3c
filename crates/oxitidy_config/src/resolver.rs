use anyhow::{Context, Result};
use log::{debug, trace, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::aliases::{dedup_mappings, tsconfig_mappings};
use crate::file::{ConfigFile, FormatConfig, ImportOrderConfig, PathResolutionConfig};
use crate::policy::{EffectivePolicy, into_policy};

/// File names probed in each directory, most specific first.
pub const CONFIG_FILE_NAMES: &[&str] = &[".oxitidyrc", ".oxitidyrc.json"];

/// Build the effective policy for a file living in `start_dir`.
///
/// Precedence, lowest to highest: built-in defaults, the config-file chain
/// discovered walking up from `start_dir` (each file's `extends` parent sits
/// just below it), then `workspace_settings` supplied by the host. Inferred
/// tsconfig mappings are read per workspace root and slot in behind any
/// explicit aliases.
pub fn resolve_policy(
    start_dir: &Path,
    workspace_roots: &[PathBuf],
    workspace_settings: Option<&ConfigFile>,
) -> EffectivePolicy {
    let chain = discover_chain(start_dir);
    debug!("Config chain has {} file(s)", chain.len());

    let mut merged = ConfigFile::default();
    for config in chain.iter().rev() {
        merged = merge_config(merged, config);
    }
    if let Some(settings) = workspace_settings {
        merged = merge_config(merged, settings);
    }

    let mut inferred = Vec::new();
    for root in workspace_roots {
        inferred.extend(tsconfig_mappings(root));
    }
    let inferred = dedup_mappings(inferred);

    into_policy(merged, workspace_roots.to_vec(), inferred)
}

/// Read and parse one config file.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

/// Overlay `over` onto `base`. `groups` and `excludedFolders` replace
/// wholesale when the override carries them; `format`, `importOrder` and
/// `pathResolution` merge key-by-key with the override key winning.
pub fn merge_config(base: ConfigFile, over: &ConfigFile) -> ConfigFile {
    ConfigFile {
        extends: None,
        groups: over.groups.clone().or(base.groups),
        excluded_folders: over.excluded_folders.clone().or(base.excluded_folders),
        format: merge_format(base.format, over.format.as_ref()),
        import_order: merge_import_order(base.import_order, over.import_order.as_ref()),
        path_resolution: merge_path_resolution(base.path_resolution, over.path_resolution.as_ref()),
    }
}

fn merge_format(base: Option<FormatConfig>, over: Option<&FormatConfig>) -> Option<FormatConfig> {
    match (base, over) {
        (base, None) => base,
        (None, Some(over)) => Some(over.clone()),
        (Some(base), Some(over)) => Some(FormatConfig {
            indent_width: over.indent_width.or(base.indent_width),
            quote_style: over.quote_style.or(base.quote_style),
            trailing_comma: over.trailing_comma.or(base.trailing_comma),
            max_line_width: over.max_line_width.or(base.max_line_width),
            specifier_sort: over.specifier_sort.or(base.specifier_sort),
            blank_lines_between_groups: over
                .blank_lines_between_groups
                .or(base.blank_lines_between_groups),
            enforce_newline_after_imports: over
                .enforce_newline_after_imports
                .or(base.enforce_newline_after_imports),
        }),
    }
}

fn merge_import_order(
    base: Option<ImportOrderConfig>,
    over: Option<&ImportOrderConfig>,
) -> Option<ImportOrderConfig> {
    match (base, over) {
        (base, None) => base,
        (None, Some(over)) => Some(over.clone()),
        (Some(base), Some(over)) => Some(ImportOrderConfig {
            side_effect: over.side_effect.or(base.side_effect),
            default: over.default.or(base.default),
            namespace: over.namespace.or(base.namespace),
            named: over.named.or(base.named),
            type_only: over.type_only.or(base.type_only),
        }),
    }
}

fn merge_path_resolution(
    base: Option<PathResolutionConfig>,
    over: Option<&PathResolutionConfig>,
) -> Option<PathResolutionConfig> {
    match (base, over) {
        (base, None) => base,
        (None, Some(over)) => Some(over.clone()),
        (Some(base), Some(over)) => Some(PathResolutionConfig {
            mode: over.mode.or(base.mode),
            aliases: over.aliases.clone().or(base.aliases),
            preferred_aliases: over.preferred_aliases.clone().or(base.preferred_aliases),
        }),
    }
}

/// Collect config files nearest-first, expanding each file's `extends` chain
/// at lower precedence than the file itself. Malformed files are logged and
/// skipped so resolution falls back to the next source; extends cycles are
/// cut.
fn discover_chain(start_dir: &Path) -> Vec<ConfigFile> {
    let mut out = Vec::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();

    let mut dir = Some(start_dir);
    while let Some(current) = dir {
        for name in CONFIG_FILE_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                trace!("Found config at {:?}", candidate);
                push_with_extends(&candidate, &mut out, &mut visited);
                break;
            }
        }
        dir = current.parent();
    }

    out
}

fn push_with_extends(path: &Path, out: &mut Vec<ConfigFile>, visited: &mut HashSet<PathBuf>) {
    let identity = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(identity) {
        warn!("Config extends cycle at {}, stopping", path.display());
        return;
    }

    match load_config(path) {
        Ok(config) => {
            let extends = config.extends.clone();
            out.push(config);
            if let Some(parent_rel) = extends {
                // `extends` resolves relative to the extending file.
                let parent = path.parent().unwrap_or(Path::new(".")).join(parent_rel);
                if parent.is_file() {
                    push_with_extends(&parent, out, visited);
                } else {
                    warn!("Extended config not found: {}", parent.display());
                }
            }
        }
        Err(e) => {
            warn!("Skipping unreadable config {}: {:#}", path.display(), e);
        }
    }
}
