use ignore::WalkBuilder;
use log::{debug, trace, warn};
use path_clean::clean;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// One alias pattern with its expansion templates. The pattern holds at most
/// one `*`; targets are templates relative to a workspace root, so the same
/// mapping resolves to different absolute paths under different roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    pub pattern: String,
    pub targets: Vec<String>,
}

/// Mappings from explicit `pathResolution.aliases` declarations, in key
/// order.
pub fn explicit_mappings(aliases: &BTreeMap<String, Vec<String>>) -> Vec<PathMapping> {
    aliases
        .iter()
        .filter(|(pattern, _)| validate_pattern(pattern))
        .map(|(pattern, targets)| PathMapping { pattern: pattern.clone(), targets: targets.clone() })
        .collect()
}

/// Drop later mappings that repeat an earlier pattern. Explicit aliases are
/// placed ahead of inferred ones, so first-writer-wins makes them stick.
pub fn dedup_mappings(mappings: Vec<PathMapping>) -> Vec<PathMapping> {
    let mut seen: HashSet<String> = HashSet::with_capacity(mappings.len());
    let mut out = Vec::with_capacity(mappings.len());
    for mapping in mappings {
        if seen.insert(mapping.pattern.clone()) {
            out.push(mapping);
        } else {
            trace!("Dropping duplicate mapping for pattern '{}'", mapping.pattern);
        }
    }
    out
}

/// Infer mappings from the tsconfig.json files under `root`.
///
/// `paths` entries resolve relative to `baseUrl`; a tsconfig with a bare
/// `baseUrl` and no `paths` synthesizes one wildcard mapping over the base
/// directory. Targets are stored relative to `root`. tsconfig `extends`
/// chains are not followed.
pub fn tsconfig_mappings(root: &Path) -> Vec<PathMapping> {
    debug!("Reading tsconfig path mappings under {:?}", root);
    let mut mappings = Vec::new();

    let walker = WalkBuilder::new(root).hidden(false).git_ignore(true).build();
    let mut tsconfig_files = Vec::new();
    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.file_name().and_then(|n| n.to_str()) == Some("tsconfig.json") {
            trace!("Found tsconfig at: {:?}", path);
            tsconfig_files.push(path.to_path_buf());
        }
    }
    tsconfig_files.sort();

    for tsconfig_path in &tsconfig_files {
        let Ok(content) = fs::read_to_string(tsconfig_path) else {
            continue;
        };
        // Strip comments (simple approach - removes // comments)
        let content_no_comments: String = content
            .lines()
            .map(|line| if let Some(idx) = line.find("//") { &line[..idx] } else { line })
            .collect::<Vec<_>>()
            .join("\n");

        let Ok(json) = serde_json::from_str::<serde_json::Value>(&content_no_comments) else {
            warn!("Skipping malformed tsconfig at {:?}", tsconfig_path);
            continue;
        };
        let Some(compiler_options) = json.get("compilerOptions") else {
            continue;
        };

        let tsconfig_dir = tsconfig_path.parent().unwrap_or(root);
        let rel_dir = tsconfig_dir.strip_prefix(root).unwrap_or(Path::new(""));
        let base_url = compiler_options.get("baseUrl").and_then(|b| b.as_str());

        let paths_obj = compiler_options.get("paths").and_then(|p| p.as_object());
        match paths_obj {
            Some(paths_obj) => {
                let base_path = rel_dir.join(base_url.unwrap_or("."));
                for (alias, targets) in paths_obj {
                    if !validate_pattern(alias) {
                        continue;
                    }
                    let Some(target_arr) = targets.as_array() else {
                        continue;
                    };
                    let resolved_targets: Vec<String> = target_arr
                        .iter()
                        .filter_map(|t| t.as_str())
                        .map(|t| template_string(&base_path.join(t)))
                        .collect();
                    if !resolved_targets.is_empty() {
                        trace!("Found tsconfig path alias: '{}' -> {:?}", alias, resolved_targets);
                        mappings.push(PathMapping {
                            pattern: alias.clone(),
                            targets: resolved_targets,
                        });
                    }
                }
            }
            None => {
                // A bare baseUrl makes every module under it addressable.
                if let Some(base_url) = base_url {
                    let target = template_string(&rel_dir.join(base_url).join("*"));
                    trace!("Synthesizing wildcard mapping for baseUrl: '*' -> {}", target);
                    mappings.push(PathMapping { pattern: "*".to_string(), targets: vec![target] });
                }
            }
        }
    }

    debug!("Loaded {} tsconfig path mappings", mappings.len());
    dedup_mappings(mappings)
}

/// The longest workspace root containing `file`, so nested roots win.
pub fn owning_root<'a>(roots: &'a [PathBuf], file: &Path) -> Option<&'a Path> {
    roots
        .iter()
        .filter(|root| file.starts_with(root))
        .max_by_key(|root| root.as_os_str().len())
        .map(|root| root.as_path())
}

/// Rewrite a relative source to its best-matching alias form, resolved
/// against the owning workspace root of `file`. Returns `None` when the
/// source is not relative, no root owns the file, or nothing matches - the
/// caller keeps the source untouched in all three cases.
pub fn to_alias(
    mappings: &[PathMapping],
    roots: &[PathBuf],
    preferred: &[String],
    file: &Path,
    source: &str,
) -> Option<String> {
    if !is_relative_source(source) {
        return None;
    }
    let root = owning_root(roots, file)?;
    let base = file.parent()?;
    let absolute = clean(base.join(source));
    let rel = absolute.strip_prefix(root).ok()?;
    let rel = template_string(rel);

    // Best match: preferred patterns first, then the most specific template.
    let mut best: Option<(bool, usize, String)> = None;
    for mapping in mappings {
        for target in &mapping.targets {
            let Some(remainder) = match_wildcard(target, &rel) else {
                continue;
            };
            if !mapping.pattern.contains('*') && !remainder.is_empty() {
                continue;
            }
            let alias = expand_wildcard(&mapping.pattern, &remainder);
            let is_preferred = preferred.iter().any(|p| p == &mapping.pattern);
            let specificity = target.len();
            let candidate = (is_preferred, specificity, alias);
            if best.as_ref().is_none_or(|b| (candidate.0, candidate.1) > (b.0, b.1)) {
                best = Some(candidate);
            }
        }
    }
    let (_, _, alias) = best?;
    trace!("Rewrote '{}' to alias '{}'", source, alias);
    Some(alias)
}

/// Rewrite an alias-form source back to a path relative to `file`. Returns
/// `None` when the source is already relative, nothing matches, or no root
/// owns the file - relative templates are never resolved against a guessed
/// root.
pub fn to_relative(
    mappings: &[PathMapping],
    roots: &[PathBuf],
    file: &Path,
    source: &str,
) -> Option<String> {
    if is_relative_source(source) {
        return None;
    }
    for mapping in mappings {
        let Some(remainder) = match_wildcard(&mapping.pattern, source) else {
            continue;
        };
        let root = owning_root(roots, file)?;
        let base = file.parent()?;
        for target in &mapping.targets {
            if !target.contains('*') && !remainder.is_empty() {
                continue;
            }
            let expanded = expand_wildcard(target, &remainder);
            let absolute = clean(root.join(expanded));
            let Some(rel) = make_relative(&absolute, base) else {
                continue;
            };
            let rel = template_string(&rel);
            let rel = if rel.starts_with("../") || rel == ".." {
                rel
            } else {
                format!("./{rel}")
            };
            trace!("Rewrote alias '{}' to '{}'", source, rel);
            return Some(rel);
        }
    }
    None
}

fn is_relative_source(source: &str) -> bool {
    source.starts_with("./") || source.starts_with("../") || source.starts_with('/')
}

fn validate_pattern(pattern: &str) -> bool {
    let ok = pattern.matches('*').count() <= 1;
    if !ok {
        warn!("Skipping alias pattern with multiple wildcards: '{}'", pattern);
    }
    ok
}

/// Match `value` against a pattern holding at most one `*`, returning the
/// text the wildcard consumed. Exact patterns match with an empty remainder.
fn match_wildcard(pattern: &str, value: &str) -> Option<String> {
    match pattern.split_once('*') {
        Some((pre, post)) => {
            if value.len() >= pre.len() + post.len()
                && value.starts_with(pre)
                && value.ends_with(post)
            {
                Some(value[pre.len()..value.len() - post.len()].to_string())
            } else {
                None
            }
        }
        None => (value == pattern).then(String::new),
    }
}

fn expand_wildcard(template: &str, remainder: &str) -> String {
    match template.split_once('*') {
        Some((pre, post)) => format!("{pre}{remainder}{post}"),
        None => template.to_string(),
    }
}

/// Forward-slash string form of a path template.
fn template_string(path: &Path) -> String {
    clean(path).to_string_lossy().replace('\\', "/")
}

/// Create a relative path from `base` to `target`
fn make_relative(target: &Path, base: &Path) -> Option<PathBuf> {
    let mut target_components = target.components();
    let mut base_components = base.components();

    let mut common_prefix_len = 0;
    let mut target_parts = Vec::new();
    let mut base_parts = Vec::new();

    // Find common prefix
    loop {
        match (target_components.next(), base_components.next()) {
            (Some(t), Some(b)) if t == b => {
                common_prefix_len += 1;
            }
            (Some(t), Some(b)) => {
                target_parts.push(t);
                base_parts.push(b);
                break;
            }
            (Some(t), None) => {
                target_parts.push(t);
                break;
            }
            (None, Some(_)) => {
                // target is a prefix of base, need to go up
                return Some(PathBuf::from("."));
            }
            (None, None) => {
                // They are the same
                return Some(PathBuf::from("."));
            }
        }
    }

    // Collect remaining components
    target_parts.extend(target_components);
    base_parts.extend(base_components);

    // If there's no common prefix, we can't make a relative path
    if common_prefix_len == 0 {
        let target_root = target.components().next();
        let base_root = base.components().next();
        if target_root != base_root {
            return None;
        }
    }

    // Build the relative path: "../" for each remaining base component,
    // then append all remaining target components
    let mut result = PathBuf::new();
    for _ in &base_parts {
        result.push("..");
    }
    for component in target_parts {
        match component {
            Component::Normal(p) => result.push(p),
            Component::CurDir => {}
            Component::ParentDir => result.push(".."),
            Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if result.as_os_str().is_empty() { Some(PathBuf::from(".")) } else { Some(result) }
}
