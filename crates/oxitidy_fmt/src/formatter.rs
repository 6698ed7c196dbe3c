use log::{debug, trace};
use std::collections::HashSet;
use std::path::Path;

use oxitidy_config::{AliasMode, EffectivePolicy, to_alias, to_relative};
use oxitidy_core::{
    ByteSpan, GroupedImports, ImportRecord, classify, dedup_specifiers, default_source_type,
    drop_missing, drop_unused, parse_imports, sort_specifiers, source_type_for,
};
use oxitidy_doc::print;

use crate::block::{
    SKIP_PRAGMA, extend_over_headers, extend_to_lines, has_dynamic_import, has_skip_pragma,
};
use crate::builder::build_doc;
use crate::error::FormatError;

/// Outcome of one formatting call. `skipped` carries the reason when the file
/// was deliberately left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatResult {
    pub text: String,
    pub changed: bool,
    pub skipped: Option<String>,
}

impl FormatResult {
    fn unchanged(source: &str, skipped: Option<String>) -> Self {
        Self { text: source.to_string(), changed: false, skipped }
    }
}

/// Name sets supplied by the external oracles. The core only consumes them;
/// it never detects unused or unresolvable imports itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleInput<'a> {
    pub unused_names: Option<&'a HashSet<String>>,
    pub missing_modules: Option<&'a HashSet<String>>,
    /// Keep records whose module the missing-module oracle flagged.
    pub keep_missing: bool,
}

/// Reorganize the leading import block of `source` under `policy`, leaving
/// all other code byte-identical. `file` feeds extension-based parse flags
/// and alias resolution; without it sources are never rewritten.
pub fn format_source(
    source: &str,
    policy: &EffectivePolicy,
    file: Option<&Path>,
) -> Result<FormatResult, FormatError> {
    format_source_with(source, policy, file, OracleInput::default())
}

/// [`format_source`] with oracle-supplied name sets applied before grouping.
pub fn format_source_with(
    source: &str,
    policy: &EffectivePolicy,
    file: Option<&Path>,
    oracles: OracleInput<'_>,
) -> Result<FormatResult, FormatError> {
    if has_skip_pragma(source) {
        trace!("Skip pragma present, leaving file alone");
        return Ok(FormatResult::unchanged(source, Some(format!("{SKIP_PRAGMA} pragma"))));
    }

    let source_type = file.map(source_type_for).unwrap_or_else(default_source_type);
    let parsed =
        parse_imports(source, source_type).map_err(|e| FormatError::Parse(e.to_string()))?;

    let Some(raw_span) = parsed.block else {
        trace!("No import block found");
        return Ok(FormatResult::unchanged(source, None));
    };

    let mut span = extend_to_lines(source, raw_span);
    span.start = extend_over_headers(source, span.start, &policy.group_names());

    if has_dynamic_import(&source[span.start..span.end]) {
        return Err(FormatError::DynamicImports);
    }

    let mut records = parsed.records;
    if let Some(unused) = oracles.unused_names {
        records = drop_unused(&records, unused);
    }
    if let Some(missing) = oracles.missing_modules {
        records = drop_missing(&records, missing, oracles.keep_missing);
    }

    rewrite_sources(&mut records, policy, file);

    for record in &mut records {
        let deduped = dedup_specifiers(&record.specifiers);
        record.specifiers = sort_specifiers(deduped, policy.format.specifier_sort);
    }

    let grouped =
        classify(records, &policy.groups, &policy.kind_ranks, policy.format.specifier_sort);
    let populated = GroupedImports {
        buckets: grouped.buckets.into_iter().filter(|b| !b.records.is_empty()).collect(),
    };

    let block = print(&build_doc(&populated, &policy.format));
    let text = splice(source, span, &block, policy.format.enforce_newline_after_imports);
    let changed = text != source;
    debug!("Formatted import block: changed={changed}");
    Ok(FormatResult { text, changed, skipped: None })
}

fn rewrite_sources(records: &mut [ImportRecord], policy: &EffectivePolicy, file: Option<&Path>) {
    let Some(mode) = policy.paths.mode else {
        return;
    };
    let Some(file) = file else {
        return;
    };
    for record in records {
        let rewritten = match mode {
            AliasMode::Absolute => to_alias(
                &policy.paths.mappings,
                &policy.paths.workspace_roots,
                &policy.paths.preferred_aliases,
                file,
                &record.source,
            ),
            AliasMode::Relative => to_relative(
                &policy.paths.mappings,
                &policy.paths.workspace_roots,
                file,
                &record.source,
            ),
        };
        if let Some(source) = rewritten {
            trace!("Rewrote source '{}' -> '{}'", record.source, source);
            record.source = source;
        }
    }
}

/// Replace the block span with the rendered block. With newline enforcement
/// on, the blank-line run after the block collapses to exactly one blank
/// line, inserted if absent; off preserves the original spacing verbatim.
fn splice(source: &str, span: ByteSpan, block: &str, enforce_newline: bool) -> String {
    let mut out = String::with_capacity(source.len() + block.len());
    out.push_str(&source[..span.start]);
    out.push_str(block);

    let rest = &source[span.end..];
    if enforce_newline {
        let rest = skip_blank_lines(rest);
        if !rest.is_empty() {
            if !block.is_empty() {
                out.push('\n');
            }
            out.push_str(rest);
        }
    } else {
        out.push_str(rest);
    }
    out
}

fn skip_blank_lines(mut rest: &str) -> &str {
    while let Some(newline) = rest.find('\n') {
        if rest[..newline].trim().is_empty() {
            rest = &rest[newline + 1..];
        } else {
            break;
        }
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxitidy_config::{ConfigFile, into_policy};
    use std::path::PathBuf;

    fn policy() -> EffectivePolicy {
        EffectivePolicy::default()
    }

    fn policy_from(json: &str) -> EffectivePolicy {
        let config: ConfigFile = serde_json::from_str(json).unwrap();
        into_policy(config, Vec::new(), Vec::new())
    }

    fn format(source: &str, policy: &EffectivePolicy) -> FormatResult {
        format_source(source, policy, None).unwrap()
    }

    #[test]
    fn test_groups_sort_and_align() {
        let source = "import { z } from 'zod';\nimport { a } from 'alpha';\n\nconst x = 1;\n";
        let result = format(source, &policy());
        assert!(result.changed);
        assert_eq!(
            result.text,
            "// Other\nimport { a } from 'alpha';\nimport { z } from 'zod';\n\nconst x = 1;\n"
        );
    }

    #[test]
    fn test_idempotence() {
        let source = "import { z } from 'zod';\nimport { a } from 'alpha';\n\nconst x = 1;\n";
        let once = format(source, &policy());
        let twice = format(&once.text, &policy());
        assert_eq!(twice.text, once.text);
        assert!(!twice.changed);
    }

    #[test]
    fn test_lone_side_effect_import() {
        let result = format("import './x.css';", &policy());
        assert_eq!(result.text, "// Other\nimport './x.css';\n");
        let again = format(&result.text, &policy());
        assert_eq!(again.text, result.text);
    }

    #[test]
    fn test_exact_group_match_routes_react_only() {
        let policy = policy_from(
            r#"{ "groups": [
                { "name": "React", "match": "^react$", "order": 1 },
                { "name": "Other", "default": true }
            ] }"#,
        );
        let source = "import { render } from 'react-dom';\nimport { useState } from 'react';\n";
        let result = format(source, &policy);
        assert_eq!(
            result.text,
            "// React\nimport { useState } from 'react';\n\n// Other\nimport { render } from 'react-dom';\n"
        );
    }

    #[test]
    fn test_no_import_block_returns_source_unchanged() {
        let source = "const x = 1;\nexport const y = 2;\n";
        let result = format(source, &policy());
        assert_eq!(result.text, source);
        assert!(!result.changed);
        assert!(result.skipped.is_none());
    }

    #[test]
    fn test_dynamic_import_in_block_fails_closed() {
        let err = format_source("import a from './a'; import('./x');\n", &policy(), None);
        assert!(matches!(err, Err(FormatError::DynamicImports)));
    }

    #[test]
    fn test_dynamic_import_after_block_is_fine() {
        let source = "import a from './a';\nconst m = import('./lazy');\n";
        assert!(format_source(source, &policy(), None).is_ok());
    }

    #[test]
    fn test_parse_error_is_fatal() {
        let err = format_source("import {, } from from;", &policy(), None);
        assert!(matches!(err, Err(FormatError::Parse(_))));
    }

    #[test]
    fn test_skip_pragma_short_circuits() {
        let source = "// oxitidy-ignore\nimport { z } from 'zod';\nimport { a } from 'alpha';\n";
        let result = format(source, &policy());
        assert!(!result.changed);
        assert_eq!(result.text, source);
        assert!(result.skipped.is_some());
    }

    #[test]
    fn test_enforce_newline_collapses_blank_run() {
        let source = "import { a } from 'alpha';\n\n\n\nconst x = 1;\n";
        let result = format(source, &policy());
        assert_eq!(result.text, "// Other\nimport { a } from 'alpha';\n\nconst x = 1;\n");
    }

    #[test]
    fn test_enforce_newline_inserts_missing_blank() {
        let source = "import { a } from 'alpha';\nconst x = 1;\n";
        let result = format(source, &policy());
        assert_eq!(result.text, "// Other\nimport { a } from 'alpha';\n\nconst x = 1;\n");
    }

    #[test]
    fn test_disabled_newline_enforcement_preserves_spacing() {
        let policy =
            policy_from(r#"{ "format": { "enforceNewlineAfterImports": false } }"#);
        let source = "import { a } from 'alpha';\n\n\n\nconst x = 1;\n";
        let result = format(source, &policy);
        assert_eq!(result.text, "// Other\nimport { a } from 'alpha';\n\n\n\nconst x = 1;\n");
    }

    #[test]
    fn test_kind_ranks_order_within_group() {
        let source = "import { named } from './named';\nimport './side-effect';\nimport def from './default';\n";
        let result = format(source, &policy());
        assert_eq!(
            result.text,
            "// Other\nimport './side-effect';\nimport def       from './default';\nimport { named } from './named';\n"
        );
    }

    #[test]
    fn test_specifiers_dedup_and_sort() {
        let source = "import { beta, a, beta, gamma } from './m';\n";
        let result = format(source, &policy());
        assert_eq!(result.text, "// Other\nimport { a, beta, gamma } from './m';\n");
    }

    #[test]
    fn test_unused_oracle_filter() {
        let unused: HashSet<String> = ["gone".to_string()].into_iter().collect();
        let source = "import { used, gone } from './m';\nimport './keep.css';\n";
        let result = format_source_with(
            source,
            &policy(),
            None,
            OracleInput { unused_names: Some(&unused), ..Default::default() },
        )
        .unwrap();
        assert_eq!(result.text, "// Other\nimport './keep.css';\nimport { used } from './m';\n");
    }

    #[test]
    fn test_missing_module_oracle_filter() {
        let missing: HashSet<String> = ["./gone".to_string()].into_iter().collect();
        let source = "import { a } from './gone';\nimport { b } from './here';\n";
        let result = format_source_with(
            source,
            &policy(),
            None,
            OracleInput { missing_modules: Some(&missing), ..Default::default() },
        )
        .unwrap();
        assert_eq!(result.text, "// Other\nimport { b } from './here';\n");
    }

    #[test]
    fn test_re_export_block() {
        let source = "export { a } from './a';\nexport * from './b';\n";
        let result = format(source, &policy());
        assert_eq!(
            result.text,
            "// Other\nexport *     from './b';\nexport { a } from './a';\n"
        );
    }

    #[test]
    fn test_relative_mode_rewrites_alias_sources() {
        let config: ConfigFile = serde_json::from_str(
            r#"{ "pathResolution": { "mode": "relative", "aliases": { "@app/*": ["src/app/*"] } } }"#,
        )
        .unwrap();
        let policy = into_policy(config, vec![PathBuf::from("/repo")], Vec::new());
        let source = "import { a } from '@app/components/a';\n";
        let result =
            format_source(source, &policy, Some(Path::new("/repo/src/app/pages/index.ts")))
                .unwrap();
        assert_eq!(result.text, "// Other\nimport { a } from '../components/a';\n");
    }

    #[test]
    fn test_absolute_mode_rewrites_relative_sources() {
        let config: ConfigFile = serde_json::from_str(
            r#"{ "pathResolution": { "mode": "absolute", "aliases": { "@app/*": ["src/app/*"] } } }"#,
        )
        .unwrap();
        let policy = into_policy(config, vec![PathBuf::from("/repo")], Vec::new());
        let source = "import { a } from '../components/a';\n";
        let result =
            format_source(source, &policy, Some(Path::new("/repo/src/app/pages/index.ts")))
                .unwrap();
        assert_eq!(result.text, "// Other\nimport { a } from '@app/components/a';\n");
    }

    #[test]
    fn test_no_owning_root_leaves_sources_untouched() {
        let config: ConfigFile = serde_json::from_str(
            r#"{ "pathResolution": { "mode": "relative", "aliases": { "@app/*": ["src/app/*"] } } }"#,
        )
        .unwrap();
        let policy = into_policy(config, vec![PathBuf::from("/workspace")], Vec::new());
        let source = "import { a } from '@app/components/a';\n";
        let result =
            format_source(source, &policy, Some(Path::new("/elsewhere/index.ts"))).unwrap();
        assert_eq!(result.text, "// Other\nimport { a } from '@app/components/a';\n");
    }

    #[test]
    fn test_code_before_imports_is_untouched() {
        let source = "#!/usr/bin/env node\n'use strict';\nimport { b } from './b';\nimport { a } from './a';\nmain();\n";
        let result = format(source, &policy());
        assert!(result.text.starts_with("#!/usr/bin/env node\n'use strict';\n// Other\n"));
        assert!(result.text.ends_with("\nmain();\n"));
    }

    #[test]
    fn test_trailing_imports_after_code_stay_put() {
        let source = "import { a } from './a';\nconst x = 1;\nimport { late } from './late';\n";
        let result = format(source, &policy());
        assert!(result.text.ends_with("const x = 1;\nimport { late } from './late';\n"));
    }
}
