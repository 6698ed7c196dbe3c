use anyhow::{Result, anyhow};
use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_parser::Parser as OxcParser;
use oxc_span::SourceType;
use std::path::Path;

use crate::types::{ByteSpan, ImportKind, ImportRecord, ImportSpecifier};

/// Import declarations extracted from one parse. `block` covers the leading
/// run of import/re-export statements in raw byte offsets; directives like
/// `'use client'` sit outside the program body and never shift it.
#[derive(Debug, Clone)]
pub struct ParsedModule {
    pub records: Vec<ImportRecord>,
    pub block: Option<ByteSpan>,
}

/// Parse `source` and extract the leading run of import/re-export
/// declarations. The run ends at the first statement of any other kind.
/// Syntax errors are fatal for the file; nothing downstream may touch it.
pub fn parse_imports(source: &str, source_type: SourceType) -> Result<ParsedModule> {
    let allocator = Allocator::default();
    let ret = OxcParser::new(&allocator, source, source_type).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let detail = ret
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "parser panicked".to_string());
        return Err(anyhow!("syntax error: {detail}"));
    }

    let mut records: Vec<ImportRecord> = Vec::new();
    let mut block: Option<ByteSpan> = None;

    for stmt in &ret.program.body {
        let (span, record) = match stmt {
            Statement::ImportDeclaration(decl) => {
                (to_span(decl.span), convert_import(decl, records.len()))
            }
            Statement::ExportNamedDeclaration(decl) if decl.source.is_some() => {
                (to_span(decl.span), convert_named_re_export(decl, records.len()))
            }
            Statement::ExportAllDeclaration(decl) => {
                (to_span(decl.span), Some(convert_export_all(decl, records.len())))
            }
            // The leading import run ends at the first other statement.
            _ => break,
        };

        block = Some(match block {
            Some(b) => ByteSpan { start: b.start.min(span.start), end: b.end.max(span.end) },
            None => span,
        });

        match record {
            Some(r) => {
                trace!("Found {:?} import of '{}'", r.kind, r.source);
                records.push(r);
            }
            None => trace!("Skipping declaration without a literal module source"),
        }
    }

    debug!("Extracted {} import records", records.len());
    Ok(ParsedModule { records, block })
}

fn to_span(span: oxc_span::Span) -> ByteSpan {
    ByteSpan { start: span.start as usize, end: span.end as usize }
}

fn convert_import(decl: &ImportDeclaration, source_index: usize) -> Option<ImportRecord> {
    let source = decl.source.value.to_string();
    if source.is_empty() {
        return None;
    }
    let is_type_only = decl.import_kind.is_type();

    let Some(specifiers) = &decl.specifiers else {
        // `import './side-effect';`
        return Some(ImportRecord {
            kind: ImportKind::SideEffect,
            source,
            default_local: None,
            namespace_local: None,
            specifiers: Vec::new(),
            is_type_only: false,
            is_re_export: false,
            source_index,
            group_name: None,
            span: to_span(decl.span),
        });
    };

    let mut default_local = None;
    let mut namespace_local = None;
    let mut named: Vec<ImportSpecifier> = Vec::new();

    for spec in specifiers {
        match spec {
            ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                default_local = Some(s.local.name.to_string());
            }
            ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                namespace_local = Some(s.local.name.to_string());
            }
            ImportDeclarationSpecifier::ImportSpecifier(s) => {
                named.push(ImportSpecifier {
                    imported: s.imported.name().to_string(),
                    local: s.local.name.to_string(),
                    is_type: s.import_kind.is_type(),
                });
            }
        }
    }

    let kind = if !named.is_empty() || (default_local.is_none() && namespace_local.is_none()) {
        if is_type_only { ImportKind::TypeNamed } else { ImportKind::Named }
    } else if namespace_local.is_some() {
        ImportKind::Namespace
    } else if is_type_only {
        ImportKind::TypeDefault
    } else {
        ImportKind::Default
    };

    Some(ImportRecord {
        kind,
        source,
        default_local,
        namespace_local,
        specifiers: named,
        is_type_only,
        is_re_export: false,
        source_index,
        group_name: None,
        span: to_span(decl.span),
    })
}

fn convert_named_re_export(
    decl: &ExportNamedDeclaration,
    source_index: usize,
) -> Option<ImportRecord> {
    let source = decl.source.as_ref()?.value.to_string();
    if source.is_empty() {
        return None;
    }
    let is_type_only = decl.export_kind.is_type();

    let specifiers: Vec<ImportSpecifier> = decl
        .specifiers
        .iter()
        .map(|s| ImportSpecifier {
            imported: s.local.name().to_string(),
            local: s.exported.name().to_string(),
            is_type: s.export_kind.is_type(),
        })
        .collect();

    Some(ImportRecord {
        kind: if is_type_only { ImportKind::TypeNamed } else { ImportKind::Named },
        source,
        default_local: None,
        namespace_local: None,
        specifiers,
        is_type_only,
        is_re_export: true,
        source_index,
        group_name: None,
        span: to_span(decl.span),
    })
}

fn convert_export_all(decl: &ExportAllDeclaration, source_index: usize) -> ImportRecord {
    ImportRecord {
        kind: ImportKind::Namespace,
        source: decl.source.value.to_string(),
        default_local: None,
        namespace_local: decl.exported.as_ref().map(|e| e.name().to_string()),
        specifiers: Vec::new(),
        is_type_only: decl.export_kind.is_type(),
        is_re_export: true,
        source_index,
        group_name: None,
        span: to_span(decl.span),
    }
}

/// Infer the parse flags from the file extension, the same way the rest of
/// the JS/TS tooling here does it.
pub fn source_type_for(path: &Path) -> SourceType {
    let ext = path.extension().and_then(|e| e.to_str());

    let mut st = SourceType::default()
        .with_jsx(matches!(ext, Some("tsx") | Some("jsx")))
        .with_typescript(matches!(ext, Some("ts") | Some("tsx") | Some("mts") | Some("cts")));

    // ESM heuristic - .mjs, .mts are ES modules
    if matches!(ext, Some("mjs") | Some("mts")) {
        st = st.with_module(true);
    }

    st
}

/// The most permissive setting for import syntax, used when no file path is
/// available to infer from.
pub fn default_source_type() -> SourceType {
    SourceType::default().with_typescript(true).with_jsx(true).with_module(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParsedModule {
        parse_imports(source, default_source_type()).unwrap()
    }

    #[test]
    fn test_default_import() {
        let parsed = parse("import React from 'react';");
        assert_eq!(parsed.records.len(), 1);
        let r = &parsed.records[0];
        assert_eq!(r.kind, ImportKind::Default);
        assert_eq!(r.source, "react");
        assert_eq!(r.default_local.as_deref(), Some("React"));
    }

    #[test]
    fn test_named_import() {
        let parsed = parse("import { useState, useEffect as effect } from 'react';");
        let r = &parsed.records[0];
        assert_eq!(r.kind, ImportKind::Named);
        assert_eq!(r.specifiers.len(), 2);
        assert_eq!(r.specifiers[0].rendered(), "useState");
        assert_eq!(r.specifiers[1].rendered(), "useEffect as effect");
    }

    #[test]
    fn test_mixed_default_and_named() {
        let parsed = parse("import React, { useState } from 'react';");
        let r = &parsed.records[0];
        assert_eq!(r.kind, ImportKind::Named);
        assert_eq!(r.default_local.as_deref(), Some("React"));
        assert_eq!(r.specifiers.len(), 1);
    }

    #[test]
    fn test_namespace_import() {
        let parsed = parse("import * as utils from './utils';");
        let r = &parsed.records[0];
        assert_eq!(r.kind, ImportKind::Namespace);
        assert_eq!(r.namespace_local.as_deref(), Some("utils"));
    }

    #[test]
    fn test_side_effect_import() {
        let parsed = parse("import './polyfills';");
        let r = &parsed.records[0];
        assert_eq!(r.kind, ImportKind::SideEffect);
        assert!(r.specifiers.is_empty());
    }

    #[test]
    fn test_type_only_named() {
        let parsed = parse("import type { Props } from './types';");
        let r = &parsed.records[0];
        assert_eq!(r.kind, ImportKind::TypeNamed);
        assert!(r.is_type_only);
    }

    #[test]
    fn test_type_only_default() {
        let parsed = parse("import type React from 'react';");
        let r = &parsed.records[0];
        assert_eq!(r.kind, ImportKind::TypeDefault);
    }

    #[test]
    fn test_per_specifier_type() {
        let parsed = parse("import { type Foo, bar } from './utils';");
        let r = &parsed.records[0];
        assert_eq!(r.kind, ImportKind::Named);
        assert!(r.specifiers[0].is_type);
        assert!(!r.specifiers[1].is_type);
    }

    #[test]
    fn test_named_re_export() {
        let parsed = parse("export { a, b as c } from './mod';");
        let r = &parsed.records[0];
        assert!(r.is_re_export);
        assert_eq!(r.kind, ImportKind::Named);
        assert_eq!(r.specifiers[1].rendered(), "b as c");
    }

    #[test]
    fn test_export_all() {
        let parsed = parse("export * from './mod';");
        let r = &parsed.records[0];
        assert!(r.is_re_export);
        assert_eq!(r.kind, ImportKind::Namespace);
        assert!(r.namespace_local.is_none());
    }

    #[test]
    fn test_export_all_as_namespace() {
        let parsed = parse("export * as mod from './mod';");
        let r = &parsed.records[0];
        assert_eq!(r.namespace_local.as_deref(), Some("mod"));
    }

    #[test]
    fn test_leading_run_stops_at_first_statement() {
        let source = "import a from './a';\nconst x = 1;\nimport b from './b';";
        let parsed = parse(source);
        assert_eq!(parsed.records.len(), 1);
        let block = parsed.block.unwrap();
        assert_eq!(&source[block.start..block.end], "import a from './a';");
    }

    #[test]
    fn test_no_imports() {
        let parsed = parse("const x = 42;");
        assert!(parsed.records.is_empty());
        assert!(parsed.block.is_none());
    }

    #[test]
    fn test_directive_prologue_does_not_end_run() {
        let parsed = parse("'use client';\nimport a from './a';");
        assert_eq!(parsed.records.len(), 1);
    }

    #[test]
    fn test_source_index_is_dense() {
        let parsed = parse("import a from './a';\nimport b from './b';\nimport './c';");
        let indices: Vec<usize> = parsed.records.iter().map(|r| r.source_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        assert!(parse_imports("import { from 'x';", default_source_type()).is_err());
    }

    #[test]
    fn test_source_type_for_extensions() {
        assert!(source_type_for(Path::new("a.tsx")).is_jsx());
        assert!(source_type_for(Path::new("a.ts")).is_typescript());
        assert!(!source_type_for(Path::new("a.js")).is_typescript());
    }
}
