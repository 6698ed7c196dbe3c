use regex::Regex;

/// Order assigned to groups that do not declare one. Groups at the sentinel
/// sort after every explicitly ordered group.
pub const DEFAULT_GROUP_ORDER: u32 = 999;

/// Byte range into the original source text, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    SideEffect,
    Default,
    Namespace,
    Named,
    TypeDefault,
    TypeNamed,
}

/// One named binding, `imported` as it appears in the source module and
/// `local` as it is bound in the importing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpecifier {
    pub imported: String,
    pub local: String,
    pub is_type: bool,
}

impl ImportSpecifier {
    pub fn new(imported: impl Into<String>, local: impl Into<String>) -> Self {
        Self { imported: imported.into(), local: local.into(), is_type: false }
    }

    /// The form this specifier takes inside braces: `local`, `imported as
    /// local`, with a `type ` prefix when the specifier is type-qualified.
    /// Dedup keys and length sorting both work on this string.
    pub fn rendered(&self) -> String {
        let base = if self.imported == self.local {
            self.local.clone()
        } else {
            format!("{} as {}", self.imported, self.local)
        };
        if self.is_type { format!("type {base}") } else { base }
    }
}

/// One classified import or re-export declaration. Built once from the AST
/// and only replaced wholesale, never mutated in place.
#[derive(Debug, Clone)]
pub struct ImportRecord {
    pub kind: ImportKind,
    pub source: String,
    pub default_local: Option<String>,
    pub namespace_local: Option<String>,
    pub specifiers: Vec<ImportSpecifier>,
    pub is_type_only: bool,
    pub is_re_export: bool,
    /// Position among the parsed declarations, used as the stable tie-break.
    pub source_index: usize,
    pub group_name: Option<String>,
    pub span: ByteSpan,
}

impl ImportRecord {
    /// True when nothing is bound by this record (and it is not a bare
    /// side-effect import), e.g. `import {} from 'x'` or a record emptied by
    /// the unused-name filter.
    pub fn has_no_bindings(&self) -> bool {
        self.kind != ImportKind::SideEffect
            && self.default_local.is_none()
            && self.namespace_local.is_none()
            && self.specifiers.is_empty()
    }

    fn keyword(&self) -> &'static str {
        if self.is_re_export { "export" } else { "import" }
    }

    /// Everything up to and including the opening brace of the named list,
    /// e.g. `import {`, `import type {`, `import React, {`. Only meaningful
    /// for records with named specifiers.
    pub fn open_prefix(&self) -> String {
        let mut out = String::from(self.keyword());
        if self.is_type_only {
            out.push_str(" type");
        }
        if let Some(default) = &self.default_local {
            out.push(' ');
            out.push_str(default);
            out.push(',');
        }
        out.push_str(" {");
        out
    }

    /// The declaration through the closing brace or identifier plus one
    /// space, i.e. the part that gets column-aligned before `from`. Empty for
    /// side-effect records.
    pub fn binding_prefix(&self) -> String {
        if self.kind == ImportKind::SideEffect {
            return String::new();
        }
        let mut out = String::from(self.keyword());
        if self.is_type_only {
            out.push_str(" type");
        }
        let mut wrote_binding = false;
        if let Some(default) = &self.default_local {
            out.push(' ');
            out.push_str(default);
            wrote_binding = true;
        }
        if let Some(ns) = &self.namespace_local {
            out.push_str(if wrote_binding { ", * as " } else { " * as " });
            out.push_str(ns);
            wrote_binding = true;
        } else if self.kind == ImportKind::Namespace && self.namespace_local.is_none() {
            // `export * from 'x';`
            out.push_str(" *");
            wrote_binding = true;
        }
        if !self.specifiers.is_empty() || !wrote_binding {
            if wrote_binding {
                out.push(',');
            }
            if self.specifiers.is_empty() {
                out.push_str(" {}");
            } else {
                out.push_str(" { ");
                let rendered: Vec<String> = self.specifiers.iter().map(|s| s.rendered()).collect();
                out.push_str(&rendered.join(", "));
                out.push_str(" }");
            }
        }
        out.push(' ');
        out
    }

    /// `from '<source>';` with the configured quote character.
    pub fn source_clause(&self, quote: char) -> String {
        format!("from {quote}{}{quote};", self.source)
    }

    /// The whole declaration on one line. Used for width projection and for
    /// length-ordered records inside a group.
    pub fn single_line(&self, quote: char) -> String {
        if self.kind == ImportKind::SideEffect {
            format!("import {quote}{}{quote};", self.source)
        } else {
            format!("{}{}", self.binding_prefix(), self.source_clause(quote))
        }
    }
}

/// Named bucket imports are classified into. The matcher is compiled from the
/// config `match` string when the effective policy is built; the catch-all
/// carries no matcher.
#[derive(Debug, Clone)]
pub struct Group {
    pub name: String,
    pub matcher: Option<Regex>,
    pub order: u32,
    pub is_default: bool,
}

impl Group {
    pub fn catch_all(name: impl Into<String>) -> Self {
        Self { name: name.into(), matcher: None, order: DEFAULT_GROUP_ORDER, is_default: true }
    }
}

#[derive(Debug, Clone)]
pub struct GroupBucket {
    pub group: Group,
    pub records: Vec<ImportRecord>,
}

/// Ordered (group, records) pairs. Every input record lands in exactly one
/// bucket; buckets for groups that matched nothing are kept so callers can
/// decide whether to render them.
#[derive(Debug, Clone, Default)]
pub struct GroupedImports {
    pub buckets: Vec<GroupBucket>,
}

impl GroupedImports {
    pub fn record_count(&self) -> usize {
        self.buckets.iter().map(|b| b.records.len()).sum()
    }
}
