use log::trace;
use std::collections::HashSet;

use crate::types::ImportSpecifier;

/// How named specifier lists (and same-rank records inside a group) are
/// ordered. `Preserve` corresponds to `false` in config files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpecifierSort {
    Preserve,
    Alpha,
    #[default]
    Length,
}

/// Drop duplicate specifiers, keyed by rendered form, first occurrence wins.
/// The input slice is never mutated.
pub fn dedup_specifiers(specifiers: &[ImportSpecifier]) -> Vec<ImportSpecifier> {
    let mut seen: HashSet<String> = HashSet::with_capacity(specifiers.len());
    let mut out = Vec::with_capacity(specifiers.len());
    for spec in specifiers {
        if seen.insert(spec.rendered()) {
            out.push(spec.clone());
        } else {
            trace!("Dropping duplicate specifier '{}'", spec.rendered());
        }
    }
    out
}

/// Sort a named specifier list. `Length` is ascending rendered length, stable
/// on ties; `Alpha` is lexicographic on the local name. Default, namespace
/// and side-effect bindings never pass through here.
pub fn sort_specifiers(mut specifiers: Vec<ImportSpecifier>, mode: SpecifierSort) -> Vec<ImportSpecifier> {
    match mode {
        SpecifierSort::Preserve => {}
        SpecifierSort::Alpha => specifiers.sort_by(|a, b| a.local.cmp(&b.local)),
        SpecifierSort::Length => specifiers.sort_by_key(|s| s.rendered().len()),
    }
    specifiers
}
