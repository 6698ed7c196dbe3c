use log::trace;
use std::collections::HashSet;

use crate::types::{ImportKind, ImportRecord};

/// Drop bindings named by the unused-name oracle. Specifiers, default and
/// namespace bindings are all candidates; a record left with nothing bound is
/// dropped entirely. Side-effect imports are always kept - removing them
/// would change program behavior. Returns fresh records; the input is never
/// mutated.
pub fn drop_unused(records: &[ImportRecord], unused: &HashSet<String>) -> Vec<ImportRecord> {
    records
        .iter()
        .filter_map(|record| {
            if record.kind == ImportKind::SideEffect {
                return Some(record.clone());
            }
            let mut record = record.clone();
            if let Some(default) = &record.default_local
                && unused.contains(default)
            {
                trace!("Dropping unused default binding '{}'", default);
                record.default_local = None;
            }
            if let Some(ns) = &record.namespace_local
                && unused.contains(ns)
            {
                trace!("Dropping unused namespace binding '{}'", ns);
                record.namespace_local = None;
            }
            record.specifiers.retain(|s| {
                let keep = !unused.contains(&s.local);
                if !keep {
                    trace!("Dropping unused specifier '{}'", s.local);
                }
                keep
            });
            if record.has_no_bindings() {
                trace!("Dropping fully unused import of '{}'", record.source);
                None
            } else {
                Some(record)
            }
        })
        .collect()
}

/// Drop records whose module source the missing-module oracle flagged as
/// unresolvable, unless configured to keep them.
pub fn drop_missing(
    records: &[ImportRecord],
    missing: &HashSet<String>,
    keep: bool,
) -> Vec<ImportRecord> {
    if keep {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| {
            let keep = !missing.contains(&record.source);
            if !keep {
                trace!("Dropping import of unresolvable module '{}'", record.source);
            }
            keep
        })
        .cloned()
        .collect()
}
