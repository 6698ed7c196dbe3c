use log::{debug, trace, warn};
use std::cmp::Ordering;

use crate::specifiers::SpecifierSort;
use crate::types::{Group, GroupBucket, GroupedImports, ImportKind, ImportRecord};

/// Rank weights deciding how the kinds interleave inside one group. Lower
/// ranks render first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindRanks {
    pub side_effect: u32,
    pub default: u32,
    pub namespace: u32,
    pub named: u32,
    pub type_only: u32,
}

impl Default for KindRanks {
    fn default() -> Self {
        Self { side_effect: 0, default: 1, namespace: 2, named: 3, type_only: 4 }
    }
}

impl KindRanks {
    pub fn rank(&self, kind: ImportKind) -> u32 {
        match kind {
            ImportKind::SideEffect => self.side_effect,
            ImportKind::Default => self.default,
            ImportKind::Namespace => self.namespace,
            ImportKind::Named => self.named,
            ImportKind::TypeDefault | ImportKind::TypeNamed => self.type_only,
        }
    }
}

/// Put groups into matching order and guarantee exactly one catch-all:
/// none configured synthesizes "Other" at the sentinel order, extras beyond
/// the first are demoted with a warning. Ties on `order` break by
/// declaration order. Idempotent, so policy conversion and classification
/// can both call it.
pub fn normalize_groups(groups: &[Group]) -> Vec<Group> {
    let mut out: Vec<Group> = groups.to_vec();

    let mut seen_default = false;
    for group in &mut out {
        if group.is_default {
            if seen_default {
                warn!("Multiple catch-all groups configured; keeping the first, demoting '{}'", group.name);
                group.is_default = false;
            }
            seen_default = true;
        }
    }
    if !seen_default {
        debug!("No catch-all group configured, synthesizing 'Other'");
        out.push(Group::catch_all("Other"));
    }

    let mut indexed: Vec<(usize, Group)> = out.into_iter().enumerate().collect();
    indexed.sort_by_key(|(idx, g)| (g.order, *idx));
    indexed.into_iter().map(|(_, g)| g).collect()
}

/// Assign every record to a group and order the buckets' contents. Matchers
/// are tested in ascending group order, first hit wins; anything unmatched
/// lands in the catch-all. Buckets exist for every group, matched or not.
pub fn classify(
    records: Vec<ImportRecord>,
    groups: &[Group],
    ranks: &KindRanks,
    order_mode: SpecifierSort,
) -> GroupedImports {
    let groups = normalize_groups(groups);

    let mut buckets: Vec<GroupBucket> =
        groups.iter().map(|g| GroupBucket { group: g.clone(), records: Vec::new() }).collect();

    for mut record in records {
        let slot = match_group(&groups, &record.source);
        trace!("Classified '{}' into group '{}'", record.source, groups[slot].name);
        record.group_name = Some(groups[slot].name.clone());
        buckets[slot].records.push(record);
    }

    for bucket in &mut buckets {
        order_records(&mut bucket.records, ranks, order_mode);
    }

    GroupedImports { buckets }
}

fn match_group(groups: &[Group], source: &str) -> usize {
    for (idx, group) in groups.iter().enumerate() {
        if let Some(matcher) = &group.matcher
            && matcher.is_match(source)
        {
            return idx;
        }
    }
    // normalize_groups guarantees the catch-all exists
    groups.iter().position(|g| g.is_default).unwrap_or(groups.len() - 1)
}

fn order_records(records: &mut [ImportRecord], ranks: &KindRanks, mode: SpecifierSort) {
    records.sort_by(|a, b| {
        ranks
            .rank(a.kind)
            .cmp(&ranks.rank(b.kind))
            .then_with(|| match mode {
                SpecifierSort::Preserve => Ordering::Equal,
                SpecifierSort::Alpha => a.source.cmp(&b.source),
                // Longest statement first, so the group reads as a cascade
                // down to the aligned `from` column.
                SpecifierSort::Length => b
                    .single_line('\'')
                    .len()
                    .cmp(&a.single_line('\'').len())
                    .then_with(|| a.source.cmp(&b.source)),
            })
            .then_with(|| a.source_index.cmp(&b.source_index))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ByteSpan, ImportSpecifier};
    use regex::Regex;

    fn record(source: &str, kind: ImportKind, index: usize) -> ImportRecord {
        ImportRecord {
            kind,
            source: source.to_string(),
            default_local: None,
            namespace_local: None,
            specifiers: vec![ImportSpecifier::new("a", "a")],
            is_type_only: false,
            is_re_export: false,
            source_index: index,
            group_name: None,
            span: ByteSpan { start: 0, end: 0 },
        }
    }

    fn group(name: &str, pattern: &str, order: u32) -> Group {
        Group {
            name: name.to_string(),
            matcher: Some(Regex::new(pattern).unwrap()),
            order,
            is_default: false,
        }
    }

    #[test]
    fn test_every_record_lands_in_exactly_one_bucket() {
        let groups = vec![group("React", "^react", 1)];
        let records =
            vec![record("react", ImportKind::Named, 0), record("./local", ImportKind::Named, 1)];
        let grouped = classify(records, &groups, &KindRanks::default(), SpecifierSort::Preserve);
        assert_eq!(grouped.record_count(), 2);
        let names: Vec<&str> = grouped.buckets.iter().map(|b| b.group.name.as_str()).collect();
        assert_eq!(names, vec!["React", "Other"]);
        assert_eq!(grouped.buckets[0].records.len(), 1);
        assert_eq!(grouped.buckets[1].records.len(), 1);
    }

    #[test]
    fn test_exact_match_has_no_implicit_prefix() {
        let groups = vec![group("React", "^react$", 1)];
        let records =
            vec![record("react", ImportKind::Named, 0), record("react-dom", ImportKind::Named, 1)];
        let grouped = classify(records, &groups, &KindRanks::default(), SpecifierSort::Preserve);
        assert_eq!(grouped.buckets[0].records[0].source, "react");
        assert_eq!(grouped.buckets[1].records[0].source, "react-dom");
    }

    #[test]
    fn test_first_matching_group_wins() {
        let groups = vec![group("A", "^lib", 1), group("B", "^lib-extra$", 2)];
        let records = vec![record("lib-extra", ImportKind::Named, 0)];
        let grouped = classify(records, &groups, &KindRanks::default(), SpecifierSort::Preserve);
        assert_eq!(grouped.buckets[0].records.len(), 1);
    }

    #[test]
    fn test_matchers_tested_in_ascending_order() {
        // B declares the lower order, so it is tested first despite being
        // listed second.
        let groups = vec![group("A", "^lib", 5), group("B", "^lib", 1)];
        let records = vec![record("lib", ImportKind::Named, 0)];
        let grouped = classify(records, &groups, &KindRanks::default(), SpecifierSort::Preserve);
        assert_eq!(grouped.buckets[0].group.name, "B");
        assert_eq!(grouped.buckets[0].records.len(), 1);
    }

    #[test]
    fn test_group_name_is_recorded() {
        let grouped = classify(
            vec![record("./x", ImportKind::Named, 0)],
            &[],
            &KindRanks::default(),
            SpecifierSort::Preserve,
        );
        assert_eq!(grouped.buckets[0].records[0].group_name.as_deref(), Some("Other"));
    }

    #[test]
    fn test_normalize_synthesizes_catch_all() {
        let normalized = normalize_groups(&[group("React", "^react$", 1)]);
        assert_eq!(normalized.len(), 2);
        assert!(normalized[1].is_default);
        assert_eq!(normalized[1].name, "Other");
    }

    #[test]
    fn test_normalize_demotes_extra_catch_alls() {
        let mut a = group("A", "a", 1);
        a.is_default = true;
        let mut b = group("B", "b", 2);
        b.is_default = true;
        let normalized = normalize_groups(&[a, b]);
        assert_eq!(normalized.iter().filter(|g| g.is_default).count(), 1);
        assert!(normalized[0].is_default);
    }

    #[test]
    fn test_order_ties_break_by_declaration_order() {
        let normalized = normalize_groups(&[group("First", "a", 3), group("Second", "b", 3)]);
        assert_eq!(normalized[0].name, "First");
        assert_eq!(normalized[1].name, "Second");
    }

    #[test]
    fn test_kind_ranks_before_length() {
        let records = vec![
            record("./long-named-source", ImportKind::Named, 0),
            record("./s", ImportKind::SideEffect, 1),
        ];
        let grouped = classify(records, &[], &KindRanks::default(), SpecifierSort::Length);
        let bucket = &grouped.buckets[0];
        assert_eq!(bucket.records[0].kind, ImportKind::SideEffect);
    }

    #[test]
    fn test_length_orders_longest_statement_first() {
        let records =
            vec![record("zod", ImportKind::Named, 0), record("alpha", ImportKind::Named, 1)];
        let grouped = classify(records, &[], &KindRanks::default(), SpecifierSort::Length);
        let sources: Vec<&str> =
            grouped.buckets[0].records.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["alpha", "zod"]);
    }

    #[test]
    fn test_preserve_orders_by_source_index() {
        let records =
            vec![record("zebra", ImportKind::Named, 0), record("ant", ImportKind::Named, 1)];
        let grouped = classify(records, &[], &KindRanks::default(), SpecifierSort::Preserve);
        let sources: Vec<&str> =
            grouped.buckets[0].records.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["zebra", "ant"]);
    }
}
