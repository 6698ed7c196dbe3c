use oxitidy_config::{FormatOptions, TrailingComma};
use oxitidy_core::{GroupedImports, ImportKind, ImportRecord};
use oxitidy_doc::{AlignGroupId, Doc};

/// Lower grouped records into the layout document.
///
/// Each bucket contributes a `// <GroupName>` header and one node per record,
/// with the configured number of blank lines between buckets. All anchors of
/// one bucket share an alignment group id, scoped to this document. Total
/// over any input; buckets without records yield just their header.
pub fn build_doc(grouped: &GroupedImports, options: &FormatOptions) -> Doc {
    let mut children: Vec<Doc> = Vec::new();
    for (index, bucket) in grouped.buckets.iter().enumerate() {
        if index > 0 {
            for _ in 0..options.blank_lines_between_groups {
                children.push(Doc::HardLine);
            }
        }
        let group_id = index as AlignGroupId;
        let mut members = vec![Doc::text(format!("// {}", bucket.group.name)), Doc::HardLine];
        for record in &bucket.records {
            members.push(record_doc(record, group_id, options));
            members.push(Doc::HardLine);
        }
        children.push(Doc::AlignGroup(group_id, members));
    }
    Doc::concat(children)
}

fn record_doc(record: &ImportRecord, group_id: AlignGroupId, options: &FormatOptions) -> Doc {
    let quote = options.quote_style.char();
    // Side-effect and empty records are plain lines outside the alignment.
    if record.kind == ImportKind::SideEffect || record.has_no_bindings() {
        return Doc::text(record.single_line(quote));
    }

    let prefix = record.binding_prefix();
    let suffix = record.source_clause(quote);
    if should_wrap(record, &prefix, &suffix, options) {
        multiline_record(record, group_id, suffix, options)
    } else {
        Doc::anchor(group_id, Doc::text(prefix), Doc::text(suffix), None)
    }
}

/// A named list wraps when an explicit max width is configured and the
/// projected single-line form exceeds it. A lone specifier can wrap the same
/// way under a tight enough width. Without a configured width nothing wraps.
fn should_wrap(record: &ImportRecord, prefix: &str, suffix: &str, options: &FormatOptions) -> bool {
    if record.specifiers.is_empty() {
        return false;
    }
    match options.max_line_width {
        Some(max) => prefix.len() + suffix.len() > max,
        None => false,
    }
}

fn multiline_record(
    record: &ImportRecord,
    group_id: AlignGroupId,
    suffix: String,
    options: &FormatOptions,
) -> Doc {
    let rendered: Vec<String> = record.specifiers.iter().map(|s| s.rendered()).collect();
    let longest = rendered.iter().map(|s| s.len()).max().unwrap_or(0);
    let longest_is_last = rendered.last().map(|s| s.len() == longest).unwrap_or(true);

    // The closing brace aligns one column past the widest interior line:
    // that line carries a comma when the policy always writes one or when the
    // longest specifier is not the last.
    let adjustment =
        if options.trailing_comma == TrailingComma::Always || !longest_is_last { 2 } else { 1 };
    let ideal_width = options.indent_width + longest + adjustment;

    let count = rendered.len();
    let mut lines = Vec::with_capacity(count * 2);
    for (index, spec) in rendered.into_iter().enumerate() {
        lines.push(Doc::HardLine);
        let needs_comma = index + 1 < count || options.trailing_comma == TrailingComma::Always;
        lines.push(Doc::text(if needs_comma { format!("{spec},") } else { spec }));
    }

    let prefix = Doc::concat(vec![
        Doc::text(record.open_prefix()),
        Doc::indent(options.indent_width, Doc::concat(lines)),
        Doc::HardLine,
        Doc::text("} "),
    ]);
    Doc::anchor(group_id, prefix, Doc::text(suffix), Some(ideal_width))
}
