use log::trace;
use std::collections::HashMap;

use crate::ir::{AlignGroupId, Doc};

/// First pass: resolve the column width of every alignment group.
///
/// Walks the tree with a current-line-width counter that resets at every
/// `HardLine` and grows with each text node's last-line length. At each
/// anchor the candidate is `max(ideal_width, measured prefix width)`, folded
/// into a per-group running maximum. Groups without anchors are absent from
/// the result.
pub fn measure(doc: &Doc) -> HashMap<AlignGroupId, usize> {
    let mut widths = HashMap::new();
    let mut col = 0usize;
    visit(doc, 0, &mut col, &mut widths);
    trace!("Resolved {} alignment group widths", widths.len());
    widths
}

fn visit(doc: &Doc, indent: usize, col: &mut usize, widths: &mut HashMap<AlignGroupId, usize>) {
    match doc {
        Doc::Text(text) => *col = advance(*col, text),
        Doc::HardLine => *col = indent,
        Doc::Indent(extra, child) => visit(child, indent + extra, col, widths),
        Doc::Concat(children) | Doc::AlignGroup(_, children) => {
            for child in children {
                visit(child, indent, col, widths);
            }
        }
        Doc::AlignAnchor { group, prefix, suffix, ideal_width } => {
            visit(prefix, indent, col, widths);
            let candidate = ideal_width.unwrap_or(0).max(*col);
            let entry = widths.entry(*group).or_insert(0);
            if candidate > *entry {
                *entry = candidate;
            }
            // The render pass pads at least to the prefix's own width, so
            // continuing from the unpadded column keeps later hard lines
            // correct; suffixes end their lines in practice.
            visit(suffix, indent, col, widths);
        }
    }
}

/// Width of the line the cursor is on after writing `text` at column `col`.
/// Text is written verbatim, so anything after an embedded newline starts at
/// column zero.
pub(crate) fn advance(col: usize, text: &str) -> usize {
    match text.rfind('\n') {
        Some(pos) => text.len() - pos - 1,
        None => col + text.len(),
    }
}
