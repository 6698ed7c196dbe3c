use std::collections::HashMap;

use crate::ir::{AlignGroupId, Doc};
use crate::measure::{advance, measure};

/// Second pass: emit text using the widths resolved by [`measure`]. An
/// anchor's prefix is padded on the right to `max(resolved, actual)` - never
/// below its actual width - before the suffix is appended; a multi-line
/// prefix pads only its last line.
pub fn render(doc: &Doc, widths: &HashMap<AlignGroupId, usize>) -> String {
    let mut out = String::new();
    let mut col = 0usize;
    write(doc, 0, widths, &mut out, &mut col);
    out
}

/// Measure then render. The measure pass visits every anchor of a group
/// before the render pass touches any of them; there is no streaming
/// shortcut.
pub fn print(doc: &Doc) -> String {
    let widths = measure(doc);
    render(doc, &widths)
}

fn write(
    doc: &Doc,
    indent: usize,
    widths: &HashMap<AlignGroupId, usize>,
    out: &mut String,
    col: &mut usize,
) {
    match doc {
        Doc::Text(text) => {
            out.push_str(text);
            *col = advance(*col, text);
        }
        Doc::HardLine => {
            out.push('\n');
            for _ in 0..indent {
                out.push(' ');
            }
            *col = indent;
        }
        Doc::Indent(extra, child) => write(child, indent + extra, widths, out, col),
        Doc::Concat(children) | Doc::AlignGroup(_, children) => {
            for child in children {
                write(child, indent, widths, out, col);
            }
        }
        Doc::AlignAnchor { group, prefix, suffix, .. } => {
            let mut buf = String::new();
            let mut prefix_col = *col;
            write(prefix, indent, widths, &mut buf, &mut prefix_col);

            let resolved = widths.get(group).copied().unwrap_or(0);
            let padded = resolved.max(prefix_col);
            for _ in prefix_col..padded {
                buf.push(' ');
            }
            out.push_str(&buf);
            *col = padded;

            write(suffix, indent, widths, out, col);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchors_share_a_column() {
        let doc = Doc::concat(vec![
            Doc::anchor(0, Doc::text("import { a } "), Doc::text("from 'a';"), None),
            Doc::HardLine,
            Doc::anchor(0, Doc::text("import { bb } "), Doc::text("from 'b';"), None),
        ]);
        assert_eq!(print(&doc), "import { a }  from 'a';\nimport { bb } from 'b';");
    }

    #[test]
    fn test_never_pads_below_actual_width() {
        // Resolved width 0 for an unknown group: prefix keeps its own width.
        let doc = Doc::anchor(7, Doc::text("wide prefix "), Doc::text("s"), None);
        assert_eq!(render(&doc, &HashMap::new()), "wide prefix s");
    }

    #[test]
    fn test_alignment_monotonicity() {
        let prefixes = ["a ", "bbbb ", "cc "];
        let children: Vec<Doc> = prefixes
            .iter()
            .flat_map(|p| [Doc::anchor(0, Doc::text(*p), Doc::text("x"), None), Doc::HardLine])
            .collect();
        let doc = Doc::concat(children);
        let resolved = measure(&doc)[&0];
        assert!(prefixes.iter().all(|p| resolved >= p.len()));
    }

    #[test]
    fn test_multiline_prefix_pads_last_line_only() {
        let prefix = Doc::concat(vec![
            Doc::text("import {"),
            Doc::indent(4, Doc::concat(vec![Doc::HardLine, Doc::text("spec,")])),
            Doc::HardLine,
            Doc::text("} "),
        ]);
        let doc = Doc::concat(vec![
            Doc::anchor(0, prefix, Doc::text("from 'x';"), Some(10)),
            Doc::HardLine,
        ]);
        assert_eq!(print(&doc), "import {\n    spec,\n}         from 'x';\n");
    }

    #[test]
    fn test_indent_emitted_after_hard_line() {
        let doc = Doc::indent(2, Doc::concat(vec![Doc::text("a"), Doc::HardLine, Doc::text("b")]));
        assert_eq!(print(&doc), "a\n  b");
    }

    #[test]
    fn test_fixed_point_on_plain_text() {
        let doc = Doc::concat(vec![Doc::text("// Other"), Doc::HardLine, Doc::text("import 'x';")]);
        let once = print(&doc);
        assert_eq!(print(&doc), once);
    }

    #[test]
    fn test_empty_concat_renders_empty() {
        assert_eq!(print(&Doc::concat(Vec::new())), "");
    }
}
