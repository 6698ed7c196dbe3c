use regex::Regex;
use std::sync::LazyLock;

use oxitidy_core::ByteSpan;

/// A file opts out of formatting when this comment is the sole content of a
/// line.
pub const SKIP_PRAGMA: &str = "// oxitidy-ignore";

// Matches `import(` and `await import (` alike. Comments inside the block
// match too; the check fails closed on purpose.
static DYNAMIC_IMPORT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bimport\s*\(").unwrap());

pub fn has_skip_pragma(source: &str) -> bool {
    source.lines().any(|line| line.trim() == SKIP_PRAGMA)
}

pub fn has_dynamic_import(block_text: &str) -> bool {
    DYNAMIC_IMPORT.is_match(block_text)
}

/// Expand a raw statement span to whole lines. The end lands just past the
/// trailing newline when there is one.
pub fn extend_to_lines(source: &str, span: ByteSpan) -> ByteSpan {
    let start = source[..span.start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = source[span.end..].find('\n').map(|i| span.end + i + 1).unwrap_or(source.len());
    ByteSpan { start, end }
}

/// Pull the block start upward over group-header comments a previous run
/// emitted, so re-formatting consumes its own headers instead of stacking new
/// ones. Blank lines are only crossed when a header sits above them.
pub fn extend_over_headers(source: &str, mut start: usize, group_names: &[String]) -> usize {
    while start > 0 {
        let prev_start = source[..start - 1].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let prev_line = source[prev_start..start - 1].trim();
        if is_group_header(prev_line, group_names)
            || (prev_line.is_empty() && has_header_above(source, prev_start, group_names))
        {
            start = prev_start;
            continue;
        }
        break;
    }
    start
}

fn is_group_header(line: &str, group_names: &[String]) -> bool {
    line.strip_prefix("// ")
        .map(|rest| group_names.iter().any(|name| name == rest.trim()))
        .unwrap_or(false)
}

fn has_header_above(source: &str, mut pos: usize, group_names: &[String]) -> bool {
    while pos > 0 {
        let prev_start = source[..pos - 1].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line = source[prev_start..pos - 1].trim();
        if line.is_empty() {
            pos = prev_start;
            continue;
        }
        return is_group_header(line, group_names);
    }
    false
}
