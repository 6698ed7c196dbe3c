/// Identifies one set of anchors whose prefixes must share a column. Ids are
/// scoped to a single printer invocation, not globally unique.
pub type AlignGroupId = u32;

/// The document tree the printer consumes. A tagged union rather than a node
/// hierarchy, so both passes are exhaustive matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Doc {
    /// Literal text, written verbatim. May contain no trailing newline;
    /// line breaks belong to `HardLine`.
    Text(String),
    /// Unconditional line break. The next line starts at the active indent.
    HardLine,
    /// Child lines start `usize` columns further right.
    Indent(usize, Box<Doc>),
    /// Children in sequence. Also serves as the document root.
    Concat(Vec<Doc>),
    /// A prefix that must end at the same column as every sibling anchor
    /// sharing `group`, padded on the right before `suffix` is appended.
    /// `ideal_width` raises the group column without widening any prefix.
    AlignAnchor {
        group: AlignGroupId,
        prefix: Box<Doc>,
        suffix: Box<Doc>,
        ideal_width: Option<usize>,
    },
    /// Children that carry the anchors of one alignment group. Layout-wise
    /// identical to `Concat`; kept as its own tag so trees read the way they
    /// are scoped.
    AlignGroup(AlignGroupId, Vec<Doc>),
}

impl Doc {
    pub fn text(text: impl Into<String>) -> Doc {
        Doc::Text(text.into())
    }

    pub fn concat(children: Vec<Doc>) -> Doc {
        Doc::Concat(children)
    }

    pub fn indent(width: usize, child: Doc) -> Doc {
        Doc::Indent(width, Box::new(child))
    }

    pub fn anchor(group: AlignGroupId, prefix: Doc, suffix: Doc, ideal_width: Option<usize>) -> Doc {
        Doc::AlignAnchor {
            group,
            prefix: Box::new(prefix),
            suffix: Box::new(suffix),
            ideal_width,
        }
    }
}
