//! Line grammar: one line of text → one `LineKind`.
//!
//! The grammar is fixed and line-oriented. Matching precedence, first match
//! wins:
//!
//! 1. blank line
//! 2. `A -> B`: edge, right(source) / left(target) anchors
//! 3. `A -} B`: edge, bottom(source) / top(target) anchors (`-]` is the
//!    legacy spelling of the same connector)
//! 4. `x,y,Label`: node placed at integer coordinates
//! 5. anything else: standalone node named by the full trimmed line
//!
//! Labels are not escaped: a label containing a connector token cannot be
//! written. `classify` never fails.

use crate::model::AnchorPair;
use winnow::ascii::digit1;
use winnow::combinator::opt;
use winnow::prelude::*;

/// Connector for right→left edges.
pub const RIGHT_LEFT: &str = "->";
/// Connector for bottom→top edges.
pub const BOTTOM_TOP: &str = "-}";
/// Legacy spelling accepted as a synonym for [`BOTTOM_TOP`]. Never emitted.
pub const BOTTOM_TOP_LEGACY: &str = "-]";

/// The meaning of one line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty or whitespace-only. Still consumes a line index.
    Blank,
    /// A relationship between two labels.
    Edge {
        source: &'a str,
        target: &'a str,
        anchors: AnchorPair,
    },
    /// A node pinned at explicit coordinates.
    PositionedNode { x: i64, y: i64, label: &'a str },
    /// A bare label.
    StandaloneNode(&'a str),
}

/// A line of the document together with its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentLine<'a> {
    pub index: usize,
    /// The line exactly as written, including any trailing `\r`.
    pub raw: &'a str,
}

impl<'a> DocumentLine<'a> {
    /// Labels in the result borrow from the document, not from `self`.
    pub fn kind(&self) -> LineKind<'a> {
        classify(self.raw)
    }
}

/// Split a document into lines.
///
/// Splits on `\n` only, so joining the raw lines back with `\n` reproduces
/// the input byte for byte and indices line up with what the user sees.
pub fn lines(text: &str) -> impl Iterator<Item = DocumentLine<'_>> {
    text.split('\n')
        .enumerate()
        .map(|(index, raw)| DocumentLine { index, raw })
}

/// Classify a single line.
#[must_use]
pub fn classify(line: &str) -> LineKind<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }

    if let Some((source, target)) = split_at_connector(line, &[RIGHT_LEFT]) {
        return LineKind::Edge {
            source,
            target,
            anchors: AnchorPair::RightLeft,
        };
    }

    if let Some((source, target)) = split_at_connector(line, &[BOTTOM_TOP, BOTTOM_TOP_LEGACY]) {
        return LineKind::Edge {
            source,
            target,
            anchors: AnchorPair::BottomTop,
        };
    }

    if let Some((x, y, label)) = parse_positioned(line) {
        return LineKind::PositionedNode { x, y, label };
    }

    LineKind::StandaloneNode(line)
}

// ─── Low-level matchers ─────────────────────────────────────────────────

/// Split a trimmed line at the first connector that has text on both sides.
///
/// The source side is the shortest non-empty prefix, the target side is
/// everything after the connector. Both come back trimmed.
fn split_at_connector<'a>(line: &'a str, connectors: &[&str]) -> Option<(&'a str, &'a str)> {
    line.char_indices()
        .filter(|&(at, c)| at > 0 && c == '-')
        .find_map(|(at, _)| {
            let rest = &line[at..];
            let len = connectors.iter().find(|c| rest.starts_with(**c))?.len();
            let target = line[at + len..].trim();
            (!target.is_empty()).then(|| (line[..at].trim(), target))
        })
}

/// `<int>,<int>,<label>` on an already trimmed line.
fn parse_positioned(line: &str) -> Option<(i64, i64, &str)> {
    let mut input = line;
    let (x, _, y, _) = (parse_coordinate, ',', parse_coordinate, ',')
        .parse_next(&mut input)
        .ok()?;
    let label = input.trim();
    (!label.is_empty()).then_some((x, y, label))
}

/// An optionally negative run of ASCII digits that fits in `i64`.
fn parse_coordinate(input: &mut &str) -> ModalResult<i64> {
    (opt('-'), digit1)
        .take()
        .try_map(|s: &str| s.parse::<i64>())
        .parse_next(input)
}
