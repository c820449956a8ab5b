//! Break opportunities and piece widths.
//!
//! [§ 5 Line Breaking and Word Boundaries](https://www.w3.org/TR/css-text-3/#line-breaking)
//!
//! "When inline-level content is laid out into lines, it is broken across
//! line boxes. Such a break is called a line break. When a line is broken
//! due to explicit line-breaking controls (such as a preserved newline
//! character), or due to the start or end of a block, it is a forced line
//! break. When a line is broken due to content wrapping (i.e. when the UA
//! creates unforced line breaks in order to fit the content within the
//! measure), it is a soft wrap break."

use super::whitespace::{NEWLINE, SPACE};
use super::{Entry, Paragraph};
use crate::layout::{BoxId, BoxKind, BoxTree, LayoutContext};
use crate::style::{Style, WhiteSpace, WordBreak};
use crate::text::BreakOpportunity;

/// Style governing the code unit at `index`: the run's for text, the
/// parent inline's for an atomic inline.
pub(super) fn unit_style<'a>(tree: &'a BoxTree, paragraph: &Paragraph, index: usize) -> Option<&'a Style> {
    let owner = *paragraph.owners.get(index)?;
    let node = &tree[owner];
    match node.kind {
        BoxKind::Run(_) => Some(&node.style),
        _ => node.parent.map(|parent| tree[parent].style.as_ref()),
    }
}

/// [§ 4.1.2 Phase II: Trimming and Positioning](https://www.w3.org/TR/css-text-3/#white-space-phase-2)
///
/// "A sequence of collapsible spaces at the beginning of a line is removed."
pub(super) fn is_collapsible_space(tree: &BoxTree, paragraph: &Paragraph, index: usize) -> bool {
    paragraph.text.get(index) == Some(&SPACE)
        && unit_style(tree, paragraph, index).is_some_and(Style::is_ws_collapsible)
}

/// "A sequence of collapsible spaces at the end of a line is removed" and
/// preserved spaces at the end of a `pre-wrap` line hang. Newlines never
/// take room.
pub(super) fn is_hangable(tree: &BoxTree, paragraph: &Paragraph, index: usize) -> bool {
    match paragraph.text.get(index) {
        Some(&NEWLINE) => true,
        Some(&SPACE) => {
            unit_style(tree, paragraph, index).is_some_and(|style| style.white_space != WhiteSpace::Pre)
        }
        _ => false,
    }
}

/// Margin, border and padding of inline box `id` on its line-left and
/// line-right sides.
pub(super) fn inline_edges(tree: &BoxTree, id: BoxId) -> (f32, f32) {
    let cb = tree.containing_block(id);
    let style = &tree[id].style;
    let left = style.margin_line_left(&cb).to_px_or(0.0)
        + style.border_line_left_width(&cb)
        + style.padding_line_left(&cb);
    let right = style.margin_line_right(&cb).to_px_or(0.0)
        + style.border_line_right_width(&cb)
        + style.padding_line_right(&cb);
    (left, right)
}

/// Widths of buffer ranges on a line: code unit advances plus the inline
/// margins, borders and padding of inline boxes that start or end inside
/// the range.
///
/// Ranges are measured from prefix sums, so any range costs the same.
#[derive(Debug, Clone, PartialEq, Default)]
pub(super) struct Widths {
    /// Line-left edges of inline boxes starting at each position.
    start_edges: Vec<f32>,
    /// Sum of the advances before each position.
    advance_sums: Vec<f64>,
    /// Sum of the line-left edges before each position.
    start_sums: Vec<f64>,
    /// Sum of the line-right edges of boxes ending before each position.
    end_sums: Vec<f64>,
}

fn prefix_sums(values: &[f32]) -> Vec<f64> {
    let mut sums = Vec::with_capacity(values.len() + 1);
    let mut total = 0.0;
    sums.push(total);
    for &value in values {
        total += f64::from(value);
        sums.push(total);
    }
    sums
}

#[allow(clippy::cast_possible_truncation)]
fn range_sum(sums: &[f64], start: usize, end: usize) -> f32 {
    (sums[end] - sums[start]) as f32
}

impl Widths {
    /// Widths for `paragraph`, with atomic inlines measured by
    /// `atomic_width`.
    pub fn new(tree: &BoxTree, paragraph: &Paragraph, atomic_width: impl Fn(BoxId) -> f32) -> Self {
        let len = paragraph.text.len();
        let mut advances = paragraph.advances.clone();
        advances.resize(len, 0.0);
        let mut start_edges = vec![0.0; len + 1];
        let mut end_edges = vec![0.0; len + 1];

        for entry in &paragraph.entries {
            match *entry {
                Entry::Start(id) => {
                    let BoxKind::Inline(inline) = &tree[id].kind else {
                        continue;
                    };
                    let (left, right) = inline_edges(tree, id);
                    start_edges[inline.text_start] += left;
                    end_edges[inline.text_end] += right;
                }
                Entry::Atomic { id, position } => advances[position] = atomic_width(id),
                _ => {}
            }
        }

        Self::from_parts(&advances, start_edges, &end_edges)
    }

    /// Widths from per-position values. `start_edges` and `end_edges` have
    /// one entry more than `advances`.
    pub fn from_parts(advances: &[f32], start_edges: Vec<f32>, end_edges: &[f32]) -> Self {
        Self {
            advance_sums: prefix_sums(advances),
            start_sums: prefix_sums(&start_edges),
            end_sums: prefix_sums(end_edges),
            start_edges,
        }
    }

    /// Line-left edges of the inline boxes starting at `position`.
    pub fn start_edge(&self, position: usize) -> f32 {
        self.start_edges.get(position).copied().unwrap_or(0.0)
    }

    /// Width of `[start, end)`.
    pub fn width(&self, start: usize, end: usize) -> f32 {
        if end <= start {
            return 0.0;
        }
        self.advance(start, end)
            + range_sum(&self.start_sums, start, end)
            + self.end_edges_between(start, end)
    }

    /// Line-right edges of inline boxes ending in `(start, end]`.
    pub fn end_edges_between(&self, start: usize, end: usize) -> f32 {
        if end <= start {
            return 0.0;
        }
        range_sum(&self.end_sums, start + 1, end + 1)
    }

    /// Advances only, for white space hanging at a line end.
    pub fn advance(&self, start: usize, end: usize) -> f32 {
        if end <= start {
            return 0.0;
        }
        range_sum(&self.advance_sums, start, end)
    }
}

/// [§ 5.1 Line Breaking Details](https://www.w3.org/TR/css-text-3/#line-break-details)
///
/// All break opportunities of `paragraph` in ascending order, ending with
/// the end of the buffer.
///
/// - Soft opportunities come from the injected breaker and are dropped
///   after text that does not wrap (`nowrap`, `pre`).
/// - `word-break: break-all` adds every grapheme boundary inside its text,
///   except next to spaces.
/// - `<br>` is a forced break at its position. Several at one position
///   each force a line.
pub(super) fn break_opportunities(
    tree: &BoxTree,
    paragraph: &Paragraph,
    ctx: &LayoutContext<'_>,
) -> Vec<BreakOpportunity> {
    let text = &paragraph.text;
    let len = text.len();
    let mut breaks: Vec<BreakOpportunity> = Vec::new();

    // STEP 1: UAX #14.
    for opportunity in ctx.line_breaker.create(text, false) {
        if opportunity.position == 0 || opportunity.position > len {
            continue;
        }
        let wraps = unit_style(tree, paragraph, opportunity.position - 1)
            .is_none_or(|style| !style.white_space.is_nowrap());
        if opportunity.required || wraps {
            breaks.push(opportunity);
        }
    }

    // STEP 2: break-all.
    for entry in &paragraph.entries {
        let Entry::Text { run, start, end } = *entry else {
            continue;
        };
        let style = &tree[run].style;
        if style.word_break != WordBreak::BreakAll || style.white_space.is_nowrap() {
            continue;
        }
        for &boundary in paragraph.graphemes_within(start, end) {
            if text[boundary] != SPACE && text[boundary - 1] != SPACE {
                breaks.push(BreakOpportunity {
                    position: boundary,
                    required: false,
                });
            }
        }
    }

    // STEP 3: sort, merging soft opportunities at one position.
    breaks.sort_by_key(|opportunity| (opportunity.position, !opportunity.required));
    breaks.dedup_by(|next, previous| {
        next.position == previous.position && (!next.required || !previous.required)
    });

    // STEP 4: forced breaks from <br>.
    for entry in &paragraph.entries {
        if let Entry::Break { position, .. } = *entry {
            let index = breaks.partition_point(|opportunity| opportunity.position <= position);
            let soft_here = index
                .checked_sub(1)
                .filter(|&i| breaks[i].position == position && !breaks[i].required);
            if let Some(i) = soft_here {
                breaks[i].required = true;
            } else {
                breaks.insert(
                    index,
                    BreakOpportunity {
                        position,
                        required: true,
                    },
                );
            }
        }
    }

    if breaks.last().is_none_or(|last| last.position < len) {
        breaks.push(BreakOpportunity {
            position: len,
            required: false,
        });
    }

    breaks
}

/// [§ 5.5 Overflow Wrapping](https://www.w3.org/TR/css-text-3/#overflow-wrap-property)
///
/// Largest prefix of `[start, end)` ending at a grapheme boundary that fits
/// in `available`. At least one grapheme is taken.
pub(super) fn emergency_break(
    paragraph: &Paragraph,
    widths: &Widths,
    start: usize,
    end: usize,
    available: f32,
) -> usize {
    let first = paragraph.next_grapheme(start).min(end);
    let mut fitted = first;
    while fitted < end {
        let next = paragraph.next_grapheme(fitted).min(end);
        if next <= fitted || widths.width(start, next) > available {
            break;
        }
        fitted = next;
    }
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_belong_to_the_range_they_touch() {
        let widths = Widths::from_parts(&[8.0, 8.0, 8.0], vec![0.0, 5.0, 0.0, 0.0], &[0.0, 0.0, 3.0, 0.0]);
        assert!((widths.start_edge(1) - 5.0).abs() < f32::EPSILON);
        assert!((widths.width(0, 1) - 8.0).abs() < f32::EPSILON);
        assert!((widths.width(1, 2) - 16.0).abs() < f32::EPSILON);
        assert!((widths.width(2, 3) - 8.0).abs() < f32::EPSILON);
        assert!((widths.width(0, 3) - 32.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_range_has_no_width() {
        let widths = Widths::from_parts(&[8.0], vec![0.0; 2], &[0.0; 2]);
        assert!(widths.width(1, 1).abs() < f32::EPSILON);
        assert!(widths.advance(1, 0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_long_ranges_keep_whole_pixel_precision() {
        let widths = Widths::from_parts(&[8.0; 30_000], vec![0.0; 30_001], &[0.0; 30_001]);
        assert!((widths.width(29_990, 30_000) - 80.0).abs() < f32::EPSILON);
        assert!((widths.advance(0, 30_000) - 240_000.0).abs() < f32::EPSILON);
    }
}
