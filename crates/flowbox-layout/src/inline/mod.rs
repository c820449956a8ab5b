//! CSS Inline Layout.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block. Horizontal
//! margins, borders, and padding are respected between these boxes."
//!
//! Every block container of inlines owns one [`Paragraph`]. Its text runs
//! are flattened into a single UTF-16 buffer during prelayout, white space
//! is processed, and the buffer is itemized and shaped. Layout then breaks
//! the shaped text into [`Linebox`]es around the floats of the enclosing
//! block formatting context.
//!
//! | Phase      | Module        | Output                                   |
//! |------------|---------------|------------------------------------------|
//! | prelayout  | `whitespace`  | collapsed buffer, inline text ranges     |
//! | prelayout  | `shaping`     | [`ShapedItem`]s, per code unit advances  |
//! | layout     | `linebreak`   | break opportunities, piece widths        |
//! | layout     | `lines`       | [`Linebox`]es, [`InlineFragment`]s       |

mod linebreak;
mod lines;
mod shaping;
mod whitespace;

use serde::Serialize;
use unicode_script::Script;

use crate::layout::{BoxId, BoxKind, BoxTree, LayoutContext};
use crate::style::Direction;

pub(crate) use lines::{layout_paragraph, paragraph_contribution};
pub use whitespace::{NEWLINE, OBJECT_REPLACEMENT, SPACE};

/// A shaped, font/direction/script-homogeneous piece of a paragraph.
///
/// Before layout an item covers a whole itemization run. On a [`Linebox`]
/// it is clipped to the part of the run on that line and positioned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapedItem {
    /// The text run the glyphs belong to. Before layout an item can span
    /// several runs with equal formatting and this is the first of them.
    pub run: BoxId,
    /// Start of the item in the paragraph buffer.
    pub start: usize,
    /// End of the item in the paragraph buffer.
    pub end: usize,
    /// Glyph records, [`G_SZ`](crate::text::G_SZ) entries each.
    pub glyphs: Vec<i32>,
    /// Identifier of the face the glyphs come from.
    pub face: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Pixels per font unit.
    pub scale: f32,
    /// Bidi embedding level.
    pub level: u8,
    /// Script of the item.
    #[serde(skip)]
    pub script: Script,
    /// Line-left edge of the first glyph, relative to the paragraph's
    /// content area.
    pub x: f32,
    /// Baseline, relative to the paragraph's content area.
    pub baseline: f32,
    /// Advance width of the item on its line.
    pub inline_size: f32,
}

impl ShapedItem {
    /// Direction of the glyphs.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        Direction::from_level(self.level)
    }

    /// Number of glyphs.
    #[must_use]
    pub const fn glyph_count(&self) -> usize {
        self.glyphs.len() / crate::text::G_SZ
    }
}

/// [§ 4.2 Line Boxes](https://www.w3.org/TR/css-inline-3/#line-boxes)
///
/// "The rectangular area that contains the boxes that form a line is called
/// a line box."
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Linebox {
    /// First code unit on the line.
    pub start: usize,
    /// End of the line in the buffer, including hanging white space.
    pub end: usize,
    /// Block offset from the paragraph's content edge.
    pub block_offset: f32,
    /// Height of the line.
    pub block_size: f32,
    /// Line-left edge of the content after alignment.
    pub line_left: f32,
    /// Width of the content, without hanging white space.
    pub inline_size: f32,
    /// Distance from the line's top to its baseline.
    pub ascender: f32,
    /// Distance from the baseline to the line's bottom.
    pub descender: f32,
    /// Text on the line in visual order.
    pub items: Vec<ShapedItem>,
    /// Atomic inlines on the line in visual order.
    pub atomics: Vec<BoxId>,
}

impl Linebox {
    /// Block offset of the line's bottom edge.
    #[must_use]
    pub fn block_end(&self) -> f32 {
        self.block_offset + self.block_size
    }
}

/// The part of one inline box that sits on one line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InlineFragment {
    /// The inline box.
    pub inline: BoxId,
    /// Index of the line in [`Paragraph::lineboxes`].
    pub line: usize,
    /// Line-left edge relative to the paragraph's content area.
    pub line_left: f32,
    /// Width including the box's inline margins, borders and padding on
    /// this line.
    pub inline_size: f32,
    /// Top of the box's border edge relative to the paragraph's content
    /// area.
    pub block_start: f32,
    /// Height from the top to the bottom border edge.
    pub block_size: f32,
}

/// One entry of the flattened inline content, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Entry {
    Start(BoxId),
    End(BoxId),
    Text { run: BoxId, start: usize, end: usize },
    Atomic { id: BoxId, position: usize },
    Float { id: BoxId, position: usize },
    Break { id: BoxId, position: usize },
}

/// What a stretch of the buffer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentKind {
    /// Text of one run, shaped as part of an item of [`Paragraph::items`].
    Text { item: usize, run: BoxId },
    /// An atomic inline standing on an object replacement character.
    Atomic(BoxId),
}

/// A stretch of the buffer with one owner and one bidi level. Segments
/// partition the buffer in logical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment {
    pub start: usize,
    pub end: usize,
    pub level: u8,
    pub kind: SegmentKind,
}

/// The inline content of one block container of inlines.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Paragraph {
    /// Text after white space processing, with U+FFFC for atomic inlines.
    pub text: Vec<u16>,
    /// Lines, set by layout.
    pub lineboxes: Vec<Linebox>,
    /// Inline box fragments, set by layout.
    pub fragments: Vec<InlineFragment>,
    #[serde(skip)]
    pub(crate) entries: Vec<Entry>,
    /// Text run or atomic inline that owns each code unit.
    #[serde(skip)]
    pub(crate) owners: Vec<BoxId>,
    /// Shaped items in logical order.
    #[serde(skip)]
    pub(crate) items: Vec<ShapedItem>,
    #[serde(skip)]
    pub(crate) segments: Vec<Segment>,
    /// Advance of each code unit, in pixels. A cluster's advance sits on its
    /// first code unit.
    #[serde(skip)]
    pub(crate) advances: Vec<f32>,
    /// Grapheme cluster boundaries of `text`, from `0` to `text.len()`.
    #[serde(skip)]
    pub(crate) graphemes: Vec<usize>,
    #[serde(skip)]
    pub(crate) has_text: bool,
    #[serde(skip)]
    pub(crate) has_sized_inline: bool,
    #[serde(skip)]
    pub(crate) has_atomics: bool,
    #[serde(skip)]
    pub(crate) has_floats: bool,
    #[serde(skip)]
    pub(crate) has_breaks: bool,
}

impl Paragraph {
    /// The processed text as a string.
    #[must_use]
    pub fn text_string(&self) -> String {
        String::from_utf16_lossy(&self.text)
    }

    /// Whether layout produces at least one line: there is text that is
    /// not collapsible white space, an atomic inline, a forced break, or an
    /// inline box with padding or borders.
    #[must_use]
    pub const fn has_content(&self) -> bool {
        self.has_text || self.has_atomics || self.has_breaks || self.has_sized_inline
    }

    /// Whether layout has anything to do, lines or floats.
    #[must_use]
    pub const fn should_layout_content(&self) -> bool {
        self.has_content() || self.has_floats
    }

    /// The first grapheme boundary after `index`, or the end of the text.
    pub(crate) fn next_grapheme(&self, index: usize) -> usize {
        let next = self.graphemes.partition_point(|&boundary| boundary <= index);
        self.graphemes.get(next).copied().unwrap_or(self.text.len())
    }

    /// Grapheme boundaries strictly inside `(start, end)`.
    pub(crate) fn graphemes_within(&self, start: usize, end: usize) -> &[usize] {
        let from = self.graphemes.partition_point(|&boundary| boundary <= start);
        let to = self.graphemes.partition_point(|&boundary| boundary < end);
        &self.graphemes[from..to.max(from)]
    }

    /// Shaped items in logical order, before line breaking.
    #[must_use]
    pub fn shaped_items(&self) -> &[ShapedItem] {
        &self.items
    }

    /// Bottom of the last line, or 0.
    #[must_use]
    pub fn block_size(&self) -> f32 {
        self.lineboxes.last().map_or(0.0, Linebox::block_end)
    }
}

/// [§ 4.1 The White Space Processing Rules](https://www.w3.org/TR/css-text-3/#white-space-rules)
///
/// Flatten, collapse and shape the inline content of the block container
/// of inlines `id`.
pub(crate) fn prepare_paragraph(tree: &mut BoxTree, id: BoxId, ctx: &LayoutContext<'_>) {
    let Some(&root) = tree[id].children.first() else {
        return;
    };
    let base = tree[id].style.direction;

    // STEP 1: flatten the subtree and process white space.
    let mut paragraph = Paragraph::default();
    let mut collapser = whitespace::Collapser::new();
    collect(tree, root, root, &mut paragraph, &mut collapser);

    // STEP 2: the shaper owns the buffer it shapes from.
    let mut buffer = ctx.shaper.allocate_buffer(paragraph.text.len());
    buffer.clear();
    buffer.extend_from_slice(&paragraph.text);
    paragraph.text = buffer;

    // STEP 3: itemize and shape.
    shaping::shape_paragraph(tree, &mut paragraph, base, ctx);
    paragraph.graphemes = ctx.grapheme_breaker.grapheme_boundaries(&paragraph.text);

    // STEP 4: partition the buffer.
    paragraph.segments = build_segments(tree, &paragraph, base);

    #[cfg(feature = "layout-trace")]
    log::trace!(
        "[IFC] prepared {id:?}: {:?} ({} items)",
        paragraph.text_string(),
        paragraph.items.len()
    );

    if let Some(slot) = tree[id].kind.paragraph_mut() {
        *slot = paragraph;
    }
}

fn collect(
    tree: &mut BoxTree,
    id: BoxId,
    root: BoxId,
    paragraph: &mut Paragraph,
    collapser: &mut whitespace::Collapser,
) {
    if tree[id].style.is_absolute() {
        return;
    }
    let position = paragraph.text.len();

    match &tree[id].kind {
        BoxKind::Inline(_) => {
            paragraph.entries.push(Entry::Start(id));
            for child in tree[id].children.clone() {
                collect(tree, child, root, paragraph, collapser);
            }
            paragraph.entries.push(Entry::End(id));

            let end = paragraph.text.len();
            let style = &tree[id].style;
            if id != root && (style.has_padding_area() || style.has_border_area()) {
                paragraph.has_sized_inline = true;
            }
            if let BoxKind::Inline(inline) = &mut tree[id].kind {
                inline.text_start = position;
                inline.text_end = end;
            }
        }
        BoxKind::Run(run) => {
            let source = run.source.clone();
            let style = tree[id].style.clone();
            collapser.push(&mut paragraph.text, &source, style.white_space);
            let end = paragraph.text.len();
            paragraph.owners.resize(end, id);

            let collapsible = style.is_ws_collapsible();
            if paragraph.text[position..end]
                .iter()
                .any(|&unit| unit != SPACE || !collapsible)
            {
                paragraph.has_text = true;
            }
            if let BoxKind::Run(run) = &mut tree[id].kind {
                run.text_start = position;
                run.text_end = end;
            }
            if end > position {
                paragraph.entries.push(Entry::Text {
                    run: id,
                    start: position,
                    end,
                });
            }
        }
        BoxKind::Break => {
            paragraph.entries.push(Entry::Break { id, position });
            paragraph.has_breaks = true;
            collapser.forced_break();
        }
        kind if kind.is_float() => {
            paragraph.entries.push(Entry::Float { id, position });
            paragraph.has_floats = true;
        }
        kind if kind.is_atomic_inline() => {
            paragraph.text.push(OBJECT_REPLACEMENT);
            paragraph.owners.push(id);
            paragraph.entries.push(Entry::Atomic { id, position });
            paragraph.has_atomics = true;
            collapser.atomic();
        }
        _ => {}
    }
}

/// Bidi level of content styled with `direction` in a paragraph whose base
/// direction is `base`. Levels are not resolved from the text itself; a
/// run in the opposite direction is embedded one level deeper.
pub(crate) const fn embedding_level(direction: Direction, base: Direction) -> u8 {
    let base_level = base.base_level();
    if matches!(
        (direction, base),
        (Direction::Ltr, Direction::Ltr) | (Direction::Rtl, Direction::Rtl)
    ) {
        base_level
    } else {
        base_level + 1
    }
}

fn build_segments(tree: &BoxTree, paragraph: &Paragraph, base: Direction) -> Vec<Segment> {
    let runs: Vec<(BoxId, usize, usize)> = paragraph
        .entries
        .iter()
        .filter_map(|entry| match *entry {
            Entry::Text { run, start, end } => Some((run, start, end)),
            _ => None,
        })
        .collect();

    // Items shaped across inline box edges are cut back into runs, which
    // carry the vertical alignment.
    let mut segments: Vec<Segment> = Vec::new();
    for (index, item) in paragraph.items.iter().enumerate() {
        let first = runs.partition_point(|&(_, _, end)| end <= item.start);
        for &(run, start, end) in runs[first..].iter().take_while(|&&(_, start, _)| start < item.end) {
            let start = start.max(item.start);
            let end = end.min(item.end);
            if start < end {
                segments.push(Segment {
                    start,
                    end,
                    level: item.level,
                    kind: SegmentKind::Text { item: index, run },
                });
            }
        }
    }

    for entry in &paragraph.entries {
        if let Entry::Atomic { id, position } = *entry {
            let direction = tree[id]
                .parent
                .map_or(base, |parent| tree[parent].style.direction);
            segments.push(Segment {
                start: position,
                end: position + 1,
                level: embedding_level(direction, base),
                kind: SegmentKind::Atomic(id),
            });
        }
    }

    segments.sort_by_key(|segment| segment.start);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_direction_embeds_one_level_deeper() {
        assert_eq!(embedding_level(Direction::Ltr, Direction::Ltr), 0);
        assert_eq!(embedding_level(Direction::Rtl, Direction::Ltr), 1);
        assert_eq!(embedding_level(Direction::Rtl, Direction::Rtl), 1);
        assert_eq!(embedding_level(Direction::Ltr, Direction::Rtl), 2);
    }
}
