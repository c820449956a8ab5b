//! Line boxes.
//!
//! [§ 4.2 Line Boxes](https://www.w3.org/TR/css-inline-3/#line-boxes)
//!
//! "In general, the line-left edge of a line box touches the line-left edge
//! of its containing block and the line-right edge touches the line-right
//! edge of its containing block. However, floating boxes may come between
//! the containing block edge and the line box edge."
//!
//! Lines are filled greedily. The content between two break opportunities
//! (a *piece*) joins the current line while the line still fits the vacancy
//! the float context reports at the line's block offset. A piece that does
//! not fit starts the next line; a piece that does not fit on an empty line
//! either overflows or, when `overflow-wrap`/`word-break` allow it, is split
//! at a grapheme boundary.

use std::collections::{BTreeMap, HashMap};

use super::linebreak::{
    Widths, break_opportunities, emergency_break, inline_edges, is_collapsible_space, is_hangable,
    unit_style,
};
use super::{Entry, InlineFragment, Linebox, Paragraph, SegmentKind, ShapedItem};
use crate::layout::flow::{self, IntrinsicSize};
use crate::layout::{BlockFormattingContext, BoxId, BoxKind, BoxTree, IfcVacancy, LayoutContext};
use crate::style::{Overflow, PhysicalTextAlign, VerticalAlign};
use crate::text::{G_CL, G_SZ, InlineMetrics};

/// A line being filled.
#[derive(Debug, Clone, Copy)]
struct Line {
    start: usize,
    /// End of the last piece, including hanging white space.
    end: usize,
    /// End of the last piece's visible content.
    content_end: usize,
    /// Block offset from the paragraph's content edge.
    top: f32,
    vacancy: IfcVacancy,
    has_content: bool,
}

impl Line {
    const fn new(start: usize, top: f32, vacancy: IfcVacancy) -> Self {
        Self {
            start,
            end: start,
            content_end: start,
            top,
            vacancy,
            has_content: false,
        }
    }

    fn width(&self, widths: &Widths) -> f32 {
        widths.width(self.start, self.end) - widths.advance(self.content_end, self.end)
    }
}

/// A segment clipped to one line.
#[derive(Debug, Clone, Copy)]
struct Part {
    start: usize,
    end: usize,
    level: u8,
    kind: SegmentKind,
    x: f32,
    width: f32,
}

/// What a box's baseline is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// The line's baseline.
    Baseline,
    /// The top of the line, through a `vertical-align: top` subtree.
    Top(BoxId),
    /// The bottom of the line, through a `vertical-align: bottom` subtree.
    Bottom(BoxId),
}

/// Position of a box's baseline relative to its anchor, positive upwards.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Shift {
    anchor: Anchor,
    up: f32,
}

impl Shift {
    const BASELINE: Self = Self {
        anchor: Anchor::Baseline,
        up: 0.0,
    };
}

/// Ascent and descent of an aligned subtree, relative to its root's baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Subtree {
    top: bool,
    ascender: f32,
    descender: f32,
}

/// Vertical metrics of an assembled line.
#[derive(Debug, Clone, PartialEq, Default)]
struct LineMetrics {
    ascender: f32,
    descender: f32,
    subtrees: BTreeMap<BoxId, Subtree>,
}

impl LineMetrics {
    /// Distance from the line's top to the baseline of a box with `shift`.
    fn baseline(&self, shift: Shift) -> f32 {
        match shift.anchor {
            Anchor::Baseline => self.ascender - shift.up,
            Anchor::Top(root) => {
                self.subtrees.get(&root).map_or(0.0, |subtree| subtree.ascender) - shift.up
            }
            Anchor::Bottom(root) => {
                self.ascender + self.descender
                    - self.subtrees.get(&root).map_or(0.0, |subtree| subtree.descender)
                    - shift.up
            }
        }
    }
}

fn inline_metrics(tree: &BoxTree, id: BoxId) -> InlineMetrics {
    match &tree[id].kind {
        BoxKind::Inline(inline) => inline.metrics,
        _ => InlineMetrics::EMPTY,
    }
}

/// Margin-box inline size of a laid out box.
fn outer_inline_size(tree: &BoxTree, id: BoxId) -> f32 {
    let node = &tree[id];
    node.margins.line_left + node.border_area.inline_size + node.margins.line_right
}

/// Margin-box block size of a laid out box.
fn outer_block_size(tree: &BoxTree, id: BoxId) -> f32 {
    let node = &tree[id];
    node.margins.block_start + node.border_area.block_size + node.margins.block_end
}

/// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
///
/// Baseline of an inline-level block container, from its border edge.
///
/// "The baseline of an 'inline-block' is the baseline of its last line box
/// in the normal flow, unless it has either no in-flow line boxes or if its
/// 'overflow' property has a computed value other than 'visible', in which
/// case the baseline is the bottom margin edge."
fn last_baseline(tree: &BoxTree, id: BoxId) -> Option<f32> {
    let node = &tree[id];
    let inset = node.padding_area.block_start + node.content_area.block_start;

    match node.kind.formatting() {
        BoxKind::BlockContainerOfInlines(_, paragraph) => paragraph
            .lineboxes
            .last()
            .map(|line| inset + line.block_offset + line.ascender),
        BoxKind::BlockContainerOfBlocks(_) => node.children.iter().rev().find_map(|&child| {
            let child_node = &tree[child];
            if child_node.style.is_out_of_flow() {
                return None;
            }
            last_baseline(tree, child).map(|baseline| inset + child_node.border_area.block_start + baseline)
        }),
        _ => None,
    }
}

/// Distance from the margin-box top of atomic inline `id` to its baseline.
fn atomic_ascender(tree: &BoxTree, id: BoxId) -> f32 {
    let node = &tree[id];
    let baseline = if node.style.overflow == Overflow::Visible && node.kind.is_block_container() {
        last_baseline(tree, id)
    } else {
        None
    };
    baseline.map_or_else(|| outer_block_size(tree, id), |b| node.margins.block_start + b)
}

/// [§ 10.8.1 vertical-align](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
///
/// How far a box whose own ascent and descent are `ascender`/`descender`
/// is raised above its parent's baseline.
fn baseline_shift(align: VerticalAlign, parent: &InlineMetrics, ascender: f32, descender: f32) -> f32 {
    match align {
        VerticalAlign::Baseline | VerticalAlign::Top | VerticalAlign::Bottom => 0.0,
        VerticalAlign::Middle => parent.x_height / 2.0 - (ascender - descender) / 2.0,
        VerticalAlign::Sub => -parent.subscript,
        VerticalAlign::Super => parent.superscript,
        VerticalAlign::TextTop => parent.ascender - ascender,
        VerticalAlign::TextBottom => descender - parent.descender,
        VerticalAlign::Length(px) => px,
    }
}

/// [§ 9.3 Reordering Resolved Levels](https://unicode.org/reports/tr9/#Reordering_Resolved_Levels)
///
/// "L2. From the highest level found in the text to the lowest odd level on
/// each line, including intermediate levels not actually present in the
/// text, reverse any contiguous sequence of characters that are at that
/// level or higher."
///
/// Returns the indices of `levels` in visual order.
fn reorder_visually(levels: &[u8]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..levels.len()).collect();
    let (Some(&highest), Some(&lowest)) = (levels.iter().max(), levels.iter().min()) else {
        return order;
    };
    let lowest_odd = lowest | 1;

    let mut level = highest;
    while level >= lowest_odd {
        let mut i = 0;
        while i < order.len() {
            if levels[order[i]] < level {
                i += 1;
                continue;
            }
            let mut j = i;
            while j < order.len() && levels[order[j]] >= level {
                j += 1;
            }
            order[i..j].reverse();
            i = j;
        }
        level -= 1;
    }

    order
}

struct LineBuilder<'p, 'c> {
    id: BoxId,
    root: BoxId,
    paragraph: &'p Paragraph,
    ctx: &'p LayoutContext<'c>,
    widths: Widths,
    strut: InlineMetrics,
    shifts: HashMap<BoxId, Shift>,
    lineboxes: Vec<Linebox>,
    fragments: Vec<InlineFragment>,
}

impl<'p, 'c> LineBuilder<'p, 'c> {
    fn new(tree: &BoxTree, id: BoxId, paragraph: &'p Paragraph, ctx: &'p LayoutContext<'c>) -> Self {
        let root = tree[id].children.first().copied().unwrap_or(id);
        Self {
            id,
            root,
            paragraph,
            ctx,
            widths: Widths::new(tree, paragraph, |atomic| outer_inline_size(tree, atomic)),
            strut: inline_metrics(tree, root),
            shifts: HashMap::new(),
            lineboxes: Vec::new(),
            fragments: Vec::new(),
        }
    }

    fn build(mut self, tree: &mut BoxTree, bfc: &mut BlockFormattingContext) -> (Vec<Linebox>, Vec<InlineFragment>) {
        let paragraph = self.paragraph;
        let breaks = break_opportunities(tree, paragraph, self.ctx);
        let floats: Vec<(BoxId, usize)> = paragraph
            .entries
            .iter()
            .filter_map(|entry| match *entry {
                Entry::Float { id, position } => Some((id, position)),
                _ => None,
            })
            .collect();
        let strut_height = self.strut.line_height();

        let offsets = bfc.offsets();
        if let Some(fctx) = &mut bfc.fctx {
            fctx.pre_text_content(tree, &offsets);
        }

        let mut line = Line::new(0, 0.0, bfc.local_vacancy_at(0.0, strut_height));
        let mut next_float = 0;
        let mut cursor = 0;
        let mut index = 0;

        while let Some(&opportunity) = breaks.get(index) {
            let end = opportunity.position;

            // STEP 1: floats anchored before the piece.
            while let Some(&(float, position)) = floats.get(next_float) {
                if position > cursor {
                    break;
                }
                self.place_float(tree, bfc, float, &mut line);
                next_float += 1;
            }

            // STEP 2: trim and measure the piece.
            if line.start == line.end {
                while cursor < end && is_collapsible_space(tree, paragraph, cursor) {
                    cursor += 1;
                }
                line.start = cursor;
                line.end = cursor;
                line.content_end = cursor;
            }
            let mut hang_start = end;
            while hang_start > cursor && is_hangable(tree, paragraph, hang_start - 1) {
                hang_start -= 1;
            }
            let has_content = hang_start > cursor;
            let content_end = if has_content { hang_start } else { line.content_end };
            let width = self.widths.width(line.start, end) - self.widths.advance(content_end, end);

            if has_content && !line.has_content {
                line.vacancy = bfc.local_vacancy_for_line(line.top, strut_height, width);
                line.top = line.vacancy.block_offset;
            }

            // STEP 3: overflow.
            if has_content && !line.vacancy.fits(width) {
                if line.has_content {
                    #[cfg(feature = "layout-trace")]
                    log::trace!("[IFC] {:?}: piece [{cursor}, {end}) moves to the next line", self.id);
                    self.finish_line(tree, bfc, &mut line, cursor);
                    continue;
                }

                let anywhere = unit_style(tree, paragraph, cursor)
                    .is_some_and(|style| style.wraps_overflow_anywhere(false));
                if anywhere {
                    let split = emergency_break(
                        paragraph,
                        &self.widths,
                        cursor,
                        hang_start,
                        line.vacancy.inline_size,
                    );
                    if split < hang_start {
                        #[cfg(feature = "layout-trace")]
                        log::trace!("[IFC] {:?}: emergency break at {split}", self.id);
                        line.end = split;
                        line.content_end = split;
                        line.has_content = true;
                        cursor = split;
                        self.finish_line(tree, bfc, &mut line, cursor);
                        continue;
                    }
                }
            }

            // STEP 4: commit.
            line.end = end;
            line.content_end = content_end;
            line.has_content |= has_content;
            cursor = end;
            index += 1;

            if opportunity.required {
                self.finish_line(tree, bfc, &mut line, cursor);
            }
        }

        for &(float, _) in &floats[next_float..] {
            self.place_float(tree, bfc, float, &mut line);
        }

        let nothing_yet = self.lineboxes.is_empty() && paragraph.has_content();
        if line.has_content || line.end > line.start || nothing_yet {
            self.finish_line(tree, bfc, &mut line, cursor);
        }

        let offsets = bfc.offsets();
        if let Some(fctx) = &mut bfc.fctx {
            fctx.consume_misfits(tree, &offsets);
        }

        (self.lineboxes, self.fragments)
    }

    /// Lay out float `float` and place it beside the current line.
    fn place_float(&self, tree: &mut BoxTree, bfc: &mut BlockFormattingContext, float: BoxId, line: &mut Line) {
        flow::layout_float_box(tree, float, self.ctx);

        let offsets = bfc.offsets();
        let line_width = if line.has_content { line.width(&self.widths) } else { 0.0 };
        bfc.ensure_float_context(offsets.cb_block_start + line.top).place_float(
            tree,
            float,
            &offsets,
            line_width,
            !line.has_content,
        );

        if line.has_content {
            line.vacancy = bfc.local_vacancy_at(line.top, self.strut.line_height());
        }
    }

    /// Turn `line` into a line box and start the next line at `next_start`.
    fn finish_line(&mut self, tree: &mut BoxTree, bfc: &mut BlockFormattingContext, line: &mut Line, next_start: usize) {
        let linebox = self.assemble(tree, line);
        let bottom = linebox.block_end();

        #[cfg(feature = "layout-trace")]
        log::trace!(
            "[IFC] {:?}: line {} [{}, {}) at {} size {}x{}",
            self.id,
            self.lineboxes.len(),
            linebox.start,
            linebox.end,
            linebox.block_offset,
            linebox.inline_size,
            linebox.block_size
        );

        self.lineboxes.push(linebox);

        let offsets = bfc.offsets();
        if let Some(fctx) = &mut bfc.fctx {
            fctx.post_line(tree, &offsets, offsets.cb_block_start + bottom, true);
        }

        *line = Line::new(next_start, bottom, bfc.local_vacancy_at(bottom, self.strut.line_height()));
    }

    /// Baseline shift of inline box, run or atomic inline `id`.
    fn shift_of(&mut self, tree: &BoxTree, id: BoxId) -> Shift {
        if id == self.root {
            return Shift::BASELINE;
        }
        if let Some(&shift) = self.shifts.get(&id) {
            return shift;
        }
        let Some(parent) = tree[id].parent.filter(|&parent| tree[parent].kind.is_inline()) else {
            return Shift::BASELINE;
        };

        let parent_shift = self.shift_of(tree, parent);
        let shift = match tree[id].kind {
            // Text sits on its inline's baseline.
            BoxKind::Run(_) => parent_shift,
            _ => match tree[id].style.vertical_align {
                VerticalAlign::Top => Shift {
                    anchor: Anchor::Top(id),
                    up: 0.0,
                },
                VerticalAlign::Bottom => Shift {
                    anchor: Anchor::Bottom(id),
                    up: 0.0,
                },
                align => {
                    let (ascender, descender) = self.extent(tree, id);
                    Shift {
                        anchor: parent_shift.anchor,
                        up: parent_shift.up
                            + baseline_shift(align, &inline_metrics(tree, parent), ascender, descender),
                    }
                }
            },
        };

        let _ = self.shifts.insert(id, shift);
        shift
    }

    /// Ascent and descent of an inline box (its line-height box) or an
    /// atomic inline (its margin box).
    fn extent(&self, tree: &BoxTree, id: BoxId) -> (f32, f32) {
        if id == self.root {
            return (self.strut.ascender_box, self.strut.descender_box);
        }
        match &tree[id].kind {
            BoxKind::Inline(inline) => (inline.metrics.ascender_box, inline.metrics.descender_box),
            _ => {
                let ascender = atomic_ascender(tree, id);
                (ascender, outer_block_size(tree, id) - ascender)
            }
        }
    }

    /// Whether inline box `[start, end)` has something on `line`.
    fn inline_on_line(&self, line: &Line, start: usize, end: usize) -> bool {
        if start == end {
            return line.start <= start && (start < line.end || line.end == self.paragraph.text.len());
        }
        start < line.content_end.max(line.start) && end > line.start
    }

    /// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
    ///
    /// "The line box height is the distance between the uppermost box top
    /// and the lowermost box bottom."
    fn line_metrics(&mut self, tree: &BoxTree, line: &Line, parts: &[Part]) -> LineMetrics {
        let mut contributors = vec![self.root];
        for entry in &self.paragraph.entries {
            let Entry::Start(inline) = *entry else {
                continue;
            };
            let BoxKind::Inline(payload) = &tree[inline].kind else {
                continue;
            };
            if inline != self.root && self.inline_on_line(line, payload.text_start, payload.text_end) {
                contributors.push(inline);
            }
        }
        contributors.extend(parts.iter().filter_map(|part| match part.kind {
            SegmentKind::Atomic(atomic) => Some(atomic),
            SegmentKind::Text { .. } => None,
        }));

        let mut metrics = LineMetrics::default();
        for id in contributors {
            let shift = self.shift_of(tree, id);
            let (ascender, descender) = self.extent(tree, id);
            let above = shift.up + ascender;
            let below = descender - shift.up;
            match shift.anchor {
                Anchor::Baseline => {
                    metrics.ascender = metrics.ascender.max(above);
                    metrics.descender = metrics.descender.max(below);
                }
                Anchor::Top(root) | Anchor::Bottom(root) => {
                    let subtree = metrics.subtrees.entry(root).or_insert(Subtree {
                        top: matches!(shift.anchor, Anchor::Top(_)),
                        ascender: 0.0,
                        descender: 0.0,
                    });
                    subtree.ascender = subtree.ascender.max(above);
                    subtree.descender = subtree.descender.max(below);
                }
            }
        }

        // "If they are aligned 'top' or 'bottom', they must be aligned so as
        // to minimize the line box height."
        for subtree in metrics.subtrees.values() {
            let height = subtree.ascender + subtree.descender;
            if height > metrics.ascender + metrics.descender {
                if subtree.top {
                    metrics.descender = height - metrics.ascender;
                } else {
                    metrics.ascender = height - metrics.descender;
                }
            }
        }

        metrics
    }

    fn assemble(&mut self, tree: &mut BoxTree, line: &Line) -> Linebox {
        let paragraph = self.paragraph;
        let visible_end = line.content_end.max(line.start);

        // STEP 1: clip segments to the visible part of the line.
        let mut parts: Vec<Part> = paragraph
            .segments
            .iter()
            .filter(|segment| segment.start < visible_end && segment.end > line.start)
            .map(|segment| {
                let start = segment.start.max(line.start);
                let end = segment.end.min(visible_end);
                Part {
                    start,
                    end,
                    level: segment.level,
                    kind: segment.kind,
                    x: 0.0,
                    width: self.widths.width(start, end),
                }
            })
            .collect();
        if let Some(last) = parts.last_mut() {
            last.width += self.widths.end_edges_between(last.end, line.end);
        }

        // STEP 2: visual order.
        let levels: Vec<u8> = parts.iter().map(|part| part.level).collect();
        let order = reorder_visually(&levels);

        // STEP 3: text-align.
        let inline_size: f32 = parts.iter().map(|part| part.width).sum();
        let free = (line.vacancy.inline_size - inline_size).max(0.0);
        let align = match tree[self.id].style.resolved_text_align() {
            PhysicalTextAlign::Left => 0.0,
            PhysicalTextAlign::Right => free,
            PhysicalTextAlign::Center => free / 2.0,
        };
        let line_left = line.vacancy.left_offset + align;
        let mut x = line_left;
        for &i in &order {
            parts[i].x = x;
            x += parts[i].width;
        }

        // STEP 4: vertical metrics.
        let metrics = self.line_metrics(tree, line, &parts);

        // STEP 5: place text and atomic inlines.
        let mut items = Vec::new();
        let mut atomics = Vec::new();
        for &i in &order {
            let part = parts[i];
            let origin = part.x + self.widths.start_edge(part.start);
            match part.kind {
                SegmentKind::Text { item: item_index, run } => {
                    let Some(item) = paragraph.items.get(item_index) else {
                        continue;
                    };
                    let shift = tree[run]
                        .parent
                        .map_or(Shift::BASELINE, |parent| self.shift_of(tree, parent));
                    let glyphs: Vec<i32> = item
                        .glyphs
                        .chunks_exact(G_SZ)
                        .filter(|glyph| {
                            usize::try_from(glyph[G_CL]).is_ok_and(|cluster| (part.start..part.end).contains(&cluster))
                        })
                        .flatten()
                        .copied()
                        .collect();
                    items.push(ShapedItem {
                        start: part.start,
                        end: part.end,
                        glyphs,
                        x: origin,
                        baseline: line.top + metrics.baseline(shift),
                        inline_size: self.widths.advance(part.start, part.end),
                        run,
                        ..item.clone()
                    });
                }
                SegmentKind::Atomic(atomic) => {
                    let shift = self.shift_of(tree, atomic);
                    let (ascender, _) = self.extent(tree, atomic);
                    let margin_top = line.top + metrics.baseline(shift) - ascender;
                    let margins = tree[atomic].margins;
                    tree.set_block_position(atomic, margin_top + margins.block_start);
                    tree.set_inline_position(atomic, origin + margins.line_left);
                    atomics.push(atomic);
                }
            }
        }

        // STEP 6: inline box fragments.
        let line_index = self.lineboxes.len();
        self.collect_fragments(tree, line, &parts, &metrics, line_index, line_left);

        Linebox {
            start: line.start,
            end: line.end,
            block_offset: line.top,
            block_size: metrics.ascender + metrics.descender,
            line_left,
            inline_size,
            ascender: metrics.ascender,
            descender: metrics.descender,
            items,
            atomics,
        }
    }

    /// Line-left edges of the inline ancestors of `id` that start where it
    /// starts, and line-right edges of those that end where it ends.
    fn outer_edges(&self, tree: &BoxTree, id: BoxId, start: usize, end: usize) -> (f32, f32) {
        let mut left = 0.0;
        let mut right = 0.0;
        let mut current = tree[id].parent;
        while let Some(ancestor) = current {
            if ancestor == self.root {
                break;
            }
            let BoxKind::Inline(payload) = &tree[ancestor].kind else {
                break;
            };
            let (ancestor_left, ancestor_right) = inline_edges(tree, ancestor);
            if payload.text_start == start {
                left += ancestor_left;
            }
            if payload.text_end == end {
                right += ancestor_right;
            }
            current = tree[ancestor].parent;
        }
        (left, right)
    }

    fn collect_fragments(
        &mut self,
        tree: &BoxTree,
        line: &Line,
        parts: &[Part],
        metrics: &LineMetrics,
        line_index: usize,
        line_left: f32,
    ) {
        let last_logical = parts.len().checked_sub(1);
        let inlines: Vec<(BoxId, usize, usize)> = self
            .paragraph
            .entries
            .iter()
            .filter_map(|entry| match *entry {
                Entry::Start(id) if id != self.root => match &tree[id].kind {
                    BoxKind::Inline(payload) => Some((id, payload.text_start, payload.text_end)),
                    _ => None,
                },
                _ => None,
            })
            .collect();

        for (id, start, end) in inlines {
            if !self.inline_on_line(line, start, end) {
                continue;
            }
            let (outer_left, outer_right) = self.outer_edges(tree, id, start, end);
            let mut left = f32::INFINITY;
            let mut right = f32::NEG_INFINITY;

            for (i, part) in parts.iter().enumerate() {
                if part.start < start || part.start >= end {
                    continue;
                }
                let part_left = if part.start == start { part.x + outer_left } else { part.x };
                let mut part_right = part.x + part.width;
                if Some(i) == last_logical {
                    let own_end = end.min(line.end);
                    part_right -= self.widths.end_edges_between(own_end.max(part.end), line.end);
                    if end <= line.end {
                        part_right -= outer_right;
                    }
                } else if part.end == end {
                    part_right -= outer_right;
                }
                left = left.min(part_left);
                right = right.max(part_right);
            }

            if left > right {
                // An empty inline box: only its own edges.
                let (own_left, own_right) = inline_edges(tree, id);
                left = parts
                    .iter()
                    .find(|part| part.start == start)
                    .map(|part| part.x + outer_left)
                    .or_else(|| parts.iter().find(|part| part.end == start).map(|part| part.x + part.width))
                    .unwrap_or(line_left);
                right = left + own_left + own_right;
            }

            let cb = tree.containing_block(id);
            let style = &tree[id].style;
            let font = inline_metrics(tree, id);
            let shift = self.shift_of(tree, id);
            let baseline = line.top + metrics.baseline(shift);
            let above = style.padding_block_start(&cb) + style.border_block_start_width(&cb);

            self.fragments.push(InlineFragment {
                inline: id,
                line: line_index,
                line_left: left,
                inline_size: right - left,
                block_start: baseline - font.ascender - above,
                block_size: font.ascender + font.descender + style.block_padding_border(&cb),
            });
        }
    }
}

/// Lay out the lines of block container of inlines `id` inside `bfc`.
/// Returns the height of the lines.
pub(crate) fn layout_paragraph(
    tree: &mut BoxTree,
    id: BoxId,
    ctx: &LayoutContext<'_>,
    bfc: &mut BlockFormattingContext,
) -> f32 {
    let Some(mut paragraph) = tree[id].kind.paragraph_mut().map(std::mem::take) else {
        return 0.0;
    };
    paragraph.lineboxes.clear();
    paragraph.fragments.clear();

    if paragraph.should_layout_content() {
        // Atomic inlines are sized before they can be measured.
        for entry in &paragraph.entries {
            if let Entry::Atomic { id: atomic, .. } = *entry {
                flow::layout_atomic_inline(tree, atomic, ctx);
            }
        }

        let (lineboxes, fragments) = LineBuilder::new(tree, id, &paragraph, ctx).build(tree, bfc);
        paragraph.lineboxes = lineboxes;
        paragraph.fragments = fragments;
    }

    let block_size = paragraph.block_size();
    if let Some(slot) = tree[id].kind.paragraph_mut() {
        *slot = paragraph;
    }
    block_size
}

/// Widest grapheme cluster in `[start, end)`.
fn widest_grapheme(paragraph: &Paragraph, widths: &Widths, start: usize, end: usize) -> f32 {
    let mut widest: f32 = 0.0;
    let mut boundary = start;
    while boundary < end {
        let next = paragraph.next_grapheme(boundary).min(end);
        if next <= boundary {
            break;
        }
        widest = widest.max(widths.width(boundary, next));
        boundary = next;
    }
    widest
}

/// [§ 5.1 Intrinsic Sizes](https://www.w3.org/TR/css-sizing-3/#intrinsic-sizes)
///
/// Min-content or max-content inline size of the lines of block container
/// of inlines `id`.
///
/// "The min-content inline size of an inline formatting context is the
/// largest min-content contribution of its in-flow inline-level content
/// (the widest unbreakable piece). The max-content inline size is the
/// length of its longest line when only forced breaks are taken."
pub(crate) fn paragraph_contribution(
    tree: &BoxTree,
    id: BoxId,
    ctx: &LayoutContext<'_>,
    mode: IntrinsicSize,
) -> f32 {
    let Some(paragraph) = tree[id].kind.paragraph() else {
        return 0.0;
    };
    let widths = Widths::new(tree, paragraph, |atomic| {
        flow::layout_contribution(tree, atomic, ctx, mode)
    });

    let mut widest: f32 = 0.0;
    let mut cursor = 0;
    let mut line_start = 0;
    let mut content_end = 0;
    let mut line_empty = true;

    for opportunity in break_opportunities(tree, paragraph, ctx) {
        let end = opportunity.position;
        let fresh = mode == IntrinsicSize::MinContent || line_empty;
        if fresh {
            while cursor < end && is_collapsible_space(tree, paragraph, cursor) {
                cursor += 1;
            }
            line_start = cursor;
            content_end = cursor;
        }
        let mut hang_start = end;
        while hang_start > cursor && is_hangable(tree, paragraph, hang_start - 1) {
            hang_start -= 1;
        }
        if hang_start > cursor {
            content_end = hang_start;
            line_empty = false;
        }

        let width = match mode {
            IntrinsicSize::MinContent => {
                let anywhere = unit_style(tree, paragraph, cursor)
                    .is_some_and(|style| style.wraps_overflow_anywhere(true));
                if anywhere {
                    widest_grapheme(paragraph, &widths, cursor, hang_start)
                } else {
                    widths.width(cursor, end) - widths.advance(hang_start, end)
                }
            }
            IntrinsicSize::MaxContent => {
                widths.width(line_start, end) - widths.advance(content_end, end)
            }
        };
        widest = widest.max(width);

        cursor = end;
        if opportunity.required {
            line_empty = true;
        }
    }

    for entry in &paragraph.entries {
        if let Entry::Float { id: float, .. } = *entry {
            widest = widest.max(flow::layout_contribution(tree, float, ctx, mode));
        }
    }

    widest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reorder_reverses_embedded_run() {
        assert_eq!(reorder_visually(&[0, 1, 1, 0]), vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_reorder_nested_levels() {
        assert_eq!(reorder_visually(&[1, 1, 2, 2, 1]), vec![4, 2, 3, 1, 0]);
    }

    #[test]
    fn test_reorder_all_ltr_is_identity() {
        assert_eq!(reorder_visually(&[0, 0, 0]), vec![0, 1, 2]);
        assert!(reorder_visually(&[]).is_empty());
    }

    #[test]
    fn test_baseline_shift_middle_centres_on_x_height() {
        let parent = InlineMetrics {
            x_height: 8.0,
            ..InlineMetrics::EMPTY
        };
        let shift = baseline_shift(VerticalAlign::Middle, &parent, 20.0, 0.0);
        assert!((shift + 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_baseline_shift_sub_and_super() {
        let parent = InlineMetrics {
            subscript: 1.6,
            superscript: 8.0,
            ..InlineMetrics::EMPTY
        };
        assert!((baseline_shift(VerticalAlign::Sub, &parent, 0.0, 0.0) + 1.6).abs() < f32::EPSILON);
        assert!((baseline_shift(VerticalAlign::Super, &parent, 0.0, 0.0) - 8.0).abs() < f32::EPSILON);
    }
}
