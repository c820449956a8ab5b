//! Block formatting contexts.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! "In a block formatting context, boxes are laid out one after the other,
//! vertically, beginning at the top of a containing block. The vertical
//! distance between two sibling boxes is determined by the 'margin'
//! properties. Vertical margins between adjacent block-level boxes in a block
//! formatting context collapse."
//!
//! Margins can only be resolved once it is known what they adjoin, which is
//! often only after later boxes were seen. The formatting context therefore
//! records box start and end events on a stack and positions the boxes in a
//! batch whenever the pending margin stops adjoining (non-zero padding or
//! border, clearance, text, or the end of the context).

use std::collections::HashMap;

use serde::Serialize;

use super::box_tree::{BoxId, BoxKind, BoxTree};
use super::float::{BfcOffsets, FloatContext, IfcVacancy};
use crate::style::Clear;

/// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// "When two or more margins collapse, the resulting margin width is the
/// maximum of the collapsing margins' widths. In the case of negative
/// margins, the maximum of the absolute values of the negative adjoining
/// margins is deducted from the maximum of the positive adjoining margins.
/// If there are no positive margins, the maximum of the absolute values
/// of the adjoining margins is deducted from zero."
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MarginCollapseCollection {
    positive: f32,
    negative: f32,
}

impl MarginCollapseCollection {
    /// A collection holding one margin.
    #[must_use]
    pub fn new(initial: f32) -> Self {
        let mut collection = Self::default();
        let _ = collection.add(initial);
        collection
    }

    /// Add a margin to the adjoining set.
    pub fn add(&mut self, margin: f32) -> &mut Self {
        if margin < 0.0 {
            self.negative = self.negative.max(-margin);
        } else {
            self.positive = self.positive.max(margin);
        }
        self
    }

    /// The collapsed margin.
    #[must_use]
    pub fn get(&self) -> f32 {
        self.positive - self.negative
    }
}

/// The margin that has not been placed yet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct PendingMargin {
    /// Shallowest nesting level the margin adjoins.
    level: usize,
    collection: MarginCollapseCollection,
    /// Level at which clearance was introduced; the margin cannot collapse
    /// through the bottom of boxes at or above it.
    clearance_at_level: Option<usize>,
}

impl PendingMargin {
    fn new(level: usize) -> Self {
        Self {
            level,
            collection: MarginCollapseCollection::default(),
            clearance_at_level: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Start(BoxId),
    End(BoxId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Start,
    End,
}

/// State of one block formatting context while its boxes are laid out.
#[derive(Debug, Clone)]
pub struct BlockFormattingContext {
    /// Content inline size of the box that established the context.
    pub inline_size: f32,
    /// Floats, created when the first float is placed.
    pub fctx: Option<FloatContext>,
    /// Block offset of the next box's border edge (before pending margins),
    /// in the coordinates of the root's content area.
    pub cb_block_start: f32,
    /// Line-left inset of the current containing block from the root.
    pub cb_line_left: f32,
    /// Line-right inset of the current containing block from the root.
    pub cb_line_right: f32,
    stack: Vec<Event>,
    size_stack: Vec<f32>,
    offset_stack: Vec<f32>,
    last: Option<Last>,
    level: usize,
    hypotheticals: HashMap<BoxId, f32>,
    margin: PendingMargin,
}

impl BlockFormattingContext {
    /// A context for a root whose content area is `inline_size` wide.
    #[must_use]
    pub fn new(inline_size: f32) -> Self {
        Self {
            inline_size,
            fctx: None,
            cb_block_start: 0.0,
            cb_line_left: 0.0,
            cb_line_right: 0.0,
            stack: Vec::new(),
            size_stack: vec![0.0],
            offset_stack: vec![0.0],
            last: None,
            level: 0,
            hypotheticals: HashMap::new(),
            margin: PendingMargin::new(0),
        }
    }

    /// Current containing block offsets, for the float context.
    #[must_use]
    pub const fn offsets(&self) -> BfcOffsets {
        BfcOffsets {
            cb_block_start: self.cb_block_start,
            cb_line_left: self.cb_line_left,
            cb_line_right: self.cb_line_right,
            inline_size: self.inline_size,
        }
    }

    /// The float context, created with its shelves at `block_offset` if
    /// there is none yet.
    pub fn ensure_float_context(&mut self, block_offset: f32) -> &mut FloatContext {
        self.fctx.get_or_insert_with(|| FloatContext::new(block_offset))
    }

    /// Vacancy for a line of the current inline formatting context, in that
    /// context's content coordinates. Moves down past floats until
    /// `line_width` fits or no float is left.
    #[must_use]
    pub fn local_vacancy_for_line(&self, block_offset: f32, block_size: f32, line_width: f32) -> IfcVacancy {
        let offsets = self.offsets();
        let bfc_block_offset = self.cb_block_start + block_offset;
        let vacancy = match &self.fctx {
            Some(fctx) => fctx.find_line_position(&offsets, bfc_block_offset, block_size, line_width),
            None => self.open_vacancy(bfc_block_offset),
        };
        self.localize(vacancy)
    }

    /// Vacancy at exactly `block_offset`, in the current inline formatting
    /// context's content coordinates.
    #[must_use]
    pub fn local_vacancy_at(&self, block_offset: f32, block_size: f32) -> IfcVacancy {
        let offsets = self.offsets();
        let bfc_block_offset = self.cb_block_start + block_offset;
        let vacancy = match &self.fctx {
            Some(fctx) => fctx.vacancy_for_line(&offsets, bfc_block_offset, block_size),
            None => self.open_vacancy(bfc_block_offset),
        };
        self.localize(vacancy)
    }

    fn open_vacancy(&self, block_offset: f32) -> IfcVacancy {
        IfcVacancy {
            left_offset: self.cb_line_left,
            right_offset: self.cb_line_right,
            inline_size: self.inline_size - self.cb_line_left - self.cb_line_right,
            block_offset,
            left_float_count: 0,
            right_float_count: 0,
        }
    }

    fn localize(&self, mut vacancy: IfcVacancy) -> IfcVacancy {
        vacancy.block_offset -= self.cb_block_start;
        vacancy.left_offset -= self.cb_line_left;
        vacancy.right_offset -= self.cb_line_right;
        vacancy
    }

    /// Where the content area of block container `id` sits inside its border
    /// area's containing block: `(block_start, line_left, line_right)`.
    fn containing_block_to_content(tree: &BoxTree, id: BoxId) -> (f32, f32, f32) {
        let cb = tree.containing_block(id);
        let node = &tree[id];
        let style = &node.style;
        let block_start = style.border_block_start_width(&cb) + style.padding_block_start(&cb);
        let line_left = node.border_area.line_left
            + style.border_line_left_width(&cb)
            + style.padding_line_left(&cb);
        let line_right = cb.inline_size - line_left - node.content_area.inline_size;
        (block_start, line_left, line_right)
    }

    /// [§ 9.5.2 Controlling flow next to floats](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    ///
    /// Add the block-start margin of `id` to the pending margin, or, if the
    /// box has clearance, flush and start a new margin below the floats.
    ///
    /// "Computing the clearance of an element on which 'clear' is set is done
    /// by first determining the hypothetical position of the element's top
    /// border edge."
    fn collapse_start(&mut self, tree: &mut BoxTree, id: BoxId) {
        let cb = tree.containing_block(id);
        let style = tree[id].style.clone();
        let margin_block_start = style.margin_block_start(&cb).to_px_or(0.0);
        let mut float_bottom: f32 = 0.0;
        let mut clearance: f32 = 0.0;

        if let Some(fctx) = &self.fctx {
            if style.clear.clears_left() {
                float_bottom = float_bottom.max(fctx.left_bottom());
            }
            if style.clear.clears_right() {
                float_bottom = float_bottom.max(fctx.right_bottom());
            }
        }

        if style.clear != Clear::None {
            let mut hypothetical = self.margin.collection;
            let _ = hypothetical.add(margin_block_start);
            clearance = clearance.max(float_bottom - (self.cb_block_start + hypothetical.get()));
        }

        if clearance > 0.0 {
            self.position_block_containers(tree);
            let c = float_bottom - self.cb_block_start;
            self.margin = PendingMargin {
                level: self.level,
                collection: MarginCollapseCollection::new(c),
                clearance_at_level: None,
            };
            if can_collapse_through(tree, id) {
                self.margin.clearance_at_level = Some(self.level);
            }

            #[cfg(feature = "layout-trace")]
            log::trace!("[BFC] clearance {clearance} for {id:?}");
        } else {
            let _ = self.margin.collection.add(margin_block_start);
        }
    }

    /// The block container `id` starts. For a block container of inlines,
    /// `layout_text` lays out its lines while the pending margin is known.
    pub fn box_start(
        &mut self,
        tree: &mut BoxTree,
        id: BoxId,
        layout_text: impl FnOnce(&mut BoxTree, &mut Self),
    ) {
        let cb = tree.containing_block(id);
        let (block_start, line_left, line_right) = Self::containing_block_to_content(tree, id);
        let style = tree[id].style.clone();
        let adjoins_next =
            style.padding_block_start(&cb) == 0.0 && style.border_block_start_width(&cb) == 0.0;
        let is_ifc = tree[id].kind.is_block_container_of_inlines();

        self.collapse_start(tree, id);

        self.last = Some(Last::Start);
        self.level += 1;
        self.cb_line_left += line_left;
        self.cb_line_right += line_right;
        self.stack.push(Event::Start(id));

        let text_offset = block_start + self.margin.collection.get();
        if is_ifc {
            self.cb_block_start += text_offset;
        }

        let offsets = self.offsets();
        if let Some(fctx) = &mut self.fctx {
            fctx.box_start(&offsets);
        }

        if is_ifc {
            layout_text(tree, self);
            self.cb_block_start -= text_offset;
        }

        if !adjoins_next {
            self.position_block_containers(tree);
            self.margin = PendingMargin::new(self.level);
        }
    }

    /// The block container `id` ends.
    pub fn box_end(&mut self, tree: &mut BoxTree, id: BoxId) {
        let cb = tree.containing_block(id);
        let (_, line_left, line_right) = Self::containing_block_to_content(tree, id);
        let style = tree[id].style.clone();
        let margin_block_end = style.margin_block_end(&cb).to_px_or(0.0);
        let mut adjoins = style.padding_block_end(&cb) == 0.0
            && style.border_block_end_width(&cb) == 0.0
            && self
                .margin
                .clearance_at_level
                .is_none_or(|level| self.level > level);

        if adjoins {
            adjoins = if self.last == Some(Last::Start) {
                can_collapse_through(tree, id)
            } else {
                style.block_size(&cb).is_auto()
            };
        }

        self.stack.push(Event::End(id));
        self.level -= 1;
        self.cb_line_left -= line_left;
        self.cb_line_right -= line_right;

        if !adjoins {
            self.position_block_containers(tree);
            self.margin = PendingMargin::new(self.level);
        }

        if self.last == Some(Last::Start) {
            let _ = self.hypotheticals.insert(id, self.margin.collection.get());
        }

        let _ = self.margin.collection.add(margin_block_end);
        if self.level < self.margin.level {
            self.margin.level = self.level;
        }

        self.last = Some(Last::End);
    }

    /// A block-level box without block-level children (a replaced box). Its
    /// margins never collapse through it.
    pub fn box_atomic(&mut self, tree: &mut BoxTree, id: BoxId) {
        let cb = tree.containing_block(id);
        let margin_block_end = tree[id].style.margin_block_end(&cb).to_px_or(0.0);

        self.collapse_start(tree, id);
        self.level += 1;
        self.stack.push(Event::Start(id));
        let offsets = self.offsets();
        if let Some(fctx) = &mut self.fctx {
            fctx.box_start(&offsets);
        }
        self.position_block_containers(tree);

        self.level -= 1;
        self.stack.push(Event::End(id));
        self.margin = PendingMargin::new(self.level);
        self.position_block_containers(tree);

        let _ = self.margin.collection.add(margin_block_end);
        self.last = Some(Last::End);
    }

    /// [§ 10.6.7 'Auto' heights for block formatting context roots](https://www.w3.org/TR/CSS2/visudet.html#root-height)
    ///
    /// Flush everything and size the root `id` if its height is `auto`.
    ///
    /// "In addition, if the element has any floating descendants whose bottom
    /// margin edge is below the element's bottom content edge, then the
    /// height is increased to include those edges."
    pub fn finalize(&mut self, tree: &mut BoxTree, id: BoxId) {
        debug_assert!(tree[id].kind.is_bfc_root(), "finalize is for formatting context roots");
        let cb = tree.containing_block(id);
        let auto = tree[id].style.block_size(&cb).is_auto();

        self.position_block_containers(tree);

        if auto {
            let linebox_height = if tree[id].kind.is_block_container_of_inlines() {
                tree[id].content_area.block_size
            } else {
                0.0
            };
            let float_bottom = self.fctx.as_ref().map_or(0.0, FloatContext::both_bottom);
            let size = linebox_height.max(self.cb_block_start).max(float_bottom);
            set_block_size_clamped(tree, id, size);
        }
    }

    /// Resolve the pending margin and position every box whose start or end
    /// was recorded since the last flush.
    fn position_block_containers(&mut self, tree: &mut BoxTree) {
        let margin = self.margin.collection.get();
        let top = self.offset_stack.len() - 1;
        let mut passed_margin_level = self.margin.level == top;
        let mut level_needs_post_offset = top;

        if let Some(size) = self.size_stack.get_mut(self.margin.level) {
            *size += margin;
        }
        self.cb_block_start += margin;

        for event in std::mem::take(&mut self.stack) {
            match event {
                Event::End(id) => {
                    let child_size = self.size_stack.pop().unwrap_or(0.0);
                    let offset = self.offset_stack.pop().unwrap_or(0.0);
                    let level = self.size_stack.len().saturating_sub(1);
                    let cb = tree.containing_block(id);
                    let node = &tree[id];
                    if node.style.block_size(&cb).is_auto()
                        && node.kind.is_block_container_of_blocks()
                        && !node.kind.is_bfc_root()
                    {
                        set_block_size_clamped(tree, id, child_size);
                    }

                    let block_size = tree[id].border_area.block_size;
                    if let Some(size) = self.size_stack.get_mut(level) {
                        *size += block_size;
                    }
                    self.cb_block_start = offset + block_size;

                    if level < level_needs_post_offset {
                        level_needs_post_offset -= 1;
                        self.cb_block_start += margin;
                    }
                }
                Event::Start(id) => {
                    let level = self.size_stack.len().saturating_sub(1);
                    let mut block_offset = self.size_stack.get(level).copied().unwrap_or(0.0);

                    if !passed_margin_level {
                        passed_margin_level = self.margin.level == level;
                    }
                    if !passed_margin_level {
                        block_offset += margin;
                    }
                    if let Some(hypothetical) = self.hypotheticals.get(&id) {
                        block_offset -= margin - hypothetical;
                    }

                    tree.set_block_position(id, block_offset);
                    self.size_stack.push(0.0);
                    self.offset_stack.push(self.cb_block_start);
                }
            }
        }

        #[cfg(feature = "layout-trace")]
        log::trace!(
            "[BFC] flushed margin {margin} at level {}, cb_block_start={}",
            self.margin.level,
            self.cb_block_start
        );
    }
}

/// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// "top and bottom margins of a box that does not establish a new block
/// formatting context and that has zero computed 'min-height', zero or
/// 'auto' computed 'height', and no in-flow children" adjoin.
#[must_use]
pub fn can_collapse_through(tree: &BoxTree, id: BoxId) -> bool {
    let cb = tree.containing_block(id);
    let node = &tree[id];
    match node.style.block_size(&cb).length() {
        Some(size) if size != 0.0 => return false,
        _ => {}
    }
    if node.style.min_block_size(&cb) > 0.0 {
        return false;
    }

    match node.kind.formatting() {
        BoxKind::BlockContainerOfInlines(_, paragraph) => !paragraph.has_content(),
        BoxKind::BlockContainerOfBlocks(_) => node
            .children
            .iter()
            .all(|&child| tree[child].style.is_absolute()),
        _ => false,
    }
}

/// Set the content block size of `id`, clamped by `min-height` and
/// `max-height`.
pub fn set_block_size_clamped(tree: &mut BoxTree, id: BoxId, size: f32) {
    let cb = tree.containing_block(id);
    let clamped = tree[id].style.clamp_block_size(&cb, size);
    tree.set_block_size(id, clamped);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_margins_take_the_maximum() {
        let mut collection = MarginCollapseCollection::new(20.0);
        let _ = collection.add(30.0);
        assert!((collection.get() - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_negative_margin_is_deducted() {
        let mut collection = MarginCollapseCollection::new(20.0);
        let _ = collection.add(-5.0).add(-8.0);
        assert!((collection.get() - 12.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_only_negative_margins() {
        let mut collection = MarginCollapseCollection::new(-4.0);
        let _ = collection.add(-9.0);
        assert!((collection.get() + 9.0).abs() < f32::EPSILON);
    }
}
