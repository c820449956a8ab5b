//! CSS Float Layout.
//!
//! [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "A float is a box that is shifted to the left or right on the current line.
//! The most interesting characteristic of a float is that content may flow along
//! its side (or be prohibited from doing so by the 'clear' property)."
//!
//! "A floated box is shifted to the left or right until its outer edge touches
//! the containing block edge or the outer edge of another float."
//!
//! Each side keeps a list of *tracks*: horizontal bands of the block
//! formatting context, delimited by `block_offsets`, each remembering how far
//! the floats in it intrude from that side. The *shelf* is the lowest block
//! offset a new float on that side may be placed at; it only moves down.

use serde::Serialize;

use super::box_tree::{BoxId, BoxTree};
use crate::style::Float;

/// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
///
/// Where the containing block of the current content sits inside the block
/// formatting context, and how wide the formatting context is. Float
/// geometry is kept in formatting context coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BfcOffsets {
    /// Block offset of the current containing block's content edge.
    pub cb_block_start: f32,
    /// Distance from the formatting context's line-left edge to the current
    /// containing block's line-left content edge.
    pub cb_line_left: f32,
    /// Same, on the line-right side.
    pub cb_line_right: f32,
    /// Inline size of the formatting context root's content area.
    pub inline_size: f32,
}

/// Space left for content next to floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IfcVacancy {
    /// Space taken on the line-left side, from the formatting context edge.
    pub left_offset: f32,
    /// Space taken on the line-right side, from the formatting context edge.
    pub right_offset: f32,
    /// Remaining inline size.
    pub inline_size: f32,
    /// Block offset the vacancy was measured at.
    pub block_offset: f32,
    /// Number of left floats intruding.
    pub left_float_count: usize,
    /// Number of right floats intruding.
    pub right_float_count: usize,
}

impl IfcVacancy {
    /// Tolerance for rounding errors when checking whether content fits.
    pub const EPSILON: f32 = 1.0 / 64.0;

    /// Whether `inline_size` fits in the vacancy.
    #[must_use]
    pub fn fits(&self, inline_size: f32) -> bool {
        inline_size - self.inline_size < Self::EPSILON
    }

    /// Whether any float intrudes into the vacancy.
    #[must_use]
    pub const fn has_floats(&self) -> bool {
        self.left_float_count > 0 || self.right_float_count > 0
    }
}

/// The floats on one side of a block formatting context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatSide {
    /// Floats placed on this side, in placement order.
    pub items: Vec<BoxId>,
    shelf_block_offset: f32,
    shelf_track_index: usize,
    block_offsets: Vec<f32>,
    inline_sizes: Vec<f32>,
    inline_offsets: Vec<f32>,
    float_counts: Vec<usize>,
}

impl FloatSide {
    fn new(block_offset: f32) -> Self {
        Self {
            items: Vec::new(),
            shelf_block_offset: block_offset,
            shelf_track_index: 0,
            block_offsets: vec![block_offset],
            inline_sizes: vec![0.0],
            inline_offsets: vec![0.0],
            float_counts: vec![0],
        }
    }

    /// The furthest the floats in tracks `start..end` reach into the
    /// formatting context, measured from `inline_offset`.
    fn size_of_tracks(&self, start: usize, end: usize, inline_offset: f32) -> f32 {
        (start..end)
            .filter(|&i| self.float_counts[i] > 0)
            .map(|i| inline_offset + self.inline_sizes[i] + self.inline_offsets[i])
            .fold(0.0, f32::max)
    }

    fn float_count_of_tracks(&self, start: usize, end: usize) -> usize {
        self.float_counts[start..end].iter().copied().max().unwrap_or(0)
    }

    /// One past the last track that `block_offset..block_offset + block_size`
    /// overlaps, starting the search at `start`.
    fn end_track(&self, start: usize, block_offset: f32, block_size: f32) -> usize {
        let block_position = block_offset + block_size;
        let mut end = start + 1;
        while end < self.block_offsets.len() && self.block_offsets[end] < block_position {
            end += 1;
        }
        end
    }

    fn track_range(&self, block_offset: f32, block_size: f32) -> (usize, usize) {
        let mut start = self.block_offsets.partition_point(|&o| o < block_offset);
        if self.block_offsets.get(start) != Some(&block_offset) {
            start = start.saturating_sub(1);
        }
        (start, self.end_track(start, block_offset, block_size))
    }

    /// Inline space taken by this side's floats between `block_offset` and
    /// `block_offset + block_size`.
    #[must_use]
    pub fn occupied_space(&self, block_offset: f32, block_size: f32, inline_offset: f32) -> f32 {
        if self.items.is_empty() {
            return 0.0;
        }
        let (start, end) = self.track_range(block_offset, block_size);
        self.size_of_tracks(start, end, inline_offset)
    }

    fn box_start(&mut self, block_offset: f32) {
        self.shelf_block_offset = block_offset;
        self.shelf_track_index = self.track_range(block_offset, 0.0).0;
    }

    fn drop_shelf(&mut self, block_offset: f32) {
        if block_offset > self.shelf_block_offset {
            self.shelf_block_offset = block_offset;
            self.shelf_track_index = self.track_range(block_offset, 0.0).0;
        }
    }

    fn next_track_offset(&self) -> f32 {
        self.block_offsets
            .get(self.shelf_track_index + 1)
            .or_else(|| self.block_offsets.get(self.shelf_track_index))
            .copied()
            .unwrap_or(self.shelf_block_offset)
    }

    /// Block offset below every float on this side.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.block_offsets.last().copied().unwrap_or(0.0)
    }

    /// Split track `track_index` in two at `block_offset`. Both halves keep
    /// the original's intrusion.
    fn split_track(&mut self, track_index: usize, block_offset: f32) {
        let size = self.inline_sizes[track_index];
        let offset = self.inline_offsets[track_index];
        let count = self.float_counts[track_index];
        self.block_offsets.insert(track_index + 1, block_offset);
        self.inline_sizes.insert(track_index, size);
        self.inline_offsets.insert(track_index, offset);
        self.float_counts.insert(track_index, count);
    }

    #[allow(clippy::float_cmp)]
    fn split_if_shelf_dropped(&mut self) {
        if self.block_offsets[self.shelf_track_index] != self.shelf_block_offset {
            self.split_track(self.shelf_track_index, self.shelf_block_offset);
            self.shelf_track_index += 1;
        }
    }

    /// Record a float at the shelf and position it along the inline axis.
    fn place_float(&mut self, tree: &mut BoxTree, id: BoxId, vacancy: &IfcVacancy, offsets: &BfcOffsets) {
        debug_assert!(
            (vacancy.block_offset - self.shelf_block_offset).abs() < f32::EPSILON,
            "vacancy measured away from the shelf"
        );

        self.split_if_shelf_dropped();

        let side = tree[id].style.float;
        let border_area = tree[id].border_area;
        let margins = tree.margins_auto_is_zero(id);
        let start_track = self.shelf_track_index;
        let block_size = border_area.block_size + margins.block_start + margins.block_end;
        let block_end_offset = self.shelf_block_offset + block_size;

        let end_track = if block_size > 0.0 {
            let end = self.end_track(start_track, self.shelf_block_offset, block_size);
            if self.block_offsets.get(end) != Some(&block_end_offset) {
                self.split_track(end - 1, block_end_offset);
            }
            end
        } else {
            start_track
        };

        let (vc_offset, cb_offset, margin_offset, margin_end) = if side == Float::Left {
            (
                vacancy.left_offset,
                offsets.cb_line_left,
                margins.line_left,
                margins.line_right,
            )
        } else {
            (
                vacancy.right_offset,
                offsets.cb_line_right,
                margins.line_right,
                margins.line_left,
            )
        };

        if side == Float::Left {
            tree.set_inline_position(id, vc_offset - cb_offset + margin_offset);
        } else {
            let cb_inline_size = tree.containing_block(id).inline_size;
            tree.set_inline_position(
                id,
                cb_inline_size - border_area.inline_size - vc_offset + cb_offset - margin_offset,
            );
        }

        let outer = margin_offset + border_area.inline_size + margin_end;
        for track in start_track..end_track {
            if self.float_counts[track] == 0 {
                self.inline_offsets[track] = vc_offset;
                self.inline_sizes[track] = outer;
            } else {
                self.inline_sizes[track] = vc_offset - self.inline_offsets[track] + outer;
            }
            self.float_counts[track] += 1;
        }

        self.items.push(id);
    }
}

/// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
///
/// Float bookkeeping of one block formatting context. Created on demand by
/// the formatting context when its first float is placed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatContext {
    /// Left floats.
    pub left_floats: FloatSide,
    /// Right floats.
    pub right_floats: FloatSide,
    misfits: Vec<BoxId>,
}

impl FloatContext {
    /// An empty context whose shelves start at `block_offset`.
    #[must_use]
    pub fn new(block_offset: f32) -> Self {
        Self {
            left_floats: FloatSide::new(block_offset),
            right_floats: FloatSide::new(block_offset),
            misfits: Vec::new(),
        }
    }

    /// A new box started at the current block offset: floats that follow it
    /// may not be placed higher.
    pub fn box_start(&mut self, offsets: &BfcOffsets) {
        self.left_floats.box_start(offsets.cb_block_start);
        self.right_floats.box_start(offsets.cb_block_start);
    }

    /// Vacancy for a line box at `block_offset` of height `block_size`.
    #[must_use]
    pub fn vacancy_for_line(&self, offsets: &BfcOffsets, block_offset: f32, block_size: f32) -> IfcVacancy {
        let left_space =
            self.left_floats
                .occupied_space(block_offset, block_size, -offsets.cb_line_left);
        let right_space =
            self.right_floats
                .occupied_space(block_offset, block_size, -offsets.cb_line_right);
        let left_offset = offsets.cb_line_left + left_space;
        let right_offset = offsets.cb_line_right + right_space;
        IfcVacancy {
            left_offset,
            right_offset,
            inline_size: offsets.inline_size - left_offset - right_offset,
            block_offset,
            left_float_count: 0,
            right_float_count: 0,
        }
    }

    /// Vacancy at the shelf of `side` for a float of border block size
    /// `block_size`, with `line_width` already taken by the current line.
    fn vacancy_for_box(&self, offsets: &BfcOffsets, side: Float, block_size: f32, line_width: f32) -> IfcVacancy {
        let left = side == Float::Left;
        let (floats, opposite) = if left {
            (&self.left_floats, &self.right_floats)
        } else {
            (&self.right_floats, &self.left_floats)
        };
        let (inline_offset, opposite_inline_offset) = if left {
            (-offsets.cb_line_left, -offsets.cb_line_right)
        } else {
            (-offsets.cb_line_right, -offsets.cb_line_left)
        };

        let block_offset = floats.shelf_block_offset;
        let start_track = floats.shelf_track_index;
        let end_track = floats.end_track(start_track, block_offset, block_size);
        let inline_space = floats.size_of_tracks(start_track, end_track, inline_offset);
        let (opposite_start, opposite_end) = opposite.track_range(block_offset, block_size);
        let opposite_space = opposite.size_of_tracks(opposite_start, opposite_end, opposite_inline_offset);

        let (left_space, right_space) = if left {
            (inline_space, opposite_space)
        } else {
            (opposite_space, inline_space)
        };
        let left_offset = offsets.cb_line_left + left_space;
        let right_offset = offsets.cb_line_right + right_space;

        let count = floats.float_count_of_tracks(start_track, end_track);
        let opposite_count = opposite.float_count_of_tracks(opposite_start, opposite_end);
        let (left_float_count, right_float_count) = if left {
            (count, opposite_count)
        } else {
            (opposite_count, count)
        };

        IfcVacancy {
            left_offset,
            right_offset,
            inline_size: offsets.inline_size - left_offset - right_offset - line_width,
            block_offset,
            left_float_count,
            right_float_count,
        }
    }

    /// Bottom of the left floats.
    #[must_use]
    pub fn left_bottom(&self) -> f32 {
        self.left_floats.bottom()
    }

    /// Bottom of the right floats.
    #[must_use]
    pub fn right_bottom(&self) -> f32 {
        self.right_floats.bottom()
    }

    /// Bottom of all floats.
    #[must_use]
    pub fn both_bottom(&self) -> f32 {
        self.left_bottom().max(self.right_bottom())
    }

    /// Find the first block offset at or below `block_offset` where a line of
    /// `inline_size` fits beside the floats, stepping through track
    /// boundaries of both sides.
    #[must_use]
    pub fn find_line_position(
        &self,
        offsets: &BfcOffsets,
        mut block_offset: f32,
        block_size: f32,
        inline_size: f32,
    ) -> IfcVacancy {
        let mut left_index = self.left_floats.track_range(block_offset, block_size).0;
        let mut right_index = self.right_floats.track_range(block_offset, block_size).0;
        let left_len = self.left_floats.inline_sizes.len();
        let right_len = self.right_floats.inline_sizes.len();

        while left_index < left_len || right_index < right_len {
            let left_off = if left_index < left_len {
                self.left_floats.block_offsets[left_index]
            } else {
                f32::INFINITY
            };
            let right_off = if right_index < right_len {
                self.right_floats.block_offsets[right_index]
            } else {
                f32::INFINITY
            };

            block_offset = block_offset.max(left_off.min(right_off));
            let vacancy = self.vacancy_for_line(offsets, block_offset, block_size);
            if inline_size <= vacancy.inline_size {
                return vacancy;
            }

            if left_off <= right_off {
                left_index += 1;
            }
            if right_off <= left_off {
                right_index += 1;
            }
        }

        self.vacancy_for_line(offsets, block_offset, block_size)
    }

    /// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Place the laid out float `id`. `line_width` is the inline size already
    /// used by the current line; a float that does not fit beside it (unless
    /// the line is empty and no float is in the way) is queued as a misfit
    /// and placed after the line.
    ///
    /// "A left-floating box that has another left-floating box to its left
    /// may not have its right outer edge to the right of its containing
    /// block's right edge."
    pub fn place_float(
        &mut self,
        tree: &mut BoxTree,
        id: BoxId,
        offsets: &BfcOffsets,
        line_width: f32,
        line_is_empty: bool,
    ) {
        let style = tree[id].style.clone();
        let side = style.float;
        if side == Float::None {
            debug_assert!(false, "tried to place a box that does not float");
            return;
        }

        if !self.misfits.is_empty() {
            self.misfits.push(id);
            return;
        }

        let left_bottom = self.left_bottom();
        let right_bottom = self.right_bottom();
        {
            let floats = self.side_mut(side);
            if style.clear.clears_left() {
                floats.drop_shelf(left_bottom);
            }
            if style.clear.clears_right() {
                floats.drop_shelf(right_bottom);
            }
        }

        let border_area = tree[id].border_area;
        let margins = tree.margins_auto_is_zero(id);
        let vacancy = self.vacancy_for_box(offsets, side, border_area.block_size, line_width);
        let inline_size = border_area.inline_size + margins.line_left + margins.line_right;

        if vacancy.fits(inline_size) || (line_is_empty && !vacancy.has_floats()) {
            let shelf = self.side(side).shelf_block_offset;
            tree.set_block_position(id, shelf + margins.block_start - offsets.cb_block_start);
            self.side_mut(side).place_float(tree, id, &vacancy, offsets);

            #[cfg(feature = "layout-trace")]
            log::trace!(
                "[FLOAT] placed {id:?} {side} at shelf {shelf} (vacancy {})",
                vacancy.inline_size
            );
            return;
        }

        let without_line = self.vacancy_for_box(offsets, side, border_area.block_size, 0.0);
        if !without_line.fits(inline_size) {
            let (count, opposite_count) = if side == Float::Left {
                (without_line.left_float_count, without_line.right_float_count)
            } else {
                (without_line.right_float_count, without_line.left_float_count)
            };
            if count > 0 {
                let next = self.side(side).next_track_offset();
                self.side_mut(side).drop_shelf(next);
            } else if opposite_count > 0 {
                let shelf = self.side(side).shelf_block_offset;
                let opposite = self.side(side.opposite());
                let (_, track_index) = opposite.track_range(shelf, 0.0);
                if let Some(&next) = opposite.block_offsets.get(track_index) {
                    self.side_mut(side).drop_shelf(next);
                }
            }
        }

        self.misfits.push(id);
    }

    /// Place queued misfits until none remain. Each pass may queue floats
    /// again after dropping their shelf.
    pub fn consume_misfits(&mut self, tree: &mut BoxTree, offsets: &BfcOffsets) {
        while !self.misfits.is_empty() {
            let misfits = std::mem::take(&mut self.misfits);
            for id in misfits {
                self.place_float(tree, id, offsets, 0.0, true);
            }
        }
    }

    /// Move both shelves down to `block_offset`.
    pub fn drop_shelf(&mut self, block_offset: f32) {
        self.left_floats.drop_shelf(block_offset);
        self.right_floats.drop_shelf(block_offset);
    }

    /// A line box ending at `line_bottom` (formatting context coordinates)
    /// was finished. Floats after a break, and pending misfits, go below it.
    pub fn post_line(&mut self, tree: &mut BoxTree, offsets: &BfcOffsets, line_bottom: f32, did_break: bool) {
        if did_break || !self.misfits.is_empty() {
            self.drop_shelf(line_bottom);
        }
        self.consume_misfits(tree, offsets);
    }

    /// Inline content is about to be laid out: place anything still queued.
    pub fn pre_text_content(&mut self, tree: &mut BoxTree, offsets: &BfcOffsets) {
        self.consume_misfits(tree, offsets);
    }

    const fn side(&self, side: Float) -> &FloatSide {
        match side {
            Float::Right => &self.right_floats,
            Float::Left | Float::None => &self.left_floats,
        }
    }

    const fn side_mut(&mut self, side: Float) -> &mut FloatSide {
        match side {
            Float::Right => &mut self.right_floats,
            Float::Left | Float::None => &mut self.left_floats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side_with_float(inline_size: f32, from: f32, to: f32) -> FloatSide {
        let mut side = FloatSide::new(0.0);
        side.box_start(from);
        side.split_if_shelf_dropped();
        let end = side.end_track(side.shelf_track_index, from, to - from);
        side.split_track(end - 1, to);
        for track in side.shelf_track_index..end {
            side.inline_sizes[track] = inline_size;
            side.float_counts[track] += 1;
        }
        side.items.push(BoxId(1));
        side
    }

    #[test]
    fn test_occupied_space_only_inside_band() {
        let side = side_with_float(50.0, 10.0, 60.0);
        assert!((side.occupied_space(0.0, 5.0, 0.0)).abs() < f32::EPSILON);
        assert!((side.occupied_space(20.0, 5.0, 0.0) - 50.0).abs() < f32::EPSILON);
        assert!((side.occupied_space(5.0, 10.0, 0.0) - 50.0).abs() < f32::EPSILON);
        assert!((side.occupied_space(60.0, 10.0, 0.0)).abs() < f32::EPSILON);
        assert!((side.bottom() - 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_vacancy_fits_within_epsilon() {
        let vacancy = IfcVacancy {
            left_offset: 0.0,
            right_offset: 0.0,
            inline_size: 100.0,
            block_offset: 0.0,
            left_float_count: 0,
            right_float_count: 0,
        };
        assert!(vacancy.fits(100.01));
        assert!(!vacancy.fits(100.1));
    }
}
