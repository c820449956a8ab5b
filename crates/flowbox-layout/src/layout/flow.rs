//! Flow layout steps.
//!
//! [§ 10 Visual formatting model details](https://www.w3.org/TR/CSS2/visudet.html)
//!
//! The recursive step of block layout. In-flow block-level boxes are sized
//! along the inline axis here and handed to the [`BlockFormattingContext`]
//! that positions them; block containers of inlines call into the inline
//! layout while their block offset is known. Floats, atomic inlines and
//! block formatting context roots get their own formatting context and a
//! shrink-to-fit width where theirs is `auto`.

use super::bfc::{BlockFormattingContext, set_block_size_clamped};
use super::box_tree::{BoxId, BoxKind, BoxTree, UsedMargins};
use super::LayoutContext;
use crate::inline::{layout_paragraph, paragraph_contribution};
use crate::style::{AutoOr, Direction};

/// [§ 5.1 Intrinsic Sizes](https://www.w3.org/TR/css-sizing-3/#intrinsic-sizes)
///
/// Which intrinsic inline size to measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntrinsicSize {
    /// "The smallest size a box could take that doesn't lead to overflow
    /// that could be avoided by choosing a larger size."
    MinContent,
    /// "A box's ideal size in a given axis when given infinite available
    /// space."
    MaxContent,
}

/// Used inline-axis values of a block-level box.
#[derive(Debug, Clone, Copy, PartialEq)]
struct InlineAxis {
    /// Content inline size.
    size: f32,
    margin_line_left: f32,
    margin_line_right: f32,
}

/// Default size of a replaced element without natural dimensions.
///
/// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
///
/// "Otherwise, if 'width' has a computed value of 'auto', and the element
/// has an intrinsic width, then that intrinsic width is the used value of
/// 'width'. Otherwise ... the used value of 'width' becomes 300px."
const DEFAULT_REPLACED_WIDTH: f32 = 300.0;
const DEFAULT_REPLACED_HEIGHT: f32 = 150.0;

/// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// "The following constraints must hold among the used values of the other
/// properties:
///
/// 'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
/// 'padding-right' + 'border-right-width' + 'margin-right' = width of
/// containing block"
fn solve_inline_axis(
    available: f32,
    size: AutoOr,
    margin_line_left: AutoOr,
    margin_line_right: AutoOr,
    padding_border: f32,
    direction: Direction,
) -> InlineAxis {
    let mut left = margin_line_left;
    let mut right = margin_line_right;

    // STEP 1: "If 'width' is not 'auto' and 'border-left-width' +
    // 'padding-left' + 'width' + 'padding-right' + 'border-right-width'
    // (plus any of 'margin-left' or 'margin-right' that are not 'auto') is
    // larger than the width of the containing block, then any 'auto' values
    // for 'margin-left' or 'margin-right' are, for the following rules,
    // treated as zero."
    let too_wide = size
        .length()
        .is_some_and(|size| size + padding_border + left.to_px_or(0.0) + right.to_px_or(0.0) > available);
    if too_wide {
        left = AutoOr::Length(left.to_px_or(0.0));
        right = AutoOr::Length(right.to_px_or(0.0));
    }

    let remaining = |size: f32, margin: f32| available - size - padding_border - margin;

    match (size, left, right) {
        // RULE A: "If 'width' is set to 'auto', any other 'auto' values
        // become '0' and 'width' follows from the resulting equality."
        (AutoOr::Auto, left, right) => {
            let margin_line_left = left.to_px_or(0.0);
            let margin_line_right = right.to_px_or(0.0);
            let size = remaining(0.0, margin_line_left + margin_line_right);
            if size >= 0.0 {
                return InlineAxis {
                    size,
                    margin_line_left,
                    margin_line_right,
                };
            }
            // A negative width is clamped and the box overflows on the end
            // side.
            over_constrained(available, 0.0, margin_line_left, margin_line_right, padding_border, direction)
        }
        // RULE B: "If both 'margin-left' and 'margin-right' are 'auto',
        // their used values are equal."
        (AutoOr::Length(size), AutoOr::Auto, AutoOr::Auto) => {
            let half = remaining(size, 0.0) / 2.0;
            InlineAxis {
                size,
                margin_line_left: half,
                margin_line_right: half,
            }
        }
        // RULE C: "If there is exactly one value specified as 'auto', its
        // used value follows from the equality."
        (AutoOr::Length(size), AutoOr::Auto, AutoOr::Length(right)) => InlineAxis {
            size,
            margin_line_left: remaining(size, right),
            margin_line_right: right,
        },
        (AutoOr::Length(size), AutoOr::Length(left), AutoOr::Auto) => InlineAxis {
            size,
            margin_line_left: left,
            margin_line_right: remaining(size, left),
        },
        // RULE D: over-constrained.
        (AutoOr::Length(size), AutoOr::Length(left), AutoOr::Length(right)) => {
            over_constrained(available, size, left, right, padding_border, direction)
        }
    }
}

/// "If all of the above have a computed value other than 'auto', the values
/// are said to be 'over-constrained' and one of the used values will have
/// to be different from its computed value. If the 'direction' property of
/// the containing block has the value 'ltr', the specified value of
/// 'margin-right' is ignored and the value is calculated so as to make the
/// equality true. If the value of 'direction' is 'rtl', this happens to
/// 'margin-left' instead."
fn over_constrained(
    available: f32,
    size: f32,
    left: f32,
    right: f32,
    padding_border: f32,
    direction: Direction,
) -> InlineAxis {
    match direction {
        Direction::Ltr => InlineAxis {
            size,
            margin_line_left: left,
            margin_line_right: available - size - padding_border - left,
        },
        Direction::Rtl => InlineAxis {
            size,
            margin_line_left: available - size - padding_border - right,
            margin_line_right: right,
        },
    }
}

/// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
/// and [§ 10.6.2](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-height)
///
/// Used content inline and block size of replaced box `id`, before min/max
/// clamping.
fn replaced_size(tree: &BoxTree, id: BoxId) -> (f32, f32) {
    let cb = tree.containing_block(id);
    let node = &tree[id];
    let style = &node.style;
    let Some(replaced) = node.kind.replaced() else {
        return (0.0, 0.0);
    };
    let ratio = replaced.ratio();

    match (style.inline_size(&cb).length(), style.block_size(&cb).length()) {
        (Some(width), Some(height)) => (width, height),
        // "If 'height' has a computed value of 'auto', and the element has
        // an intrinsic ratio then the used value of 'height' is: (used
        // width) / (intrinsic ratio)"
        (Some(width), None) => (width, width / ratio),
        (None, Some(height)) => (height * ratio, height),
        (None, None) => match (replaced.intrinsic_width, replaced.intrinsic_height) {
            (Some(width), Some(height)) => (width, height),
            (Some(width), None) => (width, DEFAULT_REPLACED_HEIGHT),
            (None, Some(height)) => (DEFAULT_REPLACED_WIDTH, height),
            (None, None) => (DEFAULT_REPLACED_WIDTH, DEFAULT_REPLACED_HEIGHT),
        },
    }
}

/// Store used margins and the inline size, and inset the inner areas.
fn commit_inline_axis(tree: &mut BoxTree, id: BoxId, axis: InlineAxis) {
    let cb = tree.containing_block(id);
    let style = tree[id].style.clone();
    let padding_border = style.inline_padding_border(&cb);

    tree[id].margins = UsedMargins {
        block_start: style.margin_block_start(&cb).to_px_or(0.0),
        line_right: axis.margin_line_right,
        block_end: style.margin_block_end(&cb).to_px_or(0.0),
        line_left: axis.margin_line_left,
    };
    tree.set_inline_outer_size(id, axis.size + padding_border);
    tree.set_inline_position(id, axis.margin_line_left);
    tree.fill_areas(id);
}

/// [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
///
/// Resolve the inline axis of in-flow block-level box `id`.
///
/// "1. The tentative used width is calculated (without 'min-width' and
/// 'max-width') following the rules under 'Calculating widths and margins'
/// above.
/// 2. If the tentative used width is greater than 'max-width', the rules
/// above are applied again using the computed value of 'max-width' as the
/// computed value for 'width'.
/// 3. If the resulting width is smaller than 'min-width', the rules above
/// are applied again, but this time using the value of 'min-width' as the
/// computed value for 'width'."
fn block_box_model(tree: &mut BoxTree, id: BoxId) {
    let cb = tree.containing_block(id);
    let style = tree[id].style.clone();
    let padding_border = style.inline_padding_border(&cb);
    let margin_line_left = style.margin_line_left(&cb);
    let margin_line_right = style.margin_line_right(&cb);

    let specified = match tree[id].kind.replaced() {
        Some(_) => AutoOr::Length(replaced_size(tree, id).0),
        None => style.inline_size(&cb),
    };

    let solve = |size: AutoOr| {
        solve_inline_axis(
            cb.inline_size,
            size,
            margin_line_left,
            margin_line_right,
            padding_border,
            cb.direction,
        )
    };

    // STEP 1: tentative width.
    let mut axis = solve(specified);

    // STEP 2 and 3: min-width and max-width.
    let clamped = style.clamp_inline_size(&cb, axis.size);
    if (clamped - axis.size).abs() > f32::EPSILON {
        axis = solve(AutoOr::Length(clamped));
    }

    commit_inline_axis(tree, id, axis);
}

/// [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
///
/// Resolve the inline axis of a float, atomic inline or absolutely
/// positioned box `id`. `auto` margins are zero and an `auto` width is the
/// shrink-to-fit width within `available` (margin box).
///
/// "Then the shrink-to-fit width is:
///   min(max(preferred minimum width, available width), preferred width)"
fn shrink_to_fit_box_model(tree: &mut BoxTree, id: BoxId, ctx: &LayoutContext<'_>, available: f32) {
    let cb = tree.containing_block(id);
    let style = tree[id].style.clone();
    let margins = tree.margins_auto_is_zero(id);
    let padding_border = style.inline_padding_border(&cb);

    let size = if tree[id].kind.replaced().is_some() {
        replaced_size(tree, id).0
    } else if let AutoOr::Length(size) = style.inline_size(&cb) {
        size
    } else {
        // STEP 1: preferred width and preferred minimum width.
        let min_content = content_contribution(tree, id, ctx, IntrinsicSize::MinContent);
        let max_content = content_contribution(tree, id, ctx, IntrinsicSize::MaxContent);

        // STEP 2: available width.
        let available = available - margins.line_left - margins.line_right - padding_border;

        // STEP 3: shrink-to-fit.
        min_content.max(available).min(max_content)
    };

    commit_inline_axis(
        tree,
        id,
        InlineAxis {
            size: style.clamp_inline_size(&cb, size),
            margin_line_left: margins.line_left,
            margin_line_right: margins.line_right,
        },
    );
}

/// Content block size of `id` if it does not depend on layout.
fn definite_block_size(tree: &BoxTree, id: BoxId) -> Option<f32> {
    if tree[id].kind.replaced().is_some() {
        return Some(replaced_size(tree, id).1);
    }
    let cb = tree.containing_block(id);
    tree[id].style.block_size(&cb).length()
}

/// [§ 10.6.7 'Auto' heights for block formatting context roots](https://www.w3.org/TR/CSS2/visudet.html#root-height)
///
/// Lay out the contents of block formatting context root `id`, whose inline
/// axis is already resolved, in a fresh formatting context. Sizes the box if
/// its height is `auto`.
pub(crate) fn layout_formatting_root(tree: &mut BoxTree, id: BoxId, ctx: &LayoutContext<'_>) {
    if let Some(size) = definite_block_size(tree, id) {
        set_block_size_clamped(tree, id, size);
    }
    if tree[id].kind.replaced().is_some() {
        return;
    }

    let mut bfc = BlockFormattingContext::new(tree[id].content_area.inline_size);

    #[cfg(feature = "layout-trace")]
    log::trace!("[BFC] root {id:?} inline size {}", bfc.inline_size);

    if tree[id].kind.is_block_container_of_inlines() {
        let lines = layout_paragraph(tree, id, ctx, &mut bfc);
        if definite_block_size(tree, id).is_none() {
            tree.set_block_size(id, lines);
        }
    } else if tree[id].kind.is_block_container_of_blocks() {
        for child in tree[id].children.clone() {
            layout_block_level_box(tree, child, ctx, &mut bfc);
        }
    } else {
        return;
    }

    bfc.finalize(tree, id);
}

/// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
///
/// Lay out in-flow block-level box `id` and its subtree in `bfc`.
///
/// "In a block formatting context, boxes are laid out one after the other,
/// vertically, beginning at the top of a containing block."
pub(crate) fn layout_block_level_box(
    tree: &mut BoxTree,
    id: BoxId,
    ctx: &LayoutContext<'_>,
    bfc: &mut BlockFormattingContext,
) {
    // Laid out after the flow, against their own containing block.
    if tree[id].style.is_absolute() {
        return;
    }

    // STEP 1: inline axis.
    block_box_model(tree, id);

    // STEP 2: boxes that are laid out on their own and then flow as one
    // piece: replaced boxes and new formatting context roots.
    let kind = &tree[id].kind;
    if kind.replaced().is_some() || kind.is_bfc_root() {
        layout_formatting_root(tree, id, ctx);
        bfc.box_atomic(tree, id);
        return;
    }
    if !kind.is_block_container() {
        return;
    }

    // STEP 3: a definite height is known before the children.
    let definite = definite_block_size(tree, id);
    if let Some(size) = definite {
        set_block_size_clamped(tree, id, size);
    }

    // STEP 4: children. Lines are laid out once the block offset of the
    // content edge is known.
    bfc.box_start(tree, id, |tree, bfc| {
        let lines = layout_paragraph(tree, id, ctx, bfc);
        if definite.is_none() {
            set_block_size_clamped(tree, id, lines);
        }
    });
    if tree[id].kind.is_block_container_of_blocks() {
        for child in tree[id].children.clone() {
            layout_block_level_box(tree, child, ctx, bfc);
        }
    }

    // STEP 5: an auto height of a block container of blocks is the sum of
    // its children, resolved by the formatting context when the margins
    // below them are known.
    bfc.box_end(tree, id);
}

/// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
///
/// Size and lay out float `id`. Placement is left to the float context.
///
/// "A floated box is shifted to the left or right until its outer edge
/// touches the containing block edge or the outer edge of another float."
pub(crate) fn layout_float_box(tree: &mut BoxTree, id: BoxId, ctx: &LayoutContext<'_>) {
    let available = tree.containing_block(id).inline_size;
    shrink_to_fit_box_model(tree, id, ctx, available);
    layout_formatting_root(tree, id, ctx);
}

/// [§ 10.3.9 'Inline-block', non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#inlineblock-width)
///
/// Size and lay out atomic inline `id`. The line builder positions it.
///
/// "If 'width' is 'auto', the used value is the shrink-to-fit width as for
/// floating elements."
pub(crate) fn layout_atomic_inline(tree: &mut BoxTree, id: BoxId, ctx: &LayoutContext<'_>) {
    let available = tree.containing_block(id).inline_size;
    shrink_to_fit_box_model(tree, id, ctx, available);
    layout_formatting_root(tree, id, ctx);
}

/// [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
///
/// Size and lay out absolutely positioned box `id` within `available`
/// pixels of its containing block. Positioning is done by the caller.
pub(crate) fn layout_absolute_box(tree: &mut BoxTree, id: BoxId, ctx: &LayoutContext<'_>, available: f32) {
    shrink_to_fit_box_model(tree, id, ctx, available);
    layout_formatting_root(tree, id, ctx);
}

/// Intrinsic content inline size of `id`, without its padding, border and
/// margins.
fn content_contribution(tree: &BoxTree, id: BoxId, ctx: &LayoutContext<'_>, mode: IntrinsicSize) -> f32 {
    let node = &tree[id];
    match node.kind.formatting() {
        BoxKind::ReplacedBox(_) => replaced_size(tree, id).0,
        BoxKind::BlockContainerOfInlines(..) => paragraph_contribution(tree, id, ctx, mode),
        BoxKind::BlockContainerOfBlocks(_) => node
            .children
            .iter()
            .filter(|&&child| !tree[child].style.is_absolute())
            .map(|&child| layout_contribution(tree, child, ctx, mode))
            .fold(0.0, f32::max),
        _ => 0.0,
    }
}

/// [§ 5.1 Intrinsic Sizes](https://www.w3.org/TR/css-sizing-3/#intrinsic-sizes)
///
/// Min-content or max-content contribution of `id`: the inline size of its
/// margin box when sized at that intrinsic size.
///
/// "The contribution of a box to its containing block's intrinsic size is
/// the outer size of the box, including its margins."
pub(crate) fn layout_contribution(tree: &BoxTree, id: BoxId, ctx: &LayoutContext<'_>, mode: IntrinsicSize) -> f32 {
    let cb = tree.containing_block(id);
    let style = &tree[id].style;
    let margins = tree.margins_auto_is_zero(id);

    let size = match style.inline_size(&cb) {
        AutoOr::Length(size) if tree[id].kind.replaced().is_none() => size,
        _ => content_contribution(tree, id, ctx, mode),
    };

    style.clamp_inline_size(&cb, size)
        + style.inline_padding_border(&cb)
        + margins.line_left
        + margins.line_right
}
