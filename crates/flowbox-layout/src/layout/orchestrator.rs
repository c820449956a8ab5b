//! Layout passes over a whole box tree.
//!
//! [§ 9 Visual formatting model](https://www.w3.org/TR/CSS2/visuren.html)
//!
//! Layout of one tree runs in four passes:
//!
//! 1. **Prelayout** (top-down): containing blocks, definiteness of block
//!    sizes, inline metrics and paragraph preparation.
//! 2. **Flow**: the children of the initial containing block in a block
//!    formatting context rooted at it.
//! 3. **Absolute positioning**: boxes taken out of flow, in document order so
//!    that nested containing blocks are sized first.
//! 4. **Postlayout** (top-down): relative offsets, inline box areas,
//!    conversion to absolute physical coordinates and pixel snapping.

use super::bfc::BlockFormattingContext;
use super::box_model::{AreaKind, AreaRef, BoxArea};
use super::box_tree::{BoxId, BoxKind, BoxTree};
use super::flow;
use super::LayoutContext;
use crate::inline::prepare_paragraph;
use crate::style::{AutoOr, Direction, Position};
use crate::text::InlineMetrics;

/// Lay out every box of `tree`.
///
/// Areas are flow-relative while the passes run and absolute, physical and
/// frozen once this returns. Line boxes and their items stay relative to the
/// content area of the block container that owns them.
pub fn layout_tree(tree: &mut BoxTree, ctx: &LayoutContext<'_>) {
    if tree.is_frozen() {
        log::debug!("layout_tree called on a frozen tree, ignoring");
        return;
    }

    prelayout(tree, ctx);

    let mut bfc = BlockFormattingContext::new(tree[BoxId::ICB].content_area.inline_size);
    for child in tree[BoxId::ICB].children.clone() {
        flow::layout_block_level_box(tree, child, ctx, &mut bfc);
    }
    bfc.finalize(tree, BoxId::ICB);

    layout_absolutes(tree, ctx);
    postlayout(tree);
}

/// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
///
/// "4. If the element has 'position: absolute', the containing block is
/// established by the nearest ancestor with a 'position' other than
/// 'static' ... In that case the containing block is formed by the padding
/// edge of the ancestor. If there is no such ancestor, the containing block
/// is the initial containing block."
///
/// Otherwise "the containing block is formed by the content edge of the
/// nearest ancestor box that is a block container".
fn find_containing_block(tree: &BoxTree, id: BoxId) -> AreaRef {
    let absolute = tree[id].style.is_absolute();
    let mut ancestor = tree[id].parent;
    while let Some(candidate) = ancestor {
        let node = &tree[candidate];
        if absolute {
            if node.kind.is_formatting_box() && node.style.is_positioned() {
                return AreaRef::padding(candidate);
            }
        } else if node.kind.is_block_container() {
            return AreaRef::content(candidate);
        }
        ancestor = node.parent;
    }
    if absolute {
        AreaRef::padding(BoxId::ICB)
    } else {
        AreaRef::content(BoxId::ICB)
    }
}

fn prelayout(tree: &mut BoxTree, ctx: &LayoutContext<'_>) {
    let viewport = *tree.viewport();
    {
        let icb = &mut tree[BoxId::ICB];
        for kind in [AreaKind::Border, AreaKind::Padding, AreaKind::Content] {
            let area = icb.area_mut(kind);
            area.inline_size = viewport.width;
            area.block_size = viewport.height;
        }
        icb.block_size_definite = true;
    }

    let order = tree.preorder(BoxId::ICB);

    // STEP 1: containing blocks and definite sizes. Preorder visits every
    // containing block before the boxes inside it.
    for &id in order.iter().skip(1) {
        let cb = find_containing_block(tree, id);
        tree[id].containing_block = Some(cb);
        let cb_definite = cb.kind == AreaKind::Padding || tree[cb.id].block_size_definite;
        tree[id].block_size_definite = tree.compute_block_size_definite(id, cb_definite);

        if tree[id].kind.is_inline() {
            let metrics = InlineMetrics::compute(ctx.shaper, &tree[id].style, ctx.lang);
            if let BoxKind::Inline(inline) = &mut tree[id].kind {
                inline.metrics = metrics;
            }
        }
    }

    // STEP 2: paragraphs, once every inline box has its metrics.
    for &id in &order {
        if tree[id].kind.is_block_container_of_inlines() {
            prepare_paragraph(tree, id, ctx);
        }
    }
}

/// [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
///
/// Size and place every absolutely positioned box against its containing
/// block. Without insets on an axis the box sits at the containing block's
/// content origin on that axis.
fn layout_absolutes(tree: &mut BoxTree, ctx: &LayoutContext<'_>) {
    for id in tree.preorder(BoxId::ICB) {
        if id == BoxId::ICB || !tree[id].style.is_absolute() {
            continue;
        }

        let cb = tree.containing_block(id);
        let style = tree[id].style.clone();
        let line_left = style.inset_line_left(&cb);
        let line_right = style.inset_line_right(&cb);
        let block_start = style.inset_block_start(&cb);
        let block_end = style.inset_block_end(&cb);

        let available = cb.inline_size - line_left.to_px_or(0.0) - line_right.to_px_or(0.0);
        flow::layout_absolute_box(tree, id, ctx, available.max(0.0));

        // The containing block is a padding area; the static position is
        // at the content edge inside it.
        let content_origin = tree[id]
            .containing_block
            .map_or(BoxArea::default(), |cb| tree[cb.id].content_area);

        let node = &tree[id];
        let margins = node.margins;
        let inline_position = match (line_left, line_right) {
            (AutoOr::Length(left), _) => left + margins.line_left,
            (AutoOr::Auto, AutoOr::Length(right)) => {
                cb.inline_size - right - margins.line_right - node.border_area.inline_size
            }
            (AutoOr::Auto, AutoOr::Auto) => content_origin.line_left + margins.line_left,
        };
        let block_position = match (block_start, block_end, cb.block_size) {
            (AutoOr::Length(start), _, _) => start + margins.block_start,
            (AutoOr::Auto, AutoOr::Length(end), Some(cb_block_size)) => {
                cb_block_size - end - margins.block_end - node.border_area.block_size
            }
            _ => content_origin.block_start + margins.block_start,
        };

        #[cfg(feature = "layout-trace")]
        log::trace!("[ABS] {id:?} at ({inline_position}, {block_position})");

        tree.set_inline_position(id, inline_position);
        tree.set_block_position(id, block_position);
    }
}

/// [§ 3.4 Relative positioning](https://www.w3.org/TR/css-position-3/#relpos-insets)
///
/// Offset of a relatively positioned box along the block and inline axes.
///
/// "If opposing inset properties in an axis both compute to non-auto
/// values ... the inline-start inset wins and the block-start inset wins."
fn relative_offset(tree: &BoxTree, id: BoxId) -> (f32, f32) {
    let cb = tree.containing_block(id);
    let style = &tree[id].style;

    let block = match style.inset_block_start(&cb) {
        AutoOr::Length(start) => start,
        AutoOr::Auto => -style.inset_block_end(&cb).to_px_or(0.0),
    };

    let left = style.inset_line_left(&cb);
    let right = style.inset_line_right(&cb);
    let inline = match (left, right) {
        (AutoOr::Length(left), AutoOr::Length(right)) => match cb.direction {
            Direction::Ltr => left,
            Direction::Rtl => -right,
        },
        (AutoOr::Length(left), AutoOr::Auto) => left,
        (AutoOr::Auto, right) => -right.to_px_or(0.0),
    };

    (block, inline)
}

/// Border areas of inline boxes: the union of their fragments in the
/// paragraph that owns them.
fn size_inline_boxes(tree: &mut BoxTree, container: BoxId) {
    let Some(paragraph) = tree[container].kind.paragraph() else {
        return;
    };

    let mut unions: Vec<(BoxId, BoxArea)> = Vec::new();
    for fragment in &paragraph.fragments {
        let right = fragment.line_left + fragment.inline_size;
        let bottom = fragment.block_start + fragment.block_size;
        if let Some((_, area)) = unions.iter_mut().find(|(id, _)| *id == fragment.inline) {
            let area_right = (area.line_left + area.inline_size).max(right);
            let area_bottom = (area.block_start + area.block_size).max(bottom);
            area.line_left = area.line_left.min(fragment.line_left);
            area.block_start = area.block_start.min(fragment.block_start);
            area.inline_size = area_right - area.line_left;
            area.block_size = area_bottom - area.block_start;
        } else {
            unions.push((
                fragment.inline,
                BoxArea {
                    block_start: fragment.block_start,
                    block_size: fragment.block_size,
                    line_left: fragment.line_left,
                    inline_size: fragment.inline_size,
                    ..BoxArea::default()
                },
            ));
        }
    }

    for (id, area) in unions {
        // Fragments include the inline margins.
        let margins = tree.margins_auto_is_zero(id);
        let cb = tree.containing_block(id);
        let block_padding_border = tree[id].style.block_padding_border(&cb);
        tree.fill_areas(id);
        tree.set_inline_outer_size(id, (area.inline_size - margins.line_left - margins.line_right).max(0.0));
        tree.set_block_size(id, (area.block_size - block_padding_border).max(0.0));
        tree.set_inline_position(id, area.line_left + margins.line_left);
        tree.set_block_position(id, area.block_start);
        tree[id].margins = margins;
    }
}

fn postlayout(tree: &mut BoxTree) {
    let order = tree.preorder(BoxId::ICB);

    // STEP 1: inline boxes take their areas from their fragments.
    for &id in &order {
        if tree[id].kind.is_block_container_of_inlines() {
            size_inline_boxes(tree, id);
        }
    }

    // STEP 2: relative positioning moves a box and everything in it.
    for &id in order.iter().skip(1) {
        if tree[id].style.position == Position::Relative {
            let (block, inline) = relative_offset(tree, id);
            let area = &mut tree[id].border_area;
            area.block_start += block;
            area.line_left += inline;
        }
    }

    // STEP 3: absolute physical coordinates, outer areas first.
    let viewport = *tree.viewport();
    for &id in &order {
        let writing_mode = tree.containing_block(id).writing_mode;
        for kind in [AreaKind::Border, AreaKind::Padding, AreaKind::Content] {
            let area = AreaRef { id, kind };
            let parent = tree.parent_area(area).map_or(viewport, |parent| *tree.area(parent));
            tree[id].area_mut(kind).absolutify(&parent, writing_mode);
        }
    }

    // STEP 4: snap once every position is final.
    for &id in &order {
        let node = &mut tree[id];
        for kind in [AreaKind::Border, AreaKind::Padding, AreaKind::Content] {
            node.area_mut(kind).snap_pixels();
        }
    }

    tree.freeze();

    #[cfg(feature = "layout-trace")]
    log::trace!("[POST] laid out {} boxes\n{}", tree.len(), tree.dump());
}
