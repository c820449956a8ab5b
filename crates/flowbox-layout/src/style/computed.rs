//! Computed Style
//!
//! [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//! "The computed value is the result of resolving the specified value..."
//!
//! A [`Style`] is immutable once built and is shared by `Arc` between every
//! box generated for the same element. All getters that need a percentage
//! basis or a flow-relative mapping take the [`ContainingBlock`] explicitly.

use serde::Serialize;

use super::display::{DisplayValue, InnerDisplayType, OuterDisplayType};
use super::values::{
    AutoOr, BorderStyle, BoxSizing, Clear, Color, Direction, Float, FontStretch, FontStyle,
    FontVariant, LengthPercentage, LengthPercentageAuto, LineHeight, MaxSize, Overflow,
    OverflowWrap, PhysicalTextAlign, Position, Sides, TextAlign, VerticalAlign, WhiteSpace,
    WordBreak, WordSpacing,
};
use super::writing_mode::{PhysicalSide, WritingMode};

/// Default font size in pixels, the initial value of `font-size`.
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
///
/// "The position and size of an element's box(es) are sometimes calculated
/// relative to a certain rectangle, called the containing block of the element."
///
/// Only the parts of the containing block that style resolution needs: its
/// writing mode (for the logical to physical mapping), its direction, and its
/// logical sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContainingBlock {
    /// Writing mode of the box that owns the containing block.
    pub writing_mode: WritingMode,
    /// Direction of the box that owns the containing block.
    pub direction: Direction,
    /// Inline size of the containing block. Every margin, padding and inline
    /// size percentage resolves against this.
    pub inline_size: f32,
    /// Block size of the containing block, `None` while it is indefinite.
    pub block_size: Option<f32>,
}

impl ContainingBlock {
    /// A horizontal, left-to-right containing block.
    #[must_use]
    pub const fn new(inline_size: f32, block_size: Option<f32>) -> Self {
        Self {
            writing_mode: WritingMode::HorizontalTb,
            direction: Direction::Ltr,
            inline_size,
            block_size,
        }
    }
}

/// Computed styles for one box.
///
/// Initial values follow the CSS definitions; [`create_child_style`] copies
/// the inherited ones from a parent.
///
/// [`create_child_style`]: super::create_child_style
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Style {
    /// [§ zoom](https://drafts.csswg.org/css-viewport/#zoom-property). Inherited.
    pub zoom: f32,
    /// [§ 3 white-space](https://www.w3.org/TR/css-text-3/#white-space-property). Inherited.
    pub white_space: WhiteSpace,
    /// [§ 3.1 color](https://www.w3.org/TR/css-color-4/#the-color-property). Inherited.
    pub color: Color,
    /// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop), in pixels. Inherited.
    pub font_size: f32,
    /// [§ 3.2 font-weight](https://www.w3.org/TR/css-fonts-4/#font-weight-prop). Inherited.
    pub font_weight: u16,
    /// Inherited.
    pub font_variant: FontVariant,
    /// Inherited.
    pub font_style: FontStyle,
    /// Inherited.
    pub font_stretch: FontStretch,
    /// [§ 3.1 font-family](https://www.w3.org/TR/css-fonts-4/#font-family-prop). Inherited.
    pub font_family: Vec<String>,
    /// [§ 4.2 line-height](https://www.w3.org/TR/css-inline-3/#line-height-property). Inherited.
    pub line_height: LineHeight,
    /// Not inherited.
    pub vertical_align: VerticalAlign,
    /// Not inherited.
    pub display: DisplayValue,
    /// Inherited.
    pub direction: Direction,
    /// Inherited.
    pub writing_mode: WritingMode,
    /// Border widths in pixels. Only count when the side's style is visible.
    pub border_width: Sides<f32>,
    /// Border styles.
    pub border_style: Sides<BorderStyle>,
    /// Padding.
    pub padding: Sides<LengthPercentage>,
    /// Margins.
    pub margin: Sides<LengthPercentageAuto>,
    /// [§ 4.2 tab-size](https://www.w3.org/TR/css-text-3/#tab-size-property), in spaces. Inherited.
    pub tab_size: f32,
    /// Not inherited.
    pub position: Position,
    /// Not inherited.
    pub width: LengthPercentageAuto,
    /// Not inherited.
    pub height: LengthPercentageAuto,
    /// `top`, `right`, `bottom`, `left`.
    pub inset: Sides<LengthPercentageAuto>,
    /// Not inherited.
    pub box_sizing: BoxSizing,
    /// Inherited.
    pub text_align: TextAlign,
    /// Not inherited.
    pub float: Float,
    /// Not inherited.
    pub clear: Clear,
    /// Inherited.
    pub word_break: WordBreak,
    /// Inherited.
    pub overflow_wrap: OverflowWrap,
    /// Not inherited.
    pub overflow: Overflow,
    /// Inherited.
    pub word_spacing: WordSpacing,
    /// Not inherited.
    pub min_width: LengthPercentage,
    /// Not inherited.
    pub max_width: MaxSize,
    /// Not inherited.
    pub min_height: LengthPercentage,
    /// Not inherited.
    pub max_height: MaxSize,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            white_space: WhiteSpace::Normal,
            color: Color::BLACK,
            font_size: DEFAULT_FONT_SIZE_PX,
            font_weight: 400,
            font_variant: FontVariant::Normal,
            font_style: FontStyle::Normal,
            font_stretch: FontStretch::Normal,
            font_family: vec!["Helvetica".to_string()],
            line_height: LineHeight::Normal,
            vertical_align: VerticalAlign::Baseline,
            display: DisplayValue::inline(),
            direction: Direction::Ltr,
            writing_mode: WritingMode::HorizontalTb,
            border_width: Sides::all(0.0),
            border_style: Sides::all(BorderStyle::None),
            padding: Sides::all(LengthPercentage::Px(0.0)),
            margin: Sides::all(LengthPercentageAuto::Px(0.0)),
            tab_size: 8.0,
            position: Position::Static,
            width: LengthPercentageAuto::Auto,
            height: LengthPercentageAuto::Auto,
            inset: Sides::all(LengthPercentageAuto::Auto),
            box_sizing: BoxSizing::ContentBox,
            text_align: TextAlign::Start,
            float: Float::None,
            clear: Clear::None,
            word_break: WordBreak::Normal,
            overflow_wrap: OverflowWrap::Normal,
            overflow: Overflow::Visible,
            word_spacing: WordSpacing::Normal,
            min_width: LengthPercentage::Px(0.0),
            max_width: MaxSize::None,
            min_height: LengthPercentage::Px(0.0),
            max_height: MaxSize::None,
        }
    }
}

/// Flow-relative edges of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogicalSide {
    BlockStart,
    BlockEnd,
    LineLeft,
    LineRight,
}

impl LogicalSide {
    const fn physical(self, writing_mode: WritingMode) -> PhysicalSide {
        match self {
            Self::BlockStart => writing_mode.block_start_physical(),
            Self::BlockEnd => writing_mode.block_end_physical(),
            Self::LineLeft => writing_mode.line_left_physical(),
            Self::LineRight => writing_mode.line_right_physical(),
        }
    }
}

impl Style {
    /// A block-level, flow-inner style with every other property at its
    /// initial value. Used for the initial containing block.
    #[must_use]
    pub fn block() -> Self {
        Self {
            display: DisplayValue::block(),
            ..Self::default()
        }
    }

    /// [§ 2.7 Automatic Box Type Transformations](https://www.w3.org/TR/css-display-3/#transformations)
    ///
    /// "Some layout effects require blockification or inlinification of the
    /// box type, which sets the box's computed outer display type to block or
    /// inline (respectively)."
    ///
    /// Floats and absolutely positioned boxes are blockified.
    #[must_use]
    pub fn blockified(&self) -> Self {
        let mut style = self.clone();
        if style.display.is_inline_level() {
            style.display.outer = OuterDisplayType::Block;
        }
        style
    }

    /// [§ 6.1 text-align](https://www.w3.org/TR/css-text-3/#text-align-property)
    ///
    /// `start` and `end` map through `direction`. `justify` is laid out as
    /// `start`.
    #[must_use]
    pub const fn resolved_text_align(&self) -> PhysicalTextAlign {
        let ltr = matches!(self.direction, Direction::Ltr);
        match self.text_align {
            TextAlign::Start | TextAlign::Justify => {
                if ltr {
                    PhysicalTextAlign::Left
                } else {
                    PhysicalTextAlign::Right
                }
            }
            TextAlign::End => {
                if ltr {
                    PhysicalTextAlign::Right
                } else {
                    PhysicalTextAlign::Left
                }
            }
            TextAlign::Left => PhysicalTextAlign::Left,
            TextAlign::Right => PhysicalTextAlign::Right,
            TextAlign::Center => PhysicalTextAlign::Center,
        }
    }

    /// Whether the box is taken out of normal flow.
    #[must_use]
    pub const fn is_out_of_flow(&self) -> bool {
        !matches!(self.float, Float::None) || matches!(self.position, Position::Absolute)
    }

    /// Whether the box is absolutely positioned.
    #[must_use]
    pub const fn is_absolute(&self) -> bool {
        matches!(self.position, Position::Absolute)
    }

    /// Whether the box establishes a containing block for absolutely
    /// positioned descendants.
    #[must_use]
    pub const fn is_positioned(&self) -> bool {
        !matches!(self.position, Position::Static)
    }

    /// [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
    ///
    /// Whether spaces and tabs collapse.
    #[must_use]
    pub const fn is_ws_collapsible(&self) -> bool {
        matches!(
            self.white_space,
            WhiteSpace::Normal | WhiteSpace::Nowrap | WhiteSpace::PreLine
        )
    }

    /// Whether any side has non-zero padding.
    #[must_use]
    pub fn has_padding_area(&self) -> bool {
        [
            self.padding.top,
            self.padding.right,
            self.padding.bottom,
            self.padding.left,
        ]
        .into_iter()
        .any(LengthPercentage::is_positive)
    }

    /// Whether any side has a visible border of non-zero width.
    #[must_use]
    pub fn has_border_area(&self) -> bool {
        [
            PhysicalSide::Top,
            PhysicalSide::Right,
            PhysicalSide::Bottom,
            PhysicalSide::Left,
        ]
        .into_iter()
        .any(|side| self.border_width.get(side) > 0.0 && self.border_style.get(side).is_visible())
    }

    /// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
    ///
    /// "Floats, absolutely positioned elements, block containers (such as
    /// inline-blocks, table-cells, and table-captions) that are not block
    /// boxes, and block boxes with 'overflow' other than 'visible' (except
    /// when that value has been propagated to the viewport) establish new
    /// block formatting contexts for their contents."
    #[must_use]
    pub const fn creates_bfc(&self) -> bool {
        matches!(self.display.inner, InnerDisplayType::FlowRoot)
            || self.display.is_atomic_inline()
            || !matches!(self.overflow, Overflow::Visible)
            || self.is_out_of_flow()
    }

    /// [§ 5.2 word-break](https://www.w3.org/TR/css-text-3/#word-break-property)
    /// and [§ 5.5 overflow-wrap](https://www.w3.org/TR/css-text-3/#overflow-wrap-property)
    ///
    /// Whether an otherwise unbreakable word may be split at any grapheme
    /// boundary. `overflow-wrap: break-word` only applies when laying out
    /// lines; it does not lower the min-content contribution.
    #[must_use]
    pub const fn wraps_overflow_anywhere(&self, min_content: bool) -> bool {
        let anywhere = matches!(self.overflow_wrap, OverflowWrap::Anywhere)
            || matches!(self.word_break, WordBreak::BreakWord);
        if min_content {
            anywhere
        } else {
            anywhere || matches!(self.overflow_wrap, OverflowWrap::BreakWord)
        }
    }

    fn margin_on(&self, cb: &ContainingBlock, side: LogicalSide) -> AutoOr {
        self.margin
            .get(side.physical(cb.writing_mode))
            .resolve(cb.inline_size)
    }

    fn padding_on(&self, cb: &ContainingBlock, side: LogicalSide) -> f32 {
        self.padding
            .get(side.physical(cb.writing_mode))
            .resolve(cb.inline_size)
    }

    fn border_on(&self, cb: &ContainingBlock, side: LogicalSide) -> f32 {
        let physical = side.physical(cb.writing_mode);
        if self.border_style.get(physical).is_visible() {
            self.border_width.get(physical)
        } else {
            0.0
        }
    }

    /// Used margin on the block-start side, `auto` unresolved.
    #[must_use]
    pub fn margin_block_start(&self, cb: &ContainingBlock) -> AutoOr {
        self.margin_on(cb, LogicalSide::BlockStart)
    }

    /// Used margin on the block-end side, `auto` unresolved.
    #[must_use]
    pub fn margin_block_end(&self, cb: &ContainingBlock) -> AutoOr {
        self.margin_on(cb, LogicalSide::BlockEnd)
    }

    /// Used margin on the line-left side, `auto` unresolved.
    #[must_use]
    pub fn margin_line_left(&self, cb: &ContainingBlock) -> AutoOr {
        self.margin_on(cb, LogicalSide::LineLeft)
    }

    /// Used margin on the line-right side, `auto` unresolved.
    #[must_use]
    pub fn margin_line_right(&self, cb: &ContainingBlock) -> AutoOr {
        self.margin_on(cb, LogicalSide::LineRight)
    }

    /// [§ 3.1 Box Insets](https://www.w3.org/TR/css-position-3/#insets)
    ///
    /// Inset on a flow-relative side. Percentages on the block axis refer to
    /// the containing block's block size and are `auto` when it is not
    /// definite.
    fn inset_on(&self, cb: &ContainingBlock, side: LogicalSide) -> AutoOr {
        let value = self.inset.get(side.physical(cb.writing_mode));
        match side {
            LogicalSide::BlockStart | LogicalSide::BlockEnd => value.resolve_against(cb.block_size),
            LogicalSide::LineLeft | LogicalSide::LineRight => value.resolve(cb.inline_size),
        }
    }

    /// Inset from the containing block's block-start edge.
    #[must_use]
    pub fn inset_block_start(&self, cb: &ContainingBlock) -> AutoOr {
        self.inset_on(cb, LogicalSide::BlockStart)
    }

    /// Inset from the containing block's block-end edge.
    #[must_use]
    pub fn inset_block_end(&self, cb: &ContainingBlock) -> AutoOr {
        self.inset_on(cb, LogicalSide::BlockEnd)
    }

    /// Inset from the containing block's line-left edge.
    #[must_use]
    pub fn inset_line_left(&self, cb: &ContainingBlock) -> AutoOr {
        self.inset_on(cb, LogicalSide::LineLeft)
    }

    /// Inset from the containing block's line-right edge.
    #[must_use]
    pub fn inset_line_right(&self, cb: &ContainingBlock) -> AutoOr {
        self.inset_on(cb, LogicalSide::LineRight)
    }

    /// Padding on the block-start side.
    #[must_use]
    pub fn padding_block_start(&self, cb: &ContainingBlock) -> f32 {
        self.padding_on(cb, LogicalSide::BlockStart)
    }

    /// Padding on the block-end side.
    #[must_use]
    pub fn padding_block_end(&self, cb: &ContainingBlock) -> f32 {
        self.padding_on(cb, LogicalSide::BlockEnd)
    }

    /// Padding on the line-left side.
    #[must_use]
    pub fn padding_line_left(&self, cb: &ContainingBlock) -> f32 {
        self.padding_on(cb, LogicalSide::LineLeft)
    }

    /// Padding on the line-right side.
    #[must_use]
    pub fn padding_line_right(&self, cb: &ContainingBlock) -> f32 {
        self.padding_on(cb, LogicalSide::LineRight)
    }

    /// Border width on the block-start side.
    #[must_use]
    pub fn border_block_start_width(&self, cb: &ContainingBlock) -> f32 {
        self.border_on(cb, LogicalSide::BlockStart)
    }

    /// Border width on the block-end side.
    #[must_use]
    pub fn border_block_end_width(&self, cb: &ContainingBlock) -> f32 {
        self.border_on(cb, LogicalSide::BlockEnd)
    }

    /// Border width on the line-left side.
    #[must_use]
    pub fn border_line_left_width(&self, cb: &ContainingBlock) -> f32 {
        self.border_on(cb, LogicalSide::LineLeft)
    }

    /// Border width on the line-right side.
    #[must_use]
    pub fn border_line_right_width(&self, cb: &ContainingBlock) -> f32 {
        self.border_on(cb, LogicalSide::LineRight)
    }

    /// Sum of line-left and line-right padding and border.
    #[must_use]
    pub fn inline_padding_border(&self, cb: &ContainingBlock) -> f32 {
        self.padding_line_left(cb)
            + self.padding_line_right(cb)
            + self.border_line_left_width(cb)
            + self.border_line_right_width(cb)
    }

    /// Sum of block-start and block-end padding and border.
    #[must_use]
    pub fn block_padding_border(&self, cb: &ContainingBlock) -> f32 {
        self.padding_block_start(cb)
            + self.padding_block_end(cb)
            + self.border_block_start_width(cb)
            + self.border_block_end_width(cb)
    }

    /// Physical `width`/`height` property that is the inline size in the
    /// containing block's writing mode.
    const fn inline_size_property(&self, cb: &ContainingBlock) -> LengthPercentageAuto {
        if cb.writing_mode.is_horizontal() {
            self.width
        } else {
            self.height
        }
    }

    const fn block_size_property(&self, cb: &ContainingBlock) -> LengthPercentageAuto {
        if cb.writing_mode.is_horizontal() {
            self.height
        } else {
            self.width
        }
    }

    /// [§ 4.4 box-sizing](https://www.w3.org/TR/css-sizing-3/#box-sizing)
    ///
    /// Convert a specified outer size into a content-box size.
    fn content_inline(&self, cb: &ContainingBlock, specified: f32) -> f32 {
        match self.box_sizing {
            BoxSizing::ContentBox => specified,
            BoxSizing::PaddingBox => {
                (specified - self.padding_line_left(cb) - self.padding_line_right(cb)).max(0.0)
            }
            BoxSizing::BorderBox => (specified - self.inline_padding_border(cb)).max(0.0),
        }
    }

    fn content_block(&self, cb: &ContainingBlock, specified: f32) -> f32 {
        match self.box_sizing {
            BoxSizing::ContentBox => specified,
            BoxSizing::PaddingBox => {
                (specified - self.padding_block_start(cb) - self.padding_block_end(cb)).max(0.0)
            }
            BoxSizing::BorderBox => (specified - self.block_padding_border(cb)).max(0.0),
        }
    }

    /// Content-box inline size, or `auto`.
    #[must_use]
    pub fn inline_size(&self, cb: &ContainingBlock) -> AutoOr {
        match self.inline_size_property(cb).resolve(cb.inline_size) {
            AutoOr::Auto => AutoOr::Auto,
            AutoOr::Length(v) => AutoOr::Length(self.content_inline(cb, v)),
        }
    }

    /// [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    ///
    /// "If the height of the containing block is not specified explicitly
    /// (i.e., it depends on content height), and this element is not
    /// absolutely positioned, the value computes to 'auto'."
    #[must_use]
    pub fn block_size(&self, cb: &ContainingBlock) -> AutoOr {
        match self.block_size_property(cb).resolve_against(cb.block_size) {
            AutoOr::Auto => AutoOr::Auto,
            AutoOr::Length(v) => AutoOr::Length(self.content_block(cb, v)),
        }
    }

    /// Content-box `min-width` (or `min-height` in vertical modes).
    #[must_use]
    pub fn min_inline_size(&self, cb: &ContainingBlock) -> f32 {
        let min = if cb.writing_mode.is_horizontal() {
            self.min_width
        } else {
            self.min_height
        };
        let px = min.resolve(cb.inline_size);
        if px > 0.0 { self.content_inline(cb, px) } else { 0.0 }
    }

    /// Content-box `max-width` (or `max-height` in vertical modes).
    #[must_use]
    pub fn max_inline_size(&self, cb: &ContainingBlock) -> Option<f32> {
        let max = if cb.writing_mode.is_horizontal() {
            self.max_width
        } else {
            self.max_height
        };
        max.resolve_against(Some(cb.inline_size))
            .map(|px| self.content_inline(cb, px))
    }

    /// Content-box `min-height` (or `min-width` in vertical modes).
    #[must_use]
    pub fn min_block_size(&self, cb: &ContainingBlock) -> f32 {
        let min = if cb.writing_mode.is_horizontal() {
            self.min_height
        } else {
            self.min_width
        };
        let px = match (min, cb.block_size) {
            (LengthPercentage::Percent(_), None) => 0.0,
            (min, basis) => min.resolve(basis.unwrap_or(0.0)),
        };
        if px > 0.0 { self.content_block(cb, px) } else { 0.0 }
    }

    /// Content-box `max-height` (or `max-width` in vertical modes).
    #[must_use]
    pub fn max_block_size(&self, cb: &ContainingBlock) -> Option<f32> {
        let max = if cb.writing_mode.is_horizontal() {
            self.max_height
        } else {
            self.max_width
        };
        max.resolve_against(cb.block_size)
            .map(|px| self.content_block(cb, px))
    }

    /// Clamp a content-box inline size by `min-*` and `max-*`.
    /// `min` wins over `max` when they conflict.
    #[must_use]
    pub fn clamp_inline_size(&self, cb: &ContainingBlock, size: f32) -> f32 {
        let max = self.max_inline_size(cb).unwrap_or(f32::INFINITY);
        size.min(max).max(self.min_inline_size(cb))
    }

    /// Clamp a content-box block size by `min-*` and `max-*`.
    #[must_use]
    pub fn clamp_block_size(&self, cb: &ContainingBlock, size: f32) -> f32 {
        let max = self.max_block_size(cb).unwrap_or(f32::INFINITY);
        size.min(max).max(self.min_block_size(cb))
    }

    fn has_gap(&self, cb: &ContainingBlock, side: LogicalSide) -> bool {
        let physical = side.physical(cb.writing_mode);
        if self.margin.get(physical).is_nonzero() {
            return true;
        }
        if self.padding.get(physical).is_positive() {
            return true;
        }
        self.border_style.get(physical).is_visible() && self.border_width.get(physical) > 0.0
    }

    /// Whether margin, padding or border separates the line-left edge of an
    /// inline box from its content.
    #[must_use]
    pub fn has_line_left_gap(&self, cb: &ContainingBlock) -> bool {
        self.has_gap(cb, LogicalSide::LineLeft)
    }

    /// Whether margin, padding or border separates the line-right edge of an
    /// inline box from its content.
    #[must_use]
    pub fn has_line_right_gap(&self, cb: &ContainingBlock) -> bool {
        self.has_gap(cb, LogicalSide::LineRight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_box_subtracts_padding_and_border() {
        let style = Style {
            width: LengthPercentageAuto::Px(100.0),
            padding: Sides::all(LengthPercentage::Px(10.0)),
            border_width: Sides::all(5.0),
            border_style: Sides::all(BorderStyle::Solid),
            box_sizing: BoxSizing::BorderBox,
            ..Style::block()
        };
        let cb = ContainingBlock::new(300.0, None);
        assert_eq!(style.inline_size(&cb), AutoOr::Length(70.0));
    }

    #[test]
    fn test_border_without_style_has_no_width() {
        let style = Style {
            border_width: Sides::all(5.0),
            ..Style::block()
        };
        let cb = ContainingBlock::new(300.0, None);
        assert!(style.border_block_start_width(&cb).abs() < f32::EPSILON);
        assert!(!style.has_border_area());
    }

    #[test]
    fn test_vertical_containing_block_maps_margins() {
        let style = Style {
            margin: Sides {
                top: LengthPercentageAuto::Px(1.0),
                right: LengthPercentageAuto::Px(2.0),
                bottom: LengthPercentageAuto::Px(3.0),
                left: LengthPercentageAuto::Px(4.0),
            },
            ..Style::block()
        };
        let cb = ContainingBlock {
            writing_mode: WritingMode::VerticalRl,
            ..ContainingBlock::new(100.0, None)
        };
        assert_eq!(style.margin_block_start(&cb), AutoOr::Length(2.0));
        assert_eq!(style.margin_block_end(&cb), AutoOr::Length(4.0));
        assert_eq!(style.margin_line_left(&cb), AutoOr::Length(1.0));
    }

    #[test]
    fn test_text_align_start_follows_direction() {
        let rtl = Style {
            direction: Direction::Rtl,
            ..Style::default()
        };
        assert_eq!(rtl.resolved_text_align(), PhysicalTextAlign::Right);
        let justify = Style {
            text_align: TextAlign::Justify,
            ..Style::default()
        };
        assert_eq!(justify.resolved_text_align(), PhysicalTextAlign::Left);
    }
}
