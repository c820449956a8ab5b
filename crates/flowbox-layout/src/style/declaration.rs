//! Declared values and child style derivation
//!
//! [§ 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
//!
//! "Inheritance propagates property values from parent elements to their
//! children. The inherited value of a property on an element is the computed
//! value of the property on the element's parent element."
//!
//! Selector matching and the cascade happen upstream. What arrives here is
//! the winning declaration per property, already in computed form.

use strum_macros::{Display, EnumString};

use super::computed::Style;
use super::display::DisplayValue;
use super::values::{
    BorderStyle, BoxSizing, Clear, Color, Direction, Float, FontStretch, FontStyle, FontVariant,
    LengthPercentage, LengthPercentageAuto, LineHeight, MaxSize, Overflow, OverflowWrap,
    Position, TextAlign, VerticalAlign, WhiteSpace, WordBreak, WordSpacing,
};
use super::writing_mode::{PhysicalSide, WritingMode};

/// A longhand property name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Property {
    /// `zoom`
    Zoom,
    /// `white-space`
    WhiteSpace,
    /// `color`
    Color,
    /// `font-size`
    FontSize,
    /// `font-weight`
    FontWeight,
    /// `font-variant`
    FontVariant,
    /// `font-style`
    FontStyle,
    /// `font-stretch`
    FontStretch,
    /// `font-family`
    FontFamily,
    /// `line-height`
    LineHeight,
    /// `vertical-align`
    VerticalAlign,
    /// `display`
    Display,
    /// `direction`
    Direction,
    /// `writing-mode`
    WritingMode,
    /// `border-top-width`
    BorderTopWidth,
    /// `border-right-width`
    BorderRightWidth,
    /// `border-bottom-width`
    BorderBottomWidth,
    /// `border-left-width`
    BorderLeftWidth,
    /// `border-top-style`
    BorderTopStyle,
    /// `border-right-style`
    BorderRightStyle,
    /// `border-bottom-style`
    BorderBottomStyle,
    /// `border-left-style`
    BorderLeftStyle,
    /// `padding-top`
    PaddingTop,
    /// `padding-right`
    PaddingRight,
    /// `padding-bottom`
    PaddingBottom,
    /// `padding-left`
    PaddingLeft,
    /// `margin-top`
    MarginTop,
    /// `margin-right`
    MarginRight,
    /// `margin-bottom`
    MarginBottom,
    /// `margin-left`
    MarginLeft,
    /// `tab-size`
    TabSize,
    /// `position`
    Position,
    /// `width`
    Width,
    /// `height`
    Height,
    /// `top`
    Top,
    /// `right`
    Right,
    /// `bottom`
    Bottom,
    /// `left`
    Left,
    /// `box-sizing`
    BoxSizing,
    /// `text-align`
    TextAlign,
    /// `float`
    Float,
    /// `clear`
    Clear,
    /// `word-break`
    WordBreak,
    /// `overflow-wrap`
    OverflowWrap,
    /// `overflow`
    Overflow,
    /// `word-spacing`
    WordSpacing,
    /// `min-width`
    MinWidth,
    /// `max-width`
    MaxWidth,
    /// `min-height`
    MinHeight,
    /// `max-height`
    MaxHeight,
}

impl Property {
    /// [§ 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
    ///
    /// Whether the property is inherited by default.
    #[must_use]
    pub const fn is_inherited(self) -> bool {
        matches!(
            self,
            Self::Zoom
                | Self::WhiteSpace
                | Self::Color
                | Self::FontSize
                | Self::FontWeight
                | Self::FontVariant
                | Self::FontStyle
                | Self::FontStretch
                | Self::FontFamily
                | Self::LineHeight
                | Self::Direction
                | Self::WritingMode
                | Self::TabSize
                | Self::TextAlign
                | Self::WordBreak
                | Self::OverflowWrap
                | Self::WordSpacing
        )
    }

    /// The physical side a per-side property applies to.
    const fn side(self) -> Option<PhysicalSide> {
        match self {
            Self::BorderTopWidth
            | Self::BorderTopStyle
            | Self::PaddingTop
            | Self::MarginTop
            | Self::Top => Some(PhysicalSide::Top),
            Self::BorderRightWidth
            | Self::BorderRightStyle
            | Self::PaddingRight
            | Self::MarginRight
            | Self::Right => Some(PhysicalSide::Right),
            Self::BorderBottomWidth
            | Self::BorderBottomStyle
            | Self::PaddingBottom
            | Self::MarginBottom
            | Self::Bottom => Some(PhysicalSide::Bottom),
            Self::BorderLeftWidth
            | Self::BorderLeftStyle
            | Self::PaddingLeft
            | Self::MarginLeft
            | Self::Left => Some(PhysicalSide::Left),
            _ => None,
        }
    }
}

/// One declared property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// `zoom`
    Zoom(f32),
    /// `white-space`
    WhiteSpace(WhiteSpace),
    /// `color`
    Color(Color),
    /// `font-size`
    FontSize(f32),
    /// `font-weight`
    FontWeight(u16),
    /// `font-variant`
    FontVariant(FontVariant),
    /// `font-style`
    FontStyle(FontStyle),
    /// `font-stretch`
    FontStretch(FontStretch),
    /// `font-family`
    FontFamily(Vec<String>),
    /// `line-height`
    LineHeight(LineHeight),
    /// `vertical-align`
    VerticalAlign(VerticalAlign),
    /// `display`
    Display(DisplayValue),
    /// `direction`
    Direction(Direction),
    /// `writing-mode`
    WritingMode(WritingMode),
    /// `border-*-width`
    BorderWidth(PhysicalSide, f32),
    /// `border-*-style`
    BorderStyle(PhysicalSide, BorderStyle),
    /// `padding-*`
    Padding(PhysicalSide, LengthPercentage),
    /// `margin-*`
    Margin(PhysicalSide, LengthPercentageAuto),
    /// `tab-size`
    TabSize(f32),
    /// `position`
    Position(Position),
    /// `width`
    Width(LengthPercentageAuto),
    /// `height`
    Height(LengthPercentageAuto),
    /// `top`, `right`, `bottom` or `left`
    Inset(PhysicalSide, LengthPercentageAuto),
    /// `box-sizing`
    BoxSizing(BoxSizing),
    /// `text-align`
    TextAlign(TextAlign),
    /// `float`
    Float(Float),
    /// `clear`
    Clear(Clear),
    /// `word-break`
    WordBreak(WordBreak),
    /// `overflow-wrap`
    OverflowWrap(OverflowWrap),
    /// `overflow`
    Overflow(Overflow),
    /// `word-spacing`
    WordSpacing(WordSpacing),
    /// `min-width`
    MinWidth(LengthPercentage),
    /// `max-width`
    MaxWidth(MaxSize),
    /// `min-height`
    MinHeight(LengthPercentage),
    /// `max-height`
    MaxHeight(MaxSize),
    /// The `inherit` keyword: take the parent's computed value.
    Inherit(Property),
}

impl Declaration {
    /// A solid border of the given width on every side.
    #[must_use]
    pub fn solid_border(width: f32) -> [Self; 8] {
        let sides = [
            PhysicalSide::Top,
            PhysicalSide::Right,
            PhysicalSide::Bottom,
            PhysicalSide::Left,
        ];
        let [t, r, b, l] = sides;
        [
            Self::BorderWidth(t, width),
            Self::BorderStyle(t, BorderStyle::Solid),
            Self::BorderWidth(r, width),
            Self::BorderStyle(r, BorderStyle::Solid),
            Self::BorderWidth(b, width),
            Self::BorderStyle(b, BorderStyle::Solid),
            Self::BorderWidth(l, width),
            Self::BorderStyle(l, BorderStyle::Solid),
        ]
    }

    fn apply(&self, style: &mut Style, parent: &Style) {
        match self {
            Self::Zoom(v) => style.zoom = *v,
            Self::WhiteSpace(v) => style.white_space = *v,
            Self::Color(v) => style.color = *v,
            Self::FontSize(v) => style.font_size = *v,
            Self::FontWeight(v) => style.font_weight = *v,
            Self::FontVariant(v) => style.font_variant = *v,
            Self::FontStyle(v) => style.font_style = *v,
            Self::FontStretch(v) => style.font_stretch = *v,
            Self::FontFamily(v) => style.font_family.clone_from(v),
            Self::LineHeight(v) => style.line_height = *v,
            Self::VerticalAlign(v) => style.vertical_align = *v,
            Self::Display(v) => style.display = *v,
            Self::Direction(v) => style.direction = *v,
            Self::WritingMode(v) => style.writing_mode = *v,
            Self::BorderWidth(side, v) => style.border_width.set(*side, *v),
            Self::BorderStyle(side, v) => style.border_style.set(*side, *v),
            Self::Padding(side, v) => style.padding.set(*side, *v),
            Self::Margin(side, v) => style.margin.set(*side, *v),
            Self::TabSize(v) => style.tab_size = *v,
            Self::Position(v) => style.position = *v,
            Self::Width(v) => style.width = *v,
            Self::Height(v) => style.height = *v,
            Self::Inset(side, v) => style.inset.set(*side, *v),
            Self::BoxSizing(v) => style.box_sizing = *v,
            Self::TextAlign(v) => style.text_align = *v,
            Self::Float(v) => style.float = *v,
            Self::Clear(v) => style.clear = *v,
            Self::WordBreak(v) => style.word_break = *v,
            Self::OverflowWrap(v) => style.overflow_wrap = *v,
            Self::Overflow(v) => style.overflow = *v,
            Self::WordSpacing(v) => style.word_spacing = *v,
            Self::MinWidth(v) => style.min_width = *v,
            Self::MaxWidth(v) => style.max_width = *v,
            Self::MinHeight(v) => style.min_height = *v,
            Self::MaxHeight(v) => style.max_height = *v,
            Self::Inherit(property) => inherit_property(style, parent, *property),
        }
    }
}

/// Copy one property's computed value from `parent`.
fn inherit_property(style: &mut Style, parent: &Style, property: Property) {
    if let Some(side) = property.side() {
        match property {
            Property::BorderTopWidth
            | Property::BorderRightWidth
            | Property::BorderBottomWidth
            | Property::BorderLeftWidth => style
                .border_width
                .set(side, parent.border_width.get(side)),
            Property::BorderTopStyle
            | Property::BorderRightStyle
            | Property::BorderBottomStyle
            | Property::BorderLeftStyle => style
                .border_style
                .set(side, parent.border_style.get(side)),
            Property::PaddingTop
            | Property::PaddingRight
            | Property::PaddingBottom
            | Property::PaddingLeft => style.padding.set(side, parent.padding.get(side)),
            Property::MarginTop
            | Property::MarginRight
            | Property::MarginBottom
            | Property::MarginLeft => style.margin.set(side, parent.margin.get(side)),
            _ => style.inset.set(side, parent.inset.get(side)),
        }
        return;
    }

    match property {
        Property::Zoom => style.zoom = parent.zoom,
        Property::WhiteSpace => style.white_space = parent.white_space,
        Property::Color => style.color = parent.color,
        Property::FontSize => style.font_size = parent.font_size,
        Property::FontWeight => style.font_weight = parent.font_weight,
        Property::FontVariant => style.font_variant = parent.font_variant,
        Property::FontStyle => style.font_style = parent.font_style,
        Property::FontStretch => style.font_stretch = parent.font_stretch,
        Property::FontFamily => style.font_family.clone_from(&parent.font_family),
        Property::LineHeight => style.line_height = parent.line_height,
        Property::VerticalAlign => style.vertical_align = parent.vertical_align,
        Property::Display => style.display = parent.display,
        Property::Direction => style.direction = parent.direction,
        Property::WritingMode => style.writing_mode = parent.writing_mode,
        Property::TabSize => style.tab_size = parent.tab_size,
        Property::Position => style.position = parent.position,
        Property::Width => style.width = parent.width,
        Property::Height => style.height = parent.height,
        Property::BoxSizing => style.box_sizing = parent.box_sizing,
        Property::TextAlign => style.text_align = parent.text_align,
        Property::Float => style.float = parent.float,
        Property::Clear => style.clear = parent.clear,
        Property::WordBreak => style.word_break = parent.word_break,
        Property::OverflowWrap => style.overflow_wrap = parent.overflow_wrap,
        Property::Overflow => style.overflow = parent.overflow,
        Property::WordSpacing => style.word_spacing = parent.word_spacing,
        Property::MinWidth => style.min_width = parent.min_width,
        Property::MaxWidth => style.max_width = parent.max_width,
        Property::MinHeight => style.min_height = parent.min_height,
        Property::MaxHeight => style.max_height = parent.max_height,
        // Per-side properties returned above.
        _ => {}
    }
}

/// [§ 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
///
/// Derive the computed style of a child from its parent's computed style and
/// the child's own declarations.
///
/// STEP 1: Inherited properties take the parent's value.
/// STEP 2: Everything else starts at its initial value.
/// STEP 3: Declarations apply in order, so a later one wins.
///
/// Neither input is modified, so equal inputs always give equal output.
#[must_use]
pub fn create_child_style(parent: &Style, declarations: &[Declaration]) -> Style {
    // STEP 1 + STEP 2
    let mut style = Style {
        zoom: parent.zoom,
        white_space: parent.white_space,
        color: parent.color,
        font_size: parent.font_size,
        font_weight: parent.font_weight,
        font_variant: parent.font_variant,
        font_style: parent.font_style,
        font_stretch: parent.font_stretch,
        font_family: parent.font_family.clone(),
        line_height: parent.line_height,
        direction: parent.direction,
        writing_mode: parent.writing_mode,
        tab_size: parent.tab_size,
        text_align: parent.text_align,
        word_break: parent.word_break,
        overflow_wrap: parent.overflow_wrap,
        word_spacing: parent.word_spacing,
        ..Style::default()
    };

    // STEP 3
    for declaration in declarations {
        declaration.apply(&mut style, parent);
    }

    style
}
