//! Computed value types.
//!
//! [§ 4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//!
//! Every value here is already absolute: font-relative and viewport-relative
//! units were resolved by whoever built the [`Style`](super::Style). The only
//! deferred units are percentages, which need the containing block.

use serde::Serialize;
use strum_macros::{Display, EnumString};

use super::writing_mode::PhysicalSide;

/// [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
///
/// "Some properties can take the keyword 'auto' as a value. This keyword
/// allows the user agent to compute the value based on other properties."
///
/// A used value that may still be `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum AutoOr {
    /// The value is 'auto' and must be resolved during layout.
    #[default]
    Auto,
    /// The value is a specific length in pixels.
    Length(f32),
}

impl AutoOr {
    /// Check if the value is 'auto'.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Get the length value, or a default if 'auto'.
    #[must_use]
    pub const fn to_px_or(self, default: f32) -> f32 {
        match self {
            Self::Length(v) => v,
            Self::Auto => default,
        }
    }

    /// The length, if not 'auto'.
    #[must_use]
    pub const fn length(self) -> Option<f32> {
        match self {
            Self::Length(v) => Some(v),
            Self::Auto => None,
        }
    }
}

/// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
///
/// `<length-percentage>`: padding, min sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LengthPercentage {
    /// Absolute pixels.
    Px(f32),
    /// Percentage of a reference size (0-100).
    Percent(f32),
}

impl Default for LengthPercentage {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl LengthPercentage {
    /// Resolve against the percentage basis.
    #[must_use]
    pub fn resolve(self, basis: f32) -> f32 {
        match self {
            Self::Px(v) => v,
            Self::Percent(p) => basis * p / 100.0,
        }
    }

    /// Whether the value is greater than zero regardless of its basis.
    #[must_use]
    pub fn is_positive(self) -> bool {
        match self {
            Self::Px(v) | Self::Percent(v) => v > 0.0,
        }
    }
}

/// `<length-percentage> | auto`: margins, sizes and insets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum LengthPercentageAuto {
    /// The `auto` keyword.
    #[default]
    Auto,
    /// Absolute pixels.
    Px(f32),
    /// Percentage of a reference size (0-100).
    Percent(f32),
}

impl LengthPercentageAuto {
    /// Resolve against the percentage basis.
    #[must_use]
    pub fn resolve(self, basis: f32) -> AutoOr {
        match self {
            Self::Auto => AutoOr::Auto,
            Self::Px(v) => AutoOr::Length(v),
            Self::Percent(p) => AutoOr::Length(basis * p / 100.0),
        }
    }

    /// Resolve against a basis that may be indefinite. A percentage of an
    /// indefinite size behaves as `auto`.
    #[must_use]
    pub fn resolve_against(self, basis: Option<f32>) -> AutoOr {
        match (self, basis) {
            (Self::Percent(_), None) => AutoOr::Auto,
            (value, basis) => value.resolve(basis.unwrap_or(0.0)),
        }
    }

    /// Whether the value is a non-zero length or percentage.
    #[must_use]
    pub fn is_nonzero(self) -> bool {
        match self {
            Self::Auto => false,
            Self::Px(v) | Self::Percent(v) => v != 0.0,
        }
    }
}

/// `<length-percentage> | none`: max sizes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum MaxSize {
    /// No maximum.
    #[default]
    None,
    /// Absolute pixels.
    Px(f32),
    /// Percentage of a reference size (0-100).
    Percent(f32),
}

impl MaxSize {
    /// Resolve against a basis that may be indefinite. A percentage of an
    /// indefinite size behaves as `none`.
    #[must_use]
    pub fn resolve_against(self, basis: Option<f32>) -> Option<f32> {
        match (self, basis) {
            (Self::None, _) | (Self::Percent(_), None) => None,
            (Self::Px(v), _) => Some(v),
            (Self::Percent(p), Some(b)) => Some(b * p / 100.0),
        }
    }
}

/// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#propdef-line-height)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum LineHeight {
    /// "Tells user agents to set the used value to a 'reasonable' value
    /// based on the font of the element."
    #[default]
    Normal,
    /// "The used value of the property is this number multiplied by the
    /// element's font size."
    Number(f32),
    /// An absolute line height.
    Px(f32),
}

/// [§ 7.1 Word Spacing](https://www.w3.org/TR/css-text-3/#word-spacing-property)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum WordSpacing {
    /// "No additional spacing is applied."
    #[default]
    Normal,
    /// "Specifies extra spacing in addition to the intrinsic inter-word spacing."
    Px(f32),
}

impl WordSpacing {
    /// Extra advance added to each word separator.
    #[must_use]
    pub const fn px(self) -> f32 {
        match self {
            Self::Normal => 0.0,
            Self::Px(v) => v,
        }
    }
}

/// An sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha in `0.0..=1.0`.
    pub a: f32,
}

impl Color {
    /// Opaque black, the initial value of `color`.
    pub const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 1.0,
    };
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// A value per physical side, used for margin, padding, border and insets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Sides<T> {
    /// Top edge.
    pub top: T,
    /// Right edge.
    pub right: T,
    /// Bottom edge.
    pub bottom: T,
    /// Left edge.
    pub left: T,
}

impl<T: Copy> Sides<T> {
    /// The same value on every side.
    pub const fn all(value: T) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// The value on one side.
    pub const fn get(&self, side: PhysicalSide) -> T {
        match side {
            PhysicalSide::Top => self.top,
            PhysicalSide::Right => self.right,
            PhysicalSide::Bottom => self.bottom,
            PhysicalSide::Left => self.left,
        }
    }

    /// Replace the value on one side.
    pub const fn set(&mut self, side: PhysicalSide, value: T) {
        match side {
            PhysicalSide::Top => self.top = value,
            PhysicalSide::Right => self.right = value,
            PhysicalSide::Bottom => self.bottom = value,
            PhysicalSide::Left => self.left = value,
        }
    }
}

/// [§ 3 White Space Processing](https://www.w3.org/TR/css-text-3/#white-space-property)
///
/// | Value    | New lines | Spaces and tabs | Text wrapping |
/// |----------|-----------|-----------------|---------------|
/// | normal   | Collapse  | Collapse        | Wrap          |
/// | pre      | Preserve  | Preserve        | No wrap       |
/// | nowrap   | Collapse  | Collapse        | No wrap       |
/// | pre-wrap | Preserve  | Preserve        | Wrap          |
/// | pre-line | Preserve  | Collapse        | Wrap          |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WhiteSpace {
    /// Collapse everything, wrap.
    #[default]
    Normal,
    /// Collapse everything, never wrap.
    Nowrap,
    /// Preserve everything, never wrap.
    Pre,
    /// Preserve everything, wrap.
    PreWrap,
    /// Preserve new lines, collapse spaces, wrap.
    PreLine,
}

impl WhiteSpace {
    /// Whether soft wrap opportunities are suppressed.
    #[must_use]
    pub const fn is_nowrap(self) -> bool {
        matches!(self, Self::Nowrap | Self::Pre)
    }
}

/// [§ 3.3 font-style](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FontStyle {
    /// Upright glyphs.
    #[default]
    Normal,
    /// Italic glyphs.
    Italic,
    /// Slanted glyphs.
    Oblique,
}

/// [§ 6.11 font-variant](https://www.w3.org/TR/css-fonts-4/#font-variant-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FontVariant {
    /// No variant.
    #[default]
    Normal,
    /// Small capitals.
    SmallCaps,
}

/// [§ 3.4 font-stretch](https://www.w3.org/TR/css-fonts-4/#font-stretch-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FontStretch {
    /// 50%
    UltraCondensed,
    /// 62.5%
    ExtraCondensed,
    /// 75%
    Condensed,
    /// 87.5%
    SemiCondensed,
    /// 100%
    #[default]
    Normal,
    /// 112.5%
    SemiExpanded,
    /// 125%
    Expanded,
    /// 150%
    ExtraExpanded,
    /// 200%
    UltraExpanded,
}

/// [§ 10.8.1 vertical-align](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum VerticalAlign {
    /// "Align the baseline of the box with the baseline of the parent box."
    #[default]
    Baseline,
    /// "Align the vertical midpoint of the box with the baseline of the
    /// parent box plus half the x-height of the parent."
    Middle,
    /// "Lower the baseline of the box to the proper position for subscripts
    /// of the parent's box."
    Sub,
    /// "Raise the baseline of the box to the proper position for
    /// superscripts of the parent's box."
    Super,
    /// "Align the top of the box with the top of the parent's content area."
    TextTop,
    /// "Align the bottom of the box with the bottom of the parent's content area."
    TextBottom,
    /// "Align the top of the aligned subtree with the top of the line box."
    Top,
    /// "Align the bottom of the aligned subtree with the bottom of the line box."
    Bottom,
    /// "Raise (positive value) or lower (negative value) the box by this distance."
    #[strum(disabled)]
    Length(f32),
}

/// [§ 3 Border Style](https://www.w3.org/TR/css-backgrounds-3/#border-style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BorderStyle {
    /// "No border. Color and width are ignored."
    #[default]
    None,
    /// "Same as none, but has different behavior in the border conflict
    /// resolution rules for border-collapsed tables."
    Hidden,
    /// "A single line segment."
    Solid,
    /// "A series of square-ended dashes."
    Dashed,
    /// "A series of round dots."
    Dotted,
    /// "A double line segment."
    Double,
}

impl BorderStyle {
    /// Whether a border with this style has a used width.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::None | Self::Hidden)
    }
}

/// [§ 2 position](https://www.w3.org/TR/css-position-3/#position-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Position {
    /// In flow.
    #[default]
    Static,
    /// In flow, shifted after layout.
    Relative,
    /// Out of flow, placed against the nearest positioned ancestor.
    Absolute,
}

/// [§ 4.4 box-sizing](https://www.w3.org/TR/css-sizing-3/#box-sizing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BoxSizing {
    /// Sizes describe the content box.
    #[default]
    ContentBox,
    /// Sizes include padding.
    PaddingBox,
    /// Sizes include padding and border.
    BorderBox,
}

/// [§ 6.1 text-align](https://www.w3.org/TR/css-text-3/#text-align-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TextAlign {
    /// Inline-start edge of the line box.
    #[default]
    Start,
    /// Inline-end edge of the line box.
    End,
    /// Line-left edge.
    Left,
    /// Line-right edge.
    Right,
    /// Centered.
    Center,
    /// Laid out as `start`; no spacing is distributed.
    Justify,
}

/// A `text-align` value after mapping through `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PhysicalTextAlign {
    /// Flush with the line-left edge.
    Left,
    /// Flush with the line-right edge.
    Right,
    /// Centered in the line.
    Center,
}

/// [§ 9.5.1 float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Float {
    /// "The box is not floated."
    #[default]
    None,
    /// "The element generates a block box that is floated to the left."
    Left,
    /// "The element generates a block box that is floated to the right."
    Right,
}

impl Float {
    /// The other side. `none` stays `none`.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// [§ 9.5.2 clear](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Clear {
    /// "No constraint on the box's position with respect to floats."
    #[default]
    None,
    /// "Requires that the top border edge of the box be below the bottom
    /// outer edge of any left-floating boxes."
    Left,
    /// "Requires that the top border edge of the box be below the bottom
    /// outer edge of any right-floating boxes."
    Right,
    /// Both of the above.
    Both,
}

impl Clear {
    /// Whether left floats are cleared.
    #[must_use]
    pub const fn clears_left(self) -> bool {
        matches!(self, Self::Left | Self::Both)
    }

    /// Whether right floats are cleared.
    #[must_use]
    pub const fn clears_right(self) -> bool {
        matches!(self, Self::Right | Self::Both)
    }
}

/// [§ 5.2 word-break](https://www.w3.org/TR/css-text-3/#word-break-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WordBreak {
    /// "Words break according to their customary rules."
    #[default]
    Normal,
    /// "Breaking is allowed within words."
    BreakAll,
    /// Legacy alias that behaves as `overflow-wrap: anywhere`.
    BreakWord,
}

/// [§ 5.5 overflow-wrap](https://www.w3.org/TR/css-text-3/#overflow-wrap-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OverflowWrap {
    /// "Lines may break only at allowed break points."
    #[default]
    Normal,
    /// Unbreakable words may be broken if they do not fit, without
    /// affecting min-content.
    BreakWord,
    /// Unbreakable words may be broken anywhere if they do not fit.
    Anywhere,
}

/// [§ 3 overflow](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Overflow {
    /// Content is not clipped.
    #[default]
    Visible,
    /// Content is clipped; the box establishes a formatting context.
    Hidden,
}

/// [§ 2.1 direction](https://www.w3.org/TR/css-writing-modes-4/#direction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Direction {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

impl Direction {
    /// The paragraph embedding level for this base direction.
    #[must_use]
    pub const fn base_level(self) -> u8 {
        match self {
            Self::Ltr => 0,
            Self::Rtl => 1,
        }
    }

    /// The direction of text at a bidi embedding level.
    #[must_use]
    pub const fn from_level(level: u8) -> Self {
        if level % 2 == 0 { Self::Ltr } else { Self::Rtl }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_keywords_parse_kebab_case() {
        assert_eq!(WhiteSpace::from_str("pre-wrap"), Ok(WhiteSpace::PreWrap));
        assert_eq!(WordBreak::from_str("break-all"), Ok(WordBreak::BreakAll));
        assert_eq!(VerticalAlign::from_str("text-top"), Ok(VerticalAlign::TextTop));
        assert!(Float::from_str("center").is_err());
        assert_eq!(BoxSizing::BorderBox.to_string(), "border-box");
    }

    #[test]
    fn test_percentage_of_indefinite_size_is_auto() {
        let height = LengthPercentageAuto::Percent(100.0);
        assert_eq!(height.resolve_against(None), AutoOr::Auto);
        assert_eq!(height.resolve_against(Some(40.0)), AutoOr::Length(40.0));
        assert_eq!(MaxSize::Percent(50.0).resolve_against(None), None);
    }
}
