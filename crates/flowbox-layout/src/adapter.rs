//! Host adapter.
//!
//! Translates between a host application's flat element list and the
//! engine. Elements arrive as JSON-friendly records whose `props.style` is a
//! map of camelCase CSS properties with untyped values; results leave as one
//! absolute border-box rectangle per element.
//!
//! Unsupported style values never fail a layout: each one is reported once
//! through [`warn_once`] and the property keeps the value it would have had
//! without the declaration. Malformed element lists (unknown parents, parent
//! cycles, duplicate ids) are reported as [`LayoutError`]s in the result and
//! only the affected subtree is left out.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use flowbox_common::warning::{clear_warnings, warn_once};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LayoutError, StyleError};
use crate::layout::{
    BoxArea, BoxId, BoxTree, LayoutContext, SourceElement, SourceNode, UsedMargins,
    build_box_tree, layout_tree,
};
use crate::style::{
    BorderStyle, BoxSizing, Declaration, DisplayValue, LengthPercentage, LengthPercentageAuto,
    LineHeight, MaxSize, Overflow, PhysicalSide, Position, Style, VerticalAlign, WritingMode,
    create_child_style, parse_display_value,
};

/// Component name used for style warnings.
const STYLE: &str = "Style";

/// Tags of host elements laid out as replaced boxes.
const REPLACED_TAGS: [&str; 7] = ["img", "video", "audio", "canvas", "iframe", "embed", "object"];

/// Physical sides in shorthand order.
const SIDES: [PhysicalSide; 4] = [
    PhysicalSide::Top,
    PhysicalSide::Right,
    PhysicalSide::Bottom,
    PhysicalSide::Left,
];

/// Size of the viewport the layout is computed for, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width of the initial containing block.
    pub width: f32,
    /// Height of the initial containing block.
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1440.0,
            height: 900.0,
        }
    }
}

/// Properties of a host element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HostProps {
    /// Inline style: camelCase CSS property names to strings or numbers.
    #[serde(default)]
    pub style: Map<String, Value>,
    /// Text content, as a string or a number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Value>,
    /// Text content, used when `children` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Text content, used when neither `children` nor `text` is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl HostProps {
    /// Text the element contains directly, if any.
    #[must_use]
    pub fn text_content(&self) -> Option<String> {
        match &self.children {
            Some(Value::String(text)) => return Some(text.clone()),
            Some(Value::Number(number)) => return Some(number.to_string()),
            _ => {}
        }
        self.text.clone().or_else(|| self.label.clone())
    }
}

/// One element of the host's flat element list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostElement {
    /// Unique element id.
    pub id: String,
    /// Tag name.
    pub tag: String,
    /// Style and content.
    #[serde(default)]
    pub props: HostProps,
    /// Id of the parent element, `None` for roots.
    #[serde(default, alias = "parent_id")]
    pub parent_id: Option<String>,
    /// Position among siblings. Ties keep list order.
    #[serde(default, alias = "order_num")]
    pub order_num: i64,
}

/// Used margins of an element, in physical directions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarginBox {
    /// Top margin.
    pub top: f32,
    /// Right margin.
    pub right: f32,
    /// Bottom margin.
    pub bottom: f32,
    /// Left margin.
    pub left: f32,
}

impl MarginBox {
    /// Map flow-relative margins to physical sides for `writing_mode`.
    #[must_use]
    pub const fn from_used(margins: UsedMargins, writing_mode: WritingMode) -> Self {
        match writing_mode {
            WritingMode::HorizontalTb => Self {
                top: margins.block_start,
                right: margins.line_right,
                bottom: margins.block_end,
                left: margins.line_left,
            },
            WritingMode::VerticalLr => Self {
                top: margins.line_left,
                right: margins.block_end,
                bottom: margins.line_right,
                left: margins.block_start,
            },
            WritingMode::VerticalRl => Self {
                top: margins.line_left,
                right: margins.block_start,
                bottom: margins.line_right,
                left: margins.block_end,
            },
        }
    }
}

/// Computed geometry of one host element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementLayout {
    /// Host element id.
    pub element_id: String,
    /// Left edge of the border box, relative to the viewport.
    pub x: f32,
    /// Top edge of the border box, relative to the viewport.
    pub y: f32,
    /// Border box width.
    pub width: f32,
    /// Border box height.
    pub height: f32,
    /// Used margins.
    pub margin: MarginBox,
}

/// Result of [`calculate_block_layout`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComputedLayout {
    /// One entry per element that generated a box, in document order.
    pub elements: Vec<ElementLayout>,
    /// Structural problems found in the element list.
    pub errors: Vec<LayoutError>,
}

impl ComputedLayout {
    /// The layout of element `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ElementLayout> {
        self.elements.iter().find(|element| element.element_id == id)
    }
}

/// Convert a laid out area (absolute, physical) into a host rectangle.
/// Margins are left at zero.
#[must_use]
pub fn box_area_to_computed_layout(area: &BoxArea, element_id: &str) -> ElementLayout {
    ElementLayout {
        element_id: element_id.to_string(),
        x: area.x,
        y: area.y,
        width: area.width,
        height: area.height,
        margin: MarginBox::default(),
    }
}

// -----------------------------------------------------------------------------
// Value parsing
// -----------------------------------------------------------------------------

#[allow(clippy::cast_possible_truncation)]
fn json_number(value: &Value) -> Option<f32> {
    value
        .as_f64()
        .map(|number| number as f32)
        .filter(|number| number.is_finite())
}

/// A finite number written as text. `nan`, `inf` and `infinity` are
/// rejected.
fn text_number(text: &str) -> Option<f32> {
    text.trim().parse::<f32>().ok().filter(|number| number.is_finite())
}

fn invalid_length(property: &str, value: &Value) -> StyleError {
    StyleError::InvalidLength {
        property: property.to_string(),
        value: display_value(value),
    }
}

fn unknown_keyword(property: &str, value: &Value) -> StyleError {
    StyleError::UnknownKeyword {
        property: property.to_string(),
        value: display_value(value),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// A dimension as it appears in a host style value.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Dimension {
    Auto,
    Px(f32),
    Percent(f32),
}

/// [§ 5 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)
///
/// Parse `auto`, numbers (pixels), `px`, `%`, `vw` and `vh`. `fit-content`
/// sizes like `auto`. Anything else, including `calc()`, is an error.
fn parse_dimension(property: &str, value: &Value, viewport: Viewport) -> Result<Dimension, StyleError> {
    if let Some(number) = json_number(value) {
        return Ok(Dimension::Px(number));
    }
    let Some(text) = value.as_str() else {
        return Err(invalid_length(property, value));
    };
    let text = text.trim().to_ascii_lowercase();
    if text == "auto" || text == "fit-content" {
        return Ok(Dimension::Auto);
    }

    let number = |digits: &str| text_number(digits).ok_or_else(|| invalid_length(property, value));
    if let Some(digits) = text.strip_suffix('%') {
        Ok(Dimension::Percent(number(digits)?))
    } else if let Some(digits) = text.strip_suffix("px") {
        Ok(Dimension::Px(number(digits)?))
    } else if let Some(digits) = text.strip_suffix("vw") {
        viewport_px(number(digits)?, viewport.width).ok_or_else(|| invalid_length(property, value))
    } else if let Some(digits) = text.strip_suffix("vh") {
        viewport_px(number(digits)?, viewport.height).ok_or_else(|| invalid_length(property, value))
    } else {
        Ok(Dimension::Px(number(&text)?))
    }
}

/// `percent` of a viewport side, as long as the product stays finite.
fn viewport_px(percent: f32, side: f32) -> Option<Dimension> {
    Some(percent * side / 100.0)
        .filter(|px| px.is_finite())
        .map(Dimension::Px)
}

/// `<length-percentage> | auto`: margins, sizes and insets.
fn parse_length_percentage_auto(
    property: &str,
    value: &Value,
    viewport: Viewport,
) -> Result<LengthPercentageAuto, StyleError> {
    Ok(match parse_dimension(property, value, viewport)? {
        Dimension::Auto => LengthPercentageAuto::Auto,
        Dimension::Px(px) => LengthPercentageAuto::Px(px),
        Dimension::Percent(percent) => LengthPercentageAuto::Percent(percent),
    })
}

/// `<length-percentage>`: padding and minimum sizes. `auto` is an error for
/// padding; for `min-*` it means zero.
fn parse_length_percentage(
    property: &str,
    value: &Value,
    viewport: Viewport,
    auto: Option<LengthPercentage>,
) -> Result<LengthPercentage, StyleError> {
    match parse_dimension(property, value, viewport)? {
        Dimension::Auto => auto.ok_or_else(|| invalid_length(property, value)),
        Dimension::Px(px) => Ok(LengthPercentage::Px(px)),
        Dimension::Percent(percent) => Ok(LengthPercentage::Percent(percent)),
    }
}

/// `<length-percentage> | none`: maximum sizes. `auto` means `none`.
fn parse_max_size(property: &str, value: &Value, viewport: Viewport) -> Result<MaxSize, StyleError> {
    if value.as_str().is_some_and(|text| text.trim() == "none") {
        return Ok(MaxSize::None);
    }
    Ok(match parse_dimension(property, value, viewport)? {
        Dimension::Auto => MaxSize::None,
        Dimension::Px(px) => MaxSize::Px(px),
        Dimension::Percent(percent) => MaxSize::Percent(percent),
    })
}

/// A non-negative pixel length: border widths.
fn parse_px(property: &str, value: &Value, viewport: Viewport) -> Result<f32, StyleError> {
    match parse_dimension(property, value, viewport)? {
        Dimension::Px(px) if px >= 0.0 => Ok(px),
        _ => Err(invalid_length(property, value)),
    }
}

/// A keyword of one of the style enums, by its CSS name.
fn parse_keyword<T: FromStr>(property: &str, value: &Value) -> Result<T, StyleError> {
    value
        .as_str()
        .map(|text| text.trim().to_ascii_lowercase())
        .and_then(|text| T::from_str(&text).ok())
        .ok_or_else(|| unknown_keyword(property, value))
}

/// [§ 3.1 Choosing a Positioning Scheme](https://www.w3.org/TR/css-position-3/#position-property)
///
/// `fixed` boxes are positioned against the viewport, which is the initial
/// containing block here, so they behave as `absolute`. `sticky` boxes are
/// laid out as `relative` without a scroll container.
fn parse_position(property: &str, value: &Value) -> Result<Position, StyleError> {
    match value.as_str().map(str::trim) {
        Some("fixed") => Ok(Position::Absolute),
        Some("sticky") => Ok(Position::Relative),
        _ => parse_keyword(property, value),
    }
}

/// `auto`, `scroll` and `clip` clip like `hidden` for layout purposes.
fn parse_overflow(property: &str, value: &Value) -> Result<Overflow, StyleError> {
    match value.as_str().map(str::trim) {
        Some("auto" | "scroll" | "clip") => Ok(Overflow::Hidden),
        _ => parse_keyword(property, value),
    }
}

/// [§ 10.8.1 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#propdef-line-height)
fn parse_line_height(property: &str, value: &Value, font_size: f32) -> Result<LineHeight, StyleError> {
    if let Some(number) = json_number(value) {
        return Ok(LineHeight::Number(number));
    }
    let Some(text) = value.as_str().map(str::trim) else {
        return Err(invalid_length(property, value));
    };
    if text == "normal" {
        return Ok(LineHeight::Normal);
    }
    if let Some(number) = text_number(text) {
        return Ok(LineHeight::Number(number));
    }
    if let Some(percent) = text.strip_suffix('%').and_then(text_number) {
        return Ok(LineHeight::Px(font_size * percent / 100.0));
    }
    if let Some(px) = text.strip_suffix("px").and_then(text_number) {
        return Ok(LineHeight::Px(px));
    }
    Err(invalid_length(property, value))
}

/// [§ 3.5 Font size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
///
/// Pixels, `em` and percentages of the parent's font size.
fn parse_font_size(property: &str, value: &Value, parent_font_size: f32) -> Result<f32, StyleError> {
    if let Some(number) = json_number(value) {
        return Ok(number);
    }
    let Some(text) = value.as_str().map(str::trim) else {
        return Err(invalid_length(property, value));
    };
    let (digits, scale) = if let Some(digits) = text.strip_suffix("em") {
        (digits, parent_font_size)
    } else if let Some(digits) = text.strip_suffix('%') {
        (digits, parent_font_size / 100.0)
    } else if let Some(digits) = text.strip_suffix("px") {
        (digits, 1.0)
    } else {
        (text, 1.0)
    };
    text_number(digits)
        .filter(|size| *size >= 0.0)
        .map(|size| size * scale)
        .ok_or_else(|| invalid_length(property, value))
}

/// [§ 3.2 Font weight](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_font_weight(property: &str, value: &Value) -> Result<u16, StyleError> {
    let number = match value.as_str().map(str::trim) {
        Some("normal") => return Ok(400),
        Some("bold") => return Ok(700),
        Some(text) => text_number(text),
        None => json_number(value),
    };
    number
        .filter(|weight| (1.0..=1000.0).contains(weight))
        .map(|weight| weight.round() as u16)
        .ok_or_else(|| unknown_keyword(property, value))
}

/// Comma-separated family names, quotes removed.
fn parse_font_family(property: &str, value: &Value) -> Result<Vec<String>, StyleError> {
    let families: Vec<String> = value
        .as_str()
        .unwrap_or_default()
        .split(',')
        .map(|family| family.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|family| !family.is_empty())
        .collect();
    if families.is_empty() {
        Err(unknown_keyword(property, value))
    } else {
        Ok(families)
    }
}

/// [§ 10.8.1 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
fn parse_vertical_align(property: &str, value: &Value, viewport: Viewport) -> Result<VerticalAlign, StyleError> {
    if let Ok(keyword) = parse_keyword::<VerticalAlign>(property, value) {
        return Ok(keyword);
    }
    match parse_dimension(property, value, viewport) {
        Ok(Dimension::Px(px)) => Ok(VerticalAlign::Length(px)),
        _ => Err(unknown_keyword(property, value)),
    }
}

/// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
///
/// Split a four-side shorthand (`margin`, `padding`, `border-width`,
/// `border-style`) into per-side values, top, right, bottom, left.
///
/// "If there is only one component value, it applies to all sides. If there
/// are two values, the top and bottom margins are set to the first value and
/// the right and left margins are set to the second. If there are three
/// values, the top is set to the first value, the left and right are set to
/// the second, and the bottom is set to the third. If there are four values,
/// they apply to the top, right, bottom, and left, respectively."
fn expand_shorthand(value: &Value) -> Option<[Value; 4]> {
    if value.is_number() {
        return Some([value.clone(), value.clone(), value.clone(), value.clone()]);
    }
    let parts: Vec<Value> = value
        .as_str()?
        .split_whitespace()
        .map(|part| Value::String(part.to_string()))
        .collect();
    match parts.as_slice() {
        // RULE 1-VALUE
        [all] => Some([all.clone(), all.clone(), all.clone(), all.clone()]),
        // RULE 2-VALUE
        [block, inline] => Some([block.clone(), inline.clone(), block.clone(), inline.clone()]),
        // RULE 3-VALUE
        [top, inline, bottom] => Some([top.clone(), inline.clone(), bottom.clone(), inline.clone()]),
        // RULE 4-VALUE
        [top, right, bottom, left] => Some([top.clone(), right.clone(), bottom.clone(), left.clone()]),
        _ => None,
    }
}

/// Name of the longhand for `side`: `marginTop` for (`margin`, top).
fn longhand(prefix: &str, side: PhysicalSide, suffix: &str) -> String {
    let side = match side {
        PhysicalSide::Top => "Top",
        PhysicalSide::Right => "Right",
        PhysicalSide::Bottom => "Bottom",
        PhysicalSide::Left => "Left",
    };
    format!("{prefix}{side}{suffix}")
}

// -----------------------------------------------------------------------------
// Style conversion
// -----------------------------------------------------------------------------

/// Collects declarations from a host style map. Values that do not parse
/// are reported and dropped.
struct StyleReader<'a> {
    raw: &'a Map<String, Value>,
    declarations: Vec<Declaration>,
}

impl<'a> StyleReader<'a> {
    fn get(&self, property: &str) -> Option<&'a Value> {
        self.raw.get(property).filter(|value| !value.is_null())
    }

    fn push(&mut self, result: Result<Declaration, StyleError>) {
        match result {
            Ok(declaration) => self.declarations.push(declaration),
            Err(err) => warn_once(STYLE, &format!("{err}, using the initial value")),
        }
    }

    /// Read `property` if present.
    fn read(&mut self, property: &str, parse: impl FnOnce(&str, &Value) -> Result<Declaration, StyleError>) {
        if let Some(value) = self.get(property) {
            self.push(parse(property, value));
        }
    }

    /// Read a four-side property from its longhands, falling back to the
    /// shorthand side by side.
    fn read_sides(
        &mut self,
        shorthand: &str,
        prefix: &str,
        suffix: &str,
        parse: impl Fn(&str, &Value, PhysicalSide) -> Result<Declaration, StyleError>,
    ) -> [bool; 4] {
        let expanded = self.get(shorthand).map(|value| {
            let sides = expand_shorthand(value);
            if sides.is_none() {
                warn_once(STYLE, &format!("{}, using the initial value", invalid_length(shorthand, value)));
            }
            sides
        });
        let mut present = [false; 4];
        for (index, side) in SIDES.into_iter().enumerate() {
            let name = longhand(prefix, side, suffix);
            if let Some(value) = self.get(&name) {
                present[index] = true;
                self.push(parse(&name, value, side));
            } else if let Some(Some(values)) = &expanded {
                present[index] = true;
                self.push(parse(shorthand, &values[index], side));
            }
        }
        present
    }
}

/// Convert the inline style of a host element into a computed [`Style`],
/// inheriting from `parent`.
///
/// Host elements default to `display: block` and `box-sizing: border-box`.
/// A positive border width without a border style draws a solid border.
#[must_use]
pub fn element_style_to_style(element: &HostElement, parent: &Style, viewport: Viewport) -> Style {
    let raw = &element.props.style;
    let mut reader = StyleReader {
        raw,
        declarations: vec![
            Declaration::Display(DisplayValue::block()),
            Declaration::BoxSizing(BoxSizing::BorderBox),
        ],
    };

    // Display and positioning.
    if let Some(value) = reader.get("display") {
        match value.as_str() {
            Some(keyword) => reader.declarations.push(Declaration::Display(parse_display_value(keyword))),
            None => reader.push(Err(unknown_keyword("display", value))),
        }
    }
    reader.read("position", |p, v| parse_position(p, v).map(Declaration::Position));
    reader.read("float", |p, v| parse_keyword(p, v).map(Declaration::Float));
    reader.read("clear", |p, v| parse_keyword(p, v).map(Declaration::Clear));
    reader.read("overflow", |p, v| parse_overflow(p, v).map(Declaration::Overflow));
    reader.read("boxSizing", |p, v| parse_keyword(p, v).map(Declaration::BoxSizing));
    for (index, property) in ["top", "right", "bottom", "left"].into_iter().enumerate() {
        reader.read(property, |p, v| {
            parse_length_percentage_auto(p, v, viewport).map(|inset| Declaration::Inset(SIDES[index], inset))
        });
    }

    // Sizes.
    reader.read("width", |p, v| parse_length_percentage_auto(p, v, viewport).map(Declaration::Width));
    reader.read("height", |p, v| parse_length_percentage_auto(p, v, viewport).map(Declaration::Height));
    let zero = Some(LengthPercentage::Px(0.0));
    reader.read("minWidth", |p, v| parse_length_percentage(p, v, viewport, zero).map(Declaration::MinWidth));
    reader.read("minHeight", |p, v| parse_length_percentage(p, v, viewport, zero).map(Declaration::MinHeight));
    reader.read("maxWidth", |p, v| parse_max_size(p, v, viewport).map(Declaration::MaxWidth));
    reader.read("maxHeight", |p, v| parse_max_size(p, v, viewport).map(Declaration::MaxHeight));

    // Box edges.
    let _ = reader.read_sides("margin", "margin", "", |p, v, side| {
        parse_length_percentage_auto(p, v, viewport).map(|margin| Declaration::Margin(side, margin))
    });
    let _ = reader.read_sides("padding", "padding", "", |p, v, side| {
        parse_length_percentage(p, v, viewport, None).map(|padding| Declaration::Padding(side, padding))
    });
    let styled = reader.read_sides("borderStyle", "border", "Style", |p, v, side| {
        parse_keyword(p, v).map(|style| Declaration::BorderStyle(side, style))
    });
    let widths_from = reader.declarations.len();
    let _ = reader.read_sides("borderWidth", "border", "Width", |p, v, side| {
        parse_px(p, v, viewport).map(|width| Declaration::BorderWidth(side, width))
    });
    let widths = &reader.declarations[widths_from..];
    let solid: Vec<Declaration> = SIDES
        .into_iter()
        .zip(styled)
        .filter(|&(side, given)| {
            !given
                && widths.iter().any(|declaration| {
                    matches!(*declaration, Declaration::BorderWidth(s, width) if s == side && width > 0.0)
                })
        })
        .map(|(side, _)| Declaration::BorderStyle(side, BorderStyle::Solid))
        .collect();
    reader.declarations.extend(solid);

    // Text.
    let font_size = match reader.get("fontSize") {
        Some(value) => match parse_font_size("fontSize", value, parent.font_size) {
            Ok(size) => {
                reader.declarations.push(Declaration::FontSize(size));
                size
            }
            Err(err) => {
                reader.push(Err(err));
                parent.font_size
            }
        },
        None => parent.font_size,
    };
    reader.read("fontFamily", |p, v| parse_font_family(p, v).map(Declaration::FontFamily));
    reader.read("fontWeight", |p, v| parse_font_weight(p, v).map(Declaration::FontWeight));
    reader.read("fontStyle", |p, v| parse_keyword(p, v).map(Declaration::FontStyle));
    reader.read("lineHeight", |p, v| parse_line_height(p, v, font_size).map(Declaration::LineHeight));
    reader.read("whiteSpace", |p, v| parse_keyword(p, v).map(Declaration::WhiteSpace));
    reader.read("textAlign", |p, v| parse_keyword(p, v).map(Declaration::TextAlign));
    reader.read("wordBreak", |p, v| parse_keyword(p, v).map(Declaration::WordBreak));
    if reader.get("overflowWrap").is_some() {
        reader.read("overflowWrap", |p, v| parse_keyword(p, v).map(Declaration::OverflowWrap));
    } else {
        reader.read("wordWrap", |p, v| parse_keyword(p, v).map(Declaration::OverflowWrap));
    }
    reader.read("direction", |p, v| parse_keyword(p, v).map(Declaration::Direction));
    reader.read("writingMode", |p, v| parse_keyword(p, v).map(Declaration::WritingMode));
    reader.read("verticalAlign", |p, v| parse_vertical_align(p, v, viewport).map(Declaration::VerticalAlign));

    create_child_style(parent, &reader.declarations)
}

// -----------------------------------------------------------------------------
// Element list validation
// -----------------------------------------------------------------------------

/// Elements that can be laid out, grouped by parent.
struct ElementForest<'a> {
    roots: Vec<&'a HostElement>,
    children: HashMap<&'a str, Vec<&'a HostElement>>,
}

/// Check the parent references of `elements` and group them.
///
/// Duplicate ids keep their first element. Elements under an unknown parent
/// or on a parent cycle are reported and dropped with their subtrees.
fn validate<'a>(elements: &'a [HostElement], errors: &mut Vec<LayoutError>) -> ElementForest<'a> {
    let mut by_id: HashMap<&str, &HostElement> = HashMap::with_capacity(elements.len());
    let mut unique: Vec<&HostElement> = Vec::with_capacity(elements.len());
    for element in elements {
        if by_id.contains_key(element.id.as_str()) {
            errors.push(LayoutError::DuplicateElement {
                element: element.id.clone(),
            });
        } else {
            let _ = by_id.insert(element.id.as_str(), element);
            unique.push(element);
        }
    }

    let mut roots = Vec::new();
    let mut children: HashMap<&str, Vec<&HostElement>> = HashMap::new();
    for &element in &unique {
        match element.parent_id.as_deref() {
            None => roots.push(element),
            Some(parent) if by_id.contains_key(parent) => children.entry(parent).or_default().push(element),
            Some(parent) => errors.push(LayoutError::UnknownParent {
                element: element.id.clone(),
                parent: parent.to_string(),
            }),
        }
    }

    // Elements not reachable from a root hang off an unknown parent (already
    // reported) or sit on a cycle.
    let mut reachable: HashSet<&str> = HashSet::with_capacity(unique.len());
    let mut stack: Vec<&str> = roots.iter().map(|root| root.id.as_str()).collect();
    while let Some(id) = stack.pop() {
        if reachable.insert(id) {
            stack.extend(children.get(id).into_iter().flatten().map(|child| child.id.as_str()));
        }
    }
    let mut on_reported_cycle: HashSet<&str> = HashSet::new();
    for &element in &unique {
        if reachable.contains(element.id.as_str()) || on_reported_cycle.contains(element.id.as_str()) {
            continue;
        }
        let mut path: Vec<&str> = Vec::new();
        let mut current = Some(element);
        while let Some(node) = current {
            let id = node.id.as_str();
            if let Some(start) = path.iter().position(|&seen| seen == id) {
                if !path[start..].iter().any(|seen| on_reported_cycle.contains(seen)) {
                    errors.push(LayoutError::Cycle {
                        element: id.to_string(),
                    });
                }
                on_reported_cycle.extend(&path[start..]);
                break;
            }
            if on_reported_cycle.contains(id) {
                break;
            }
            path.push(id);
            current = node.parent_id.as_deref().and_then(|parent| by_id.get(parent).copied());
        }
    }

    if roots.is_empty() && !unique.is_empty() {
        errors.push(LayoutError::MissingRoot);
    }

    for error in &*errors {
        log::error!("{error}");
    }

    for siblings in children.values_mut() {
        siblings.sort_by_key(|element| element.order_num);
    }
    roots.sort_by_key(|element| element.order_num);

    ElementForest { roots, children }
}

fn fixed_px(value: LengthPercentageAuto) -> Option<f32> {
    match value {
        LengthPercentageAuto::Px(px) => Some(px),
        _ => None,
    }
}

/// Source tree for `element` and its descendants.
fn source_node(
    forest: &ElementForest<'_>,
    element: &HostElement,
    parent: &Style,
    viewport: Viewport,
) -> SourceNode {
    let style = element_style_to_style(element, parent, viewport);
    let tag = element.tag.to_ascii_lowercase();

    let mut children = Vec::new();
    if let Some(text) = element.props.text_content() {
        children.push(SourceNode::Text(text));
    }
    for child in forest.children.get(element.id.as_str()).into_iter().flatten() {
        children.push(source_node(forest, child, &style, viewport));
    }

    // A replaced element with a fixed size reports it as its natural size.
    let (intrinsic_width, intrinsic_height) = if REPLACED_TAGS.contains(&tag.as_str()) {
        (fixed_px(style.width), fixed_px(style.height))
    } else {
        (None, None)
    };

    SourceNode::Element(SourceElement {
        id: element.id.clone(),
        tag,
        style: Arc::new(style),
        children,
        intrinsic_width,
        intrinsic_height,
    })
}

/// Build the box tree of a flat list of host elements, before layout.
///
/// Returns the tree together with the structural problems found in the
/// list. Subtrees with problems are left out of the tree.
#[must_use]
pub fn build_host_box_tree(elements: &[HostElement], viewport: Viewport) -> (BoxTree, Vec<LayoutError>) {
    let mut errors = Vec::new();
    let forest = validate(elements, &mut errors);

    let initial = Style::default();
    let roots: Vec<SourceNode> = forest
        .roots
        .iter()
        .map(|root| source_node(&forest, root, &initial, viewport))
        .collect();

    (build_box_tree(&roots, viewport.width, viewport.height), errors)
}

/// Lay out a flat list of host elements in `viewport`.
///
/// Always returns a layout: structural problems are collected in
/// [`ComputedLayout::errors`] and the affected subtrees are left out.
/// Identical input gives identical output.
///
/// Style warnings are deduplicated per call: the calling thread's warning
/// set is cleared on entry, and calls on other threads are not affected.
#[must_use]
pub fn calculate_block_layout(
    elements: &[HostElement],
    viewport: Viewport,
    ctx: &LayoutContext<'_>,
) -> ComputedLayout {
    clear_warnings();

    // STEP 1: styles, validation and boxes.
    let (mut tree, errors) = build_host_box_tree(elements, viewport);

    // STEP 2: layout.
    layout_tree(&mut tree, ctx);

    // STEP 3: one rectangle per element, from its first box.
    let mut seen: HashSet<&str> = HashSet::new();
    let mut laid_out = Vec::new();
    for id in tree.preorder(BoxId::ICB) {
        let node = &tree[id];
        let Some(element) = node.element.as_deref() else {
            continue;
        };
        if !seen.insert(element) {
            continue;
        }
        let writing_mode = tree.containing_block(id).writing_mode;
        let mut layout = box_area_to_computed_layout(&node.border_area, element);
        layout.margin = MarginBox::from_used(node.margins, writing_mode);
        laid_out.push(layout);
    }

    log::debug!(
        "laid out {} elements in {}x{} ({} errors)",
        laid_out.len(),
        viewport.width,
        viewport.height,
        errors.len()
    );

    ComputedLayout {
        elements: laid_out,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 1000.0,
        height: 500.0,
    };

    #[test]
    fn test_dimension_units() {
        let parse = |value: Value| parse_dimension("width", &value, VIEWPORT);
        assert_eq!(parse(json!(12)), Ok(Dimension::Px(12.0)));
        assert_eq!(parse(json!("12px")), Ok(Dimension::Px(12.0)));
        assert_eq!(parse(json!("12")), Ok(Dimension::Px(12.0)));
        assert_eq!(parse(json!("50%")), Ok(Dimension::Percent(50.0)));
        assert_eq!(parse(json!("10vw")), Ok(Dimension::Px(100.0)));
        assert_eq!(parse(json!("10vh")), Ok(Dimension::Px(50.0)));
        assert_eq!(parse(json!("fit-content")), Ok(Dimension::Auto));
        assert!(parse(json!("calc(100% - 10px)")).is_err());
        assert!(parse(json!("nan")).is_err());
        assert!(parse(json!("inf")).is_err());
        assert!(parse(json!("-infinity")).is_err());
        assert!(parse(json!("infpx")).is_err());
        assert!(parse(json!("1e38vw")).is_err());
        assert!(parse(json!(true)).is_err());
    }

    #[test]
    fn test_shorthand_expansion() {
        let sides = expand_shorthand(&json!("1px 2px 3px")).unwrap_or_else(|| panic!("three values"));
        assert_eq!(sides, [json!("1px"), json!("2px"), json!("3px"), json!("2px")]);
        let sides = expand_shorthand(&json!(4)).unwrap_or_else(|| panic!("number"));
        assert_eq!(sides, [json!(4), json!(4), json!(4), json!(4)]);
        assert!(expand_shorthand(&json!("1px 2px 3px 4px 5px")).is_none());
    }

    #[test]
    fn test_line_height_forms() {
        assert_eq!(parse_line_height("lineHeight", &json!(1.5), 16.0), Ok(LineHeight::Number(1.5)));
        assert_eq!(parse_line_height("lineHeight", &json!("20px"), 16.0), Ok(LineHeight::Px(20.0)));
        assert_eq!(parse_line_height("lineHeight", &json!("150%"), 16.0), Ok(LineHeight::Px(24.0)));
        assert_eq!(parse_line_height("lineHeight", &json!("normal"), 16.0), Ok(LineHeight::Normal));
        assert!(parse_line_height("lineHeight", &json!("NaN"), 16.0).is_err());
        assert!(parse_font_size("fontSize", &json!("infinity"), 16.0).is_err());
    }

    #[test]
    fn test_keyword_errors_name_the_property() {
        let err = parse_keyword::<Position>("position", &json!("floating"));
        assert_eq!(
            err,
            Err(StyleError::UnknownKeyword {
                property: "position".to_string(),
                value: "floating".to_string(),
            })
        );
        assert_eq!(parse_position("position", &json!("fixed")), Ok(Position::Absolute));
        assert_eq!(parse_position("position", &json!("sticky")), Ok(Position::Relative));
    }

    #[test]
    fn test_font_weight_keywords() {
        assert_eq!(parse_font_weight("fontWeight", &json!("bold")), Ok(700));
        assert_eq!(parse_font_weight("fontWeight", &json!(300)), Ok(300));
        assert!(parse_font_weight("fontWeight", &json!(0)).is_err());
    }

    #[test]
    fn test_margin_box_vertical_rl() {
        let margins = UsedMargins {
            block_start: 1.0,
            line_right: 2.0,
            block_end: 3.0,
            line_left: 4.0,
        };
        let margin = MarginBox::from_used(margins, WritingMode::VerticalRl);
        assert_eq!(
            margin,
            MarginBox {
                top: 4.0,
                right: 1.0,
                bottom: 2.0,
                left: 3.0,
            }
        );
    }
}
