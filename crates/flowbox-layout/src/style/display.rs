//! The `display` property, limited to flow layout.
//!
//! [§ 2 Box Layout Modes](https://www.w3.org/TR/css-display-3/#the-display-properties)

use serde::Serialize;

use flowbox_common::warning::warn_once;

/// [§ 2.1 Outer Display Roles](https://www.w3.org/TR/css-display-3/#outer-role)
///
/// How a box takes part in its parent's flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OuterDisplayType {
    /// Stacks in the block direction.
    Block,
    /// Sits on lines.
    Inline,
    /// No box at all.
    None,
}

/// [§ 2.2 Inner Display Layout Models](https://www.w3.org/TR/css-display-3/#inner-model)
///
/// How a box lays out its children. Only flow layout exists here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InnerDisplayType {
    /// Block and inline flow, sharing the parent's formatting context when
    /// nothing else makes the box a root.
    Flow,
    /// Flow inside a new block formatting context.
    FlowRoot,
    /// No box at all.
    None,
}

/// An outer and inner display type pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayValue {
    /// Role in the parent's flow.
    pub outer: OuterDisplayType,
    /// Layout of the children.
    pub inner: InnerDisplayType,
}

impl Default for DisplayValue {
    fn default() -> Self {
        Self::inline()
    }
}

impl DisplayValue {
    /// `block`
    #[must_use]
    pub const fn block() -> Self {
        Self {
            outer: OuterDisplayType::Block,
            inner: InnerDisplayType::Flow,
        }
    }

    /// `inline`, the initial value.
    #[must_use]
    pub const fn inline() -> Self {
        Self {
            outer: OuterDisplayType::Inline,
            inner: InnerDisplayType::Flow,
        }
    }

    /// `inline-block`
    #[must_use]
    pub const fn inline_block() -> Self {
        Self {
            outer: OuterDisplayType::Inline,
            inner: InnerDisplayType::FlowRoot,
        }
    }

    /// `flow-root`
    #[must_use]
    pub const fn flow_root() -> Self {
        Self {
            outer: OuterDisplayType::Block,
            inner: InnerDisplayType::FlowRoot,
        }
    }

    /// `none`
    #[must_use]
    pub const fn none() -> Self {
        Self {
            outer: OuterDisplayType::None,
            inner: InnerDisplayType::None,
        }
    }

    /// Whether the element generates no boxes.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self.outer, OuterDisplayType::None)
    }

    /// Whether the principal box is block-level.
    #[must_use]
    pub const fn is_block_level(self) -> bool {
        matches!(self.outer, OuterDisplayType::Block)
    }

    /// Whether the principal box is inline-level.
    #[must_use]
    pub const fn is_inline_level(self) -> bool {
        matches!(self.outer, OuterDisplayType::Inline)
    }

    /// Whether the box is an inline-block, placed on a line as one unit.
    #[must_use]
    pub const fn is_atomic_inline(self) -> bool {
        matches!(
            (self.outer, self.inner),
            (OuterDisplayType::Inline, InnerDisplayType::FlowRoot)
        )
    }
}

/// Parse a display keyword. Layout models this engine does not implement
/// are laid out as blocks after a warning.
#[must_use]
pub fn parse_display_value(keyword: &str) -> DisplayValue {
    let lower = keyword.trim().to_ascii_lowercase();
    match lower.as_str() {
        // No markers, so list items are plain blocks.
        "block" | "list-item" => DisplayValue::block(),
        "inline" => DisplayValue::inline(),
        "inline-block" => DisplayValue::inline_block(),
        "flow-root" => DisplayValue::flow_root(),
        "none" => DisplayValue::none(),

        _ => {
            warn_once("Style", &format!("unsupported display value '{keyword}'"));
            DisplayValue::block()
        }
    }
}
