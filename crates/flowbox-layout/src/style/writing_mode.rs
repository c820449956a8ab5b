//! Flow-relative sides and their physical counterparts.
//!
//! [§ 2 Block Flow Direction](https://www.w3.org/TR/css-writing-modes-4/#block-flow)

use serde::Serialize;
use strum_macros::{Display, EnumString};

/// The `writing-mode` of a box.
///
/// Boxes are laid out in block/line coordinates, and only this type knows
/// which page edge each of those names.
///
/// | Mode            | block-start | block-end | line-left | line-right |
/// |-----------------|-------------|-----------|-----------|------------|
/// | `horizontal-tb` | top         | bottom    | left      | right      |
/// | `vertical-rl`   | right       | left      | top       | bottom     |
/// | `vertical-lr`   | left        | right     | top       | bottom     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default, EnumString, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WritingMode {
    /// Horizontal lines stacked downwards.
    #[default]
    HorizontalTb,
    /// Vertical lines stacked leftwards.
    VerticalRl,
    /// Vertical lines stacked rightwards.
    VerticalLr,
}

/// One edge of a box on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PhysicalSide {
    /// `top`
    Top,
    /// `right`
    Right,
    /// `bottom`
    Bottom,
    /// `left`
    Left,
}

impl WritingMode {
    /// Whether lines run horizontally.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::HorizontalTb)
    }

    /// [§ 6.2 Flow-relative Directions](https://www.w3.org/TR/css-writing-modes-4/#logical-directions)
    #[must_use]
    pub const fn block_start_physical(self) -> PhysicalSide {
        match self {
            Self::HorizontalTb => PhysicalSide::Top,
            Self::VerticalRl => PhysicalSide::Right,
            Self::VerticalLr => PhysicalSide::Left,
        }
    }

    /// The side opposite [`block_start_physical`](Self::block_start_physical).
    #[must_use]
    pub const fn block_end_physical(self) -> PhysicalSide {
        match self {
            Self::HorizontalTb => PhysicalSide::Bottom,
            Self::VerticalRl => PhysicalSide::Left,
            Self::VerticalLr => PhysicalSide::Right,
        }
    }

    /// [§ 6.3 Line-relative Directions](https://www.w3.org/TR/css-writing-modes-4/#line-directions)
    ///
    /// The edge left-to-right text starts from. `direction` does not change
    /// it; the margins and insets that do are resolved in
    /// [`Style`](crate::style::Style).
    #[must_use]
    pub const fn line_left_physical(self) -> PhysicalSide {
        match self {
            Self::HorizontalTb => PhysicalSide::Left,
            Self::VerticalRl | Self::VerticalLr => PhysicalSide::Top,
        }
    }

    /// The side opposite [`line_left_physical`](Self::line_left_physical).
    #[must_use]
    pub const fn line_right_physical(self) -> PhysicalSide {
        match self {
            Self::HorizontalTb => PhysicalSide::Right,
            Self::VerticalRl | Self::VerticalLr => PhysicalSide::Bottom,
        }
    }
}
