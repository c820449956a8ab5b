//! CSS Box Model areas.
//!
//! [§ 8.1 Box dimensions](https://www.w3.org/TR/CSS2/box.html#box-dimensions)
//!
//! "Each box has a content area (e.g., text, an image, etc.) and optional
//! surrounding padding, border, and margin areas; the size of each area is
//! specified by properties defined below."
//!
//! During layout every area is expressed in flow-relative coordinates
//! (`block_start`, `line_left`, `block_size`, `inline_size`) relative to its
//! parent area. Postlayout converts them into physical, absolute `x`, `y`,
//! `width` and `height`.

use serde::Serialize;

use super::box_tree::BoxId;
use crate::style::WritingMode;

/// Which of a box's nested areas an [`AreaRef`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AreaKind {
    /// "The border edge surrounds the box's border."
    Border,
    /// "The padding edge surrounds the box padding."
    Padding,
    /// "The content edge or inner edge surrounds the rendered content of
    /// the element."
    Content,
}

impl AreaKind {
    /// The area this one is nested in, within the same box.
    #[must_use]
    pub const fn outer(self) -> Option<Self> {
        match self {
            Self::Border => None,
            Self::Padding => Some(Self::Border),
            Self::Content => Some(Self::Padding),
        }
    }
}

/// A reference to one area of one box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AreaRef {
    /// Box owning the area.
    pub id: BoxId,
    /// Which area.
    pub kind: AreaKind,
}

impl AreaRef {
    /// The border area of `id`.
    #[must_use]
    pub const fn border(id: BoxId) -> Self {
        Self {
            id,
            kind: AreaKind::Border,
        }
    }

    /// The padding area of `id`.
    #[must_use]
    pub const fn padding(id: BoxId) -> Self {
        Self {
            id,
            kind: AreaKind::Padding,
        }
    }

    /// The content area of `id`.
    #[must_use]
    pub const fn content(id: BoxId) -> Self {
        Self {
            id,
            kind: AreaKind::Content,
        }
    }
}

/// One rectangle of a box.
///
/// | Phase      | Meaningful fields                                           |
/// |------------|-------------------------------------------------------------|
/// | layout     | `block_start`, `line_left`, `block_size`, `inline_size`     |
/// | postlayout | `x`, `y`, `width`, `height` (absolute, physical, snapped)   |
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoxArea {
    /// Offset from the parent area's block-start edge.
    pub block_start: f32,
    /// Size along the block axis.
    pub block_size: f32,
    /// Offset from the parent area's line-left edge.
    pub line_left: f32,
    /// Size along the inline axis.
    pub inline_size: f32,
    /// Absolute left edge.
    pub x: f32,
    /// Absolute top edge.
    pub y: f32,
    /// Physical width.
    pub width: f32,
    /// Physical height.
    pub height: f32,
}

impl BoxArea {
    /// An area already in physical coordinates, used for the viewport.
    #[must_use]
    pub const fn physical(width: f32, height: f32) -> Self {
        Self {
            block_start: 0.0,
            block_size: height,
            line_left: 0.0,
            inline_size: width,
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    /// [§ 7.3 Abstract-to-Physical Mappings](https://www.w3.org/TR/css-writing-modes-4/#logical-to-physical)
    ///
    /// Convert the flow-relative rectangle into an absolute physical one,
    /// given the parent area (already absolute) and the writing mode the
    /// parent establishes.
    ///
    /// | Writing mode    | x                                  | y          |
    /// |-----------------|------------------------------------|------------|
    /// | `horizontal-tb` | `line_left`                        | `block_start` |
    /// | `vertical-lr`   | `block_start`                      | `line_left` |
    /// | `vertical-rl`   | `parent.width - block_start - block_size` | `line_left` |
    pub fn absolutify(&mut self, parent: &Self, writing_mode: WritingMode) {
        let (x, y, width, height) = match writing_mode {
            WritingMode::HorizontalTb => {
                (self.line_left, self.block_start, self.inline_size, self.block_size)
            }
            WritingMode::VerticalLr => {
                (self.block_start, self.line_left, self.block_size, self.inline_size)
            }
            WritingMode::VerticalRl => (
                parent.width - self.block_start - self.block_size,
                self.line_left,
                self.block_size,
                self.inline_size,
            ),
        };

        self.x = parent.x + x;
        self.y = parent.y + y;
        self.width = width;
        self.height = height;
    }

    /// Round the physical edges to whole pixels. Sizes are derived from the
    /// rounded edges so adjacent areas stay adjacent.
    pub fn snap_pixels(&mut self) {
        let right = (self.x + self.width).round();
        let bottom = (self.y + self.height).round();
        self.x = self.x.round();
        self.y = self.y.round();
        self.width = right - self.x;
        self.height = bottom - self.y;
    }
}
