//! Computed style model
//!
//! This module implements the computed style record consumed by layout per:
//! - [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/)
//! - [CSS Display Module Level 3](https://www.w3.org/TR/css-display-3/)
//! - [CSS Writing Modes Level 4](https://www.w3.org/TR/css-writing-modes-4/)
//! - [CSS Box Sizing Level 3](https://www.w3.org/TR/css-sizing-3/)

pub mod computed;
pub mod declaration;
mod display;
pub mod values;
mod writing_mode;

// Re-export all public types
pub use computed::{ContainingBlock, DEFAULT_FONT_SIZE_PX, Style};
pub use declaration::{Declaration, Property, create_child_style};
pub use display::{DisplayValue, InnerDisplayType, OuterDisplayType, parse_display_value};
pub use values::{
    AutoOr, BorderStyle, BoxSizing, Clear, Color, Direction, Float, FontStretch, FontStyle,
    FontVariant, LengthPercentage, LengthPercentageAuto, LineHeight, MaxSize, Overflow,
    OverflowWrap, PhysicalTextAlign, Position, Sides, TextAlign, VerticalAlign, WhiteSpace,
    WordBreak, WordSpacing,
};
pub use writing_mode::{PhysicalSide, WritingMode};
