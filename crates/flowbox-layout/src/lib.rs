//! Block and inline flow layout for trees of styled boxes.
//!
//! # Scope
//!
//! This crate implements:
//! - **Style model** ([CSS Cascading Level 4 § 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting))
//!   - Immutable computed [`Style`] records shared by reference
//!   - [`create_child_style`] for inherited and anonymous boxes
//!
//! - **Box tree** ([CSS Display Level 3 § 2](https://www.w3.org/TR/css-display-3/#the-display-properties))
//!   - Arena of boxes addressed by [`BoxId`]
//!   - Anonymous block boxes where inline and block content mix
//!
//! - **Block formatting** ([CSS 2.1 § 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting))
//!   - Width resolution, margin collapsing, clearance
//!   - Float placement and exclusion bands ([§ 9.5](https://www.w3.org/TR/CSS2/visuren.html#floats))
//!
//! - **Inline formatting** ([CSS Inline Layout Level 3](https://www.w3.org/TR/css-inline-3/))
//!   - White space processing, shaping through an injected [`TextShaper`]
//!   - Greedy line breaking around floats, bidi reordering by embedding level
//!   - Line box metrics with `vertical-align`
//!
//! - **Host adapter**
//!   - Flat element lists with JSON styles in, absolute rectangles out
//!
//! # Not Yet Implemented
//!
//! - Flex, grid, table and multi-column layout
//! - The Unicode bidirectional algorithm (levels are an input)
//! - Painting

pub mod adapter;
pub mod error;
pub mod inline;
pub mod layout;
pub mod style;
pub mod text;

pub use adapter::{
    ComputedLayout, ElementLayout, HostElement, HostProps, MarginBox, Viewport,
    box_area_to_computed_layout, build_host_box_tree, calculate_block_layout,
    element_style_to_style,
};
pub use error::{LayoutError, ShapeError, StyleError};
pub use inline::{InlineFragment, Linebox, ShapedItem};
pub use layout::{
    AreaKind, AreaRef, BoxArea, BoxId, BoxKind, BoxNode, BoxTree, LayoutContext, SourceElement,
    SourceNode, build_box_tree, layout_tree,
};
pub use style::{Declaration, Style, create_child_style};
pub use text::{
    ApproximateShaper, FontFaceInfo, FontMetrics, GraphemeBreaker, InlineMetrics,
    LineBreakerFactory, TextShaper, UnicodeGraphemeBreaker, UnicodeLineBreakerFactory,
};
