//! CSS Layout Engine
//!
//! This module implements block flow layout over a [`BoxTree`].
//!
//! # Relevant Specifications
//!
//! - [CSS Display Module Level 3](https://www.w3.org/TR/css-display-3/)
//! - [CSS 2.1 Visual Formatting Model](https://www.w3.org/TR/CSS2/visuren.html)
//! - [CSS 2.1 Visual Formatting Model Details](https://www.w3.org/TR/CSS2/visudet.html)
//! - [CSS Positioned Layout Module Level 3](https://www.w3.org/TR/css-position-3/)
//!
//! # Module Structure
//!
//! - [`box_model`] - Box areas and references to them
//! - [`box_tree`] - The box arena and box kinds
//! - [`builder`] - Box generation from styled source elements
//! - [`float`] - Float placement and exclusion tracks
//! - [`bfc`] - Block formatting contexts and margin collapsing
//! - `flow` - Sizing of block-level boxes, floats and atomic inlines
//! - `orchestrator` - Prelayout, layout and postlayout passes

pub mod bfc;
pub mod box_model;
pub mod box_tree;
pub mod builder;
pub mod float;
pub(crate) mod flow;
mod orchestrator;

// Re-exports for convenience
pub use bfc::{BlockFormattingContext, MarginCollapseCollection};
pub use box_model::{AreaKind, AreaRef, BoxArea};
pub use box_tree::{
    BlockContainer, BoxId, BoxKind, BoxNode, BoxTree, FloatBox, InlineBox, Replaced, TextRun,
    UsedMargins,
};
pub use builder::{SourceElement, SourceNode, build_box_tree};
pub use float::{BfcOffsets, FloatContext, FloatSide, IfcVacancy};
pub use flow::IntrinsicSize;
pub use orchestrator::layout_tree;

use crate::text::{GraphemeBreaker, LineBreakerFactory, TextShaper};

/// Content language used when the host does not name one.
pub const DEFAULT_LANG: &str = "en";

/// The capabilities and settings of one layout call.
///
/// Passed down explicitly instead of being looked up globally, so
/// concurrent layouts can use different shapers.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    /// Shapes text and answers font queries.
    pub shaper: &'a dyn TextShaper,
    /// Produces line break opportunities.
    pub line_breaker: &'a dyn LineBreakerFactory,
    /// Finds grapheme cluster boundaries.
    pub grapheme_breaker: &'a dyn GraphemeBreaker,
    /// BCP 47 content language, passed to the shaper.
    pub lang: &'a str,
}

impl<'a> LayoutContext<'a> {
    /// A context for [`DEFAULT_LANG`] content.
    #[must_use]
    pub fn new(
        shaper: &'a dyn TextShaper,
        line_breaker: &'a dyn LineBreakerFactory,
        grapheme_breaker: &'a dyn GraphemeBreaker,
    ) -> Self {
        Self {
            shaper,
            line_breaker,
            grapheme_breaker,
            lang: DEFAULT_LANG,
        }
    }

    /// The same capabilities for content in `lang`.
    #[must_use]
    pub const fn with_lang(self, lang: &'a str) -> Self {
        Self { lang, ..self }
    }
}

impl std::fmt::Debug for LayoutContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutContext")
            .field("lang", &self.lang)
            .finish_non_exhaustive()
    }
}
