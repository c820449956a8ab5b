//! Text capabilities injected into layout.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."
//!
//! The engine never invents glyph metrics. Shaping, font selection, line
//! break opportunities and grapheme boundaries all come from the
//! implementations of the traits below, passed in through a
//! [`LayoutContext`](crate::LayoutContext). [`ApproximateShaper`] and the
//! `unicode-*` backed breakers are deterministic defaults used by the CLI and
//! the tests.

mod approximate;
mod unicode;

use std::fmt::Debug;
use std::sync::Arc;

use serde::Serialize;
use unicode_script::Script;

use crate::error::ShapeError;
use crate::style::{Direction, LineHeight, Style};

pub use approximate::{ApproximateFace, ApproximateShaper};
pub use unicode::{UnicodeGraphemeBreaker, UnicodeLineBreakerFactory};

// Glyph array layout. A shaped run is a flat `i32` array with one record of
// `G_SZ` entries per glyph.

/// Glyph id.
pub const G_ID: usize = 0;
/// Cluster: the UTF-16 offset in the paragraph the glyph belongs to.
pub const G_CL: usize = 1;
/// Horizontal advance in font units.
pub const G_AX: usize = 2;
/// Vertical advance in font units.
pub const G_AY: usize = 3;
/// Horizontal offset in font units.
pub const G_DX: usize = 4;
/// Vertical offset in font units.
pub const G_DY: usize = 5;
/// Flags.
pub const G_FL: usize = 6;
/// Stride of one glyph record.
pub const G_SZ: usize = 7;

/// Set in [`G_FL`] on glyphs substituted after a shaping failure.
pub const GLYPH_FLAG_FALLBACK: i32 = 1 << 8;

/// A font face chosen by [`TextShaper::font_cascade`].
pub trait FontFaceInfo: Debug + Send + Sync {
    /// Stable identifier of the face, used as a cache key.
    fn url(&self) -> &str;

    /// Units per em of the face's design grid.
    fn units_per_em(&self) -> f32;

    /// Whether spaces can change the shaping of neighbouring text in this
    /// script. When they cannot, words are shaped separately and cached.
    fn space_may_participate_in_shaping(&self, script: Script) -> bool;
}

/// Vertical font metrics in font units. `descender` is negative below the
/// baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FontMetrics {
    /// Height above the baseline.
    pub ascender: f32,
    /// Depth below the baseline (negative).
    pub descender: f32,
    /// Recommended gap between lines.
    pub line_gap: f32,
    /// Height of lowercase letters.
    pub x_height: f32,
}

/// Everything a shaper needs for one run.
#[derive(Debug, Clone, Copy)]
pub struct ShapeRequest<'a> {
    /// The paragraph's whole UTF-16 buffer.
    pub buffer: &'a [u16],
    /// Start of the run in `buffer`.
    pub offset: usize,
    /// Length of the run in code units.
    pub length: usize,
    /// Face to shape with.
    pub face: &'a dyn FontFaceInfo,
    /// Script of the run.
    pub script: Script,
    /// BCP 47 language tag.
    pub lang: &'a str,
    /// Direction of the run.
    pub direction: Direction,
}

/// Converts text into positioned glyphs.
pub trait TextShaper: Send + Sync {
    /// Shape `request.length` code units starting at `request.offset`.
    ///
    /// Returns glyph records of [`G_SZ`] entries with clusters expressed as
    /// offsets into the paragraph buffer. Glyphs for right-to-left runs are
    /// in visual order.
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeError`] when the run cannot be shaped. The inline
    /// layout replaces the run with zero-width fallback glyphs.
    fn shape(&self, request: &ShapeRequest<'_>) -> Result<Vec<i32>, ShapeError>;

    /// Vertical metrics of a face.
    fn font_metrics(&self, face: &dyn FontFaceInfo, direction: Direction) -> FontMetrics;

    /// Allocate the UTF-16 buffer a paragraph is flattened into. It is
    /// called once per paragraph with the final length, and the engine
    /// replaces its contents with the paragraph text.
    fn allocate_buffer(&self, length: usize) -> Vec<u16> {
        vec![0; length]
    }

    /// Ordered faces to try for a style. The first face is used for
    /// metrics.
    fn font_cascade(&self, style: &Style, lang: &str) -> Vec<Arc<dyn FontFaceInfo>>;
}

/// One break opportunity, as an offset into the UTF-16 buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakOpportunity {
    /// The break falls before this code unit.
    pub position: usize,
    /// Whether the line must break here (after a newline).
    pub required: bool,
}

/// Break opportunities in ascending order.
pub type LineBreaker<'a> = Box<dyn Iterator<Item = BreakOpportunity> + 'a>;

/// [UAX #14 Unicode Line Breaking Algorithm](https://www.unicode.org/reports/tr14/)
pub trait LineBreakerFactory: Send + Sync {
    /// Create a breaker over `text`. With `hard_breaks_only` only required
    /// breaks are produced.
    fn create<'a>(&self, text: &'a [u16], hard_breaks_only: bool) -> LineBreaker<'a>;
}

/// [UAX #29 Grapheme Cluster Boundaries](https://www.unicode.org/reports/tr29/#Grapheme_Cluster_Boundaries)
pub trait GraphemeBreaker: Send + Sync {
    /// The first grapheme boundary strictly after `index`, or `text.len()`.
    fn next_grapheme_break(&self, text: &[u16], index: usize) -> usize;

    /// The last grapheme boundary strictly before `index`, or `0`.
    fn previous_grapheme_break(&self, text: &[u16], index: usize) -> usize;

    /// Every boundary of `text` in ascending order, starting with `0` and
    /// ending with `text.len()`.
    fn grapheme_boundaries(&self, text: &[u16]) -> Vec<usize> {
        let mut boundaries = vec![0];
        let mut boundary = 0;
        while boundary < text.len() {
            let next = self.next_grapheme_break(text, boundary);
            if next <= boundary {
                break;
            }
            boundaries.push(next);
            boundary = next;
        }
        if boundaries.last() != Some(&text.len()) {
            boundaries.push(text.len());
        }
        boundaries
    }
}

/// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
///
/// Used vertical metrics of one inline box, in pixels. Both `descender`
/// values are positive distances below the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct InlineMetrics {
    /// Ascender plus half-leading.
    pub ascender_box: f32,
    /// Font ascender.
    pub ascender: f32,
    /// Baseline shift for `vertical-align: super`.
    pub superscript: f32,
    /// x-height.
    pub x_height: f32,
    /// Baseline shift for `vertical-align: sub`.
    pub subscript: f32,
    /// Font descender.
    pub descender: f32,
    /// Descender plus half-leading.
    pub descender_box: f32,
}

impl InlineMetrics {
    /// All zeros, used when no font face is available.
    pub const EMPTY: Self = Self {
        ascender_box: 0.0,
        ascender: 0.0,
        superscript: 0.0,
        x_height: 0.0,
        subscript: 0.0,
        descender: 0.0,
        descender_box: 0.0,
    };

    /// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// "CSS assumes that every font has font metrics that specify a
    /// characteristic height above the baseline and a depth below it. In
    /// this section we use A to mean that height (for a given font at a given
    /// size) and D the depth. We also define AD = A + D, the distance from
    /// the top to the bottom."
    ///
    /// "L = 'line-height' - AD. A' = A + L/2, D' = D + L/2."
    #[must_use]
    pub fn compute(shaper: &dyn TextShaper, style: &Style, lang: &str) -> Self {
        let cascade = shaper.font_cascade(style, lang);
        let Some(face) = cascade.first() else {
            return Self::EMPTY;
        };

        let raw = shaper.font_metrics(face.as_ref(), Direction::Ltr);
        let scale = style.font_size / face.units_per_em();

        let ascender = raw.ascender * scale;
        let descender = raw.descender * scale;
        let line_gap = raw.line_gap * scale;
        let x_height = raw.x_height * scale;

        // STEP 1: content height is what `line-height: normal` uses.
        let content_height = ascender - descender + line_gap;

        // STEP 2: resolve line-height.
        let line_height = match style.line_height {
            LineHeight::Normal => content_height,
            LineHeight::Number(n) => n * style.font_size,
            LineHeight::Px(px) => px,
        };

        // STEP 3: split the leading evenly above and below.
        let half_leading = (line_height - content_height) / 2.0;

        Self {
            ascender_box: ascender + half_leading,
            ascender,
            superscript: x_height,
            x_height,
            subscript: -descender * 0.5,
            descender: -descender,
            descender_box: -descender + half_leading,
        }
    }

    /// Height of the box that contributes to the line box.
    #[must_use]
    pub fn line_height(&self) -> f32 {
        self.ascender_box + self.descender_box
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Declaration, create_child_style};

    #[test]
    fn test_line_height_number_splits_leading() {
        let shaper = ApproximateShaper::new();
        let style = create_child_style(
            &Style::default(),
            &[Declaration::LineHeight(LineHeight::Number(2.0))],
        );
        let metrics = InlineMetrics::compute(&shaper, &style, "en");
        // 16px font: ascender 12.8, descender 3.2, line-height 32.
        assert!((metrics.ascender - 12.8).abs() < 0.001);
        assert!((metrics.ascender_box - 20.8).abs() < 0.001);
        assert!((metrics.descender_box - 11.2).abs() < 0.001);
        assert!((metrics.line_height() - 32.0).abs() < 0.001);
    }
}
