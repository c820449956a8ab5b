//! Deterministic fallback shaper.
//!
//! Without access to font data every code unit gets a fixed advance: half an
//! em for visible characters and a quarter em for spaces. Vertical metrics
//! are those of a typical Latin face. Good enough for tests and for hosts
//! that only need approximate geometry.

use std::sync::Arc;

use unicode_script::Script;

use super::{FontFaceInfo, FontMetrics, G_AX, G_CL, G_ID, G_SZ, ShapeRequest, TextShaper};
use crate::error::ShapeError;
use crate::style::{Direction, Style};

/// Scripts whose shaping can be affected by spaces, so words cannot be
/// shaped in isolation.
const COMPLEX_SCRIPTS: [Script; 16] = [
    Script::Arabic,
    Script::Devanagari,
    Script::Bengali,
    Script::Thai,
    Script::Khmer,
    Script::Myanmar,
    Script::Tibetan,
    Script::Gurmukhi,
    Script::Gujarati,
    Script::Oriya,
    Script::Tamil,
    Script::Telugu,
    Script::Kannada,
    Script::Malayalam,
    Script::Sinhala,
    Script::Syriac,
];

/// Units per em of the approximate face.
const UNITS_PER_EM: f32 = 1000.0;

/// Advance of a visible code unit, in font units.
const GLYPH_ADVANCE: i32 = 500;

/// Advance of a space, in font units.
const SPACE_ADVANCE: i32 = 250;

/// The single face served by [`ApproximateShaper`].
#[derive(Debug, Clone)]
pub struct ApproximateFace {
    url: String,
}

impl FontFaceInfo for ApproximateFace {
    fn url(&self) -> &str {
        &self.url
    }

    fn units_per_em(&self) -> f32 {
        UNITS_PER_EM
    }

    fn space_may_participate_in_shaping(&self, script: Script) -> bool {
        COMPLEX_SCRIPTS.contains(&script)
    }
}

/// A [`TextShaper`] with fixed advances and metrics.
///
/// | Metric    | Font units (1000 upem) |
/// |-----------|------------------------|
/// | advance   | 500 (space: 250)       |
/// | ascender  | 800                    |
/// | descender | -200                   |
/// | line gap  | 0                      |
/// | x-height  | 500                    |
#[derive(Debug, Clone)]
pub struct ApproximateShaper {
    face: Arc<ApproximateFace>,
}

impl Default for ApproximateShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl ApproximateShaper {
    /// Create the shaper.
    #[must_use]
    pub fn new() -> Self {
        Self {
            face: Arc::new(ApproximateFace {
                url: "approximate:sans-serif".to_string(),
            }),
        }
    }
}

const fn advance_of(code_unit: u16) -> i32 {
    match code_unit {
        // space, no-break space
        0x20 | 0xa0 => SPACE_ADVANCE,
        // trailing surrogate: the leading one carries the advance
        0xdc00..=0xdfff => 0,
        _ => GLYPH_ADVANCE,
    }
}

impl TextShaper for ApproximateShaper {
    fn shape(&self, request: &ShapeRequest<'_>) -> Result<Vec<i32>, ShapeError> {
        let end = request.offset + request.length;
        let Some(slice) = request.buffer.get(request.offset..end) else {
            return Err(ShapeError::Failed {
                reason: format!(
                    "run {}..{end} is outside a buffer of {}",
                    request.offset,
                    request.buffer.len()
                ),
            });
        };

        let mut glyphs = vec![0; slice.len() * G_SZ];
        for (i, (&unit, record)) in slice.iter().zip(glyphs.chunks_exact_mut(G_SZ)).enumerate() {
            record[G_ID] = i32::from(unit);
            record[G_CL] = i32::try_from(request.offset + i).unwrap_or(i32::MAX);
            record[G_AX] = advance_of(unit);
        }

        // Right-to-left glyphs come back in visual order.
        if request.direction == Direction::Rtl {
            glyphs = glyphs.chunks_exact(G_SZ).rev().flatten().copied().collect();
        }

        Ok(glyphs)
    }

    fn font_metrics(&self, _face: &dyn FontFaceInfo, _direction: Direction) -> FontMetrics {
        FontMetrics {
            ascender: 800.0,
            descender: -200.0,
            line_gap: 0.0,
            x_height: 500.0,
        }
    }

    fn font_cascade(&self, _style: &Style, _lang: &str) -> Vec<Arc<dyn FontFaceInfo>> {
        let face: Arc<dyn FontFaceInfo> = self.face.clone();
        vec![face]
    }
}
