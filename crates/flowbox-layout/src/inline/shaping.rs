//! Itemization and shaping.
//!
//! [§ 1.3 Shaping Across Element Boundaries](https://www.w3.org/TR/css-text-3/#boundary-shaping)
//!
//! Adjacent text runs with the same face, size and bidi level are joined,
//! then split into items of one script, and each item is handed to the
//! injected [`TextShaper`](crate::text::TextShaper). When the face reports that
//! spaces do not take part in shaping for the item's script, every word is
//! shaped on its own and cached, so repeated words are shaped once per
//! paragraph.

use std::collections::HashMap;
use std::sync::Arc;

use flowbox_common::warning::warn_once;
use unicode_script::{Script, UnicodeScript};

use super::whitespace::{NEWLINE, SPACE};
use super::{Entry, Paragraph, ShapedItem, embedding_level};
use crate::layout::{BoxId, BoxTree, LayoutContext};
use crate::style::Direction;
use crate::text::{FontFaceInfo, G_AX, G_CL, G_FL, G_SZ, GLYPH_FLAG_FALLBACK, ShapeRequest};

/// Cache key of a shaped word: face, size, direction, script and the word's
/// code units.
type WordKey = (String, u32, bool, String, Vec<u16>);

/// Shaped words with clusters relative to the word start.
type WordCache = HashMap<WordKey, Vec<i32>>;

/// [UAX #24 Script Property](https://www.unicode.org/reports/tr24/)
///
/// Split `text` into ranges of one script. `Common` and `Inherited`
/// characters (spaces, punctuation, combining marks) join the preceding
/// range, or the following one at the start.
fn script_ranges(text: &[u16], start: usize, end: usize) -> Vec<(usize, usize, Script)> {
    let mut ranges: Vec<(usize, usize, Script)> = Vec::new();
    let mut offset = start;

    for decoded in char::decode_utf16(text[start..end].iter().copied()) {
        let ch = decoded.unwrap_or(char::REPLACEMENT_CHARACTER);
        let len = ch.len_utf16();
        let script = ch.script();
        let neutral = matches!(script, Script::Common | Script::Inherited | Script::Unknown);

        match ranges.last_mut() {
            Some(last) if neutral || last.2 == script => last.1 = offset + len,
            Some(last) if matches!(last.2, Script::Common) => {
                last.1 = offset + len;
                last.2 = script;
            }
            _ => ranges.push((offset, offset + len, script)),
        }
        offset += len;
    }

    ranges
}

/// Glyphs standing in for a run that could not be shaped: one zero-width
/// glyph per code unit.
fn fallback_glyphs(offset: usize, length: usize) -> Vec<i32> {
    let mut glyphs = vec![0; length * G_SZ];
    for (i, record) in glyphs.chunks_exact_mut(G_SZ).enumerate() {
        record[G_CL] = i32::try_from(offset + i).unwrap_or(i32::MAX);
        record[G_FL] = GLYPH_FLAG_FALLBACK;
    }
    glyphs
}

fn shape_or_fallback(
    ctx: &LayoutContext<'_>,
    text: &[u16],
    face: Option<&dyn FontFaceInfo>,
    range: (usize, usize),
    script: Script,
    direction: Direction,
) -> Vec<i32> {
    let (offset, end) = range;
    let Some(face) = face else {
        warn_once("shaper", "no font face in the cascade, using fallback glyphs");
        return fallback_glyphs(offset, end - offset);
    };

    let request = ShapeRequest {
        buffer: text,
        offset,
        length: end - offset,
        face,
        script,
        lang: ctx.lang,
        direction,
    };
    match ctx.shaper.shape(&request) {
        Ok(glyphs) => glyphs,
        Err(err) => {
            warn_once("shaper", &format!("{}: {err}, using fallback glyphs", face.url()));
            fallback_glyphs(offset, end - offset)
        }
    }
}

/// Word ranges of `[start, end)`: each word keeps the spaces after it.
fn word_ranges(text: &[u16], start: usize, end: usize) -> Vec<(usize, usize)> {
    let mut words = Vec::new();
    let mut word_start = start;
    let mut i = start;
    while i < end {
        if text[i] == SPACE {
            while i < end && text[i] == SPACE {
                i += 1;
            }
            words.push((word_start, i));
            word_start = i;
        } else {
            i += 1;
        }
    }
    if word_start < end {
        words.push((word_start, end));
    }
    words
}

#[allow(clippy::too_many_arguments)]
fn shape_words(
    ctx: &LayoutContext<'_>,
    cache: &mut WordCache,
    text: &[u16],
    face: &dyn FontFaceInfo,
    font_size: f32,
    range: (usize, usize),
    script: Script,
    direction: Direction,
) -> Vec<i32> {
    let mut shaped: Vec<Vec<i32>> = Vec::new();

    for (word_start, word_end) in word_ranges(text, range.0, range.1) {
        let key: WordKey = (
            face.url().to_string(),
            font_size.to_bits(),
            direction == Direction::Rtl,
            format!("{script:?}"),
            text[word_start..word_end].to_vec(),
        );
        let base = i32::try_from(word_start).unwrap_or(i32::MAX);

        let relative = if let Some(cached) = cache.get(&key) {
            cached.clone()
        } else {
            let mut glyphs =
                shape_or_fallback(ctx, text, Some(face), (word_start, word_end), script, direction);
            for record in glyphs.chunks_exact_mut(G_SZ) {
                record[G_CL] -= base;
            }
            let _ = cache.insert(key, glyphs.clone());
            glyphs
        };

        let mut glyphs = relative;
        for record in glyphs.chunks_exact_mut(G_SZ) {
            record[G_CL] += base;
        }
        shaped.push(glyphs);
    }

    // Words were shaped in logical order; right-to-left items are stored in
    // visual order.
    if direction == Direction::Rtl {
        shaped.reverse();
    }
    shaped.concat()
}

/// Adjacent text runs that share a face, a font size and a bidi level.
/// They are shaped together so that inline box edges do not break
/// ligatures or kerning.
struct Span {
    /// First run of the span.
    run: BoxId,
    start: usize,
    end: usize,
    face: Option<Arc<dyn FontFaceInfo>>,
    font_size: f32,
    level: u8,
}

fn face_url(face: Option<&Arc<dyn FontFaceInfo>>) -> Option<&str> {
    face.map(|face| face.url())
}

/// [§ 1.3 Shaping Across Element Boundaries](https://www.w3.org/TR/css-text-3/#boundary-shaping)
///
/// "Text shaping must not be broken across inline box boundaries when
/// there are no changes in formatting." Atomic inlines and forced breaks end
/// a span.
fn shaping_spans(tree: &BoxTree, paragraph: &Paragraph, base: Direction, ctx: &LayoutContext<'_>) -> Vec<Span> {
    let mut spans: Vec<Span> = Vec::new();
    let mut joinable = false;

    for entry in &paragraph.entries {
        match *entry {
            Entry::Text { run, start, end } => {
                let style = &tree[run].style;
                let face = ctx.shaper.font_cascade(style, ctx.lang).into_iter().next();
                let level = embedding_level(style.direction, base);
                let joins = joinable
                    && spans.last().is_some_and(|span| {
                        span.end == start
                            && span.level == level
                            && span.font_size.to_bits() == style.font_size.to_bits()
                            && face_url(span.face.as_ref()) == face_url(face.as_ref())
                    });
                if joins {
                    if let Some(span) = spans.last_mut() {
                        span.end = end;
                    }
                } else {
                    spans.push(Span {
                        run,
                        start,
                        end,
                        face,
                        font_size: style.font_size,
                        level,
                    });
                }
                joinable = true;
            }
            Entry::Atomic { .. } | Entry::Break { .. } => joinable = false,
            Entry::Start(_) | Entry::End(_) | Entry::Float { .. } => {}
        }
    }

    spans
}

/// Itemize and shape the text of `paragraph`, and fill in the per code
/// unit advances.
pub(super) fn shape_paragraph(
    tree: &BoxTree,
    paragraph: &mut Paragraph,
    base: Direction,
    ctx: &LayoutContext<'_>,
) {
    let mut cache = WordCache::new();
    let mut items = Vec::new();
    let mut advances = vec![0.0; paragraph.text.len()];

    for span in shaping_spans(tree, paragraph, base, ctx) {
        let face: Option<&dyn FontFaceInfo> = span.face.as_deref();
        let direction = Direction::from_level(span.level);
        let scale = face.map_or(0.0, |face| span.font_size / face.units_per_em());

        for (item_start, item_end, script) in script_ranges(&paragraph.text, span.start, span.end) {
            // STEP 1: shape, per word when spaces cannot affect shaping.
            let glyphs = match face {
                Some(face) if !face.space_may_participate_in_shaping(script) => shape_words(
                    ctx,
                    &mut cache,
                    &paragraph.text,
                    face,
                    span.font_size,
                    (item_start, item_end),
                    script,
                    direction,
                ),
                _ => shape_or_fallback(
                    ctx,
                    &paragraph.text,
                    face,
                    (item_start, item_end),
                    script,
                    direction,
                ),
            };

            // STEP 2: advances land on the cluster's first code unit.
            for record in glyphs.chunks_exact(G_SZ) {
                let cluster = usize::try_from(record[G_CL]).unwrap_or(usize::MAX);
                if let Some(advance) = advances.get_mut(cluster) {
                    *advance += record[G_AX] as f32 * scale;
                }
            }

            items.push(ShapedItem {
                run: span.run,
                start: item_start,
                end: item_end,
                glyphs,
                face: face.map_or_else(String::new, |face| face.url().to_string()),
                font_size: span.font_size,
                scale,
                level: span.level,
                script,
                x: 0.0,
                baseline: 0.0,
                inline_size: 0.0,
            });
        }
    }

    // STEP 3: segment breaks take no room; word-spacing widens spaces.
    for entry in &paragraph.entries {
        let Entry::Text { run, start, end } = *entry else {
            continue;
        };
        let word_spacing = tree[run].style.word_spacing.px();
        for i in start..end {
            match paragraph.text[i] {
                NEWLINE => advances[i] = 0.0,
                SPACE => advances[i] += word_spacing,
                _ => {}
            }
        }
    }

    paragraph.items = items;
    paragraph.advances = advances;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_common_characters_join_neighbouring_script() {
        let text = utf16("ab, שלום");
        let ranges = script_ranges(&text, 0, text.len());
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0], (0, 4, Script::Latin));
        assert_eq!(ranges[1], (4, 8, Script::Hebrew));
    }

    #[test]
    fn test_leading_common_characters_take_following_script() {
        let text = utf16("1 abc");
        let ranges = script_ranges(&text, 0, text.len());
        assert_eq!(ranges, vec![(0, 5, Script::Latin)]);
    }

    #[test]
    fn test_words_keep_trailing_spaces() {
        let text = utf16("ab  cd e");
        assert_eq!(word_ranges(&text, 0, text.len()), vec![(0, 4), (4, 7), (7, 8)]);
    }

    #[test]
    fn test_fallback_glyphs_are_flagged() {
        let glyphs = fallback_glyphs(3, 2);
        assert_eq!(glyphs.len(), 2 * G_SZ);
        assert_eq!(glyphs[G_CL], 3);
        assert_eq!(glyphs[G_SZ + G_CL], 4);
        assert_eq!(glyphs[G_FL] & GLYPH_FLAG_FALLBACK, GLYPH_FLAG_FALLBACK);
        assert_eq!(glyphs[G_AX], 0);
    }
}
