//! Line and grapheme breaking backed by the `unicode-*` crates.
//!
//! Both crates work on UTF-8 while paragraphs are UTF-16, so each call
//! decodes the buffer and maps byte offsets back to code unit offsets.
//! Unpaired surrogates decode to U+FFFD, which is one code unit as well, so
//! offsets stay aligned.

use unicode_linebreak::{BreakOpportunity as UnicodeBreakOpportunity, linebreaks};
use unicode_segmentation::UnicodeSegmentation;

use super::{BreakOpportunity, GraphemeBreaker, LineBreaker, LineBreakerFactory};

/// Decode `text` and build a byte offset → UTF-16 offset table. Only
/// entries at char boundaries (and the end) are meaningful.
fn decode_with_offsets(text: &[u16]) -> (String, Vec<usize>) {
    let decoded: String = char::decode_utf16(text.iter().copied())
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();

    let mut offsets = vec![0; decoded.len() + 1];
    let mut utf16 = 0;
    for (byte, ch) in decoded.char_indices() {
        offsets[byte] = utf16;
        utf16 += ch.len_utf16();
    }
    offsets[decoded.len()] = utf16;

    (decoded, offsets)
}

const fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// [UAX #14](https://www.unicode.org/reports/tr14/) break opportunities via
/// `unicode-linebreak`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeLineBreakerFactory;

impl LineBreakerFactory for UnicodeLineBreakerFactory {
    fn create<'a>(&self, text: &'a [u16], hard_breaks_only: bool) -> LineBreaker<'a> {
        let (decoded, offsets) = decode_with_offsets(text);

        let breaks: Vec<BreakOpportunity> = linebreaks(&decoded)
            .filter_map(|(byte, opportunity)| {
                // The end of text is always reported as mandatory. It only is
                // one if the text ends with a newline.
                let required = match opportunity {
                    UnicodeBreakOpportunity::Mandatory => {
                        byte < decoded.len()
                            || decoded.chars().next_back().is_some_and(is_newline)
                    }
                    UnicodeBreakOpportunity::Allowed => false,
                };
                if hard_breaks_only && !required {
                    return None;
                }
                Some(BreakOpportunity {
                    position: offsets[byte],
                    required,
                })
            })
            .collect();

        Box::new(breaks.into_iter())
    }
}

/// [UAX #29](https://www.unicode.org/reports/tr29/) extended grapheme
/// clusters via `unicode-segmentation`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeGraphemeBreaker;

impl GraphemeBreaker for UnicodeGraphemeBreaker {
    fn next_grapheme_break(&self, text: &[u16], index: usize) -> usize {
        let boundaries = self.grapheme_boundaries(text);
        let next = boundaries.partition_point(|&b| b <= index);
        boundaries.get(next).copied().unwrap_or(text.len())
    }

    fn previous_grapheme_break(&self, text: &[u16], index: usize) -> usize {
        let boundaries = self.grapheme_boundaries(text);
        let before = boundaries.partition_point(|&b| b < index);
        before.checked_sub(1).map_or(0, |i| boundaries[i])
    }

    /// One decoding and segmentation pass over the whole buffer.
    fn grapheme_boundaries(&self, text: &[u16]) -> Vec<usize> {
        let (decoded, offsets) = decode_with_offsets(text);
        let mut boundaries: Vec<usize> = decoded
            .grapheme_indices(true)
            .map(|(byte, _)| offsets[byte])
            .collect();
        if boundaries.first() != Some(&0) {
            boundaries.insert(0, 0);
        }
        if boundaries.last() != Some(&text.len()) {
            boundaries.push(text.len());
        }
        boundaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_breaks_after_spaces() {
        let text = utf16("ab cd");
        let breaks: Vec<_> = UnicodeLineBreakerFactory.create(&text, false).collect();
        assert_eq!(
            breaks,
            vec![
                BreakOpportunity {
                    position: 3,
                    required: false
                },
                BreakOpportunity {
                    position: 5,
                    required: false
                },
            ]
        );
    }

    #[test]
    fn test_newline_is_required() {
        let text = utf16("a\nb");
        let breaks: Vec<_> = UnicodeLineBreakerFactory.create(&text, true).collect();
        assert_eq!(
            breaks,
            vec![BreakOpportunity {
                position: 2,
                required: true
            }]
        );
    }

    #[test]
    fn test_grapheme_breaks_skip_surrogate_pairs() {
        let text = utf16("a\u{1F600}b");
        let breaker = UnicodeGraphemeBreaker;
        assert_eq!(breaker.next_grapheme_break(&text, 1), 3);
        assert_eq!(breaker.previous_grapheme_break(&text, 3), 1);
        assert_eq!(breaker.next_grapheme_break(&text, 3), 4);
    }

    #[test]
    fn test_boundaries_of_whole_buffer() {
        let text = utf16("e\u{301}x\u{1F600}");
        assert_eq!(UnicodeGraphemeBreaker.grapheme_boundaries(&text), vec![0, 2, 3, 5]);
        assert_eq!(UnicodeGraphemeBreaker.grapheme_boundaries(&[]), vec![0]);
    }
}
