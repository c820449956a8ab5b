//! White space processing.
//!
//! [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
//!
//! "If white-space is set to normal, nowrap, or pre-line, white space
//! characters are considered collapsible and are processed by performing
//! the following steps:
//!
//! 1. Any sequence of collapsible spaces and tabs immediately preceding or
//!    following a segment break is removed.
//! 2. Collapsible segment breaks are transformed for rendering according to
//!    the segment break transformation rules.
//! 3. Every collapsible tab is converted to a collapsible space (U+0020).
//! 4. Any collapsible space immediately following another collapsible
//!    space, even one outside the boundary of the inline containing that
//!    space, provided both spaces are within the same inline formatting
//!    context, is collapsed to have zero advance width."
//!
//! Collapsed spaces are removed from the buffer instead of being kept with
//! zero advance. Phase II (trimming at line edges) happens during line
//! breaking.

use crate::style::WhiteSpace;

/// U+0020 SPACE.
pub const SPACE: u16 = 0x20;

/// U+000A LINE FEED, the only segment break kept in the buffer.
pub const NEWLINE: u16 = 0x0a;

/// U+FFFC OBJECT REPLACEMENT CHARACTER, stands in for atomic inlines.
pub const OBJECT_REPLACEMENT: u16 = 0xfffc;

const fn is_space_or_tab(ch: char) -> bool {
    matches!(ch, ' ' | '\t')
}

const fn is_segment_break(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{0c}')
}

/// Collapsing state carried across the runs of one paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collapser {
    /// Whether the last code unit written was collapsible white space (or
    /// the start of a line), so a following collapsible space is dropped.
    in_whitespace: bool,
    /// Start of the current run in the buffer. Spaces before it belong to
    /// an earlier run and are never removed retroactively.
    run_start: usize,
}

impl Default for Collapser {
    fn default() -> Self {
        Self::new()
    }
}

impl Collapser {
    /// State at the start of a paragraph, where leading spaces collapse away.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            in_whitespace: true,
            run_start: 0,
        }
    }

    /// An atomic inline was placed: a following space is kept.
    pub const fn atomic(&mut self) {
        self.in_whitespace = false;
    }

    /// A forced line break: spaces right after it are dropped.
    pub const fn forced_break(&mut self) {
        self.in_whitespace = true;
    }

    /// Append `source` to `out` with `white_space` applied.
    pub fn push(&mut self, out: &mut Vec<u16>, source: &str, white_space: WhiteSpace) {
        self.run_start = out.len();
        let mut units = [0u16; 2];

        match white_space {
            WhiteSpace::Pre | WhiteSpace::PreWrap => {
                let mut chars = source.chars().peekable();
                while let Some(ch) = chars.next() {
                    // CRLF and lone CR are segment breaks too.
                    if ch == '\r' {
                        if chars.peek() == Some(&'\n') {
                            continue;
                        }
                        out.push(NEWLINE);
                        continue;
                    }
                    out.extend_from_slice(ch.encode_utf16(&mut units));
                }
                self.in_whitespace = false;
            }
            WhiteSpace::Normal | WhiteSpace::Nowrap => {
                for ch in source.chars() {
                    if is_space_or_tab(ch) || is_segment_break(ch) {
                        self.space(out);
                    } else {
                        out.extend_from_slice(ch.encode_utf16(&mut units));
                        self.in_whitespace = false;
                    }
                }
            }
            WhiteSpace::PreLine => {
                let mut chars = source.chars().peekable();
                while let Some(ch) = chars.next() {
                    if is_space_or_tab(ch) {
                        self.space(out);
                    } else if is_segment_break(ch) {
                        if ch == '\r' && chars.peek() == Some(&'\n') {
                            continue;
                        }
                        // STEP 1: spaces before the break go.
                        if self.in_whitespace
                            && out.len() > self.run_start
                            && out.last() == Some(&SPACE)
                        {
                            let _ = out.pop();
                        }
                        out.push(NEWLINE);
                        // ...and so do the ones after it.
                        self.in_whitespace = true;
                    } else {
                        out.extend_from_slice(ch.encode_utf16(&mut units));
                        self.in_whitespace = false;
                    }
                }
            }
        }
    }

    fn space(&mut self, out: &mut Vec<u16>) {
        if !self.in_whitespace {
            out.push(SPACE);
            self.in_whitespace = true;
        }
    }
}
