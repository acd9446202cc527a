//! Segment and span types backing [`TextBuffer`](super::TextBuffer).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Classification of a buffer segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SegmentKind {
    /// A maximal run of non-whitespace characters
    Word,
    /// A maximal run of whitespace characters
    Separator,
}

/// Cached byte and character offsets of a segment within the buffer text.
///
/// Ranges are half-open. Consecutive segments have exactly adjacent spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    /// Offset of the first byte
    pub byte_start: usize,
    /// Offset one past the last byte
    pub byte_end: usize,
    /// Offset of the first character
    pub char_start: usize,
    /// Offset one past the last character
    pub char_end: usize,
}

impl Span {
    /// Length in bytes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.byte_end - self.byte_start
    }

    /// Length in characters.
    #[inline]
    pub fn char_len(&self) -> usize {
        self.char_end - self.char_start
    }
}

/// A contiguous, labelled slice of the buffer text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    kind: SegmentKind,
    text: String,
    span: Span,
}

impl Segment {
    /// Creates a segment whose span starts at the given offsets.
    pub fn new(kind: SegmentKind, text: impl Into<String>, byte_start: usize, char_start: usize) -> Self {
        let text = text.into();
        let span = Span {
            byte_start,
            byte_end: byte_start + text.len(),
            char_start,
            char_end: char_start + text.chars().count(),
        };
        Self { kind, text, span }
    }

    /// The segment kind.
    #[inline]
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// The segment text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The cached span.
    #[inline]
    pub fn span(&self) -> Span {
        self.span
    }

    /// `true` for [`SegmentKind::Word`].
    #[inline]
    pub fn is_word(&self) -> bool {
        self.kind == SegmentKind::Word
    }

    /// Replaces the text, keeping the span start. Returns the
    /// `(byte, char)` length deltas.
    pub(crate) fn set_text(&mut self, text: String) -> (isize, isize) {
        let new_chars = text.chars().count();
        let byte_delta = text.len() as isize - self.span.byte_len() as isize;
        let char_delta = new_chars as isize - self.span.char_len() as isize;
        self.span.byte_end = self.span.byte_start + text.len();
        self.span.char_end = self.span.char_start + new_chars;
        self.text = text;
        (byte_delta, char_delta)
    }

    pub(crate) fn shift(&mut self, byte_delta: isize, char_delta: isize) {
        self.span.byte_start = self.span.byte_start.wrapping_add_signed(byte_delta);
        self.span.byte_end = self.span.byte_end.wrapping_add_signed(byte_delta);
        self.span.char_start = self.span.char_start.wrapping_add_signed(char_delta);
        self.span.char_end = self.span.char_end.wrapping_add_signed(char_delta);
    }

    /// Moves the span so it starts at the given offsets.
    pub(crate) fn place_at(&mut self, byte_start: usize, char_start: usize) {
        let byte_len = self.text.len();
        let char_len = self.span.char_len();
        self.span = Span {
            byte_start,
            byte_end: byte_start + byte_len,
            char_start,
            char_end: char_start + char_len,
        };
    }
}

/// Splits `text` into alternating word and separator segments.
///
/// Every maximal whitespace run becomes a separator and every maximal
/// non-whitespace run a word, so concatenating the segments gives back
/// `text` exactly.
pub fn tokenize(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut run_start = 0usize;
    let mut run_kind: Option<SegmentKind> = None;
    let mut char_pos = 0usize;
    let mut run_char_start = 0usize;

    for (offset, c) in text.char_indices() {
        let kind = if c.is_whitespace() {
            SegmentKind::Separator
        } else {
            SegmentKind::Word
        };
        match run_kind {
            Some(current) if current == kind => {}
            Some(current) => {
                segments.push(Segment::new(
                    current,
                    &text[run_start..offset],
                    run_start,
                    run_char_start,
                ));
                run_start = offset;
                run_char_start = char_pos;
                run_kind = Some(kind);
            }
            None => run_kind = Some(kind),
        }
        char_pos += 1;
    }
    if let Some(kind) = run_kind {
        segments.push(Segment::new(kind, &text[run_start..], run_start, run_char_start));
    }
    segments
}
