//! # Tokenised Text Buffer
//!
//! [`TextBuffer`] holds the text being mutated as an ordered arena of
//! [`Segment`]s, alternating between words and whitespace separators. Each
//! segment caches its byte and character span, and the buffer keeps a table
//! from word index to segment index so operations can address words without
//! scanning separators.
//!
//! ## Editing Model
//!
//! - Word-level edits (`replace_word`, `delete_word`, `insert_word_after`)
//!   touch one segment and shift the spans that follow it. They never
//!   re-tokenise, so a replacement containing whitespace stays one word.
//! - Bulk edits validate every index first and then apply the whole batch
//!   with a single span rebuild. A failed batch leaves the buffer untouched.
//! - [`TextBuffer::replace_char_range`] is the only primitive that
//!   re-tokenises, since a byte-range edit can move segment boundaries.
//!
//! ## Invariants
//!
//! - Concatenating the segment texts always gives the buffer text
//! - Spans are consistent with their text and exactly adjacent
//!
//! ## Usage Example
//!
//! ```rust
//! use garble_core::buffer::TextBuffer;
//!
//! let mut buffer = TextBuffer::new("one  two three");
//! buffer.delete_word(1).unwrap();
//! assert_eq!(buffer.to_string(), "one  three");
//!
//! buffer.normalize();
//! assert_eq!(buffer.to_string(), "one three");
//! ```

mod segment;

pub use segment::{tokenize, Segment, SegmentKind, Span};

use std::fmt;
use std::ops::Range;

use crate::text::is_word_char;
use crate::types::error::{GarbleError, IndexTarget, Result};

/// Tokenised, span-tracked text owned by a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextBuffer {
    segments: Vec<Segment>,
    word_slots: Vec<usize>,
    byte_len: usize,
    char_len: usize,
}

impl TextBuffer {
    /// Tokenises `text` into a new buffer.
    pub fn new(text: &str) -> Self {
        Self::from_segments(tokenize(text))
    }

    fn from_segments(segments: Vec<Segment>) -> Self {
        let mut buffer = Self {
            segments,
            word_slots: Vec::new(),
            byte_len: 0,
            char_len: 0,
        };
        buffer.respan_from(0);
        buffer.rebuild_word_slots();
        buffer
    }

    // ========================================
    // Queries
    // ========================================

    /// All segments in order.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of word segments.
    #[inline]
    pub fn word_count(&self) -> usize {
        self.word_slots.len()
    }

    /// Text of the word at `index`.
    pub fn word(&self, index: usize) -> Result<&str> {
        Ok(self.segments[self.word_segment_index(index)?].text())
    }

    /// Segment index of the word at `index`.
    pub fn word_segment_index(&self, index: usize) -> Result<usize> {
        self.word_slots
            .get(index)
            .copied()
            .ok_or_else(|| GarbleError::word_index(index, self.word_slots.len()))
    }

    /// The word segment at `index`.
    pub fn word_segment(&self, index: usize) -> Result<&Segment> {
        Ok(&self.segments[self.word_segment_index(index)?])
    }

    /// Iterates over the words in order.
    pub fn words(&self) -> impl Iterator<Item = &str> + '_ {
        self.word_slots.iter().map(move |&slot| self.segments[slot].text())
    }

    /// Pairs each segment with its word index (`None` for separators).
    pub fn segments_with_word_indices(&self) -> impl Iterator<Item = (Option<usize>, &Segment)> + '_ {
        let mut next_word = 0usize;
        self.segments.iter().map(move |segment| {
            if segment.is_word() {
                let index = next_word;
                next_word += 1;
                (Some(index), segment)
            } else {
                (None, segment)
            }
        })
    }

    /// Total length in bytes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Total length in characters.
    #[inline]
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// `true` when the buffer holds no text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.byte_len == 0
    }

    /// Consumes the buffer, returning its text.
    pub fn into_string(self) -> String {
        self.to_string()
    }

    // ========================================
    // Word-level edits
    // ========================================

    /// Replaces the text of the word at `index`.
    ///
    /// # Errors
    /// Returns `GarbleError::BufferIndex` if `index` is out of range.
    pub fn replace_word(&mut self, index: usize, text: &str) -> Result<()> {
        let slot = self.word_segment_index(index)?;
        self.replace_at(slot, text.to_string());
        Ok(())
    }

    /// Replaces the text of the segment at `index`.
    ///
    /// # Errors
    /// Returns `GarbleError::BufferIndex` if `index` is out of range.
    pub fn replace_segment(&mut self, index: usize, text: &str) -> Result<()> {
        if index >= self.segments.len() {
            return Err(GarbleError::segment_index(index, self.segments.len()));
        }
        self.replace_at(index, text.to_string());
        Ok(())
    }

    fn replace_at(&mut self, slot: usize, text: String) {
        let (byte_delta, char_delta) = self.segments[slot].set_text(text);
        if byte_delta == 0 && char_delta == 0 {
            return;
        }
        for segment in &mut self.segments[slot + 1..] {
            segment.shift(byte_delta, char_delta);
        }
        self.byte_len = self.byte_len.wrapping_add_signed(byte_delta);
        self.char_len = self.char_len.wrapping_add_signed(char_delta);
    }

    /// Removes the word at `index` together with one adjacent separator.
    ///
    /// The following separator is removed when there is one, otherwise the
    /// preceding one, so words stay separated.
    ///
    /// # Errors
    /// Returns `GarbleError::BufferIndex` if `index` is out of range.
    pub fn delete_word(&mut self, index: usize) -> Result<()> {
        let slot = self.word_segment_index(index)?;
        let next_is_separator = self
            .segments
            .get(slot + 1)
            .is_some_and(|segment| !segment.is_word());
        let prev_is_separator = slot > 0 && !self.segments[slot - 1].is_word();

        let start = if next_is_separator {
            self.segments.drain(slot..slot + 2);
            slot
        } else if prev_is_separator {
            self.segments.drain(slot - 1..slot + 1);
            slot - 1
        } else {
            self.segments.remove(slot);
            slot
        };
        self.respan_from(start);
        self.rebuild_word_slots();
        Ok(())
    }

    /// Inserts `text` as a new word after the word at `index`.
    ///
    /// The new word is preceded by `separator`, or a single space when
    /// `None`.
    ///
    /// # Errors
    /// Returns `GarbleError::BufferIndex` if `index` is out of range.
    pub fn insert_word_after(&mut self, index: usize, text: &str, separator: Option<&str>) -> Result<()> {
        let slot = self.word_segment_index(index)?;
        let separator = separator.unwrap_or(" ");
        self.segments.splice(
            slot + 1..slot + 1,
            [
                Segment::new(SegmentKind::Separator, separator, 0, 0),
                Segment::new(SegmentKind::Word, text, 0, 0),
            ],
        );
        self.respan_from(slot + 1);
        self.rebuild_word_slots();
        Ok(())
    }

    // ========================================
    // Bulk edits
    // ========================================

    /// Replaces many words in one pass.
    ///
    /// Every index is checked before anything is written.
    ///
    /// # Errors
    /// Returns `GarbleError::BufferIndex` for the first out-of-range index.
    pub fn replace_words_bulk<I>(&mut self, replacements: I) -> Result<()>
    where
        I: IntoIterator<Item = (usize, String)>,
    {
        let resolved = replacements
            .into_iter()
            .map(|(index, text)| Ok((self.word_segment_index(index)?, text)))
            .collect::<Result<Vec<_>>>()?;
        self.apply_segment_batch(resolved);
        Ok(())
    }

    /// Replaces many segments in one pass.
    ///
    /// # Errors
    /// Returns `GarbleError::BufferIndex` for the first out-of-range index.
    pub fn replace_segments_bulk<I>(&mut self, replacements: I) -> Result<()>
    where
        I: IntoIterator<Item = (usize, String)>,
    {
        let len = self.segments.len();
        let resolved: Vec<(usize, String)> = replacements.into_iter().collect();
        if let Some(&(index, _)) = resolved.iter().find(|(index, _)| *index >= len) {
            return Err(GarbleError::segment_index(index, len));
        }
        self.apply_segment_batch(resolved);
        Ok(())
    }

    fn apply_segment_batch(&mut self, batch: Vec<(usize, String)>) {
        let Some(first) = batch.iter().map(|(slot, _)| *slot).min() else {
            return;
        };
        for (slot, text) in batch {
            self.segments[slot].set_text(text);
        }
        self.respan_from(first);
    }

    /// Inserts many words, each after the given word index, in one pass.
    ///
    /// Indices refer to the buffer before any insertion. Several insertions
    /// after the same word keep their batch order. Each new word is preceded
    /// by a single space.
    ///
    /// # Errors
    /// Returns `GarbleError::BufferIndex` for the first out-of-range index.
    pub fn insert_words_after_bulk<I>(&mut self, insertions: I) -> Result<()>
    where
        I: IntoIterator<Item = (usize, String)>,
    {
        let mut pending = insertions
            .into_iter()
            .map(|(index, text)| Ok((self.word_segment_index(index)?, text)))
            .collect::<Result<Vec<_>>>()?;
        if pending.is_empty() {
            return Ok(());
        }
        pending.sort_by_key(|(slot, _)| *slot);
        let first = pending[0].0;

        let mut rebuilt = Vec::with_capacity(self.segments.len() + 2 * pending.len());
        let mut queue = pending.into_iter().peekable();
        for (slot, segment) in std::mem::take(&mut self.segments).into_iter().enumerate() {
            rebuilt.push(segment);
            while let Some((_, text)) = queue.next_if(|(target, _)| *target == slot) {
                rebuilt.push(Segment::new(SegmentKind::Separator, " ", 0, 0));
                rebuilt.push(Segment::new(SegmentKind::Word, text, 0, 0));
            }
        }
        self.segments = rebuilt;
        self.respan_from(first);
        self.rebuild_word_slots();
        Ok(())
    }

    // ========================================
    // Character-range edits
    // ========================================

    /// Replaces the bytes in `range` with `text` and re-tokenises.
    ///
    /// # Errors
    /// - `GarbleError::BufferIndex` if the range lies outside the buffer or is reversed
    /// - `GarbleError::TokenBoundary` if an endpoint splits a character
    pub fn replace_char_range(&mut self, range: Range<usize>, text: &str) -> Result<()> {
        let current = self.to_string();
        for offset in [range.start, range.end] {
            if offset > current.len() {
                return Err(GarbleError::BufferIndex {
                    target: IndexTarget::Byte,
                    index: offset,
                    len: current.len(),
                });
            }
            if !current.is_char_boundary(offset) {
                return Err(GarbleError::TokenBoundary { offset });
            }
        }
        if range.start > range.end {
            return Err(GarbleError::BufferIndex {
                target: IndexTarget::Byte,
                index: range.start,
                len: range.end,
            });
        }

        let mut updated = String::with_capacity(current.len() - range.len() + text.len());
        updated.push_str(&current[..range.start]);
        updated.push_str(text);
        updated.push_str(&current[range.end..]);
        *self = Self::new(&updated);
        Ok(())
    }

    // ========================================
    // Whole-buffer passes
    // ========================================

    /// Normalises spacing without re-tokenising.
    ///
    /// Separator runs collapse to one space, the space before a word that
    /// starts with `.`, `,`, `:` or `;` is removed (joining the two words),
    /// empty words are dropped and both ends are trimmed.
    pub fn normalize(&mut self) {
        let mut parts: Vec<(SegmentKind, String)> = Vec::with_capacity(self.segments.len());
        for segment in std::mem::take(&mut self.segments) {
            let kind = segment.kind();
            if kind == SegmentKind::Word && segment.text().is_empty() {
                continue;
            }
            let previous_kind = parts.last().map(|(kind, _)| *kind);
            match (kind, previous_kind) {
                (SegmentKind::Separator, None | Some(SegmentKind::Separator)) => {}
                (SegmentKind::Separator, Some(SegmentKind::Word)) => {
                    parts.push((SegmentKind::Separator, " ".to_string()));
                }
                (SegmentKind::Word, Some(previous)) => {
                    let attaches = segment.text().starts_with(['.', ',', ':', ';']);
                    if previous == SegmentKind::Separator && attaches {
                        parts.pop();
                    }
                    match parts.last_mut() {
                        Some((SegmentKind::Word, text)) => text.push_str(segment.text()),
                        _ => parts.push((SegmentKind::Word, segment.text().to_string())),
                    }
                }
                (SegmentKind::Word, None) => {
                    parts.push((SegmentKind::Word, segment.text().to_string()));
                }
            }
        }
        if matches!(parts.last(), Some((SegmentKind::Separator, _))) {
            parts.pop();
        }

        self.segments = parts
            .into_iter()
            .map(|(kind, text)| Segment::new(kind, text, 0, 0))
            .collect();
        self.respan_from(0);
        self.rebuild_word_slots();
    }

    /// Merges runs of words made of `token` into one continuous word.
    ///
    /// A run is a sequence of words, separated by separators, in which every
    /// word consists only of `token` and non-word characters. The run must
    /// start and end with words containing `token` and hold at least two of
    /// them. Punctuation-only words and separators inside the run are
    /// absorbed. The merged word keeps the first word's leading text, then
    /// every `token` of the run, then the last word's trailing text.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use garble_core::buffer::TextBuffer;
    ///
    /// let mut buffer = TextBuffer::new("Call ███ ███, today");
    /// buffer.merge_repeated_char_words('█');
    /// assert_eq!(buffer.to_string(), "Call ██████, today");
    /// ```
    pub fn merge_repeated_char_words(&mut self, token: char) {
        let qualifies = |segment: &Segment| {
            segment.is_word()
                && !segment.text().is_empty()
                && segment.text().chars().all(|c| c == token || !is_word_char(c))
        };
        let holds_token = |segment: &Segment| segment.text().contains(token);

        let segments = std::mem::take(&mut self.segments);
        let mut merged: Vec<Segment> = Vec::with_capacity(segments.len());
        let mut changed = false;
        let mut i = 0usize;
        while i < segments.len() {
            let start = &segments[i];
            if !(qualifies(start) && holds_token(start)) {
                merged.push(start.clone());
                i += 1;
                continue;
            }

            let mut last = i;
            let mut token_words = 1usize;
            let mut k = i + 1;
            while k + 1 < segments.len() && !segments[k].is_word() && qualifies(&segments[k + 1]) {
                if holds_token(&segments[k + 1]) {
                    last = k + 1;
                    token_words += 1;
                }
                k += 2;
            }

            if token_words < 2 {
                merged.push(start.clone());
                i += 1;
                continue;
            }

            let run = &segments[i..=last];
            let count: usize = run
                .iter()
                .filter(|segment| segment.is_word())
                .map(|segment| segment.text().chars().filter(|&c| c == token).count())
                .sum();
            let first_text = run[0].text();
            let last_text = run[run.len() - 1].text();
            let prefix = first_text.find(token).map_or("", |at| &first_text[..at]);
            let suffix = last_text
                .rfind(token)
                .map_or("", |at| &last_text[at + token.len_utf8()..]);

            let mut text = String::with_capacity(prefix.len() + count * token.len_utf8() + suffix.len());
            text.push_str(prefix);
            text.extend(std::iter::repeat(token).take(count));
            text.push_str(suffix);
            merged.push(Segment::new(SegmentKind::Word, text, 0, 0));
            changed = true;
            i = last + 1;
        }

        self.segments = merged;
        if changed {
            self.respan_from(0);
            self.rebuild_word_slots();
        }
    }

    // ========================================
    // Span maintenance
    // ========================================

    fn respan_from(&mut self, start: usize) {
        let (mut byte_pos, mut char_pos) = match start.checked_sub(1).and_then(|i| self.segments.get(i)) {
            Some(previous) => (previous.span().byte_end, previous.span().char_end),
            None => (0, 0),
        };
        let len = self.segments.len();
        for segment in &mut self.segments[start.min(len)..] {
            segment.place_at(byte_pos, char_pos);
            byte_pos = segment.span().byte_end;
            char_pos = segment.span().char_end;
        }
        self.byte_len = byte_pos;
        self.char_len = char_pos;
    }

    fn rebuild_word_slots(&mut self) {
        self.word_slots.clear();
        self.word_slots.extend(
            self.segments
                .iter()
                .enumerate()
                .filter(|(_, segment)| segment.is_word())
                .map(|(slot, _)| slot),
        );
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            f.write_str(segment.text())?;
        }
        Ok(())
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests;
