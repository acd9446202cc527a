use std::collections::BTreeMap;

use garble_core::buffer::TextBuffer;
use garble_core::rng::RandomSource;
use garble_core::Result;

use crate::traits::GlitchOp;

/// Decorative (left, right) replacements for each straight glyph.
const DOUBLE: &[(&str, &str)] = &[("\u{201C}", "\u{201D}"), ("\u{201E}", "\u{201C}"), ("\u{00AB}", "\u{00BB}")];
const SINGLE: &[(&str, &str)] = &[("\u{2018}", "\u{2019}"), ("\u{2039}", "\u{203A}")];
const BACKTICK: &[(&str, &str)] = &[("\u{2018}", "\u{2019}")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteKind {
    Double,
    Single,
    Backtick,
}

impl QuoteKind {
    fn of(c: char) -> Option<Self> {
        match c {
            '"' => Some(Self::Double),
            '\'' => Some(Self::Single),
            '`' => Some(Self::Backtick),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }

    fn options(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Double => DOUBLE,
            Self::Single => SINGLE,
            Self::Backtick => BACKTICK,
        }
    }
}

/// Byte offsets of the opening and closing glyph of each pair, in closing
/// order. Each kind keeps one open slot; the next glyph of that kind closes it.
fn collect_pairs(text: &str) -> Vec<(usize, usize, QuoteKind)> {
    let mut open: [Option<usize>; 3] = [None; 3];
    let mut pairs = Vec::new();
    for (offset, c) in text.char_indices() {
        let Some(kind) = QuoteKind::of(c) else {
            continue;
        };
        match open[kind.slot()].take() {
            Some(start) => pairs.push((start, offset, kind)),
            None => open[kind.slot()] = Some(offset),
        }
    }
    pairs
}

/// Swaps paired straight quotes for typographic pairs.
///
/// Each complete `"…"`, `'…'` or `` `…` `` pair gets one decorative pair
/// chosen uniformly; a glyph left without a partner is untouched. Pairs may
/// span several words.
///
/// # Examples
///
/// ```
/// use garble_core::buffer::TextBuffer;
/// use garble_core::rng::Mt19937;
/// use garble_ops::{GlitchOp, QuotePairs};
///
/// let mut buffer = TextBuffer::new("it's \"fine\"");
/// QuotePairs.apply(&mut buffer, &mut Mt19937::from_seed_int(0)).unwrap();
/// let out = buffer.to_string();
/// assert!(out.starts_with("it's "));
/// assert!(!out.contains('"'));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotePairs;

impl GlitchOp for QuotePairs {
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()> {
        let text = buffer.to_string();
        let pairs = collect_pairs(&text);
        if pairs.is_empty() {
            return Ok(());
        }

        let mut edits: Vec<(usize, &'static str)> = Vec::with_capacity(pairs.len() * 2);
        for (start, end, kind) in pairs {
            let options = kind.options();
            let (left, right) = options[rng.range(options.len())?];
            edits.push((start, left));
            edits.push((end, right));
        }

        // quote glyphs are single-byte and never whitespace, so each sits in a word
        let segments = buffer.segments();
        let mut by_segment: BTreeMap<usize, Vec<(usize, &str)>> = BTreeMap::new();
        for (offset, glyph) in edits {
            let slot = segments.partition_point(|segment| segment.span().byte_end <= offset);
            let local = offset - segments[slot].span().byte_start;
            by_segment.entry(slot).or_default().push((local, glyph));
        }

        let mut replacements = Vec::with_capacity(by_segment.len());
        for (slot, mut glyphs) in by_segment {
            glyphs.sort_unstable_by_key(|&(local, _)| local);
            let source = segments[slot].text();
            let mut out = String::with_capacity(source.len() + glyphs.len() * 2);
            let mut cursor = 0;
            for (local, glyph) in glyphs {
                out.push_str(&source[cursor..local]);
                out.push_str(glyph);
                cursor = local + 1;
            }
            out.push_str(&source[cursor..]);
            replacements.push((slot, out));
        }
        buffer.replace_segments_bulk(replacements)
    }
}
