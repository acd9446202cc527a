use std::collections::{BTreeMap, HashSet};

use unicode_segmentation::UnicodeSegmentation;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use garble_core::buffer::TextBuffer;
use garble_core::rng::RandomSource;
use garble_core::Result;

use crate::traits::GlitchOp;

const ZERO_WIDTH_NON_JOINER: char = '\u{200C}';
const ZERO_WIDTH_JOINER: char = '\u{200D}';

const GLYPHLESS: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}', '\u{2060}'];
const THIN_SPACES: &[char] = &['\u{200A}', '\u{2009}', '\u{202F}'];

/// Which invisible characters the default palette draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Visibility {
    /// Zero-width spaces, joiners and the word joiner
    #[default]
    Glyphless,
    /// Glyphless plus the sixteen variation selectors
    WithJoiners,
    /// With-joiners plus hair, thin and narrow no-break spaces
    SemiVisible,
}

impl Visibility {
    /// The palette for this visibility level.
    pub fn palette(self) -> Vec<char> {
        let mut palette = GLYPHLESS.to_vec();
        if matches!(self, Self::WithJoiners | Self::SemiVisible) {
            palette.extend('\u{FE00}'..='\u{FE0F}');
        }
        if self == Self::SemiVisible {
            palette.extend_from_slice(THIN_SPACES);
        }
        palette
    }
}

/// Where insertions may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Placement {
    /// Between any two adjacent non-whitespace characters
    #[default]
    Random,
    /// Only between grapheme clusters
    GraphemeBoundary,
    /// Grapheme boundaries, with joiners and variation selectors restricted
    /// to contexts where they are meaningful
    ScriptAware,
}

/// Injects invisible characters between visible ones.
///
/// `count = floor(rate × positions)` plus one more with probability equal to
/// the fractional remainder. Positions are drawn with `sample`, then any run
/// of adjacent insertions longer than `max_consecutive` is cut short.
///
/// # Examples
///
/// ```
/// use garble_core::buffer::TextBuffer;
/// use garble_core::rng::Mt19937;
/// use garble_ops::{GlitchOp, Placement, ZeroWidth};
///
/// let op = ZeroWidth { rate: 1.0, placement: Placement::GraphemeBoundary, ..ZeroWidth::default() };
/// let mut buffer = TextBuffer::new("cafe\u{301}");
/// op.apply(&mut buffer, &mut Mt19937::from_seed_int(42)).unwrap();
/// assert!(buffer.to_string().ends_with("e\u{301}"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroWidth {
    /// Fraction of eligible positions that receive a character
    pub rate: f64,
    /// Explicit palette; overrides `visibility` when non-empty
    pub characters: Vec<String>,
    /// Default palette selection
    pub visibility: Visibility,
    /// Position filter
    pub placement: Placement,
    /// Longest allowed run of adjacent insertions (0 = unlimited)
    pub max_consecutive: usize,
}

impl Default for ZeroWidth {
    fn default() -> Self {
        Self {
            rate: 0.02,
            characters: Vec::new(),
            visibility: Visibility::Glyphless,
            placement: Placement::Random,
            max_consecutive: 4,
        }
    }
}

struct Position {
    segment: usize,
    char_index: usize,
    /// Indices into the palette usable here
    allowed: Vec<usize>,
}

fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F000..=0x1FAFF | 0x2600..=0x27BF | 0x2300..=0x23FF | 0x2B00..=0x2BFF
    )
}

/// Scripts whose letters change shape across a (non-)joiner.
fn is_joining_script(c: char) -> bool {
    matches!(
        c as u32,
        0x0600..=0x08FF | 0x0900..=0x0DFF | 0x1800..=0x18AF | 0xA840..=0xA87F | 0xFB50..=0xFEFC
    )
}

fn is_variation_selector(c: char) -> bool {
    ('\u{FE00}'..='\u{FE0F}').contains(&c)
}

fn grapheme_starts(text: &str) -> HashSet<usize> {
    let mut starts = HashSet::new();
    let mut char_index = 0;
    for cluster in text.graphemes(true) {
        starts.insert(char_index);
        char_index += cluster.chars().count();
    }
    starts
}

impl ZeroWidth {
    fn resolved_palette(&self) -> Vec<String> {
        let explicit: Vec<String> = self
            .characters
            .iter()
            .filter(|value| !value.is_empty())
            .cloned()
            .collect();
        if !explicit.is_empty() {
            return explicit;
        }
        self.visibility.palette().into_iter().map(String::from).collect()
    }

    fn allowed_here(&self, palette: &[String], before: char, after: char) -> Vec<usize> {
        if self.placement != Placement::ScriptAware {
            return (0..palette.len()).collect();
        }
        let joiner_context = [before, after]
            .iter()
            .any(|&c| is_joining_script(c) || is_emoji(c));
        palette
            .iter()
            .enumerate()
            .filter(|(_, glyph)| {
                let mut chars = glyph.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c == ZERO_WIDTH_JOINER || c == ZERO_WIDTH_NON_JOINER => {
                        joiner_context
                    }
                    (Some(c), None) if is_variation_selector(c) => is_emoji(before),
                    _ => true,
                }
            })
            .map(|(index, _)| index)
            .collect()
    }

    fn positions(&self, buffer: &TextBuffer, palette: &[String]) -> Vec<Position> {
        let mut positions = Vec::new();
        for (segment, seg) in buffer.segments().iter().enumerate() {
            let chars: Vec<char> = seg.text().chars().collect();
            if chars.len() < 2 {
                continue;
            }
            let boundaries = match self.placement {
                Placement::Random => None,
                _ => Some(grapheme_starts(seg.text())),
            };
            for char_index in 1..chars.len() {
                let (before, after) = (chars[char_index - 1], chars[char_index]);
                if before.is_whitespace() || after.is_whitespace() {
                    continue;
                }
                if boundaries
                    .as_ref()
                    .is_some_and(|starts| !starts.contains(&char_index))
                {
                    continue;
                }
                let allowed = self.allowed_here(palette, before, after);
                if !allowed.is_empty() {
                    positions.push(Position {
                        segment,
                        char_index,
                        allowed,
                    });
                }
            }
        }
        positions
    }
}

/// Drops sampled positions that would extend a run beyond `limit`.
fn cap_runs(sorted: Vec<usize>, positions: &[Position], limit: usize) -> Vec<usize> {
    if limit == 0 {
        return sorted;
    }
    let mut kept = Vec::with_capacity(sorted.len());
    let mut run = 0usize;
    let mut previous: Option<&Position> = None;
    for index in sorted {
        let here = &positions[index];
        let adjacent = previous.is_some_and(|prev| {
            prev.segment == here.segment && prev.char_index + 1 == here.char_index
        });
        run = if adjacent { run + 1 } else { 1 };
        previous = Some(here);
        if run <= limit {
            kept.push(index);
        }
    }
    kept
}

impl GlitchOp for ZeroWidth {
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()> {
        let palette = self.resolved_palette();
        if palette.is_empty() || buffer.is_empty() {
            return Ok(());
        }
        let rate = if self.rate.is_nan() { 0.0 } else { self.rate.max(0.0) };
        if rate <= 0.0 {
            return Ok(());
        }
        let positions = self.positions(buffer, &palette);
        if positions.is_empty() {
            return Ok(());
        }

        let total = positions.len();
        let target = rate * total as f64;
        let mut count = target.floor() as usize;
        let remainder = target - count as f64;
        if remainder > 0.0 && rng.random() < remainder {
            count += 1;
        }
        let count = count.min(total);
        if count == 0 {
            return Ok(());
        }

        let mut sampled = rng.sample(total, count)?;
        sampled.sort_unstable();
        let kept = cap_runs(sampled, &positions, self.max_consecutive);

        let mut by_segment: BTreeMap<usize, Vec<(usize, &str)>> = BTreeMap::new();
        for index in kept {
            let position = &positions[index];
            let pick = position.allowed[rng.range(position.allowed.len())?];
            by_segment
                .entry(position.segment)
                .or_default()
                .push((position.char_index, palette[pick].as_str()));
        }
        tracing::trace!(positions = total, count, "zero_width");

        let mut replacements = Vec::with_capacity(by_segment.len());
        for (segment, insertions) in by_segment {
            let text = buffer.segments()[segment].text();
            let mut out = String::with_capacity(text.len() + insertions.len() * 3);
            let mut pending = insertions.into_iter().peekable();
            for (char_index, c) in text.chars().enumerate() {
                while let Some((_, glyph)) = pending.next_if(|(at, _)| *at == char_index) {
                    out.push_str(glyph);
                }
                out.push(c);
            }
            replacements.push((segment, out));
        }
        buffer.replace_segments_bulk(replacements)
    }
}
