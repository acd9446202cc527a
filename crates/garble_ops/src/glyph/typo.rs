use std::collections::HashMap;

use smallvec::SmallVec;

use garble_core::buffer::{SegmentKind, TextBuffer};
use garble_core::rng::RandomSource;
use garble_core::text::is_word_char;
use garble_core::Result;

use super::keyboard::{classify_transition, default_layout, KeyNeighbourMap, MotorWeighting, ShiftMap};
use crate::traits::GlitchOp;

const ELIGIBLE_TRIES: usize = 16;

/// Sticky shift key: once pressed it stays down for a run of characters.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftSlip {
    /// Per-character chance of pressing shift while it is up
    pub enter_rate: f64,
    /// Per-character chance of releasing shift once the minimum hold is spent
    pub exit_rate: f64,
    /// Characters typed shifted before a release may happen
    pub min_hold: usize,
    /// Shifted glyph per key; unmapped keys are upper-cased
    pub shift_map: ShiftMap,
}

impl ShiftSlip {
    /// Creates a slip model with a one-character minimum hold.
    pub fn new(enter_rate: f64, exit_rate: f64, shift_map: ShiftMap) -> Self {
        Self {
            enter_rate: enter_rate.max(0.0),
            exit_rate: exit_rate.max(0.0),
            min_hold: 1,
            shift_map,
        }
    }

    fn shifted(&self, c: char) -> String {
        let key: String = c.to_lowercase().collect();
        match self.shift_map.get(&key) {
            Some(mapped) => mapped.clone(),
            None => c.to_uppercase().collect(),
        }
    }

    /// Runs the slip model over one segment of text.
    ///
    /// Shift engages at most once per call.
    pub fn apply(&self, text: &str, rng: &mut dyn RandomSource) -> String {
        let enter_rate = self.enter_rate.max(0.0);
        if enter_rate <= 0.0 || text.is_empty() {
            return text.to_string();
        }
        let exit_rate = self.exit_rate.max(0.0);

        let mut out = String::with_capacity(text.len());
        let mut held = enter_rate >= 1.0;
        let mut activated = held;
        let mut guaranteed = if held { self.min_hold } else { 0 };

        for c in text.chars() {
            if !activated && enter_rate < 1.0 && rng.random() < enter_rate {
                held = true;
                activated = true;
                guaranteed = self.min_hold;
            }
            if !held {
                out.push(c);
                continue;
            }
            out.push_str(&self.shifted(c));
            if guaranteed > 0 {
                guaranteed -= 1;
            } else if exit_rate >= 1.0 || (exit_rate > 0.0 && rng.random() < exit_rate) {
                held = false;
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypoAction {
    SwapAdjacent,
    Delete,
    InsertNeighbour,
    ReplaceNeighbour,
    RemoveSpace,
    InsertSpace,
    CollapseDuplicate,
    RepeatChar,
}

impl TypoAction {
    const ALL: [TypoAction; 8] = [
        TypoAction::SwapAdjacent,
        TypoAction::Delete,
        TypoAction::InsertNeighbour,
        TypoAction::ReplaceNeighbour,
        TypoAction::RemoveSpace,
        TypoAction::InsertSpace,
        TypoAction::CollapseDuplicate,
        TypoAction::RepeatChar,
    ];

    fn is_char_level(self) -> bool {
        matches!(
            self,
            TypoAction::SwapAdjacent
                | TypoAction::Delete
                | TypoAction::InsertNeighbour
                | TypoAction::ReplaceNeighbour
        )
    }
}

/// Keyboard typos: slipped, dropped, doubled and transposed keystrokes.
///
/// Performs `ceil(total_chars × rate)` change attempts. Each attempt draws
/// one of eight actions uniformly; attempts that find nothing to change are
/// spent anyway. Neighbour keys come from `layout`, optionally weighted by
/// the motor transition from the preceding character.
#[derive(Debug, Clone, PartialEq)]
pub struct Typo {
    /// Change attempts per character
    pub rate: f64,
    /// Neighbour map used for slipped keys
    pub layout: KeyNeighbourMap,
    /// Optional sticky-shift pass run before the typos
    pub shift_slip: Option<ShiftSlip>,
    /// Neighbour weighting
    pub motor_weighting: MotorWeighting,
}

impl Typo {
    /// Typo generator over the default layout with uniform neighbours.
    pub fn new(rate: f64) -> Self {
        Self {
            rate,
            layout: default_layout().clone(),
            shift_slip: None,
            motor_weighting: MotorWeighting::Uniform,
        }
    }

    fn neighbours(&self, c: char) -> Option<&[String]> {
        let mut utf8 = [0u8; 4];
        let key = c.to_ascii_lowercase().encode_utf8(&mut utf8);
        self.layout.get(key).map(Vec::as_slice)
    }

    fn pick_neighbour(
        &self,
        previous: char,
        neighbours: &[String],
        rng: &mut dyn RandomSource,
    ) -> Result<usize> {
        if self.motor_weighting == MotorWeighting::Uniform {
            return Ok(rng.range(neighbours.len())?);
        }
        let weights: SmallVec<[f64; 8]> = neighbours
            .iter()
            .map(|key| {
                let target = key.chars().next().unwrap_or(' ');
                self.motor_weighting.weight(classify_transition(previous, target))
            })
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Ok(rng.range(neighbours.len())?);
        }

        let threshold = rng.random() * total;
        let mut cumulative = 0.0;
        for (index, weight) in weights.iter().enumerate() {
            cumulative += weight;
            if cumulative >= threshold {
                return Ok(index);
            }
        }
        Ok(neighbours.len() - 1)
    }

    fn edit_word_chars(
        &self,
        action: TypoAction,
        chars: &mut Vec<char>,
        rng: &mut dyn RandomSource,
    ) -> Result<()> {
        let Some(idx) = draw_eligible_index(chars, rng)? else {
            return Ok(());
        };
        // eligible indices always have a neighbour on both sides
        let previous = chars[idx - 1];
        match action {
            TypoAction::SwapAdjacent => chars.swap(idx, idx + 1),
            TypoAction::Delete => {
                chars.remove(idx);
            }
            TypoAction::InsertNeighbour => {
                let inserted: SmallVec<[char; 4]> = match self.neighbours(chars[idx]) {
                    Some(keys) if !keys.is_empty() => {
                        let choice = self.pick_neighbour(previous, keys, rng)?;
                        keys[choice].chars().collect()
                    }
                    _ => {
                        rng.range(1)?;
                        SmallVec::from_elem(chars[idx], 1)
                    }
                };
                chars.splice(idx..idx, inserted);
            }
            TypoAction::ReplaceNeighbour => match self.neighbours(chars[idx]) {
                Some(keys) if !keys.is_empty() => {
                    let choice = self.pick_neighbour(previous, keys, rng)?;
                    let replacement: SmallVec<[char; 4]> = keys[choice].chars().collect();
                    if !replacement.is_empty() {
                        chars.splice(idx..idx + 1, replacement);
                    }
                }
                Some(_) => {
                    rng.range(1)?;
                }
                None => {}
            },
            _ => {}
        }
        Ok(())
    }
}

impl Default for Typo {
    fn default() -> Self {
        Self::new(0.02)
    }
}

fn eligible(chars: &[char], idx: usize) -> bool {
    idx > 0
        && idx + 1 < chars.len()
        && is_word_char(chars[idx - 1])
        && is_word_char(chars[idx])
        && is_word_char(chars[idx + 1])
}

/// Random probing first, then a circular scan from a random start.
fn draw_eligible_index(chars: &[char], rng: &mut dyn RandomSource) -> Result<Option<usize>> {
    let n = chars.len();
    if n == 0 {
        return Ok(None);
    }
    for _ in 0..ELIGIBLE_TRIES {
        let idx = rng.range(n)?;
        if eligible(chars, idx) {
            return Ok(Some(idx));
        }
    }
    let start = rng.range(n)?;
    Ok((0..n).map(|step| (start + step) % n).find(|&idx| eligible(chars, idx)))
}

fn remove_space(chars: &mut Vec<char>, rng: &mut dyn RandomSource) -> Result<()> {
    let spaces: SmallVec<[usize; 4]> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == ' ')
        .map(|(idx, _)| idx)
        .collect();
    if spaces.is_empty() {
        return Ok(());
    }
    let choice = rng.range(spaces.len())?;
    chars.remove(spaces[choice]);
    Ok(())
}

fn insert_space(chars: &mut Vec<char>, rng: &mut dyn RandomSource) -> Result<()> {
    if chars.len() < 2 {
        return Ok(());
    }
    let idx = rng.range(chars.len() - 1)? + 1;
    chars.insert(idx, ' ');
    Ok(())
}

fn collapse_duplicate(chars: &mut Vec<char>, rng: &mut dyn RandomSource) -> Result<()> {
    if chars.len() < 3 {
        return Ok(());
    }
    let mut matches: SmallVec<[usize; 4]> = SmallVec::new();
    let mut i = 0;
    while i + 2 < chars.len() {
        if chars[i] == chars[i + 1] && is_word_char(chars[i + 2]) {
            matches.push(i);
            i += 2;
        } else {
            i += 1;
        }
    }
    if matches.is_empty() {
        return Ok(());
    }
    let choice = rng.range(matches.len())?;
    chars.remove(matches[choice] + 1);
    Ok(())
}

fn repeat_char(chars: &mut Vec<char>, rng: &mut dyn RandomSource) -> Result<()> {
    let visible: SmallVec<[usize; 16]> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_whitespace())
        .map(|(idx, _)| idx)
        .collect();
    if visible.is_empty() {
        return Ok(());
    }
    let idx = visible[rng.range(visible.len())?];
    chars.insert(idx, chars[idx]);
    Ok(())
}

impl GlitchOp for Typo {
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()> {
        if let Some(slip) = &self.shift_slip {
            let mut slipped = Vec::new();
            for (index, segment) in buffer.segments().iter().enumerate() {
                let text = slip.apply(segment.text(), rng);
                if text != segment.text() {
                    slipped.push((index, text));
                }
            }
            if !slipped.is_empty() {
                buffer.replace_segments_bulk(slipped)?;
            }
        }

        let total_chars = buffer.char_len();
        if total_chars == 0 {
            return Ok(());
        }
        let rate = if self.rate.is_nan() { 0.0 } else { self.rate.max(0.0) };
        if rate <= 0.0 {
            return Ok(());
        }
        let max_changes = (total_chars as f64 * rate).ceil() as usize;

        let (mut words, mut separators) = (Vec::new(), Vec::new());
        for (index, segment) in buffer.segments().iter().enumerate() {
            match segment.kind() {
                SegmentKind::Word => words.push(index),
                SegmentKind::Separator => separators.push(index),
            }
        }

        let mut edited: HashMap<usize, Vec<char>> = HashMap::new();
        let segments = buffer.segments();
        for _ in 0..max_changes {
            let action = TypoAction::ALL[rng.range(TypoAction::ALL.len())?];
            let pool = if action == TypoAction::RemoveSpace {
                &separators
            } else {
                &words
            };
            if pool.is_empty() {
                continue;
            }
            let slot = pool[rng.range(pool.len())?];
            let chars = edited
                .entry(slot)
                .or_insert_with(|| segments[slot].text().chars().collect());

            match action {
                _ if action.is_char_level() => self.edit_word_chars(action, chars, rng)?,
                TypoAction::RemoveSpace => remove_space(chars, rng)?,
                TypoAction::InsertSpace => insert_space(chars, rng)?,
                TypoAction::CollapseDuplicate => collapse_duplicate(chars, rng)?,
                TypoAction::RepeatChar => repeat_char(chars, rng)?,
                _ => {}
            }
        }

        if edited.is_empty() {
            return Ok(());
        }
        tracing::trace!(segments = edited.len(), max_changes, "typo");

        let mut rebuilt = String::with_capacity(buffer.byte_len() + max_changes);
        for (slot, segment) in buffer.segments().iter().enumerate() {
            match edited.get(&slot) {
                Some(chars) => rebuilt.extend(chars.iter()),
                None => rebuilt.push_str(segment.text()),
            }
        }
        buffer.replace_char_range(0..buffer.byte_len(), &rebuilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garble_core::rng::Mt19937;

    use crate::glyph::keyboard::qwerty_shift_map;

    #[test]
    fn test_eligible_requires_word_neighbours() {
        let chars: Vec<char> = "a-bc".chars().collect();
        assert!(!eligible(&chars, 0));
        assert!(!eligible(&chars, 1));
        assert!(!eligible(&chars, 2));
        assert!(!eligible(&chars, 3));
        let chars: Vec<char> = "abc".chars().collect();
        assert!(eligible(&chars, 1));
    }

    #[test]
    fn test_draw_eligible_falls_back_to_scan() {
        let chars: Vec<char> = "x.y.abc".chars().collect();
        let mut rng = Mt19937::from_seed_int(3);
        assert_eq!(draw_eligible_index(&chars, &mut rng).unwrap(), Some(5));
        let chars: Vec<char> = "ab".chars().collect();
        assert_eq!(draw_eligible_index(&chars, &mut rng).unwrap(), None);
    }

    #[test]
    fn test_collapse_duplicate_removes_second_of_pair() {
        let mut chars: Vec<char> = "bookkeeper".chars().collect();
        let mut rng = Mt19937::from_seed_int(0);
        collapse_duplicate(&mut chars, &mut rng).unwrap();
        let out: String = chars.iter().collect();
        assert_eq!(out.chars().count(), 9);
        assert!(["bokkeeper", "bookeeper", "bookkeper"].contains(&out.as_str()), "{out}");
    }

    #[test]
    fn test_rate_zero_is_identity() {
        let mut buffer = TextBuffer::new("unchanged text here");
        Typo::new(0.0).apply(&mut buffer, &mut Mt19937::from_seed_int(1)).unwrap();
        assert_eq!(buffer.to_string(), "unchanged text here");
    }

    #[test]
    fn test_deterministic_for_seed() {
        let text = "The quick brown fox jumps over the lazy dog";
        let run = |seed| {
            let mut buffer = TextBuffer::new(text);
            Typo::new(0.2).apply(&mut buffer, &mut Mt19937::from_seed_int(seed)).unwrap();
            buffer.to_string()
        };
        assert_eq!(run(11), run(11));
        assert_ne!(run(11), text);
    }

    #[test]
    fn test_motor_weighting_keeps_determinism() {
        let op = Typo {
            motor_weighting: MotorWeighting::HastilyEdited,
            ..Typo::new(0.3)
        };
        let run = || {
            let mut buffer = TextBuffer::new("several ordinary words typed quickly");
            op.apply(&mut buffer, &mut Mt19937::from_seed_int(5)).unwrap();
            buffer.to_string()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_shift_slip_always_on() {
        let slip = ShiftSlip::new(1.0, 1.0, qwerty_shift_map());
        let mut rng = Mt19937::from_seed_int(0);
        // the guaranteed key, one more, then the release fires
        assert_eq!(slip.apply("ab1", &mut rng), "AB1");
        let slip = ShiftSlip::new(1.0, 0.0, qwerty_shift_map());
        assert_eq!(slip.apply("ab1;", &mut rng), "AB!:");
    }

    #[test]
    fn test_shift_slip_only_op_changes_case() {
        let op = Typo {
            shift_slip: Some(ShiftSlip::new(1.0, 0.0, qwerty_shift_map())),
            ..Typo::new(0.0)
        };
        let mut buffer = TextBuffer::new("hi there");
        op.apply(&mut buffer, &mut Mt19937::from_seed_int(0)).unwrap();
        assert_eq!(buffer.to_string(), "HI THERE");
    }
}
