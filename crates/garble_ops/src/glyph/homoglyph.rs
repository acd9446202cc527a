use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use once_cell::sync::Lazy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use garble_core::buffer::TextBuffer;
use garble_core::rng::RandomSource;
use garble_core::Result;

use crate::traits::GlitchOp;

/// Script of a glyph as recorded in the confusables table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Script {
    /// Latin letters and their extensions
    Latin,
    /// Greek and Coptic
    Greek,
    /// Cyrillic
    Cyrillic,
    /// Armenian
    Armenian,
    /// Number forms, letterlike symbols and anything unassigned to a script
    Common,
}

impl Script {
    /// Upper-case alias used in class selections.
    pub fn alias(self) -> &'static str {
        match self {
            Self::Latin => "LATIN",
            Self::Greek => "GREEK",
            Self::Cyrillic => "CYRILLIC",
            Self::Armenian => "ARMENIAN",
            Self::Common => "COMMON",
        }
    }

    /// Best-effort script of a character.
    pub fn of(c: char) -> Self {
        match c as u32 {
            0x41..=0x5A | 0x61..=0x7A | 0xC0..=0x24F | 0x1D00..=0x1D7F => Self::Latin,
            0x370..=0x3FF | 0x1F00..=0x1FFF => Self::Greek,
            0x400..=0x52F => Self::Cyrillic,
            0x530..=0x58F => Self::Armenian,
            _ => Self::Common,
        }
    }

    /// How plausible a substitution from `self` into `other` looks.
    pub fn affinity(self, other: Script) -> f64 {
        use Script::*;
        match (self, other) {
            (a, b) if a == b => 1.0,
            (Latin, Cyrillic) | (Cyrillic, Latin) => 0.9,
            (Greek, Cyrillic) | (Cyrillic, Greek) => 0.8,
            (Latin, Greek) | (Greek, Latin) => 0.75,
            _ => 0.5,
        }
    }
}

const DEFAULT_CLASSES: &[Script] = &[Script::Latin, Script::Greek, Script::Cyrillic];

const CONFUSABLES: &[(char, &[(char, Script)])] = &[
    ('a', &[('а', Script::Cyrillic), ('ɑ', Script::Latin), ('α', Script::Greek)]),
    ('b', &[('Ь', Script::Cyrillic), ('ƅ', Script::Latin)]),
    ('c', &[('с', Script::Cyrillic), ('ϲ', Script::Greek), ('ⅽ', Script::Common)]),
    ('d', &[('ԁ', Script::Cyrillic), ('ⅾ', Script::Common)]),
    ('e', &[('е', Script::Cyrillic), ('ҽ', Script::Cyrillic), ('℮', Script::Common)]),
    ('g', &[('ɡ', Script::Latin)]),
    ('h', &[('һ', Script::Cyrillic)]),
    ('i', &[('і', Script::Cyrillic), ('ι', Script::Greek), ('ⅰ', Script::Common)]),
    ('j', &[('ј', Script::Cyrillic), ('ϳ', Script::Greek)]),
    ('k', &[('к', Script::Cyrillic), ('κ', Script::Greek)]),
    ('l', &[('ӏ', Script::Cyrillic), ('ⅼ', Script::Common)]),
    ('m', &[('ⅿ', Script::Common)]),
    ('n', &[('ո', Script::Armenian)]),
    ('o', &[('о', Script::Cyrillic), ('ο', Script::Greek), ('օ', Script::Armenian)]),
    ('p', &[('р', Script::Cyrillic), ('ρ', Script::Greek)]),
    ('q', &[('ԛ', Script::Cyrillic)]),
    ('s', &[('ѕ', Script::Cyrillic)]),
    ('u', &[('υ', Script::Greek), ('ս', Script::Armenian)]),
    ('v', &[('ѵ', Script::Cyrillic), ('ν', Script::Greek), ('ⅴ', Script::Common)]),
    ('w', &[('ԝ', Script::Cyrillic)]),
    ('x', &[('х', Script::Cyrillic), ('ⅹ', Script::Common)]),
    ('y', &[('у', Script::Cyrillic), ('γ', Script::Greek)]),
    ('z', &[('ᴢ', Script::Latin)]),
    ('A', &[('А', Script::Cyrillic), ('Α', Script::Greek)]),
    ('B', &[('В', Script::Cyrillic), ('Β', Script::Greek)]),
    ('C', &[('С', Script::Cyrillic), ('Ϲ', Script::Greek), ('Ⅽ', Script::Common)]),
    ('E', &[('Е', Script::Cyrillic), ('Ε', Script::Greek)]),
    ('H', &[('Н', Script::Cyrillic), ('Η', Script::Greek)]),
    ('I', &[('І', Script::Cyrillic), ('Ι', Script::Greek), ('Ⅰ', Script::Common)]),
    ('J', &[('Ј', Script::Cyrillic)]),
    ('K', &[('К', Script::Cyrillic), ('Κ', Script::Greek), ('K', Script::Common)]),
    ('M', &[('М', Script::Cyrillic), ('Μ', Script::Greek), ('Ⅿ', Script::Common)]),
    ('N', &[('Ν', Script::Greek)]),
    ('O', &[('О', Script::Cyrillic), ('Ο', Script::Greek)]),
    ('P', &[('Р', Script::Cyrillic), ('Ρ', Script::Greek)]),
    ('S', &[('Ѕ', Script::Cyrillic)]),
    ('T', &[('Т', Script::Cyrillic), ('Τ', Script::Greek)]),
    ('X', &[('Х', Script::Cyrillic), ('Χ', Script::Greek)]),
    ('Y', &[('Ү', Script::Cyrillic), ('Υ', Script::Greek)]),
    ('Z', &[('Ζ', Script::Greek)]),
    ('0', &[('О', Script::Cyrillic), ('Ο', Script::Greek)]),
    ('1', &[('l', Script::Latin), ('ӏ', Script::Cyrillic)]),
    ('3', &[('З', Script::Cyrillic)]),
    ('6', &[('б', Script::Cyrillic)]),
];

static TABLE: Lazy<HashMap<char, &'static [(char, Script)]>> =
    Lazy::new(|| CONFUSABLES.iter().copied().collect());

/// Scripts a homoglyph substitution may draw from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClassSelection {
    /// Latin, Greek and Cyrillic
    #[default]
    Default,
    /// Every script in the table
    All,
    /// Only the named script aliases
    Specific(Vec<String>),
}

impl ClassSelection {
    /// Builds a selection from alias names; `"all"` anywhere selects every script.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut specific = Vec::new();
        for name in names {
            let name = name.as_ref();
            if name.eq_ignore_ascii_case("all") {
                return Self::All;
            }
            specific.push(name.to_ascii_uppercase());
        }
        Self::Specific(specific)
    }

    fn allows(&self, script: Script) -> bool {
        match self {
            Self::Default => DEFAULT_CLASSES.contains(&script),
            Self::All => true,
            Self::Specific(names) => names.iter().any(|name| name == script.alias()),
        }
    }
}

/// Swaps characters for visually confusable glyphs from other scripts.
///
/// `trunc(candidates × rate)` substitutions are attempted; targets are drawn
/// without replacement. A target is passed over when no glyph survives the
/// class and ban filters, or when substituting it would create a run of more
/// than `max_consecutive` adjacent substituted characters.
///
/// # Examples
///
/// ```
/// use garble_core::buffer::TextBuffer;
/// use garble_core::rng::Mt19937;
/// use garble_ops::{GlitchOp, Homoglyph};
///
/// let mut buffer = TextBuffer::new("hello");
/// Homoglyph { rate: 1.0, ..Homoglyph::default() }
///     .apply(&mut buffer, &mut Mt19937::from_seed_int(42))
///     .unwrap();
/// assert_ne!(buffer.to_string(), "hello");
/// assert_eq!(buffer.char_len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Homoglyph {
    /// Fraction of candidate characters to substitute
    pub rate: f64,
    /// Allowed source scripts for replacement glyphs
    pub classes: ClassSelection,
    /// Glyphs never used as replacements
    pub banned_characters: Vec<String>,
    /// Longest run of adjacent substitutions (0 = unlimited)
    pub max_consecutive: usize,
    /// Weight replacement glyphs by script affinity instead of uniformly
    pub script_affinity: bool,
}

impl Default for Homoglyph {
    fn default() -> Self {
        Self {
            rate: 0.02,
            classes: ClassSelection::Default,
            banned_characters: Vec::new(),
            max_consecutive: 3,
            script_affinity: false,
        }
    }
}

struct Target {
    global: usize,
    segment: usize,
    local: usize,
    original: char,
}

/// Length of the run `position` would join.
fn run_through(taken: &BTreeSet<usize>, position: usize) -> usize {
    let left = (0..position).rev().take_while(|p| taken.contains(p)).count();
    let right = (position + 1..).take_while(|p| taken.contains(p)).count();
    left + 1 + right
}

impl Homoglyph {
    fn choose(
        &self,
        original: char,
        options: &[(char, Script)],
        rng: &mut dyn RandomSource,
    ) -> Result<char> {
        if !self.script_affinity {
            return Ok(options[rng.range(options.len())?].0);
        }
        let source = Script::of(original);
        let total: f64 = options.iter().map(|(_, script)| source.affinity(*script)).sum();
        let threshold = rng.random() * total;
        let mut cumulative = 0.0;
        for &(glyph, script) in options {
            cumulative += source.affinity(script);
            if cumulative >= threshold {
                return Ok(glyph);
            }
        }
        Ok(options[options.len() - 1].0)
    }
}

impl GlitchOp for Homoglyph {
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()> {
        let rate = if self.rate.is_nan() { 0.0 } else { self.rate.max(0.0) };
        if rate == 0.0 {
            return Ok(());
        }

        let mut targets: Vec<Target> = Vec::new();
        for (segment, seg) in buffer.segments().iter().enumerate() {
            let base = seg.span().char_start;
            for (local, c) in seg.text().chars().enumerate() {
                if c.is_alphanumeric() && TABLE.contains_key(&c) {
                    targets.push(Target {
                        global: base + local,
                        segment,
                        local,
                        original: c,
                    });
                }
            }
        }
        if targets.is_empty() {
            return Ok(());
        }

        let banned: HashSet<&str> = self
            .banned_characters
            .iter()
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .collect();
        let requested = (targets.len() as f64 * rate).trunc() as usize;

        let mut taken = BTreeSet::new();
        let mut edits: BTreeMap<usize, Vec<(usize, char)>> = BTreeMap::new();
        let mut applied = 0usize;
        while applied < requested && !targets.is_empty() {
            let target = targets.swap_remove(rng.range(targets.len())?);
            let Some(options) = TABLE.get(&target.original) else {
                continue;
            };
            let mut utf8 = [0u8; 4];
            let options: Vec<(char, Script)> = options
                .iter()
                .copied()
                .filter(|(glyph, script)| {
                    self.classes.allows(*script)
                        && *glyph != target.original
                        && !banned.contains(&*glyph.encode_utf8(&mut utf8))
                })
                .collect();
            if options.is_empty() {
                continue;
            }
            if self.max_consecutive > 0 && run_through(&taken, target.global) > self.max_consecutive {
                continue;
            }

            let glyph = self.choose(target.original, &options, rng)?;
            taken.insert(target.global);
            edits.entry(target.segment).or_default().push((target.local, glyph));
            applied += 1;
        }
        if edits.is_empty() {
            return Ok(());
        }
        tracing::trace!(requested, applied, "homoglyph");

        let mut replacements = Vec::with_capacity(edits.len());
        for (segment, swaps) in edits {
            let swaps: HashMap<usize, char> = swaps.into_iter().collect();
            let text: String = buffer.segments()[segment]
                .text()
                .chars()
                .enumerate()
                .map(|(local, c)| swaps.get(&local).copied().unwrap_or(c))
                .collect();
            replacements.push((segment, text));
        }
        buffer.replace_segments_bulk(replacements)
    }
}
