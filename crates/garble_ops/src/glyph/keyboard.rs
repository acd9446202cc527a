//! Keyboard geometry: neighbour maps, finger assignments and shift maps.
//!
//! Layouts are described by their four key rows, each indented by its
//! physical stagger. Two keys are neighbours when they touch on the
//! staggered grid. The `CURATOR_QWERTY` layout is a hand-tuned QWERTY map
//! and the default for typo generation.

use std::collections::HashMap;

use once_cell::sync::Lazy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Key → neighbouring keys.
pub type KeyNeighbourMap = HashMap<String, Vec<String>>;

/// Key → shifted glyph.
pub type ShiftMap = HashMap<String, String>;

const CURATOR_QWERTY: &[(&str, &str)] = &[
    ("a", "qwsz"),
    ("b", "vghn  "),
    ("c", "xdfv  "),
    ("d", "serfcx"),
    ("e", "wsdrf34"),
    ("f", "drtgvc"),
    ("g", "ftyhbv"),
    ("h", "gyujnb"),
    ("i", "ujko89"),
    ("j", "huikmn"),
    ("k", "jilom,"),
    ("l", "kop;.,"),
    ("m", "njk,  "),
    ("n", "bhjm  "),
    ("o", "iklp90"),
    ("p", "o0-[;l"),
    ("q", "was 12"),
    ("r", "edft45"),
    ("s", "awedxz"),
    ("t", "r56ygf"),
    ("u", "y78ijh"),
    ("v", "cfgb  "),
    ("w", "q23esa"),
    ("x", "zsdc  "),
    ("y", "t67uhg"),
    ("z", "asx"),
];

const ROW_LAYOUTS: &[(&str, [&str; 4])] = &[
    (
        "QWERTY",
        ["`1234567890-=", " qwertyuiop[]\\", "  asdfghjkl;'", "   zxcvbnm,./"],
    ),
    (
        "DVORAK",
        ["`1234567890[]\\", " ',.pyfgcrl/=\\", "  aoeuidhtns-", "   ;qjkxbmwvz"],
    ),
    (
        "COLEMAK",
        ["`1234567890-=", " qwfpgjluy;[]\\", "  arstdhneio'", "   zxcvbkm,./"],
    ),
    (
        "AZERTY",
        ["²&é\"'(-è_çà)=", " azertyuiop^$", "  qsdfghjklmù*", "   <wxcvbn,;:!"],
    ),
    (
        "QWERTZ",
        ["^1234567890ß´", " qwertzuiopü+", "  asdfghjklöä#", "   yxcvbnm,.-"],
    ),
];

const QWERTY_SHIFTED: &[(&str, &str)] = &[
    ("`", "~"),
    ("1", "!"),
    ("2", "@"),
    ("3", "#"),
    ("4", "$"),
    ("5", "%"),
    ("6", "^"),
    ("7", "&"),
    ("8", "*"),
    ("9", "("),
    ("0", ")"),
    ("-", "_"),
    ("=", "+"),
    ("[", "{"),
    ("]", "}"),
    ("\\", "|"),
    (";", ":"),
    ("'", "\""),
    (",", "<"),
    (".", ">"),
    ("/", "?"),
];

/// Builds a neighbour map from staggered key rows.
///
/// Each row is indented one column further than the row above, so a key
/// at `(row, col)` touches `(row - 1, col - 1)`, `(row - 1, col)`,
/// `(row, col ± 1)`, `(row + 1, col)` and `(row + 1, col + 1)`.
/// Spaces in the rows are padding, not keys.
pub fn neighbour_map_from_rows(rows: &[&str]) -> KeyNeighbourMap {
    let grid: Vec<Vec<char>> = rows.iter().map(|row| row.chars().collect()).collect();
    let key_at = |row: isize, col: isize| -> Option<char> {
        if row < 0 || col < 0 {
            return None;
        }
        grid.get(row as usize)
            .and_then(|cells| cells.get(col as usize))
            .copied()
            .filter(|c| *c != ' ')
    };

    let mut map = KeyNeighbourMap::new();
    for (r, cells) in grid.iter().enumerate() {
        for (c, &key) in cells.iter().enumerate() {
            if key == ' ' {
                continue;
            }
            let (row, col) = (r as isize, c as isize);
            let neighbours: Vec<String> = [
                (row - 1, col - 1),
                (row - 1, col),
                (row, col - 1),
                (row, col + 1),
                (row + 1, col),
                (row + 1, col + 1),
            ]
            .into_iter()
            .filter_map(|(nr, nc)| key_at(nr, nc))
            .map(String::from)
            .collect();
            map.entry(key.to_string()).or_insert(neighbours);
        }
    }
    map
}

static LAYOUTS: Lazy<HashMap<&'static str, KeyNeighbourMap>> = Lazy::new(|| {
    let mut layouts = HashMap::new();
    layouts.insert(
        "CURATOR_QWERTY",
        CURATOR_QWERTY
            .iter()
            .map(|(key, neighbours)| (key.to_string(), neighbours.chars().map(String::from).collect()))
            .collect(),
    );
    for (name, rows) in ROW_LAYOUTS {
        layouts.insert(*name, neighbour_map_from_rows(rows));
    }
    layouts
});

/// Looks up a built-in layout by name (case-insensitive).
///
/// Known names: `CURATOR_QWERTY`, `QWERTY`, `DVORAK`, `COLEMAK`, `AZERTY`,
/// `QWERTZ`.
pub fn builtin_layout(name: &str) -> Option<&'static KeyNeighbourMap> {
    LAYOUTS.get(name.to_ascii_uppercase().as_str())
}

/// The default typo layout.
pub fn default_layout() -> &'static KeyNeighbourMap {
    static DEFAULT: Lazy<KeyNeighbourMap> = Lazy::new(|| {
        builtin_layout("CURATOR_QWERTY").cloned().unwrap_or_default()
    });
    &DEFAULT
}

/// QWERTY shift map: shifted symbols plus upper-case letters.
pub fn qwerty_shift_map() -> ShiftMap {
    let mut map: ShiftMap = QWERTY_SHIFTED
        .iter()
        .map(|(key, shifted)| (key.to_string(), shifted.to_string()))
        .collect();
    for letter in 'a'..='z' {
        map.insert(letter.to_string(), letter.to_ascii_uppercase().to_string());
    }
    map
}

/// Motor-coordination weighting applied to neighbour choice.
///
/// The weights come from large-scale keystroke studies: `WetInk` models
/// errors that survive correction (same-finger slips are usually caught),
/// `HastilyEdited` models raw typing before correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MotorWeighting {
    /// Every neighbour equally likely
    #[default]
    Uniform,
    /// Uncorrected errors
    WetInk,
    /// Raw, uncorrected typing
    HastilyEdited,
}

impl MotorWeighting {
    /// Parses `uniform`, `wet_ink` or `hastily_edited` (hyphens allowed).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().replace('-', "_").as_str() {
            "uniform" => Some(Self::Uniform),
            "wet_ink" => Some(Self::WetInk),
            "hastily_edited" => Some(Self::HastilyEdited),
            _ => None,
        }
    }

    /// Weight multiplier for a key transition.
    pub fn weight(self, transition: Transition) -> f64 {
        match (self, transition) {
            (Self::Uniform, _) => 1.0,
            (Self::WetInk, Transition::SameFinger) => 0.858,
            (Self::WetInk, Transition::SameHand) => 0.965,
            (Self::HastilyEdited, Transition::SameFinger) => 3.031,
            (Self::HastilyEdited, Transition::SameHand) => 1.101,
            _ => 1.0,
        }
    }
}

/// Motor classification of a pair of consecutive keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same hand, same finger
    SameFinger,
    /// Same hand, different finger
    SameHand,
    /// Different hands
    CrossHand,
    /// Either key is the space bar
    Space,
    /// Either key is not on the finger map
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hand {
    Left,
    Right,
    Thumb,
}

/// Touch-typing (hand, finger) for a key; finger 0 is the pinky.
fn finger_for_char(c: char) -> Option<(Hand, u8)> {
    match c.to_ascii_lowercase() {
        '`' | '1' | 'q' | 'a' | 'z' | '~' | '!' => Some((Hand::Left, 0)),
        '2' | 'w' | 's' | 'x' | '@' => Some((Hand::Left, 1)),
        '3' | 'e' | 'd' | 'c' | '#' => Some((Hand::Left, 2)),
        '4' | 'r' | 'f' | 'v' | '5' | 't' | 'g' | 'b' | '$' | '%' => Some((Hand::Left, 3)),
        '6' | 'y' | 'h' | 'n' | '7' | 'u' | 'j' | 'm' | '^' | '&' => Some((Hand::Right, 3)),
        '8' | 'i' | 'k' | ',' | '*' | '<' => Some((Hand::Right, 2)),
        '9' | 'o' | 'l' | '.' | '(' | '>' => Some((Hand::Right, 1)),
        '0' | 'p' | ';' | '/' | '-' | '[' | '\'' | ')' | ':' | '?' | '_' | '{' | '"' | '='
        | ']' | '\\' | '+' | '}' | '|' => Some((Hand::Right, 0)),
        ' ' => Some((Hand::Thumb, 4)),
        _ => None,
    }
}

/// Classifies the transition from `previous` to `current`.
pub fn classify_transition(previous: char, current: char) -> Transition {
    let (Some((prev_hand, prev_finger)), Some((curr_hand, curr_finger))) =
        (finger_for_char(previous), finger_for_char(current))
    else {
        return Transition::Unknown;
    };
    if prev_hand == Hand::Thumb || curr_hand == Hand::Thumb {
        Transition::Space
    } else if prev_hand != curr_hand {
        Transition::CrossHand
    } else if prev_finger == curr_finger {
        Transition::SameFinger
    } else {
        Transition::SameHand
    }
}
