//! Serialisable operation descriptors.
//!
//! A descriptor is `{"name": ..., "type": "<kind>", ...params}`. The `type`
//! tag selects the [`OperationSpec`] variant; decoding into a live
//! [`Operation`] happens once, in [`Descriptor::build`].

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use garble_ops::glyph::keyboard::{builtin_layout, default_layout, qwerty_shift_map};
use garble_ops::{
    ClassSelection, DeleteRandomWords, DriftMode, Hokey, HomophoneWeighting, Homophones, Homoglyph,
    Jargoyle, MotorWeighting, OcrArtifacts, Operation, Pedant, Placement, QuotePairs, RedactWords,
    ReduplicateWords, RushmoreCombo, RushmoreMode, ShiftSlip, Stone, SwapAdjacentWords, Typo,
    Visibility, ZeroWidth,
};

/// Every `type` tag the engine decodes, aliases included.
pub const SUPPORTED_KINDS: &[&str] = &[
    "reduplicate",
    "delete",
    "swap_adjacent",
    "rushmore_combo",
    "redact",
    "ocr",
    "typo",
    "mimic",
    "zwj",
    "quote_pairs",
    "apostrofae",
    "hokey",
    "wherewolf",
    "ekkokin",
    "jargoyle",
    "pedant",
];

/// Whether `kind` names a decodable operation.
pub fn is_supported_kind(kind: &str) -> bool {
    SUPPORTED_KINDS.contains(&kind)
}

/// A descriptor that decoded but cannot become an operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DescriptorError {
    /// The entry has no name to derive a seed from.
    #[error("descriptor name must not be empty")]
    EmptyName,

    /// A numeric parameter is NaN or infinite.
    #[error("parameter '{field}' must be finite, got {value}")]
    NonFinite {
        /// Parameter name
        field: &'static str,
        /// Offending value
        value: f64,
    },

    /// A numeric parameter is negative.
    #[error("parameter '{field}' must not be negative, got {value}")]
    Negative {
        /// Parameter name
        field: &'static str,
        /// Offending value
        value: f64,
    },

    /// The typo layout name is not built in.
    #[error("unknown keyboard layout: {0}")]
    UnknownLayout(String),
}

fn check_rate(field: &'static str, value: f64) -> Result<f64, DescriptorError> {
    if !value.is_finite() {
        return Err(DescriptorError::NonFinite { field, value });
    }
    if value < 0.0 {
        return Err(DescriptorError::Negative { field, value });
    }
    Ok(value)
}

/// A named operation descriptor.
///
/// # Examples
///
/// ```
/// use garble_pipeline::Descriptor;
///
/// let descriptor: Descriptor =
///     serde_json::from_str(r#"{"name": "Typogre", "type": "typo", "rate": 0.05}"#).unwrap();
/// assert_eq!(descriptor.build().unwrap().kind(), "typo");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Name used for seed derivation
    pub name: String,
    /// Kind and parameters
    #[serde(flatten)]
    pub operation: OperationSpec,
}

impl Descriptor {
    /// Creates a descriptor.
    pub fn new(name: impl Into<String>, operation: OperationSpec) -> Self {
        Self {
            name: name.into(),
            operation,
        }
    }

    /// Validates and decodes into a live operation.
    ///
    /// # Errors
    /// See [`DescriptorError`].
    pub fn build(&self) -> Result<Operation, DescriptorError> {
        if self.name.trim().is_empty() {
            return Err(DescriptorError::EmptyName);
        }
        self.operation.build()
    }
}

/// Rate-and-weighting parameters of a word stage in a combo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WordStage {
    /// Stage rate
    pub rate: f64,
    /// Select uniformly
    #[serde(default)]
    pub unweighted: bool,
}

/// Rate of the swap stage in a combo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwapStage {
    /// Stage rate
    pub rate: f64,
}

/// A typo layout: a built-in name or an explicit neighbour map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayoutSpec {
    /// Built-in layout name such as `"QWERTY"`
    Named(String),
    /// Key → neighbouring keys
    Custom(HashMap<String, Vec<String>>),
}

/// Homoglyph script classes: `"all"` or a list of aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassesSpec {
    /// A single alias, or `"all"`
    One(String),
    /// Several aliases
    Many(Vec<String>),
}

fn default_redaction_char() -> char {
    '█'
}

fn default_mimic_cap() -> usize {
    3
}

fn default_zero_width_cap() -> usize {
    4
}

fn default_extension_min() -> usize {
    2
}

fn default_extension_max() -> usize {
    5
}

fn default_word_length_threshold() -> usize {
    6
}

fn default_base_p() -> f64 {
    0.45
}

/// Operation kind and parameters, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationSpec {
    /// Word stutter
    Reduplicate {
        /// Target fraction of words
        rate: f64,
        /// Select uniformly
        #[serde(default)]
        unweighted: bool,
    },
    /// Word deletion
    Delete {
        /// Target fraction of words
        rate: f64,
        /// Select uniformly
        #[serde(default)]
        unweighted: bool,
    },
    /// Adjacent core swaps
    SwapAdjacent {
        /// Per-pair probability
        rate: f64,
    },
    /// Ordered word stages
    RushmoreCombo {
        /// Stage order
        modes: Vec<RushmoreMode>,
        /// Delete stage
        #[serde(default)]
        delete: Option<WordStage>,
        /// Reduplicate stage
        #[serde(default)]
        duplicate: Option<WordStage>,
        /// Swap stage
        #[serde(default)]
        swap: Option<SwapStage>,
    },
    /// Block-glyph redaction
    Redact {
        /// Redaction glyph
        #[serde(default = "default_redaction_char")]
        replacement_char: char,
        /// Fraction of candidates
        rate: f64,
        /// Merge adjacent redactions
        #[serde(default)]
        merge_adjacent: bool,
        /// Select uniformly
        #[serde(default)]
        unweighted: bool,
    },
    /// Recogniser confusions
    Ocr {
        /// Fraction of matches replaced
        rate: f64,
    },
    /// Keyboard typos
    Typo {
        /// Changes per character
        rate: f64,
        /// Layout name or neighbour map
        #[serde(default)]
        layout: Option<LayoutSpec>,
        /// Chance of pressing shift per character; zero disables slips
        #[serde(default)]
        shift_slip_rate: f64,
        /// Chance of releasing shift; defaults to half the slip rate
        #[serde(default)]
        shift_slip_exit_rate: Option<f64>,
        /// Shifted glyph per key; defaults to QWERTY
        #[serde(default)]
        shift_map: Option<HashMap<String, String>>,
        /// Neighbour weighting
        #[serde(default)]
        motor_weighting: MotorWeighting,
    },
    /// Homoglyph swaps
    Mimic {
        /// Fraction of candidate characters
        rate: f64,
        /// Script classes
        #[serde(default)]
        classes: Option<ClassesSpec>,
        /// Glyphs never inserted
        #[serde(default)]
        banned_characters: Vec<String>,
        /// Longest run of adjacent substitutions; zero is unlimited
        #[serde(default = "default_mimic_cap")]
        max_consecutive: usize,
        /// Weight glyphs by script closeness
        #[serde(default)]
        script_affinity: bool,
    },
    /// Invisible character injection
    Zwj {
        /// Fraction of eligible positions
        rate: f64,
        /// Explicit palette overriding `visibility`
        #[serde(default)]
        characters: Vec<String>,
        /// Palette level
        #[serde(default)]
        visibility: Visibility,
        /// Placement policy
        #[serde(default)]
        placement: Placement,
        /// Longest run of adjacent insertions; zero is unlimited
        #[serde(default = "default_zero_width_cap")]
        max_consecutive: usize,
    },
    /// Typographic quote pairing
    #[serde(alias = "apostrofae")]
    QuotePairs {},
    /// Expressive lengthening
    Hokey {
        /// Share of candidates stretched
        rate: f64,
        /// Fewest extra copies
        #[serde(default = "default_extension_min")]
        extension_min: usize,
        /// Most extra copies
        #[serde(default = "default_extension_max")]
        extension_max: usize,
        /// Letter count above which stretching is damped
        #[serde(default = "default_word_length_threshold")]
        word_length_threshold: usize,
        /// Sampler success probability
        #[serde(default = "default_base_p")]
        base_p: f64,
    },
    /// Homophone substitution
    #[serde(alias = "ekkokin")]
    Wherewolf {
        /// Replacement probability
        rate: f64,
        /// Choice among alternatives
        #[serde(default)]
        weighting: HomophoneWeighting,
    },
    /// Dictionary substitution
    Jargoyle {
        /// Lower-case word → alternatives
        #[serde(default)]
        lexemes: BTreeMap<String, Vec<String>>,
        /// Alternative selection
        #[serde(default)]
        mode: DriftMode,
        /// Fraction of candidates
        rate: f64,
    },
    /// Grammar hypercorrection
    Pedant {
        /// Hypercorrection form
        stone: Stone,
    },
}

impl OperationSpec {
    /// The canonical `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Reduplicate { .. } => "reduplicate",
            Self::Delete { .. } => "delete",
            Self::SwapAdjacent { .. } => "swap_adjacent",
            Self::RushmoreCombo { .. } => "rushmore_combo",
            Self::Redact { .. } => "redact",
            Self::Ocr { .. } => "ocr",
            Self::Typo { .. } => "typo",
            Self::Mimic { .. } => "mimic",
            Self::Zwj { .. } => "zwj",
            Self::QuotePairs {} => "quote_pairs",
            Self::Hokey { .. } => "hokey",
            Self::Wherewolf { .. } => "wherewolf",
            Self::Jargoyle { .. } => "jargoyle",
            Self::Pedant { .. } => "pedant",
        }
    }

    /// Validates parameters and decodes into a live operation.
    ///
    /// # Errors
    /// See [`DescriptorError`].
    pub fn build(&self) -> Result<Operation, DescriptorError> {
        let operation = match self {
            Self::Reduplicate { rate, unweighted } => ReduplicateWords {
                rate: check_rate("rate", *rate)?,
                unweighted: *unweighted,
            }
            .into(),
            Self::Delete { rate, unweighted } => DeleteRandomWords {
                rate: check_rate("rate", *rate)?,
                unweighted: *unweighted,
            }
            .into(),
            Self::SwapAdjacent { rate } => SwapAdjacentWords {
                rate: check_rate("rate", *rate)?,
            }
            .into(),
            Self::RushmoreCombo {
                modes,
                delete,
                duplicate,
                swap,
            } => RushmoreCombo {
                modes: modes.clone(),
                delete: delete
                    .map(|stage| {
                        Ok::<_, DescriptorError>(DeleteRandomWords {
                            rate: check_rate("delete.rate", stage.rate)?,
                            unweighted: stage.unweighted,
                        })
                    })
                    .transpose()?,
                duplicate: duplicate
                    .map(|stage| {
                        Ok::<_, DescriptorError>(ReduplicateWords {
                            rate: check_rate("duplicate.rate", stage.rate)?,
                            unweighted: stage.unweighted,
                        })
                    })
                    .transpose()?,
                swap: swap
                    .map(|stage| {
                        Ok::<_, DescriptorError>(SwapAdjacentWords {
                            rate: check_rate("swap.rate", stage.rate)?,
                        })
                    })
                    .transpose()?,
            }
            .into(),
            Self::Redact {
                replacement_char,
                rate,
                merge_adjacent,
                unweighted,
            } => RedactWords {
                replacement_char: *replacement_char,
                rate: check_rate("rate", *rate)?,
                merge_adjacent: *merge_adjacent,
                unweighted: *unweighted,
            }
            .into(),
            Self::Ocr { rate } => OcrArtifacts {
                rate: check_rate("rate", *rate)?,
            }
            .into(),
            Self::Typo {
                rate,
                layout,
                shift_slip_rate,
                shift_slip_exit_rate,
                shift_map,
                motor_weighting,
            } => {
                let layout = match layout {
                    None => default_layout().clone(),
                    Some(LayoutSpec::Named(name)) => builtin_layout(name)
                        .cloned()
                        .ok_or_else(|| DescriptorError::UnknownLayout(name.clone()))?,
                    Some(LayoutSpec::Custom(map)) => map.clone(),
                };
                let enter = check_rate("shift_slip_rate", *shift_slip_rate)?;
                let shift_slip = if enter > 0.0 {
                    let exit = match shift_slip_exit_rate {
                        Some(exit) => check_rate("shift_slip_exit_rate", *exit)?,
                        None => enter * 0.5,
                    };
                    let map = shift_map.clone().unwrap_or_else(qwerty_shift_map);
                    Some(ShiftSlip::new(enter, exit, map))
                } else {
                    None
                };
                Typo {
                    rate: check_rate("rate", *rate)?,
                    layout,
                    shift_slip,
                    motor_weighting: *motor_weighting,
                }
                .into()
            }
            Self::Mimic {
                rate,
                classes,
                banned_characters,
                max_consecutive,
                script_affinity,
            } => Homoglyph {
                rate: check_rate("rate", *rate)?,
                classes: match classes {
                    None => ClassSelection::Default,
                    Some(ClassesSpec::One(name)) => ClassSelection::from_names([name]),
                    Some(ClassesSpec::Many(names)) => ClassSelection::from_names(names),
                },
                banned_characters: banned_characters.clone(),
                max_consecutive: *max_consecutive,
                script_affinity: *script_affinity,
            }
            .into(),
            Self::Zwj {
                rate,
                characters,
                visibility,
                placement,
                max_consecutive,
            } => ZeroWidth {
                rate: check_rate("rate", *rate)?,
                characters: characters.clone(),
                visibility: *visibility,
                placement: *placement,
                max_consecutive: *max_consecutive,
            }
            .into(),
            Self::QuotePairs {} => QuotePairs.into(),
            Self::Hokey {
                rate,
                extension_min,
                extension_max,
                word_length_threshold,
                base_p,
            } => Hokey {
                rate: check_rate("rate", *rate)?,
                extension_min: *extension_min,
                extension_max: *extension_max,
                word_length_threshold: *word_length_threshold,
                base_p: check_rate("base_p", *base_p)?,
            }
            .into(),
            Self::Wherewolf { rate, weighting } => Homophones {
                rate: check_rate("rate", *rate)?,
                weighting: *weighting,
            }
            .into(),
            Self::Jargoyle {
                lexemes,
                mode,
                rate,
            } => Jargoyle {
                lexemes: lexemes.clone(),
                mode: *mode,
                rate: check_rate("rate", *rate)?,
            }
            .into(),
            Self::Pedant { stone } => Pedant { stone: *stone }.into(),
        };
        Ok(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Descriptor {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults_fill_optional_parameters() {
        let descriptor = decode(r#"{"name": "Redactyl", "type": "redact", "rate": 0.5}"#);
        assert_eq!(
            descriptor.operation,
            OperationSpec::Redact {
                replacement_char: '█',
                rate: 0.5,
                merge_adjacent: false,
                unweighted: false,
            }
        );
    }

    #[test]
    fn test_aliases_decode_to_canonical_kind() {
        let quotes = decode(r#"{"name": "Apostrofae", "type": "apostrofae"}"#);
        assert_eq!(quotes.operation.kind(), "quote_pairs");
        let homophones = decode(r#"{"name": "Ekkokin", "type": "ekkokin", "rate": 0.1}"#);
        assert_eq!(homophones.operation.kind(), "wherewolf");
    }

    #[test]
    fn test_unknown_kind_fails_to_decode() {
        let result: Result<Descriptor, _> =
            serde_json::from_str(r#"{"name": "X", "type": "teleport", "rate": 0.1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_typo_layout_and_slip() {
        let descriptor = decode(
            r#"{"name": "Typogre", "type": "typo", "rate": 0.1, "layout": "dvorak", "shift_slip_rate": 0.2}"#,
        );
        match descriptor.build().unwrap() {
            Operation::Typo(typo) => {
                let slip = typo.shift_slip.unwrap();
                assert_eq!(slip.enter_rate, 0.2);
                assert_eq!(slip.exit_rate, 0.1);
                assert_eq!(&typo.layout, builtin_layout("DVORAK").unwrap());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unknown_layout_is_rejected() {
        let descriptor = decode(r#"{"name": "Typogre", "type": "typo", "rate": 0.1, "layout": "klingon"}"#);
        assert_eq!(
            descriptor.build().unwrap_err(),
            DescriptorError::UnknownLayout("klingon".to_string())
        );
    }

    #[test]
    fn test_invalid_rates_are_rejected() {
        let negative = Descriptor::new("Rushmore", OperationSpec::Delete { rate: -0.1, unweighted: false });
        assert!(matches!(negative.build(), Err(DescriptorError::Negative { .. })));
        let nan = Descriptor::new("Rushmore", OperationSpec::SwapAdjacent { rate: f64::NAN });
        assert!(matches!(nan.build(), Err(DescriptorError::NonFinite { .. })));
        let unnamed = Descriptor::new(" ", OperationSpec::QuotePairs {});
        assert_eq!(unnamed.build().unwrap_err(), DescriptorError::EmptyName);
    }

    #[test]
    fn test_pedant_stone_by_name() {
        let descriptor = decode(r#"{"name": "Pedant", "type": "pedant", "stone": "Whom Stone"}"#);
        assert_eq!(
            descriptor.build().unwrap(),
            Operation::Pedant(Pedant { stone: Stone::WhomStone })
        );
    }

    #[test]
    fn test_every_supported_kind_is_known() {
        for kind in SUPPORTED_KINDS {
            assert!(is_supported_kind(kind));
        }
        assert!(!is_supported_kind("teleport"));
    }

    #[test]
    fn test_toml_combo_decodes() {
        let text = r#"
name = "Rushmore"
type = "rushmore_combo"
modes = ["swap", "delete"]
delete = { rate = 0.1, unweighted = true }
swap = { rate = 0.5 }
"#;
        let descriptor: Descriptor = toml::from_str(text).unwrap();
        assert_eq!(
            descriptor,
            Descriptor::new(
                "Rushmore",
                OperationSpec::RushmoreCombo {
                    modes: vec![RushmoreMode::Swap, RushmoreMode::Delete],
                    delete: Some(WordStage { rate: 0.1, unweighted: true }),
                    duplicate: None,
                    swap: Some(SwapStage { rate: 0.5 }),
                },
            )
        );
    }
}
