//! Closed dispatch over every operation kind.
//!
//! Descriptors are decoded into an [`Operation`] once; applying it is a
//! single `match` with no string lookups.

use garble_core::buffer::TextBuffer;
use garble_core::rng::RandomSource;
use garble_core::Result;

use crate::glyph::{Homoglyph, OcrArtifacts, QuotePairs, Typo, ZeroWidth};
use crate::lexical::{Hokey, Homophones, Jargoyle, Pedant};
use crate::traits::GlitchOp;
use crate::word::{DeleteRandomWords, RedactWords, ReduplicateWords, RushmoreCombo, SwapAdjacentWords};

/// Any operation the engine can run.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Word stutter
    Reduplicate(ReduplicateWords),
    /// Word deletion
    Delete(DeleteRandomWords),
    /// Adjacent core swaps
    SwapAdjacent(SwapAdjacentWords),
    /// Ordered word-level stages
    RushmoreCombo(RushmoreCombo),
    /// Block-glyph redaction
    Redact(RedactWords),
    /// Recogniser confusions
    Ocr(OcrArtifacts),
    /// Keyboard typos
    Typo(Typo),
    /// Homoglyph swaps
    Mimic(Homoglyph),
    /// Invisible character injection
    ZeroWidth(ZeroWidth),
    /// Typographic quote pairing
    QuotePairs(QuotePairs),
    /// Expressive lengthening
    Hokey(Hokey),
    /// Homophone substitution
    Homophones(Homophones),
    /// Dictionary substitution
    Jargoyle(Jargoyle),
    /// Grammar hypercorrection
    Pedant(Pedant),
}

impl Operation {
    /// The descriptor tag this operation decodes from.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Reduplicate(_) => "reduplicate",
            Self::Delete(_) => "delete",
            Self::SwapAdjacent(_) => "swap_adjacent",
            Self::RushmoreCombo(_) => "rushmore_combo",
            Self::Redact(_) => "redact",
            Self::Ocr(_) => "ocr",
            Self::Typo(_) => "typo",
            Self::Mimic(_) => "mimic",
            Self::ZeroWidth(_) => "zwj",
            Self::QuotePairs(_) => "quote_pairs",
            Self::Hokey(_) => "hokey",
            Self::Homophones(_) => "wherewolf",
            Self::Jargoyle(_) => "jargoyle",
            Self::Pedant(_) => "pedant",
        }
    }

    fn as_op(&self) -> &dyn GlitchOp {
        match self {
            Self::Reduplicate(op) => op,
            Self::Delete(op) => op,
            Self::SwapAdjacent(op) => op,
            Self::RushmoreCombo(op) => op,
            Self::Redact(op) => op,
            Self::Ocr(op) => op,
            Self::Typo(op) => op,
            Self::Mimic(op) => op,
            Self::ZeroWidth(op) => op,
            Self::QuotePairs(op) => op,
            Self::Hokey(op) => op,
            Self::Homophones(op) => op,
            Self::Jargoyle(op) => op,
            Self::Pedant(op) => op,
        }
    }
}

impl GlitchOp for Operation {
    fn apply(&self, buffer: &mut TextBuffer, rng: &mut dyn RandomSource) -> Result<()> {
        self.as_op().apply(buffer, rng)
    }
}

macro_rules! impl_from_op {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Operation {
                fn from(op: $ty) -> Self {
                    Self::$variant(op)
                }
            }
        )*
    };
}

impl_from_op!(
    Reduplicate(ReduplicateWords),
    Delete(DeleteRandomWords),
    SwapAdjacent(SwapAdjacentWords),
    RushmoreCombo(RushmoreCombo),
    Redact(RedactWords),
    Ocr(OcrArtifacts),
    Typo(Typo),
    Mimic(Homoglyph),
    ZeroWidth(ZeroWidth),
    QuotePairs(QuotePairs),
    Hokey(Hokey),
    Homophones(Homophones),
    Jargoyle(Jargoyle),
    Pedant(Pedant),
);
