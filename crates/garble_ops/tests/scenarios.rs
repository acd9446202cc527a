//! End-to-end behaviour of individual operations on small inputs.

use garble_core::buffer::TextBuffer;
use garble_core::rng::Mt19937;
use garble_ops::{
    DeleteRandomWords, GlitchOp, Operation, Pedant, Placement, QuotePairs, RedactWords,
    ReduplicateWords, Stone, SwapAdjacentWords, ZeroWidth,
};
use proptest::prelude::*;

fn apply(op: &dyn GlitchOp, text: &str, seed: i128) -> String {
    let mut buffer = TextBuffer::new(text);
    op.apply(&mut buffer, &mut Mt19937::from_seed_int(seed))
        .unwrap();
    buffer.into_string()
}

#[test]
fn delete_full_rate_keeps_first_word() {
    let op = DeleteRandomWords {
        rate: 1.0,
        unweighted: false,
    };
    assert_eq!(apply(&op, "a b c d", 151), "a");
}

#[test]
fn redact_merge_joins_adjacent_runs() {
    let mut buffer = TextBuffer::new("███ ███");
    buffer.merge_repeated_char_words('█');
    assert_eq!(buffer.to_string(), "██████");

    let op = RedactWords {
        rate: 1.0,
        merge_adjacent: true,
        ..RedactWords::default()
    };
    assert_eq!(apply(&op, "abc def", 3), "██████");
}

#[test]
fn swap_full_rate_pairs_words() {
    let op = SwapAdjacentWords { rate: 1.0 };
    assert_eq!(apply(&op, "one two three four", 0), "two one four three");
    assert_eq!(apply(&op, "(one) two, three", 0), "(two) one, three");
}

#[test]
fn zero_width_grapheme_boundary_never_splits_marks() {
    let op = ZeroWidth {
        rate: 1.0,
        placement: Placement::GraphemeBoundary,
        ..ZeroWidth::default()
    };
    let text = "cafe\u{301} nai\u{308}ve re\u{301}sume\u{301}";
    for seed in 0..16 {
        let out = apply(&op, text, seed);
        let stripped: String = out
            .chars()
            .filter(|c| !['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}', '\u{2060}'].contains(c))
            .collect();
        assert_eq!(stripped, text);
        for mark in ['\u{301}', '\u{308}'] {
            for (index, c) in out.char_indices() {
                if c == mark {
                    let before = out[..index].chars().last();
                    assert!(
                        matches!(before, Some('e' | 'i')),
                        "seed {seed}: mark detached in {out:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn operations_compose_through_enum() {
    let ops: Vec<Operation> = vec![
        ReduplicateWords {
            rate: 0.0,
            unweighted: true,
        }
        .into(),
        QuotePairs.into(),
        Pedant {
            stone: Stone::Orthogonite,
        }
        .into(),
    ];
    let mut buffer = TextBuffer::new("say \"hi\" now");
    for op in &ops {
        op.apply(&mut buffer, &mut Mt19937::from_seed_int(1)).unwrap();
    }
    let out = buffer.to_string();
    assert!(out.starts_with("SAY "));
    assert!(!out.contains('"'));
}

proptest! {
    #[test]
    fn swap_preserves_word_multiset(words in prop::collection::vec("[a-z]{1,6}", 1..12), seed in 0i128..1000) {
        let text = words.join(" ");
        let op = SwapAdjacentWords { rate: 0.5 };
        let out = apply(&op, &text, seed);
        let mut before: Vec<&str> = text.split(' ').collect();
        let mut after: Vec<&str> = out.split(' ').collect();
        before.sort_unstable();
        after.sort_unstable();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn operations_are_deterministic(text in "[a-zA-Z ,.!]{0,60}", seed in 0i128..1000) {
        let ops: Vec<Operation> = vec![
            SwapAdjacentWords { rate: 0.5 }.into(),
            ZeroWidth { rate: 0.3, ..ZeroWidth::default() }.into(),
            DeleteRandomWords { rate: 0.3, unweighted: false }.into(),
        ];
        for op in &ops {
            prop_assert_eq!(apply(op, &text, seed), apply(op, &text, seed));
        }
    }
}
