//! Tests for the text buffer.

use super::*;
use proptest::prelude::*;

fn assert_spans_consistent(buffer: &TextBuffer) {
    let mut byte_pos = 0;
    let mut char_pos = 0;
    for segment in buffer.segments() {
        let span = segment.span();
        assert_eq!(span.byte_start, byte_pos);
        assert_eq!(span.char_start, char_pos);
        assert_eq!(span.byte_len(), segment.text().len());
        assert_eq!(span.char_len(), segment.text().chars().count());
        byte_pos = span.byte_end;
        char_pos = span.char_end;
    }
    assert_eq!(buffer.byte_len(), byte_pos);
    assert_eq!(buffer.char_len(), char_pos);
}

// ========================================
// Tokenisation
// ========================================

#[test]
fn test_tokenize_alternates() {
    let buffer = TextBuffer::new("  Hello,\tworld!  ");
    let kinds: Vec<SegmentKind> = buffer.segments().iter().map(Segment::kind).collect();
    assert_eq!(
        kinds,
        vec![
            SegmentKind::Separator,
            SegmentKind::Word,
            SegmentKind::Separator,
            SegmentKind::Word,
            SegmentKind::Separator,
        ]
    );
    assert_eq!(buffer.word_count(), 2);
    assert_eq!(buffer.word(0).unwrap(), "Hello,");
    assert_eq!(buffer.word(1).unwrap(), "world!");
}

#[test]
fn test_empty_buffer() {
    let buffer = TextBuffer::new("");
    assert!(buffer.is_empty());
    assert_eq!(buffer.word_count(), 0);
    assert_eq!(buffer.segments().len(), 0);
    assert_eq!(buffer.to_string(), "");
}

#[test]
fn test_spans_track_multibyte_text() {
    let buffer = TextBuffer::new("naïve café");
    let second = buffer.word_segment(1).unwrap().span();
    assert_eq!(second.char_start, 6);
    assert_eq!(second.byte_start, 7);
    assert_eq!(buffer.char_len(), 10);
    assert_eq!(buffer.byte_len(), 12);
}

#[test]
fn test_segments_with_word_indices() {
    let buffer = TextBuffer::new("a b c");
    let indices: Vec<Option<usize>> = buffer
        .segments_with_word_indices()
        .map(|(index, _)| index)
        .collect();
    assert_eq!(indices, vec![Some(0), None, Some(1), None, Some(2)]);
}

// ========================================
// Word-level edits
// ========================================

#[test]
fn test_replace_word_shifts_spans() {
    let mut buffer = TextBuffer::new("one two three");
    buffer.replace_word(0, "uno").unwrap();
    buffer.replace_word(1, "dos-dos").unwrap();
    assert_eq!(buffer.to_string(), "uno dos-dos three");
    assert_spans_consistent(&buffer);
}

#[test]
fn test_replace_word_out_of_range() {
    let mut buffer = TextBuffer::new("one two");
    let err = buffer.replace_word(2, "x").unwrap_err();
    assert_eq!(err, GarbleError::word_index(2, 2));
    assert_eq!(buffer.to_string(), "one two");
}

#[test]
fn test_delete_word_removes_following_separator() {
    let mut buffer = TextBuffer::new("a b c");
    buffer.delete_word(0).unwrap();
    assert_eq!(buffer.to_string(), "b c");
    buffer.delete_word(1).unwrap();
    assert_eq!(buffer.to_string(), "b");
    assert_eq!(buffer.word_count(), 1);
    assert_spans_consistent(&buffer);
}

#[test]
fn test_spans_follow_middle_and_tail_edits() {
    let mut buffer = TextBuffer::new("alpha beta gamma delta");
    buffer.replace_word(1, "β").unwrap();
    assert_spans_consistent(&buffer);
    buffer.delete_word(3).unwrap();
    assert_eq!(buffer.to_string(), "alpha β gamma");
    assert_spans_consistent(&buffer);
    buffer.insert_word_after(2, "ω", None).unwrap();
    assert_eq!(buffer.to_string(), "alpha β gamma ω");
    assert_eq!(buffer.char_len(), 15);
    assert_spans_consistent(&buffer);
}

#[test]
fn test_delete_only_word() {
    let mut buffer = TextBuffer::new("solo");
    buffer.delete_word(0).unwrap();
    assert!(buffer.is_empty());
}

#[test]
fn test_insert_word_after() {
    let mut buffer = TextBuffer::new("hello world");
    buffer.insert_word_after(0, "there", None).unwrap();
    buffer.insert_word_after(2, "again", Some("\n")).unwrap();
    assert_eq!(buffer.to_string(), "hello there world\nagain");
    assert_eq!(buffer.word_count(), 4);
    assert_spans_consistent(&buffer);
}

// ========================================
// Bulk edits
// ========================================

#[test]
fn test_replace_words_bulk() {
    let mut buffer = TextBuffer::new("the quick brown fox");
    buffer
        .replace_words_bulk(vec![(3, "cat".to_string()), (1, "slow".to_string())])
        .unwrap();
    assert_eq!(buffer.to_string(), "the slow brown cat");
    assert_spans_consistent(&buffer);
}

#[test]
fn test_replace_words_bulk_is_all_or_nothing() {
    let mut buffer = TextBuffer::new("the quick brown fox");
    let result = buffer.replace_words_bulk(vec![(0, "a".to_string()), (9, "b".to_string())]);
    assert_eq!(result, Err(GarbleError::word_index(9, 4)));
    assert_eq!(buffer.to_string(), "the quick brown fox");
}

#[test]
fn test_replace_segments_bulk() {
    let mut buffer = TextBuffer::new("a b");
    buffer
        .replace_segments_bulk(vec![(1, "  ".to_string()), (2, "bee".to_string())])
        .unwrap();
    assert_eq!(buffer.to_string(), "a  bee");
    assert_spans_consistent(&buffer);

    let err = buffer.replace_segments_bulk(vec![(3, String::new())]).unwrap_err();
    assert_eq!(err, GarbleError::segment_index(3, 3));
}

#[test]
fn test_insert_words_after_bulk_uses_original_indices() {
    let mut buffer = TextBuffer::new("a b c");
    buffer
        .insert_words_after_bulk(vec![
            (2, "c2".to_string()),
            (0, "a2".to_string()),
            (0, "a3".to_string()),
        ])
        .unwrap();
    assert_eq!(buffer.to_string(), "a a2 a3 b c c2");
    assert_eq!(buffer.word_count(), 6);
    assert_spans_consistent(&buffer);
}

// ========================================
// Character-range edits
// ========================================

#[test]
fn test_replace_char_range_retokenises() {
    let mut buffer = TextBuffer::new("hello world");
    buffer.replace_char_range(2..8, "y wo").unwrap();
    assert_eq!(buffer.to_string(), "hey world");
    assert_eq!(buffer.word_count(), 2);
    assert_spans_consistent(&buffer);
}

#[test]
fn test_replace_char_range_rejects_split_character() {
    let mut buffer = TextBuffer::new("café");
    let err = buffer.replace_char_range(4..5, "e").unwrap_err();
    assert_eq!(err, GarbleError::TokenBoundary { offset: 4 });
}

#[test]
fn test_replace_char_range_rejects_out_of_range() {
    let mut buffer = TextBuffer::new("abc");
    let err = buffer.replace_char_range(1..9, "").unwrap_err();
    assert_eq!(
        err,
        GarbleError::BufferIndex {
            target: IndexTarget::Byte,
            index: 9,
            len: 3
        }
    );
}

// ========================================
// Normalisation and merging
// ========================================

#[test]
fn test_normalize_collapses_and_trims() {
    let mut buffer = TextBuffer::new("  a \t b\n\nc  ");
    buffer.normalize();
    assert_eq!(buffer.to_string(), "a b c");
    assert_spans_consistent(&buffer);
}

#[test]
fn test_normalize_attaches_punctuation() {
    let mut buffer = TextBuffer::new("wait , what ; ok .");
    buffer.normalize();
    assert_eq!(buffer.to_string(), "wait, what; ok.");
    assert_eq!(buffer.word_count(), 3);
}

#[test]
fn test_normalize_drops_empty_words() {
    let mut buffer = TextBuffer::new("a b c");
    buffer.replace_word(1, "").unwrap();
    buffer.normalize();
    assert_eq!(buffer.to_string(), "a c");
}

#[test]
fn test_merge_adjacent_redactions() {
    let mut buffer = TextBuffer::new("███ ███");
    buffer.merge_repeated_char_words('█');
    assert_eq!(buffer.to_string(), "██████");
    assert_eq!(buffer.word_count(), 1);
}

#[test]
fn test_merge_absorbs_punctuation_words() {
    let mut buffer = TextBuffer::new("(██ - ███) end");
    buffer.merge_repeated_char_words('█');
    assert_eq!(buffer.to_string(), "(█████) end");
    assert_spans_consistent(&buffer);
}

#[test]
fn test_merge_leaves_single_redaction() {
    let mut buffer = TextBuffer::new("a ███ b ███");
    buffer.merge_repeated_char_words('█');
    assert_eq!(buffer.to_string(), "a ███ b ███");
}

#[test]
fn test_merge_does_not_absorb_trailing_punctuation_word() {
    let mut buffer = TextBuffer::new("██ ██ -- tail");
    buffer.merge_repeated_char_words('█');
    assert_eq!(buffer.to_string(), "████ -- tail");
}

// ========================================
// Property-based tests
// ========================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_tokenize_reconstructs(text in "\\PC{0,60}") {
        let buffer = TextBuffer::new(&text);
        prop_assert_eq!(buffer.to_string(), text);
        assert_spans_consistent(&buffer);
    }

    #[test]
    fn prop_segments_alternate(text in "[a-zé ,.\t\n]{0,40}") {
        let buffer = TextBuffer::new(&text);
        for pair in buffer.segments().windows(2) {
            prop_assert_ne!(pair[0].kind(), pair[1].kind());
        }
    }

    #[test]
    fn prop_replace_word_keeps_spans(text in "[a-z]{1,6}( [a-z]{1,6}){0,8}", replacement in "[A-Zß]{0,5}") {
        let mut buffer = TextBuffer::new(&text);
        let last = buffer.word_count() - 1;
        buffer.replace_word(last / 2, &replacement).unwrap();
        assert_spans_consistent(&buffer);
    }
}
