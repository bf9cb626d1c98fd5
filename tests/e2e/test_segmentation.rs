use crate::e2e::helpers::fixtures;

use pretty_assertions::assert_eq;
use texttape::domain::segment::{
    reconstruct, segment, ChunkBoundary, OversizePolicy, SegmentationError, Segmenter,
    SegmenterConfig,
};

#[test]
fn it_should_split_greeting_into_three_sentence_chunks() {
    let chunks = segment(fixtures::GREETING, 20).unwrap();

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["Hello world.", "This is a test.", "Bye."]);
    assert!(chunks.iter().all(|c| c.boundary == ChunkBoundary::Sentence));
    assert_eq!(
        chunks.iter().map(|c| c.index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn it_should_tile_a_long_document_exactly() {
    let document = fixtures::long_document();

    for budget in [40, 80, 150, 400, 1800] {
        let chunks = segment(&document, budget).unwrap();

        assert_eq!(reconstruct(&document, &chunks), document);
        assert_eq!(chunks.first().unwrap().char_range.start, 0);
        assert_eq!(chunks.last().unwrap().char_range.end, document.len());
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].char_range.end, pair[1].char_range.start);
        }
        for chunk in &chunks {
            assert!(chunk.char_count() <= budget, "chunk over budget {}", budget);
            assert!(!chunk.text.is_empty());
            assert_eq!(chunk.text, chunk.text.trim());
        }
    }
}

#[test]
fn it_should_keep_every_word_in_order() {
    let document = fixtures::long_document();
    let chunks = segment(&document, 90).unwrap();

    let rejoined: Vec<&str> = chunks
        .iter()
        .flat_map(|c| c.text.split_whitespace())
        .collect();
    let original: Vec<&str> = document.split_whitespace().collect();
    assert_eq!(rejoined, original);
}

#[test]
fn it_should_split_run_on_unicode_text_between_words() {
    let document = fixtures::unicode_run_on();
    let chunks = segment(&document, 25).unwrap();

    assert!(chunks.len() > 1);
    assert!(chunks
        .iter()
        .all(|c| c.boundary == ChunkBoundary::Whitespace || c.boundary == ChunkBoundary::Sentence));
    assert!(chunks.iter().all(|c| c.char_count() <= 25));
    assert_eq!(reconstruct(&document, &chunks), document);
}

#[test]
fn it_should_be_deterministic() {
    let document = fixtures::long_document();
    assert_eq!(segment(&document, 120).unwrap(), segment(&document, 120).unwrap());
}

#[test]
fn it_should_honor_oversize_policies() {
    let document = "A tremendously long sentence without any early stop. Short.";

    let keep = Segmenter::new(SegmenterConfig {
        oversize_policy: OversizePolicy::KeepSentence,
        ..SegmenterConfig::default()
    })
    .unwrap()
    .segment(document, 20)
    .unwrap();
    assert_eq!(keep[0].boundary, ChunkBoundary::Oversized);
    assert_eq!(keep[0].text, "A tremendously long sentence without any early stop.");
    assert_eq!(keep[1].text, "Short.");

    let strict = Segmenter::new(SegmenterConfig {
        oversize_policy: OversizePolicy::Strict,
        ..SegmenterConfig::default()
    })
    .unwrap()
    .segment(document, 10);
    assert!(matches!(
        strict,
        Err(SegmentationError::WordExceedsBudget { .. })
    ));
}

#[test]
fn it_should_reject_invalid_settings() {
    assert_eq!(segment("Hello.", 0), Err(SegmentationError::InvalidBudget));
    assert!(matches!(
        Segmenter::new(SegmenterConfig {
            terminators: String::new(),
            ..SegmenterConfig::default()
        }),
        Err(SegmentationError::InvalidTerminators(_))
    ));
}

#[test]
fn it_should_return_nothing_for_blank_text() {
    assert!(segment("", 10).unwrap().is_empty());
    assert!(segment(" \n\t ", 10).unwrap().is_empty());
}
