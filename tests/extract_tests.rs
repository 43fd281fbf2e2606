use crate::linkr_extras::StubLlmProvider;
use linkr::chunk::{chunk_transcript, split_sentences};
use linkr::extract::{ExtractContext, extract_mentions, parse_response};
use spectral::prelude::*;

mod linkr_extras;

macro_rules! assert_responses {
    (
        $(
            $test_name:ident : response => $response:expr, result => [$($mention:expr),* $(,)?]
        ),+ $(,)?
    ) => {
        $(
            #[test]
            fn $test_name() {
                let expected: Vec<String> = vec![$($mention.to_owned()),*];

                assert_that(&parse_response($response)).is_equal_to(expected);
            }
        )+
    }
}

assert_responses![
    plain_lines_are_trimmed:
        response => "Ada Lovelace\n  Grace Hopper \n\n",
        result => ["Ada Lovelace", "Grace Hopper"],
    think_block_is_removed:
        response => "<think>Who is mentioned?</think>\nLinus Torvalds",
        result => ["Linus Torvalds"],
    bullets_are_stripped:
        response => "- Rust\n* Tokio\n3. Serde\n2) Axum",
        result => ["Rust", "Tokio", "Serde", "Axum"],
    json_array_is_accepted:
        response => r#"["Ada Lovelace", " Grace Hopper", ""]"#,
        result => ["Ada Lovelace", "Grace Hopper"],
    malformed_json_falls_back_to_lines:
        response => "[Ada Lovelace]",
        result => ["[Ada Lovelace]"],
    hyphenated_name_survives:
        response => "Jean-Luc Picard",
        result => ["Jean-Luc Picard"],
];

#[test]
fn chunks_never_split_sentences() {
    let chunks = chunk_transcript("Hi. Bob came. Ann left.", 10);

    assert_that(&chunks).is_equal_to(vec![
        "Hi.".to_owned(),
        "Bob came.".to_owned(),
        "Ann left.".to_owned(),
    ]);
    for chunk in &chunks {
        assert_that(&(chunk.chars().count() <= 10)).is_true();
    }
}

#[test]
fn chunks_pack_sentences_greedily() {
    let chunks = chunk_transcript("Hi. Yo. Bob came! Ok? Ann", 10);

    assert_that(&chunks).is_equal_to(vec![
        "Hi. Yo.".to_owned(),
        "Bob came!".to_owned(),
        "Ok? Ann".to_owned(),
    ]);
}

#[test]
fn oversized_sentence_is_emitted_whole() {
    let chunks = chunk_transcript("Hi. This sentence is long. Ok.", 10);

    assert_that(&chunks).is_equal_to(vec![
        "Hi.".to_owned(),
        "This sentence is long.".to_owned(),
        "Ok.".to_owned(),
    ]);
}

#[test]
fn zero_budget_disables_chunking() {
    assert_that(&chunk_transcript("  Hi. Bob came.  ", 0)).is_equal_to(vec!["Hi. Bob came.".to_owned()]);
    assert_that(&chunk_transcript("   ", 10)).is_empty();
}

#[test]
fn sentences_split_on_terminal_punctuation() {
    assert_that(&split_sentences("Version 1.5 is out! Really? yes.\nDone"))
        .is_equal_to(vec!["Version 1.5 is out!", "Really?", "yes.", "Done"]);
}

#[tokio::test]
async fn mentions_are_deduplicated_across_chunks_in_first_seen_order() {
    let model = StubLlmProvider::new(&["Ann\nBob", "Bob\nCid\nAnn"]);
    let context = ExtractContext {
        model: &model,
        prompt_template: None,
        chunk_size: 10,
        rate_limiter: None,
    };

    let mentions = extract_mentions("Ann met Bob. Bob met Cid.", &context)
        .await
        .expect("Expected successful processing.");

    assert_that(&model.calls()).is_equal_to(2);
    assert_that(&mentions).is_equal_to(vec!["Ann".to_owned(), "Bob".to_owned(), "Cid".to_owned()]);
}

#[tokio::test]
async fn empty_transcript_makes_no_requests() {
    let model = StubLlmProvider::new(&["Ann"]);
    let context = ExtractContext {
        model: &model,
        prompt_template: Some("List names in: {transcript}"),
        chunk_size: 0,
        rate_limiter: None,
    };

    let mentions = extract_mentions("   ", &context)
        .await
        .expect("Expected successful processing.");

    assert_that(&model.calls()).is_equal_to(0);
    assert_that(&mentions).is_empty();
}
