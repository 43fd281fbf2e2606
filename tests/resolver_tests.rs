use crate::linkr_extras::{entry, link};
use linkr::{
    EntryPolicy, FormatTemplate, PassStep, parse_mentions, resolve_pass, resume,
    resolver::{CompletedPass, Continuation},
};
use spectral::prelude::*;

mod linkr_extras;

fn template() -> FormatTemplate {
    FormatTemplate::new("- {name}: {url}")
}

fn suspended(step: PassStep) -> Continuation {
    match step {
        PassStep::AwaitingInput(continuation) => continuation,
        PassStep::Complete(pass) => panic!("Expected suspension, got {pass:?}"),
    }
}

fn completed(step: PassStep) -> CompletedPass {
    match step {
        PassStep::Complete(pass) => pass,
        PassStep::AwaitingInput(continuation) => {
            panic!("Expected completion, suspended on {}", continuation.pending_mention)
        }
    }
}

#[test]
fn all_matched_mentions_resolve_in_order_without_suspending() {
    let directory = vec![
        entry("1", "React", "https://react.dev"),
        entry("2", "Rust", "https://www.rust-lang.org"),
        entry("3", "Tokio", "https://tokio.rs"),
    ];

    let pass = completed(resolve_pass(
        ["tokio", "React", "rust", "react"],
        directory.clone(),
        &template(),
    ));

    assert_that(&pass.resolved_lines).is_equal_to(vec![
        "- Tokio: https://tokio.rs".to_owned(),
        "- React: https://react.dev".to_owned(),
        "- Rust: https://www.rust-lang.org".to_owned(),
        "- React: https://react.dev".to_owned(),
    ]);
    assert_that(&pass.working_directory).is_equal_to(directory);
}

#[test]
fn react_then_vue_scenario() {
    let directory = vec![entry("1", "React", "https://react.dev")];

    let continuation = suspended(resolve_pass(["react", "Vue"], directory, &template()));
    assert_that(&continuation.pending_mention.as_str()).is_equal_to("Vue");
    assert_that(&continuation.resolved_lines)
        .is_equal_to(vec!["- React: https://react.dev".to_owned()]);
    assert_that(&continuation.remaining_mentions.len()).is_equal_to(0);

    let pass = completed(resume(
        continuation,
        link("Vue", "https://vuejs.org"),
        EntryPolicy::Persisted,
    ));

    assert_that(&pass.output().as_str())
        .is_equal_to("- React: https://react.dev\n- Vue: https://vuejs.org");
    assert_that(&pass.working_directory).has_length(2);
    assert_that(&pass.working_directory[1].id).is_none();
}

#[test]
fn one_off_entry_leaves_working_directory_unchanged() {
    let directory = vec![entry("1", "React", "https://react.dev")];
    let continuation = suspended(resolve_pass(["Svelte", "Svelte"], directory.clone(), &template()));

    let continuation = suspended(resume(
        continuation,
        link("Svelte", "https://svelte.dev"),
        EntryPolicy::OneOff,
    ));

    assert_that(&continuation.working_directory).is_equal_to(directory);
    assert_that(&continuation.resolved_lines)
        .is_equal_to(vec!["- Svelte: https://svelte.dev".to_owned()]);
    // Not remembered, so the repeated mention asks again.
    assert_that(&continuation.pending_mention.as_str()).is_equal_to("Svelte");
}

#[test]
fn persisted_entry_matches_later_repeats_of_the_mention() {
    let continuation = suspended(resolve_pass(
        ["Svelte", "React", "svelte"],
        vec![entry("1", "React", "https://react.dev")],
        &template(),
    ));

    let pass = completed(resume(
        continuation,
        link("Svelte", "https://svelte.dev"),
        EntryPolicy::Persisted,
    ));

    assert_that(&pass.working_directory).has_length(2);
    assert_that(&pass.resolved_lines).is_equal_to(vec![
        "- Svelte: https://svelte.dev".to_owned(),
        "- React: https://react.dev".to_owned(),
        "- Svelte: https://svelte.dev".to_owned(),
    ]);
}

#[test]
fn resumed_pass_suspends_again_on_next_unknown_mention() {
    let continuation = suspended(resolve_pass(["Axum", "Serde", "Axum"], Vec::new(), &template()));
    assert_that(&continuation.remaining_mentions.len()).is_equal_to(2);

    let continuation = suspended(resume(
        continuation,
        link("Axum", "https://docs.rs/axum"),
        EntryPolicy::Persisted,
    ));
    assert_that(&continuation.pending_mention.as_str()).is_equal_to("Serde");
    assert_that(&continuation.remaining_mentions.len()).is_equal_to(1);

    let pass = completed(resume(
        continuation,
        link("Serde", "https://serde.rs"),
        EntryPolicy::Persisted,
    ));
    assert_that(&pass.resolved_lines).has_length(3);
}

#[test]
fn supplied_name_replaces_mention_text() {
    let continuation = suspended(resolve_pass(["elon"], Vec::new(), &template()));

    let pass = completed(resume(
        continuation,
        link("Elon Musk", "https://x.com/elonmusk"),
        EntryPolicy::Persisted,
    ));

    assert_that(&pass.output().as_str()).is_equal_to("- Elon Musk: https://x.com/elonmusk");
}

#[test]
fn continuation_survives_serialization() {
    let continuation = suspended(resolve_pass(
        ["react", "Vue", "Rust"],
        vec![entry("1", "React", "https://react.dev")],
        &template(),
    ));

    let json = serde_json::to_string(&continuation).expect("Expected serializable state.");
    let restored: Continuation = serde_json::from_str(&json).expect("Expected restorable state.");

    assert_that(&restored).is_equal_to(continuation);
}

#[test]
fn empty_mention_list_completes_immediately() {
    let pass = completed(resolve_pass(Vec::<String>::new(), Vec::new(), &template()));

    assert_that(&pass.output().as_str()).is_equal_to("");
}

#[test]
fn pasted_block_keeps_order_and_duplicates() {
    let mentions = parse_mentions("  React \n\n\tVue\nReact\n   \n");

    assert_that(&mentions).is_equal_to(vec![
        "React".to_owned(),
        "Vue".to_owned(),
        "React".to_owned(),
    ]);
}

#[test]
fn template_substitutes_every_placeholder_once() {
    let template = FormatTemplate::new("[{name}]({url}) {name} {unknown} {");

    assert_that(&template.render("A {url}", "https://a.dev").as_str())
        .is_equal_to("[A {url}](https://a.dev) A {url} {unknown} {");
}
