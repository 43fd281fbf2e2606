//! The mention resolution pass.
//!
//! A pass walks the mentions in order and formats every one that matches the
//! working directory. The first mention without a match suspends the pass:
//! the caller receives a [`Continuation`] holding everything needed to pick
//! up where the pass stopped, and calls [`resume`] once the user has supplied
//! a link. Nothing here touches a store; persistence happens only when the
//! caller commits the [`CompletedPass`].

use std::collections::VecDeque;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::link::{LinkEntry, NewLink};
use crate::matcher::best_match;
use crate::template::FormatTemplate;

/// How a user supplied link is used when resuming a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntryPolicy {
    /// Added to the working directory and persisted on commit.
    #[default]
    Persisted,
    /// Used for the pending line only.
    OneOff,
}

/// Saved state of a suspended pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continuation {
    /// The mention that found no match.
    pub pending_mention: String,
    pub resolved_lines: Vec<String>,
    pub working_directory: Vec<LinkEntry>,
    pub remaining_mentions: VecDeque<String>,
    pub template: FormatTemplate,
}

/// A pass with every mention resolved, waiting to be committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPass {
    pub resolved_lines: Vec<String>,
    pub working_directory: Vec<LinkEntry>,
}

impl CompletedPass {
    /// The formatted output block.
    pub fn output(&self) -> String {
        self.resolved_lines.join("\n")
    }
}

/// Outcome of running a pass until it either finishes or needs input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassStep {
    AwaitingInput(Continuation),
    Complete(CompletedPass),
}

/// Starts a pass over `mentions` against a snapshot of the directory.
pub fn resolve_pass<I, S>(mentions: I, directory: Vec<LinkEntry>, template: &FormatTemplate) -> PassStep
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let remaining: VecDeque<String> = mentions.into_iter().map(Into::into).collect();
    debug!(
        "Starting pass over {} mentions with {} directory entries",
        remaining.len(),
        directory.len()
    );

    run(Vec::new(), directory, remaining, template.clone())
}

/// Resolves the pending mention of `continuation` with `link` and carries on
/// with the remaining mentions.
///
/// The formatted line uses the supplied name, which may differ from the raw
/// mention text.
pub fn resume(continuation: Continuation, link: NewLink, policy: EntryPolicy) -> PassStep {
    let Continuation {
        pending_mention,
        mut resolved_lines,
        mut working_directory,
        remaining_mentions,
        template,
    } = continuation;

    debug!(
        "Resolved \"{pending_mention}\" as {} ({policy:?})",
        link.name()
    );
    resolved_lines.push(template.render(link.name(), link.url()));
    if policy == EntryPolicy::Persisted {
        working_directory.push(LinkEntry::unsaved(link));
    }

    run(resolved_lines, working_directory, remaining_mentions, template)
}

fn run(
    mut resolved_lines: Vec<String>,
    working_directory: Vec<LinkEntry>,
    mut remaining_mentions: VecDeque<String>,
    template: FormatTemplate,
) -> PassStep {
    while let Some(mention) = remaining_mentions.pop_front() {
        let Some(found) = best_match(&mention, &working_directory) else {
            debug!("No match for \"{mention}\", suspending pass");
            return PassStep::AwaitingInput(Continuation {
                pending_mention: mention,
                resolved_lines,
                working_directory,
                remaining_mentions,
                template,
            });
        };

        debug!(
            "Matched \"{mention}\" to \"{}\" (score {:.3})",
            found.entry.name, found.score
        );
        resolved_lines.push(template.render(&found.entry.name, &found.entry.url));
    }

    PassStep::Complete(CompletedPass {
        resolved_lines,
        working_directory,
    })
}
