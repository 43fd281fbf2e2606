//! Terminal front end for a resolution session.
//!
//! Unmatched mentions are asked for one at a time:
//!
//! ```text
//! No match for "Vue".
//!   1. Vue.js - The Progressive JavaScript Framework <https://vuejs.org>
//! URL or suggestion number (prefix ! for one-off, "| Name" to rename, empty to cancel):
//! ```

use std::io::{BufRead, Write};

use anyhow::Result;
use log::info;

use crate::link::NewLink;
use crate::resolver::EntryPolicy;
use crate::session::{PassState, Session};
use crate::suggest::{Suggestion, SuggestionProvider};

const ONE_OFF_PREFIX: char = '!';
const RENAME_SEPARATOR: char = '|';

/// What the user typed in answer to an unmatched mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Cancel,
    Link(NewLink, EntryPolicy),
    Invalid(String),
}

/// Interprets one answer line for `mention`.
///
/// The line is `[!]<url or suggestion number>[ | <name>]`.
pub fn parse_answer(line: &str, mention: &str, suggestions: &[Suggestion]) -> Answer {
    let line = line.trim();
    if line.is_empty() {
        return Answer::Cancel;
    }

    let (policy, line) = match line.strip_prefix(ONE_OFF_PREFIX) {
        Some(rest) => (EntryPolicy::OneOff, rest.trim()),
        None => (EntryPolicy::Persisted, line),
    };
    let (target, name) = match line.split_once(RENAME_SEPARATOR) {
        Some((target, name)) => (target.trim(), name.trim()),
        None => (line, mention),
    };

    let url = match target.parse::<usize>() {
        Ok(number) => match number.checked_sub(1).and_then(|index| suggestions.get(index)) {
            Some(suggestion) => suggestion.url.as_str(),
            None => return Answer::Invalid(format!("No suggestion number {number}")),
        },
        Err(_) => target,
    };

    match NewLink::new(name, url) {
        Ok(link) => Answer::Link(link, policy),
        Err(error) => Answer::Invalid(error.to_string()),
    }
}

enum Next {
    Ask(String),
    Commit,
    Finished(String),
    Idle,
}

/// Runs a full pass over `mentions`, prompting on `input`/`output` for every
/// unmatched mention, then commits.
///
/// Returns the formatted output, or `None` when the user cancelled.
///
/// # Errors
///
/// Returns an error if a pass is already in progress or the terminal cannot
/// be read or written.
pub async fn run_match<R, W>(
    session: &mut Session,
    suggester: &dyn SuggestionProvider,
    mentions: Vec<String>,
    input: &mut R,
    output: &mut W,
) -> Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    session.start(mentions)?;

    loop {
        let next = match session.state() {
            PassState::AwaitingInput(continuation) => {
                Next::Ask(continuation.pending_mention.clone())
            }
            PassState::Committing(_) => Next::Commit,
            PassState::Done { output } => Next::Finished(output.clone()),
            PassState::Matching => Next::Idle,
        };

        match next {
            Next::Ask(mention) => {
                let suggestions = suggester.suggest(&mention).await;
                match ask(&mention, &suggestions, input, output)? {
                    Some((link, policy)) => {
                        session.resume(link, policy)?;
                    }
                    None => {
                        session.cancel();
                        writeln!(output, "Cancelled.")?;
                        return Ok(None);
                    }
                }
            }
            Next::Commit => {
                let report = session.commit().await?;
                if report.is_complete() {
                    continue;
                }

                for failure in &report.failures {
                    writeln!(output, "Failed to save \"{}\": {}", failure.name, failure.error)?;
                }
                if confirm("Retry failed writes? [y/N]", input, output)? {
                    continue;
                }

                let PassState::Committing(pass) = session.state() else {
                    continue;
                };
                let formatted = pass.output();
                writeln!(output, "{formatted}")?;
                return Ok(Some(formatted));
            }
            Next::Finished(formatted) => {
                info!("Pass complete");
                writeln!(output, "{formatted}")?;
                return Ok(Some(formatted));
            }
            Next::Idle => return Ok(None),
        }
    }
}

fn ask<R: BufRead, W: Write>(
    mention: &str,
    suggestions: &[Suggestion],
    input: &mut R,
    output: &mut W,
) -> Result<Option<(NewLink, EntryPolicy)>> {
    writeln!(output, "No match for \"{mention}\".")?;
    for (number, suggestion) in suggestions.iter().enumerate() {
        writeln!(
            output,
            "  {}. {} <{}>",
            number + 1,
            suggestion.title,
            suggestion.url
        )?;
    }

    loop {
        write!(
            output,
            "URL or suggestion number (prefix {ONE_OFF_PREFIX} for one-off, \"{RENAME_SEPARATOR} Name\" to rename, empty to cancel): "
        )?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match parse_answer(&line, mention, suggestions) {
            Answer::Cancel => return Ok(None),
            Answer::Link(link, policy) => return Ok(Some((link, policy))),
            Answer::Invalid(reason) => writeln!(output, "{reason}")?,
        }
    }
}

fn confirm<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> Result<bool> {
    write!(output, "{question} ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
