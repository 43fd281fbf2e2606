//! A resolution session: the committed directory plus at most one pass in
//! flight.
//!
//! ```text
//! Matching --start--> AwaitingInput --resume--> ... --> Committing --commit--> Done
//!     ^                    |                                |
//!     +------cancel--------+--------------cancel------------+
//! ```

use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;

use crate::commit::{CommitReport, commit, plan_commit};
use crate::link::{LinkEntry, NewLink};
use crate::resolver::{CompletedPass, Continuation, EntryPolicy, PassStep, resolve_pass, resume};
use crate::store::{DirectoryStore, StoreError};
use crate::template::FormatTemplate;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a resolution pass is still in progress")]
    PassInProgress,
    #[error("no mention is waiting for a link")]
    NotAwaitingInput,
    #[error("no completed pass to commit")]
    NothingToCommit,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Where the current pass stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PassState {
    /// Ready to start a pass.
    #[default]
    Matching,
    /// Suspended on a mention without a match.
    AwaitingInput(Continuation),
    /// All mentions resolved; writes not yet (fully) persisted.
    Committing(CompletedPass),
    /// The last pass was committed.
    Done { output: String },
}

pub struct Session {
    store: Arc<dyn DirectoryStore>,
    directory: Vec<LinkEntry>,
    template: FormatTemplate,
    state: PassState,
}

impl Session {
    /// Loads the directory from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed.
    pub async fn open(
        store: Arc<dyn DirectoryStore>,
        template: FormatTemplate,
    ) -> Result<Self, SessionError> {
        let directory = store.list().await?;
        info!("Loaded {} links", directory.len());

        Ok(Self {
            store,
            directory,
            template,
            state: PassState::Matching,
        })
    }

    /// The committed directory.
    pub fn directory(&self) -> &[LinkEntry] {
        &self.directory
    }

    pub fn template(&self) -> &FormatTemplate {
        &self.template
    }

    pub fn state(&self) -> &PassState {
        &self.state
    }

    /// The mention the pass is waiting on, if any.
    pub fn pending_mention(&self) -> Option<&str> {
        match &self.state {
            PassState::AwaitingInput(continuation) => Some(&continuation.pending_mention),
            _ => None,
        }
    }

    /// Starts a pass over `mentions`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PassInProgress`] while a previous pass is
    /// awaiting input or not yet committed.
    pub fn start<I, S>(&mut self, mentions: I) -> Result<&PassState, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if matches!(
            self.state,
            PassState::AwaitingInput(_) | PassState::Committing(_)
        ) {
            return Err(SessionError::PassInProgress);
        }

        let step = resolve_pass(mentions, self.directory.clone(), &self.template);
        self.state = step.into();
        Ok(&self.state)
    }

    /// Resolves the pending mention with `link`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAwaitingInput`] when no mention is pending.
    pub fn resume(&mut self, link: NewLink, policy: EntryPolicy) -> Result<&PassState, SessionError> {
        let continuation = match std::mem::take(&mut self.state) {
            PassState::AwaitingInput(continuation) => continuation,
            other => {
                self.state = other;
                return Err(SessionError::NotAwaitingInput);
            }
        };

        self.state = resume(continuation, link, policy).into();
        Ok(&self.state)
    }

    /// Abandons the pass in flight. Nothing is persisted.
    pub fn cancel(&mut self) {
        if matches!(
            self.state,
            PassState::AwaitingInput(_) | PassState::Committing(_)
        ) {
            debug!("Pass abandoned");
        }
        self.state = PassState::Matching;
    }

    /// Persists the completed pass.
    ///
    /// On full success the working directory becomes the committed directory
    /// and the session moves to [`PassState::Done`]. On partial failure the
    /// pass stays in [`PassState::Committing`] with the successful writes
    /// folded in, so calling `commit` again only retries what failed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NothingToCommit`] unless the session is
    /// committing.
    pub async fn commit(&mut self) -> Result<CommitReport, SessionError> {
        let PassState::Committing(pass) = &self.state else {
            return Err(SessionError::NothingToCommit);
        };

        let plan = plan_commit(&self.directory, &pass.working_directory);
        debug!("Committing {} writes", plan.len());
        let report = commit(self.store.as_ref(), plan).await;

        let PassState::Committing(pass) = &mut self.state else {
            return Err(SessionError::NothingToCommit);
        };
        // The committed directory tracks what the store holds now.
        for (index, entry) in &report.created {
            if let Some(slot) = pass.working_directory.get_mut(*index) {
                *slot = entry.clone();
            }
            self.directory.push(entry.clone());
        }
        for entry in &report.updated {
            if let Some(slot) = self
                .directory
                .iter_mut()
                .find(|known| known.id.is_some() && known.id == entry.id)
            {
                *slot = entry.clone();
            }
        }

        if report.is_complete() {
            let output = pass.output();
            self.directory = std::mem::take(&mut pass.working_directory);
            self.state = PassState::Done { output };
        }

        Ok(report)
    }

    /// Re-reads the committed directory from the store.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PassInProgress`] while a pass is in flight, or
    /// the store error if listing fails.
    pub async fn refresh(&mut self) -> Result<(), SessionError> {
        if matches!(
            self.state,
            PassState::AwaitingInput(_) | PassState::Committing(_)
        ) {
            return Err(SessionError::PassInProgress);
        }
        self.directory = self.store.list().await?;
        Ok(())
    }
}

impl From<PassStep> for PassState {
    fn from(step: PassStep) -> Self {
        match step {
            PassStep::AwaitingInput(continuation) => PassState::AwaitingInput(continuation),
            PassStep::Complete(pass) => PassState::Committing(pass),
        }
    }
}
