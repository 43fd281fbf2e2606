//! Persisting the outcome of a completed pass.

use std::collections::HashMap;

use log::{info, warn};

use crate::link::{LinkEntry, NewLink};
use crate::store::{DirectoryStore, StoreError};

/// Writes needed to bring the store in line with a working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitPlan {
    /// Entries to create, keyed by their position in the working directory.
    pub creates: Vec<(usize, NewLink)>,
    /// Entries to update, with their store id.
    pub updates: Vec<(String, NewLink)>,
}

impl CommitPlan {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.creates.len() + self.updates.len()
    }
}

/// A single write that did not go through.
#[derive(Debug)]
pub struct CommitFailure {
    pub name: String,
    pub id: Option<String>,
    pub error: StoreError,
}

/// Per-item outcome of a commit. Successful writes are not rolled back when
/// others fail.
#[derive(Debug, Default)]
pub struct CommitReport {
    /// Created entries, keyed by their position in the working directory.
    pub created: Vec<(usize, LinkEntry)>,
    pub updated: Vec<LinkEntry>,
    pub failures: Vec<CommitFailure>,
}

impl CommitReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Diffs `working` against the directory the pass started from.
///
/// Entries without an id are created. Entries with an id are updated when
/// their name or url differ from the baseline entry with the same id, or
/// when the baseline has no such id. Entries that fail validation are
/// skipped with a warning.
pub fn plan_commit(baseline: &[LinkEntry], working: &[LinkEntry]) -> CommitPlan {
    let known: HashMap<&str, &LinkEntry> = baseline
        .iter()
        .filter_map(|entry| entry.id.as_deref().map(|id| (id, entry)))
        .collect();

    let mut plan = CommitPlan::default();
    for (index, entry) in working.iter().enumerate() {
        let unchanged = entry.id.as_deref().is_some_and(|id| {
            known
                .get(id)
                .is_some_and(|original| original.same_link(entry))
        });
        if unchanged {
            continue;
        }

        let link = match NewLink::try_from(entry) {
            Ok(link) => link,
            Err(error) => {
                warn!("Skipping invalid entry \"{}\": {error}", entry.name);
                continue;
            }
        };

        match entry.id.as_deref() {
            None => plan.creates.push((index, link)),
            Some(id) => plan.updates.push((id.to_owned(), link)),
        }
    }

    plan
}

/// Issues every create and update of `plan` concurrently and waits for all
/// of them. A failing write does not cancel the others.
pub async fn commit(store: &dyn DirectoryStore, plan: CommitPlan) -> CommitReport {
    let mut report = CommitReport::default();
    if plan.is_empty() {
        return report;
    }

    let (positions, creates): (Vec<usize>, Vec<NewLink>) = plan.creates.into_iter().unzip();
    let create_names: Vec<String> = creates.iter().map(|link| link.name().to_owned()).collect();
    let update_keys: Vec<(String, String)> = plan
        .updates
        .iter()
        .map(|(id, link)| (id.clone(), link.name().to_owned()))
        .collect();

    let create_all = async {
        if creates.is_empty() {
            Vec::new()
        } else {
            store.create_many(creates).await
        }
    };
    let update_all = async {
        if plan.updates.is_empty() {
            Vec::new()
        } else {
            store.update_many(plan.updates).await
        }
    };
    let (created, updated) = futures::join!(create_all, update_all);

    for ((index, name), result) in positions.into_iter().zip(create_names).zip(created) {
        match result {
            Ok(entry) => report.created.push((index, entry)),
            Err(error) => report.failures.push(CommitFailure {
                name,
                id: None,
                error,
            }),
        }
    }
    for ((id, name), result) in update_keys.into_iter().zip(updated) {
        match result {
            Ok(entry) => report.updated.push(entry),
            Err(error) => report.failures.push(CommitFailure {
                name,
                id: Some(id),
                error,
            }),
        }
    }

    if report.is_complete() {
        info!(
            "Committed {} new and {} updated links",
            report.created.len(),
            report.updated.len()
        );
    } else {
        for failure in &report.failures {
            warn!("Failed to save \"{}\": {}", failure.name, failure.error);
        }
    }

    report
}
