use crate::resource::Source;
use crate::store::{IssueRecord, IssueStore};
use crate::version::{IssueState, Version};
use anyhow::Result;
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use tracing::debug;

/// Derives the `since` lower bound for the next listing call.
///
/// The relevant timestamp of the previous version (closure time in closed
/// mode, creation time in open mode) plus a one-second buffer: the store's
/// second-granularity `since` filter would otherwise re-return the boundary
/// issue on every poll. An absent or unparseable timestamp yields no bound,
/// degrading to a full rescan.
pub fn since_window(previous: Option<&Version>, issue_state: IssueState) -> Option<NaiveDateTime> {
    let previous = previous?;
    let observed_at = match issue_state {
        IssueState::Closed => previous.closed_at_time(),
        IssueState::Open => previous.created_at_time(),
    }?;
    Some(observed_at + chrono::Duration::seconds(1))
}

/// Applies the title-prefix filter and the catch-up cap.
///
/// The cap retains the N lowest-numbered (oldest) issues after prefix
/// filtering, bounding the burst size when catching up after an idle period.
pub fn matching_records(
    records: Vec<IssueRecord>,
    title_prefix: Option<&str>,
    limit_old_versions: Option<usize>,
) -> Vec<IssueRecord> {
    let prefix = title_prefix.unwrap_or("");
    let mut matching: Vec<IssueRecord> = records
        .into_iter()
        .filter(|record| record.title.starts_with(prefix))
        .collect();
    matching.sort_by_key(|record| record.number);
    if let Some(limit) = limit_old_versions {
        matching.truncate(limit);
    }
    matching
}

/// Keeps only candidates strictly newer than `previous`; a candidate with the
/// previous version's issue number is the previous version, however much the
/// issue has mutated since.
pub fn newer_than_previous(candidates: Vec<Version>, previous: &Version) -> Vec<Version> {
    candidates
        .into_iter()
        .filter(|candidate| {
            candidate.number != previous.number
                && candidate.trigger_order(previous) == Ordering::Greater
        })
        .collect()
}

/// Computes the new versions since `previous`, oldest first.
///
/// An empty result echoes `previous` back unchanged so the host always has a
/// checkpoint to persist; without a previous version an empty result stays
/// empty.
pub async fn resolve<S: IssueStore>(
    store: &S,
    source: &Source,
    previous: Option<&Version>,
) -> Result<Vec<Version>> {
    let since = since_window(previous, source.issue_state);
    debug!(state = source.issue_state.as_str(), ?since, "listing issues");

    let records = store
        .list_issues(source.issue_state, &source.labels, since)
        .await?;
    let matching = matching_records(
        records,
        source.issue_prefix.as_deref(),
        source.limit_old_versions,
    );

    let mut versions: Vec<Version> = matching.into_iter().map(Version::from).collect();
    if let Some(previous) = previous {
        versions = newer_than_previous(versions, previous);
    }
    versions.sort_by(|a, b| a.trigger_order(b));

    if versions.is_empty() {
        return Ok(previous.cloned().into_iter().collect());
    }
    Ok(versions)
}
