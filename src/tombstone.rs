use crate::build::BuildMetadata;
use crate::resource::Source;
use crate::store::IssueStore;
use crate::version::{IssueState, Version};
use anyhow::Result;
use tracing::debug;

const CONSUMED_MARKER_START: &str = "[CONSUMED #";

/// Marker recording which build consumed an issue, e.g. `[CONSUMED #42]`.
pub fn consumed_marker(build_name: &str) -> String {
    format!("{CONSUMED_MARKER_START}{build_name}]")
}

/// True if a title already carries a consumed marker.
pub fn is_tombstoned(title: &str) -> bool {
    title.starts_with(CONSUMED_MARKER_START)
}

/// Marks a consumed issue so it never resolves as new again.
///
/// The store has no acknowledge primitive, so the title is rewritten to the
/// consumed marker followed by the title the publisher renders for this build
/// context. The marker goes in front of the original prefix; prefix matching
/// downstream still succeeds and the issue number is unchanged.
///
/// Only a closed issue is rewritten: an open issue has not finished yielding
/// its build, so it is left untouched. A title already carrying a marker is
/// also left alone, which makes the rewrite idempotent.
pub async fn tombstone<S: IssueStore>(
    store: &S,
    source: &Source,
    version: &Version,
    build: &BuildMetadata,
) -> Result<()> {
    let issue = store.get_issue(version.number).await?;

    if issue.state != IssueState::Closed {
        debug!(number = issue.number, "issue still open; skipping tombstone");
        return Ok(());
    }
    if is_tombstoned(&issue.title) {
        debug!(number = issue.number, "issue already tombstoned");
        return Ok(());
    }

    let title = build.render(&source.issue_title_template);
    let tombstoned_title = format!("{}{}", consumed_marker(&build.build_name), title);
    store.edit_issue_title(issue.number, &tombstoned_title).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumed_marker_format() {
        assert_eq!(consumed_marker("42"), "[CONSUMED #42]");
    }

    #[test]
    fn test_is_tombstoned_detects_marker() {
        assert!(is_tombstoned("[CONSUMED #42][bot] Pipeline p task j completed"));
        assert!(!is_tombstoned("[bot] Pipeline p task j completed"));
    }

    #[test]
    fn test_marker_precedes_prefix() {
        let title = format!("{}{}", consumed_marker("7"), "[bot] Done");
        assert_eq!(title, "[CONSUMED #7][bot] Done");
        assert!(is_tombstoned(&title));
    }
}
