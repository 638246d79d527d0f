use crate::build::BuildMetadata;
use crate::resource::Source;
use crate::store::IssueStore;
use crate::version::Version;
use anyhow::Result;
use tracing::warn;

/// Records a build's completion as exactly one open issue.
///
/// The rendered title is the idempotency key: an existing open issue with that
/// exact title gets a comment, otherwise a fresh issue is created. Finding
/// more than one match means something outside this system duplicated the
/// issue; that is reported and the first match is used so repeated calls stay
/// deterministic. A concurrent publisher racing past the search can still
/// create a duplicate, which the store gives no way to prevent.
pub async fn publish<S: IssueStore>(
    store: &S,
    source: &Source,
    build: &BuildMetadata,
    assignees: Option<&[String]>,
    labels: Option<&[String]>,
) -> Result<Version> {
    let title = build.render(&source.issue_title_template);
    let body = build.render(&source.issue_body_template);

    let matches = store.search_open_by_title(&title).await?;
    if matches.len() > 1 {
        warn!(
            title = %title,
            count = matches.len(),
            "multiple open issues share the completion title; commenting on the first"
        );
    }

    match matches.into_iter().next() {
        Some(existing) => {
            store.comment_on_issue(existing.number, &body).await?;
            Ok(Version::from(existing))
        }
        None => {
            let assignees = assignees.unwrap_or(&source.assignees);
            let labels = labels.unwrap_or(&source.labels);
            let created = store.create_issue(&title, &body, assignees, labels).await?;
            Ok(Version::from(created))
        }
    }
}
