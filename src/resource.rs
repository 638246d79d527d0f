use crate::build::BuildMetadata;
use crate::github::client::GitHubClient;
use crate::store::IssueStore;
use crate::version::{IssueState, Version};
use crate::{publisher, resolver, tombstone};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

/// Filename of the serialized version written on download.
pub const DOWNLOAD_FILENAME: &str = "gh_issue.json";

fn default_issue_state() -> IssueState {
    IssueState::Closed
}

fn default_title_template() -> String {
    "[bot] Pipeline {BUILD_PIPELINE_NAME} task {BUILD_JOB_NAME} completed".to_string()
}

fn default_body_template() -> String {
    "Build {BUILD_NAME} finished.".to_string()
}

/// Static resource configuration, as delivered by the pipeline definition.
#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    /// Repository identifier in `owner/name` form.
    pub repository: String,
    #[serde(default)]
    pub github_auth_token: String,
    /// Which issue state counts as a trigger.
    #[serde(default = "default_issue_state")]
    pub issue_state: IssueState,
    /// Only issues whose title starts with this prefix are resolved.
    #[serde(default)]
    pub issue_prefix: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default = "default_title_template")]
    pub issue_title_template: String,
    #[serde(default = "default_body_template")]
    pub issue_body_template: String,
    /// Cap on how many old unresolved issues one poll may return.
    #[serde(default)]
    pub limit_old_versions: Option<usize>,
}

/// Metadata returned to the host alongside a version, as name/value pairs.
pub type Metadata = Vec<(String, String)>;

/// The resource: one configured repository observed through an issue store.
pub struct Resource<S> {
    source: Source,
    store: S,
}

impl Resource<GitHubClient> {
    /// Builds a resource backed by the real GitHub API.
    pub fn from_source(source: Source) -> Result<Self> {
        let store = GitHubClient::new(&source.repository, &source.github_auth_token)?;
        Ok(Resource { source, store })
    }
}

impl<S: IssueStore> Resource<S> {
    pub fn new(source: Source, store: S) -> Self {
        Resource { source, store }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Computes the new versions since `previous`, oldest first.
    ///
    /// A poll with no remaining API quota fails outright rather than
    /// producing a version set from partial or stale data.
    pub async fn fetch_new_versions(&self, previous: Option<&Version>) -> Result<Vec<Version>> {
        let remaining = self.store.rate_limit_remaining().await?;
        if remaining == 0 {
            bail!("GitHub API rate limit exhausted; aborting poll");
        }
        resolver::resolve(&self.store, &self.source, previous).await
    }

    /// Writes the serialized version into `destination_dir`, then tombstones
    /// the consumed issue.
    pub async fn download_version(
        &self,
        version: &Version,
        destination_dir: &Path,
        build: &BuildMetadata,
    ) -> Result<(Version, Metadata)> {
        let payload =
            serde_json::to_string_pretty(version).context("Failed to serialize version")?;
        let path = destination_dir.join(DOWNLOAD_FILENAME);
        std::fs::write(&path, payload)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tombstone::tombstone(&self.store, &self.source, version, build).await?;
        Ok((version.clone(), Metadata::new()))
    }

    /// Records a finished build as exactly one open issue.
    ///
    /// `assignees` and `labels` override the source configuration for this
    /// call when given.
    pub async fn publish_new_version(
        &self,
        build: &BuildMetadata,
        assignees: Option<&[String]>,
        labels: Option<&[String]>,
    ) -> Result<(Version, Metadata)> {
        let version = publisher::publish(&self.store, &self.source, build, assignees, labels).await?;
        Ok((version, Metadata::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_minimal_json() {
        let json = r#"{"repository": "test/repo", "github_auth_token": "dummy"}"#;
        let source: Source = serde_json::from_str(json).unwrap();

        assert_eq!(source.repository, "test/repo");
        assert_eq!(source.issue_state, IssueState::Closed);
        assert_eq!(source.issue_prefix, None);
        assert!(source.labels.is_empty());
        assert!(source.assignees.is_empty());
        assert_eq!(source.limit_old_versions, None);
        assert_eq!(
            source.issue_title_template,
            "[bot] Pipeline {BUILD_PIPELINE_NAME} task {BUILD_JOB_NAME} completed"
        );
        assert_eq!(source.issue_body_template, "Build {BUILD_NAME} finished.");
    }

    #[test]
    fn test_source_full_json() {
        let json = r#"{
            "repository": "test/repo",
            "github_auth_token": "dummy",
            "issue_state": "open",
            "issue_prefix": "[bot]",
            "labels": ["pipeline"],
            "assignees": ["user1"],
            "issue_title_template": "custom {BUILD_NAME}",
            "issue_body_template": "done",
            "limit_old_versions": 2
        }"#;
        let source: Source = serde_json::from_str(json).unwrap();

        assert_eq!(source.issue_state, IssueState::Open);
        assert_eq!(source.issue_prefix.as_deref(), Some("[bot]"));
        assert_eq!(source.labels, vec!["pipeline".to_string()]);
        assert_eq!(source.assignees, vec!["user1".to_string()]);
        assert_eq!(source.issue_title_template, "custom {BUILD_NAME}");
        assert_eq!(source.limit_old_versions, Some(2));
    }

    #[test]
    fn test_source_rejects_unknown_issue_state() {
        let json = r#"{"repository": "test/repo", "issue_state": "merged"}"#;
        assert!(serde_json::from_str::<Source>(json).is_err());
    }
}
