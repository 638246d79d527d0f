use crate::version::{IssueState, Version};
use anyhow::Result;
use chrono::NaiveDateTime;

/// One issue as observed in the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRecord {
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub created_at: String,
    pub closed_at: Option<String>,
    pub url: String,
    pub labels: Vec<String>,
}

impl From<IssueRecord> for Version {
    fn from(record: IssueRecord) -> Self {
        Version {
            number: record.number,
            title: record.title,
            state: record.state,
            created_at: record.created_at,
            closed_at: record.closed_at,
            url: record.url,
        }
    }
}

/// Narrow read/write contract this crate requires from the issue store.
///
/// The store is an externally-owned, eventually-consistent collection: listing
/// may over-include around the `since` bound and nothing here is transactional.
/// Callers tolerate stale or overlapping results instead of locking.
#[allow(async_fn_in_trait)]
pub trait IssueStore {
    /// Lists issues in `state` carrying all of `labels`, modified at or after
    /// `since` when a bound is given.
    async fn list_issues(
        &self,
        state: IssueState,
        labels: &[String],
        since: Option<NaiveDateTime>,
    ) -> Result<Vec<IssueRecord>>;

    /// Returns open issues whose title exactly equals `title`.
    async fn search_open_by_title(&self, title: &str) -> Result<Vec<IssueRecord>>;

    async fn get_issue(&self, number: u64) -> Result<IssueRecord>;

    async fn create_issue(
        &self,
        title: &str,
        body: &str,
        assignees: &[String],
        labels: &[String],
    ) -> Result<IssueRecord>;

    async fn comment_on_issue(&self, number: u64, body: &str) -> Result<()>;

    async fn edit_issue_title(&self, number: u64, title: &str) -> Result<()>;

    /// Remaining core API quota; a poll must not proceed on zero.
    async fn rate_limit_remaining(&self) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_from_record_keeps_all_fields() {
        let record = IssueRecord {
            number: 8,
            title: "[bot] Done".to_string(),
            state: IssueState::Closed,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            closed_at: Some("2024-01-03T00:00:00Z".to_string()),
            url: "http://example.com/issue/8".to_string(),
            labels: vec!["pipeline".to_string()],
        };

        let version = Version::from(record.clone());

        assert_eq!(version.number, 8);
        assert_eq!(version.title, record.title);
        assert_eq!(version.state, IssueState::Closed);
        assert_eq!(version.created_at, record.created_at);
        assert_eq!(version.closed_at, record.closed_at);
        assert_eq!(version.url, record.url);
    }

    #[test]
    fn test_version_from_open_record_has_no_closed_at() {
        let record = IssueRecord {
            number: 3,
            title: "Open issue".to_string(),
            state: IssueState::Open,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            closed_at: None,
            url: "http://example.com/issue/3".to_string(),
            labels: vec![],
        };

        let version = Version::from(record);
        assert_eq!(version.closed_at, None);
    }
}
