use crate::github::parse::{exact_title_matches, fetch_issue_pages, parse_issue_records};
use crate::store::{IssueRecord, IssueStore};
use crate::version::{ISO_8601_FORMAT, IssueState};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;

/// GitHub API endpoints
mod endpoints {
    pub const API_ROOT: &str = "https://api.github.com";
}

const USER_AGENT: &str = "concourse-github-issues";

/// Builds the search query for an exact-title lookup in open issues. The
/// search API has no true exact-match operator, so results still go through
/// `exact_title_matches`.
fn search_query(repository: &str, title: &str) -> String {
    format!("repo:{repository} state:open \"{title}\" in:title is:issue")
}

/// Token-authenticated GitHub client scoped to a single repository.
pub struct GitHubClient {
    client: reqwest::Client,
    repository: String,
    token: String,
}

impl GitHubClient {
    pub fn new(repository: &str, token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(GitHubClient {
            client,
            repository: repository.to_string(),
            token: token.to_string(),
        })
    }

    fn issues_url(&self) -> String {
        format!("{}/repos/{}/issues", endpoints::API_ROOT, self.repository)
    }

    async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("API request error: {}", response.status()));
        }

        Ok(response.json().await?)
    }

    async fn send_json(
        &self,
        request: reqwest::RequestBuilder,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let response = request
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("API request error: {}", response.status()));
        }

        Ok(response.json().await?)
    }

    fn single_record(value: serde_json::Value) -> Result<IssueRecord> {
        parse_issue_records(std::slice::from_ref(&value))
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Malformed issue payload from GitHub"))
    }
}

impl IssueStore for GitHubClient {
    async fn list_issues(
        &self,
        state: IssueState,
        labels: &[String],
        since: Option<NaiveDateTime>,
    ) -> Result<Vec<IssueRecord>> {
        let mut base_query = vec![("state".to_string(), state.as_str().to_string())];
        if !labels.is_empty() {
            base_query.push(("labels".to_string(), labels.join(",")));
        }
        if let Some(since) = since {
            base_query.push(("since".to_string(), since.format(ISO_8601_FORMAT).to_string()));
        }

        let url = self.issues_url();
        fetch_issue_pages(async |page, per_page| {
            let mut query = base_query.clone();
            query.push(("page".to_string(), page.to_string()));
            query.push(("per_page".to_string(), per_page.to_string()));
            let value = self.get_json(&url, &query).await?;
            value
                .as_array()
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Expected a JSON array of issues"))
        })
        .await
    }

    async fn search_open_by_title(&self, title: &str) -> Result<Vec<IssueRecord>> {
        let url = format!("{}/search/issues", endpoints::API_ROOT);
        let query = vec![("q".to_string(), search_query(&self.repository, title))];
        let value = self.get_json(&url, &query).await?;
        let items = value["items"]
            .as_array()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Expected search results with an items array"))?;
        Ok(exact_title_matches(parse_issue_records(&items), title))
    }

    async fn get_issue(&self, number: u64) -> Result<IssueRecord> {
        let url = format!("{}/{}", self.issues_url(), number);
        let value = self.get_json(&url, &[]).await?;
        Self::single_record(value)
    }

    async fn create_issue(
        &self,
        title: &str,
        body: &str,
        assignees: &[String],
        labels: &[String],
    ) -> Result<IssueRecord> {
        let payload = serde_json::json!({
            "title": title,
            "body": body,
            "assignees": assignees,
            "labels": labels,
        });
        let value = self
            .send_json(self.client.post(self.issues_url()), &payload)
            .await?;
        Self::single_record(value)
    }

    async fn comment_on_issue(&self, number: u64, body: &str) -> Result<()> {
        let url = format!("{}/{}/comments", self.issues_url(), number);
        let payload = serde_json::json!({ "body": body });
        self.send_json(self.client.post(url), &payload).await?;
        Ok(())
    }

    async fn edit_issue_title(&self, number: u64, title: &str) -> Result<()> {
        let url = format!("{}/{}", self.issues_url(), number);
        let payload = serde_json::json!({ "title": title });
        self.send_json(self.client.patch(url), &payload).await?;
        Ok(())
    }

    async fn rate_limit_remaining(&self) -> Result<u64> {
        let url = format!("{}/rate_limit", endpoints::API_ROOT);
        let value = self.get_json(&url, &[]).await?;
        value["resources"]["core"]["remaining"]
            .as_u64()
            .ok_or_else(|| anyhow::anyhow!("Malformed rate limit payload from GitHub"))
    }
}
