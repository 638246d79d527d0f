use crate::store::IssueRecord;
use crate::version::IssueState;
use anyhow::Result;

/// Converts raw GitHub issue payloads into records, skipping entries that are
/// malformed and entries that are pull requests (the issues endpoints return
/// both).
pub fn parse_issue_records(issues_json: &[serde_json::Value]) -> Vec<IssueRecord> {
    issues_json
        .iter()
        .filter_map(|issue| {
            if !issue["pull_request"].is_null() {
                return None;
            }
            let number = issue["number"].as_u64()?;
            let title = issue["title"].as_str()?;
            let state = match issue["state"].as_str()? {
                "open" => IssueState::Open,
                "closed" => IssueState::Closed,
                _ => return None,
            };
            let created_at = issue["created_at"].as_str()?;
            let closed_at = issue["closed_at"].as_str().map(str::to_string);
            let url = issue["html_url"]
                .as_str()
                .or_else(|| issue["url"].as_str())
                .unwrap_or_default()
                .to_string();
            let labels = issue["labels"]
                .as_array()
                .map(|labels| {
                    labels
                        .iter()
                        .filter_map(|label| label["name"].as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();

            Some(IssueRecord {
                number,
                title: title.to_string(),
                state,
                created_at: created_at.to_string(),
                closed_at,
                url,
                labels,
            })
        })
        .collect()
}

/// Drives paginated issue listing until an empty page, parsing as it goes.
pub async fn fetch_issue_pages<F>(mut fetch_page: F) -> Result<Vec<IssueRecord>>
where
    F: AsyncFnMut(u32, u32) -> Result<Vec<serde_json::Value>>,
{
    let mut all_records = Vec::new();
    let mut page = 1;
    let per_page = 100;

    loop {
        let page_json = fetch_page(page, per_page).await?;

        if page_json.is_empty() {
            break;
        }

        all_records.extend(parse_issue_records(&page_json));
        page += 1;
    }

    Ok(all_records)
}

/// Post-filters search results down to exact title equality. The search API
/// matches on words, so a query for a title can return supersets of it.
pub fn exact_title_matches(records: Vec<IssueRecord>, title: &str) -> Vec<IssueRecord> {
    records
        .into_iter()
        .filter(|record| record.title == title)
        .collect()
}
