use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Timestamp format used on the wire and in persisted versions.
///
/// GitHub returns timestamps in this shape and Concourse persists versions as
/// flat string documents, so both sides of the round trip share it.
pub const ISO_8601_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

/// Immutable snapshot of a tracked issue, used as the pipeline trigger unit.
///
/// Timestamps are kept as the strings they arrived as: a malformed timestamp
/// in a persisted previous version must degrade to a full rescan, not fail
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
    pub url: String,
}

/// Parses an ISO-8601 timestamp, returning `None` on malformed input.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, ISO_8601_FORMAT).ok()
}

impl Version {
    pub fn created_at_time(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.created_at)
    }

    pub fn closed_at_time(&self) -> Option<NaiveDateTime> {
        self.closed_at.as_deref().and_then(parse_timestamp)
    }

    /// Orders versions for triggering.
    ///
    /// Two closed issues compare by closure time: closure reflects when the
    /// underlying work finished, which is the trigger signal for closed-mode
    /// pipelines. Any pair involving an open issue compares by issue number,
    /// approximating creation order. Unparseable closure timestamps fall back
    /// to number comparison rather than failing.
    pub fn trigger_order(&self, other: &Version) -> Ordering {
        if self.state == IssueState::Closed && other.state == IssueState::Closed {
            if let (Some(own), Some(theirs)) = (self.closed_at_time(), other.closed_at_time()) {
                return own.cmp(&theirs).then(self.number.cmp(&other.number));
            }
        }
        self.number.cmp(&other.number)
    }
}
