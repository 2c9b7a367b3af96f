//! Issue-tracker lookup: pre-populate workstreams from assigned issues.
//!
//! Speaks a Jira-style REST search endpoint. Only `{key, summary}` pairs
//! leave this module — the tracker is a naming convenience at workstream
//! creation, nothing downstream depends on it.

use serde::Deserialize;

/// Errors from tracker lookups.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("tracker request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("tracker returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// An issue assigned to the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedIssue {
    pub key: String,
    pub summary: String,
}

/// Client for a Jira-style issue tracker.
pub struct TrackerClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl TrackerClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Unresolved issues assigned to the current user, most recently
    /// updated first.
    pub async fn assigned_issues(&self) -> Result<Vec<TrackedIssue>, TrackerError> {
        let url = format!("{}/rest/api/2/search", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[
                (
                    "jql",
                    "assignee = currentUser() AND resolution = Unresolved ORDER BY updated DESC",
                ),
                ("fields", "summary"),
            ])
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::Api { status, body });
        }

        let payload: SearchPayload = response.json().await?;
        Ok(issues_from(payload))
    }
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    issues: Vec<IssueRecord>,
}

#[derive(Debug, Deserialize)]
struct IssueRecord {
    key: String,
    fields: IssueFields,
}

#[derive(Debug, Deserialize, Default)]
struct IssueFields {
    #[serde(default)]
    summary: String,
}

fn issues_from(payload: SearchPayload) -> Vec<TrackedIssue> {
    payload
        .issues
        .into_iter()
        .map(|issue| TrackedIssue {
            key: issue.key,
            summary: issue.fields.summary,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_search_payload_to_issues() {
        let json = r#"{
            "issues": [
                {"key": "PAY-142", "fields": {"summary": "Migrate ledger writes"}},
                {"key": "PAY-150", "fields": {"summary": "Retry loop fix"}}
            ],
            "total": 2
        }"#;

        let payload: SearchPayload = serde_json::from_str(json).unwrap();
        let issues = issues_from(payload);

        assert_eq!(
            issues,
            vec![
                TrackedIssue {
                    key: "PAY-142".into(),
                    summary: "Migrate ledger writes".into(),
                },
                TrackedIssue {
                    key: "PAY-150".into(),
                    summary: "Retry loop fix".into(),
                },
            ]
        );
    }

    #[test]
    fn tolerates_missing_fields() {
        let json = r#"{"issues": [{"key": "PAY-1", "fields": {}}]}"#;

        let payload: SearchPayload = serde_json::from_str(json).unwrap();
        let issues = issues_from(payload);

        assert_eq!(issues[0].summary, "");
    }

    #[test]
    fn empty_payload_is_no_issues() {
        let payload: SearchPayload = serde_json::from_str("{}").unwrap();
        assert!(issues_from(payload).is_empty());
    }
}
