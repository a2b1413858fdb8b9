//! Normalized data returned from the hosting platform.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single issue or pull request returned by the issues endpoint.
///
/// Label names are derived once when the item is ingested and the closed
/// timestamp is mandatory: items without one are rejected before they reach
/// the selection pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub html_url: String,
    pub author: String,
    /// Label names in the order the platform returned them
    pub labels: Vec<String>,
    pub closed_at: DateTime<Utc>,
    /// True when the item carries pull-request data
    pub is_pull_request: bool,
}

impl Item {
    /// Label names joined by a single space, the form label regexes run
    /// against.
    pub fn joined_labels(&self) -> String {
        self.labels.join(" ")
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLabel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub login: String,
}

/// Issue payload as returned by `GET /repos/{owner}/{repo}/issues`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawIssue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl RawIssue {
    /// Converts the payload into an [`Item`], or returns `None` when the
    /// payload has no closed timestamp.
    pub fn into_item(self) -> Option<Item> {
        let closed_at = self.closed_at?;

        let is_pull_request = self
            .pull_request
            .as_ref()
            .is_some_and(|pr| !pr.is_null());

        Some(Item {
            number: self.number,
            title: self.title,
            body: self.body.unwrap_or_default(),
            html_url: self.html_url,
            author: self.user.map(|u| u.login).unwrap_or_default(),
            labels: self.labels.into_iter().map(|l| l.name).collect(),
            closed_at,
            is_pull_request,
        })
    }
}

/// A milestone defined on the repository.
#[derive(Debug, Clone, Deserialize)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagRefObject {
    pub sha: String,
    /// `tag` for annotated tags, `commit` for lightweight ones
    #[serde(rename = "type")]
    pub kind: String,
}

/// A reference under `refs/tags/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TagRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub object: TagRefObject,
}

impl TagRef {
    pub fn is_annotated(&self) -> bool {
        self.object.kind == "tag"
    }
}

/// Filters accepted by the issues endpoint. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentioned: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
}

impl ItemQuery {
    /// Query for every closed issue and pull request, optionally scoped to a
    /// milestone and an earliest update time.
    pub fn closed(milestone: Option<u64>, since: Option<DateTime<Utc>>) -> Self {
        Self {
            milestone,
            state: Some("closed".into()),
            since,
            ..Default::default()
        }
    }
}
