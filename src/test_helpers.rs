//! Common test helper functions shared across test modules.
//!
//! Provides reusable fixtures for items, remote configs and mock forges.
use chrono::{DateTime, TimeZone, Utc};
use secrecy::SecretString;

use crate::forge::{
    config::{Credentials, RemoteConfig},
    traits::MockForge,
    types::{Item, RawIssue, RawLabel, RawUser},
};

/// Creates a test RemoteConfig for `test/repo` authenticated with a token.
pub fn create_test_remote_config() -> RemoteConfig {
    RemoteConfig {
        owner: "test".to_string(),
        repo: "repo".to_string(),
        credentials: Credentials::Token(SecretString::from(
            "test-token".to_string(),
        )),
        ..Default::default()
    }
}

/// A MockForge that answers `remote_config` and always has request budget
/// left. Callers add expectations for the calls their test makes.
pub fn create_mock_forge() -> MockForge {
    let mut mock = MockForge::new();
    mock.expect_remote_config()
        .returning(create_test_remote_config);
    mock.expect_rate_limit_remaining().returning(|| Ok(5000));
    mock
}

/// Noon UTC on the given day of March 2024.
pub fn march(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
}

fn item(number: u64, labels: &[&str], is_pull_request: bool) -> Item {
    let kind = if is_pull_request { "pull" } else { "issues" };
    Item {
        number,
        title: format!("Item {number}"),
        body: "".into(),
        html_url: format!("https://github.com/test/repo/{kind}/{number}"),
        author: "octocat".into(),
        labels: labels.iter().map(|l| l.to_string()).collect(),
        closed_at: march(15),
        is_pull_request,
    }
}

/// A closed issue with the given labels, closed on March 15th.
pub fn issue(number: u64, labels: &[&str]) -> Item {
    item(number, labels, false)
}

/// A closed pull request with the given labels, closed on March 15th.
pub fn pull_request(number: u64, labels: &[&str]) -> Item {
    item(number, labels, true)
}

/// The API payload an [`Item`] is built from.
pub fn raw_issue(item: &Item) -> RawIssue {
    RawIssue {
        number: item.number,
        title: item.title.clone(),
        body: Some(item.body.clone()),
        html_url: item.html_url.clone(),
        user: Some(RawUser {
            login: item.author.clone(),
        }),
        labels: item
            .labels
            .iter()
            .map(|name| RawLabel { name: name.clone() })
            .collect(),
        closed_at: Some(item.closed_at),
        pull_request: item
            .is_pull_request
            .then(|| serde_json::json!({ "url": item.html_url })),
    }
}

/// One page of API payloads for `items`.
pub fn raw_page(items: &[Item]) -> Vec<RawIssue> {
    items.iter().map(raw_issue).collect()
}
