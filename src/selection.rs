//! Turns the raw list of closed issues and pull requests into the ordered
//! sets a template renders.
//!
//! The steps run in a fixed order, each producing a new list:
//!
//! 1. drop items closed outside the version window
//! 2. drop unmerged pull requests and, with a branch filter, pull requests
//!    targeting another branch
//! 3. keep the pull requests whose labels match the pull request regex
//! 4. keep the issues whose labels match the issue regex
//! 5. partition the issues into the configured label groups
//!
//! Every step except 2 is a pure function of its input.
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use log::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{
    error::Result,
    forge::{manager::ForgeManager, types::Item},
    resolver::VersionWindow,
};

/// A named output bucket selecting issues carrying `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelGroup {
    pub name: String,
    pub label: String,
}

impl LabelGroup {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// Issues that fell into one [`LabelGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueGroup {
    pub name: String,
    pub issues: Vec<Item>,
}

/// User supplied filters applied after fetching.
#[derive(Debug, Clone, Default, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct SelectionFilters {
    /// Only keep pull requests targeting this branch.
    pub branch: Option<String>,
    /// Regex searched in the space-joined issue labels. Empty keeps all.
    pub issue_label_regex: String,
    /// Regex searched in the space-joined pull request labels. Empty keeps
    /// all.
    pub pr_label_regex: String,
    /// Ordered label groups. Empty disables grouping.
    pub issue_label_groups: Vec<LabelGroup>,
}

impl SelectionFilters {
    pub fn builder() -> SelectionFiltersBuilder {
        SelectionFiltersBuilder::default()
    }
}

/// The final sets handed to the renderer.
///
/// `groups` is empty unless label groups were configured, in which case
/// `issues` only holds issues that matched at least one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub pull_requests: Vec<Item>,
    pub issues: Vec<Item>,
    pub groups: Vec<IssueGroup>,
}

/// Label regex compiled once. An empty pattern matches everything.
#[derive(Debug, Clone)]
pub struct LabelFilter {
    pattern: Option<Regex>,
}

impl LabelFilter {
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self { pattern: None });
        }

        Ok(Self {
            pattern: Some(Regex::new(pattern)?),
        })
    }

    pub fn matches(&self, item: &Item) -> bool {
        match &self.pattern {
            Some(re) => re.is_match(&item.joined_labels()),
            None => true,
        }
    }
}

/// Drops items closed strictly before `since` or strictly after `until`.
pub fn filter_by_window(
    items: Vec<Item>,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
) -> Vec<Item> {
    items
        .into_iter()
        .filter(|item| since.is_none_or(|since| item.closed_at >= since))
        .filter(|item| until.is_none_or(|until| item.closed_at <= until))
        .collect()
}

/// Drops pull requests that were not merged, and with a `branch`, those
/// whose base branch differs. Issues pass through untouched.
///
/// Costs one merge lookup per pull request, plus one base branch lookup per
/// merged pull request when filtering by branch.
pub async fn filter_by_merge_status(
    forge: &ForgeManager,
    items: Vec<Item>,
    branch: Option<&str>,
) -> Result<Vec<Item>> {
    let mut kept = Vec::with_capacity(items.len());

    for item in items {
        if !item.is_pull_request {
            kept.push(item);
            continue;
        }

        if !forge.is_merged(item.number).await? {
            debug!("dropping PR #{}: not merged", item.number);
            continue;
        }

        if let Some(branch) = branch {
            let base = forge.base_branch(item.number).await?;
            if base != branch {
                debug!(
                    "dropping PR #{}: targets {base}, not {branch}",
                    item.number
                );
                continue;
            }
        }

        kept.push(item);
    }

    Ok(kept)
}

/// Pull requests whose labels match `filter`.
pub fn select_pull_requests(items: &[Item], filter: &LabelFilter) -> Vec<Item> {
    items
        .iter()
        .filter(|item| item.is_pull_request && filter.matches(item))
        .cloned()
        .collect()
}

/// Issues whose labels match `filter`.
pub fn select_issues(items: &[Item], filter: &LabelFilter) -> Vec<Item> {
    items
        .iter()
        .filter(|item| !item.is_pull_request && filter.matches(item))
        .cloned()
        .collect()
}

/// Partitions `issues` into `groups`.
///
/// An issue lands in every group whose label it carries. Returns the issues
/// that matched at least one group, in their original order and without
/// duplicates, plus the non-empty groups in configured order. With no groups
/// configured the issues pass through and the group list is empty.
pub fn group_issues(
    issues: Vec<Item>,
    groups: &[LabelGroup],
) -> (Vec<Item>, Vec<IssueGroup>) {
    if groups.is_empty() {
        return (issues, vec![]);
    }

    let mut buckets: Vec<IssueGroup> = groups
        .iter()
        .map(|g| IssueGroup {
            name: g.name.clone(),
            issues: vec![],
        })
        .collect();

    let mut matched = HashSet::new();

    for issue in &issues {
        for (group, bucket) in groups.iter().zip(buckets.iter_mut()) {
            if issue.has_label(&group.label) {
                bucket.issues.push(issue.clone());
                matched.insert(issue.number);
            }
        }
    }

    let selected = issues
        .into_iter()
        .filter(|issue| matched.contains(&issue.number))
        .collect();

    buckets.retain(|bucket| !bucket.issues.is_empty());

    (selected, buckets)
}

/// Runs every selection step over `items`.
///
/// Both regexes are compiled before any remote call so a bad pattern fails
/// the run without spending requests.
pub async fn select(
    forge: &ForgeManager,
    items: Vec<Item>,
    window: &VersionWindow,
    filters: &SelectionFilters,
) -> Result<Selection> {
    let pr_filter = LabelFilter::new(&filters.pr_label_regex)?;
    let issue_filter = LabelFilter::new(&filters.issue_label_regex)?;

    let items = filter_by_window(items, window.since(), window.until());
    debug!("{} items inside the version window", items.len());

    let items =
        filter_by_merge_status(forge, items, filters.branch.as_deref())
            .await?;

    let pull_requests = select_pull_requests(&items, &pr_filter);
    let issues = select_issues(&items, &issue_filter);

    let (issues, groups) = group_issues(issues, &filters.issue_label_groups);

    info!(
        "selected {} issues and {} pull requests",
        issues.len(),
        pull_requests.len()
    );

    Ok(Selection {
        pull_requests,
        issues,
        groups,
    })
}
