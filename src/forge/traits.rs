//! Traits related to the remote hosting platform
use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

use crate::{
    error::Result,
    forge::{
        config::RemoteConfig,
        types::{ItemQuery, Milestone, RawIssue, TagRef},
    },
};

/// Raw calls against the hosting platform. Each method is a single request;
/// pagination, rate-limit checks and result interpretation live in
/// [`crate::forge::manager::ForgeManager`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    fn remote_config(&self) -> RemoteConfig;
    /// Requests left in the current rate-limit window.
    async fn rate_limit_remaining(&self) -> Result<u64>;
    /// `Ok(false)` when the user or organization does not exist.
    async fn owner_exists(&self) -> Result<bool>;
    /// `Ok(false)` when the repository does not exist.
    async fn repo_exists(&self) -> Result<bool>;
    async fn list_tag_refs(&self) -> Result<Vec<TagRef>>;
    /// Creation time of a tag: the tagger date for annotated tags, the
    /// commit date for lightweight ones.
    async fn tag_timestamp(&self, tag: &TagRef) -> Result<DateTime<Utc>>;
    /// One page of milestones in every state.
    async fn list_milestones(&self, page: u32) -> Result<Vec<Milestone>>;
    /// One page of issues and pull requests, as returned by the API.
    async fn list_items(
        &self,
        query: &ItemQuery,
        page: u32,
    ) -> Result<Vec<RawIssue>>;
    /// `Ok(false)` and an error both mean the pull request was not merged.
    async fn is_merged(&self, number: u64) -> Result<bool>;
    /// Name of the branch the pull request targets.
    async fn base_branch(&self, number: u64) -> Result<String>;
}
