//! Manager that wraps forge implementations
//!
//! Every request goes through a rate-limit check first. Pagination,
//! exact-name lookups and the interpretation of negative answers (unknown
//! owner, missing tag, unmerged pull request) live here so each [`Forge`]
//! stays a thin request layer.
use chrono::{DateTime, Utc};
use log::*;
use std::future::Future;

use crate::{
    error::{LoghubError, Result},
    forge::{
        config::RemoteConfig,
        traits::Forge,
        types::{Item, ItemQuery, Milestone},
    },
};

/// Accumulates pages from `fetch` starting at page 1 until a page comes back
/// empty. A short page does not end pagination: only an empty one does.
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut page = 1;
    let mut all = vec![];

    loop {
        let results = fetch(page).await?;

        if results.is_empty() {
            break;
        }

        debug!("page {page}: {} results", results.len());
        all.extend(results);
        page += 1;
    }

    Ok(all)
}

pub struct ForgeManager {
    forge: Box<dyn Forge>,
    remote_config: RemoteConfig,
}

impl ForgeManager {
    pub fn new(forge: Box<dyn Forge>) -> Self {
        let remote_config = forge.remote_config();
        Self {
            forge,
            remote_config,
        }
    }

    pub fn remote_config(&self) -> RemoteConfig {
        self.remote_config.clone()
    }

    fn rate_limit_exceeded(&self) -> LoghubError {
        LoghubError::RateLimitExceeded {
            authenticated: self.remote_config.credentials.is_authenticated(),
        }
    }

    /// Rate-limit errors raised by the forge don't know which credentials
    /// were used.
    fn with_credentials(&self, err: LoghubError) -> LoghubError {
        match err {
            LoghubError::RateLimitExceeded { .. } => self.rate_limit_exceeded(),
            err => err,
        }
    }

    /// Checks the rate limit, then awaits a single forge request.
    async fn request<T>(
        &self,
        request: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        self.check_rate().await?;
        request.await.map_err(|err| self.with_credentials(err))
    }

    /// Fails with [`LoghubError::RateLimitExceeded`] once the request budget
    /// is spent.
    pub async fn check_rate(&self) -> Result<()> {
        let remaining = self
            .forge
            .rate_limit_remaining()
            .await
            .map_err(|err| self.with_credentials(err))?;

        if remaining == 0 {
            error!("GitHub API rate limit exceeded!");
            return Err(self.rate_limit_exceeded());
        }

        debug!("rate limit remaining: {remaining}");

        Ok(())
    }

    /// Confirms the owner and repository exist before any other request.
    ///
    /// Any other failure runs the rate-limit check as a diagnostic so an
    /// exhausted budget is reported as such.
    pub async fn validate(&self) -> Result<()> {
        let owner = self.remote_config.owner.clone();
        let repo = self.remote_config.repo.clone();

        match self.forge.owner_exists().await {
            Ok(true) => {}
            Ok(false) => return Err(LoghubError::InvalidOwner(owner)),
            Err(err) => {
                self.check_rate().await?;
                return Err(self.with_credentials(err));
            }
        }

        match self.forge.repo_exists().await {
            Ok(true) => {}
            Ok(false) => return Err(LoghubError::InvalidRepo { owner, repo }),
            Err(err) => {
                self.check_rate().await?;
                return Err(self.with_credentials(err));
            }
        }

        info!("using repository {}", self.remote_config.full_name());

        Ok(())
    }

    /// Creation time of the tag named `tag_name`, matched exactly against
    /// `refs/tags/<tag_name>`.
    pub async fn tag_timestamp(&self, tag_name: &str) -> Result<DateTime<Utc>> {
        let ref_name = format!("refs/tags/{tag_name}");
        let refs = self.request(self.forge.list_tag_refs()).await?;

        let tag = refs
            .into_iter()
            .find(|r| r.ref_name == ref_name)
            .ok_or_else(|| LoghubError::InvalidTag(tag_name.to_string()))?;

        let timestamp = self.request(self.forge.tag_timestamp(&tag)).await?;

        debug!("tag {tag_name} created at {timestamp}");

        Ok(timestamp)
    }

    /// Every milestone of the repository regardless of state.
    pub async fn milestones(&self) -> Result<Vec<Milestone>> {
        collect_pages(|page| self.request(self.forge.list_milestones(page)))
            .await
    }

    /// The milestone whose title equals `title`.
    pub async fn milestone(&self, title: &str) -> Result<Milestone> {
        self.milestones()
            .await?
            .into_iter()
            .find(|m| m.title == title)
            .ok_or_else(|| LoghubError::InvalidMilestone(title.to_string()))
    }

    /// Every closed issue and pull request matching `query`.
    ///
    /// Pagination runs on the raw pages; payloads without a closed timestamp
    /// are dropped afterwards.
    pub async fn items(&self, query: &ItemQuery) -> Result<Vec<Item>> {
        debug!("listing items with query: {:?}", query);

        let raw = collect_pages(|page| {
            self.request(self.forge.list_items(query, page))
        })
        .await?;

        let items: Vec<Item> = raw
            .into_iter()
            .filter_map(|issue| {
                let number = issue.number;
                let item = issue.into_item();
                if item.is_none() {
                    warn!("skipping #{number}: no closed_at timestamp");
                }
                item
            })
            .collect();

        info!("fetched {} issues and pull requests", items.len());

        Ok(items)
    }

    /// Whether pull request `number` was merged. Any failure of the merge
    /// endpoint counts as "not merged".
    pub async fn is_merged(&self, number: u64) -> Result<bool> {
        self.check_rate().await?;

        match self.forge.is_merged(number).await {
            Ok(merged) => Ok(merged),
            Err(err) => {
                debug!("treating PR #{number} as not merged: {err}");
                Ok(false)
            }
        }
    }

    /// Branch pull request `number` targets.
    pub async fn base_branch(&self, number: u64) -> Result<String> {
        self.request(self.forge.base_branch(number)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        forge::{
            traits::MockForge,
            types::{TagRef, TagRefObject},
        },
        test_helpers::{
            create_mock_forge, create_test_remote_config, issue, raw_issue,
            raw_page,
        },
    };

    fn mock_forge() -> MockForge {
        let mut mock = MockForge::new();
        mock.expect_remote_config()
            .returning(create_test_remote_config);
        mock
    }

    fn tag_ref(name: &str, sha: &str) -> TagRef {
        TagRef {
            ref_name: format!("refs/tags/{name}"),
            object: TagRefObject {
                sha: sha.into(),
                kind: "tag".into(),
            },
        }
    }

    #[tokio::test]
    async fn collect_pages_stops_on_first_empty_page() {
        let pages = [100, 100, 0, 100];

        let items = collect_pages(|page| async move {
            let count = pages[(page - 1) as usize];
            Ok(vec![page; count])
        })
        .await
        .unwrap();

        assert_eq!(items.len(), 200);
    }

    #[tokio::test]
    async fn collect_pages_continues_past_short_pages() {
        let pages = [100, 3, 0];

        let items = collect_pages(|page| async move {
            Ok(vec![(); pages[(page - 1) as usize]])
        })
        .await
        .unwrap();

        assert_eq!(items.len(), 103);
    }

    #[tokio::test]
    async fn items_accumulates_pages_until_empty() {
        let mut mock = create_mock_forge();

        mock.expect_list_items().times(3).returning(|_, page| {
            let count = if page <= 2 { 100 } else { 0 };
            Ok((0..count)
                .map(|n| raw_issue(&issue(u64::from(page) * 1000 + n, &[])))
                .collect())
        });

        let manager = ForgeManager::new(Box::new(mock));
        let items = manager
            .items(&ItemQuery::closed(None, None))
            .await
            .unwrap();

        assert_eq!(items.len(), 200);
    }

    #[tokio::test]
    async fn exhausted_rate_limit_is_fatal() {
        let mut mock = mock_forge();
        mock.expect_rate_limit_remaining().returning(|| Ok(0));
        mock.expect_list_items().never();

        let manager = ForgeManager::new(Box::new(mock));
        let err = manager
            .items(&ItemQuery::closed(None, None))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LoghubError::RateLimitExceeded {
                authenticated: true
            }
        ));
    }

    #[tokio::test]
    async fn merge_lookup_errors_mean_not_merged() {
        let mut mock = create_mock_forge();
        mock.expect_is_merged().returning(|number| {
            if number == 1 {
                Ok(true)
            } else {
                Err(LoghubError::forge("404 Not Found"))
            }
        });

        let manager = ForgeManager::new(Box::new(mock));

        assert!(manager.is_merged(1).await.unwrap());
        assert!(!manager.is_merged(2).await.unwrap());
    }

    #[tokio::test]
    async fn finds_tag_by_exact_ref_name() {
        let mut mock = create_mock_forge();
        mock.expect_list_tag_refs().returning(|| {
            Ok(vec![tag_ref("v1.0.0-rc1", "aaa"), tag_ref("v1.0.0", "bbb")])
        });
        mock.expect_tag_timestamp()
            .withf(|tag| tag.object.sha == "bbb")
            .returning(|_| {
                Ok(DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
                    .unwrap()
                    .with_timezone(&Utc))
            });

        let manager = ForgeManager::new(Box::new(mock));
        let timestamp = manager.tag_timestamp("v1.0.0").await.unwrap();

        assert_eq!(timestamp.to_rfc3339(), "2024-01-02T03:04:05+00:00");
    }

    #[tokio::test]
    async fn unknown_tag_is_fatal() {
        let mut mock = create_mock_forge();
        mock.expect_list_tag_refs()
            .returning(|| Ok(vec![tag_ref("v1.0.0", "bbb")]));
        mock.expect_tag_timestamp().never();

        let manager = ForgeManager::new(Box::new(mock));
        let err = manager.tag_timestamp("v1.0").await.unwrap_err();

        assert!(matches!(err, LoghubError::InvalidTag(t) if t == "v1.0"));
    }

    #[tokio::test]
    async fn finds_milestone_across_pages() {
        let mut mock = create_mock_forge();
        mock.expect_list_milestones().returning(|page| {
            Ok(match page {
                1 => vec![Milestone {
                    number: 1,
                    title: "v1.0.0".into(),
                    closed_at: None,
                }],
                2 => vec![Milestone {
                    number: 2,
                    title: "v1.2.0".into(),
                    closed_at: None,
                }],
                _ => vec![],
            })
        });

        let manager = ForgeManager::new(Box::new(mock));

        assert_eq!(manager.milestone("v1.2.0").await.unwrap().number, 2);
        assert!(matches!(
            manager.milestone("v9").await.unwrap_err(),
            LoghubError::InvalidMilestone(_)
        ));
    }

    #[tokio::test]
    async fn validate_reports_unknown_owner_and_repo() {
        let mut mock = mock_forge();
        mock.expect_owner_exists().returning(|| Ok(false));
        let manager = ForgeManager::new(Box::new(mock));
        assert!(matches!(
            manager.validate().await.unwrap_err(),
            LoghubError::InvalidOwner(o) if o == "test"
        ));

        let mut mock = mock_forge();
        mock.expect_owner_exists().returning(|| Ok(true));
        mock.expect_repo_exists().returning(|| Ok(false));
        let manager = ForgeManager::new(Box::new(mock));
        assert!(matches!(
            manager.validate().await.unwrap_err(),
            LoghubError::InvalidRepo { .. }
        ));
    }

    #[tokio::test]
    async fn validate_checks_rate_limit_on_other_failures() {
        let mut mock = mock_forge();
        mock.expect_owner_exists()
            .returning(|| Err(LoghubError::forge("boom")));
        mock.expect_rate_limit_remaining().times(1).returning(|| Ok(0));

        let manager = ForgeManager::new(Box::new(mock));

        assert!(matches!(
            manager.validate().await.unwrap_err(),
            LoghubError::RateLimitExceeded { .. }
        ));
    }

    #[tokio::test]
    async fn open_items_do_not_end_pagination() {
        let mut mock = create_mock_forge();
        mock.expect_list_items().times(3).returning(|_, page| {
            Ok(match page {
                1 => {
                    let mut open = raw_issue(&issue(1, &[]));
                    open.closed_at = None;
                    vec![open]
                }
                2 => raw_page(&[issue(2, &[])]),
                _ => vec![],
            })
        });

        let manager = ForgeManager::new(Box::new(mock));
        let query = ItemQuery {
            state: Some("all".into()),
            ..Default::default()
        };
        let items = manager.items(&query).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].number, 2);
    }

    #[tokio::test]
    async fn rate_limit_is_checked_before_every_page() {
        let mut mock = mock_forge();
        let mut checks = 0;
        mock.expect_rate_limit_remaining().returning(move || {
            checks += 1;
            Ok(if checks == 1 { 1 } else { 0 })
        });
        mock.expect_list_items()
            .times(1)
            .returning(|_, page| Ok(raw_page(&[issue(u64::from(page), &[])])));

        let manager = ForgeManager::new(Box::new(mock));
        let err = manager
            .items(&ItemQuery::closed(None, None))
            .await
            .unwrap_err();

        assert!(matches!(err, LoghubError::RateLimitExceeded { .. }));
    }

    #[tokio::test]
    async fn tag_lookup_checks_rate_limit_per_request() {
        let mut mock = mock_forge();
        mock.expect_rate_limit_remaining().times(2).returning(|| Ok(10));
        mock.expect_list_tag_refs()
            .returning(|| Ok(vec![tag_ref("v1.0.0", "bbb")]));
        mock.expect_tag_timestamp().returning(|_| {
            Ok(DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc))
        });

        let manager = ForgeManager::new(Box::new(mock));

        assert!(manager.tag_timestamp("v1.0.0").await.is_ok());
    }

    #[tokio::test]
    async fn rate_limit_errors_reflect_credentials() {
        let mut mock = create_mock_forge();
        mock.expect_list_items().returning(|_, _| {
            Err(LoghubError::RateLimitExceeded {
                authenticated: false,
            })
        });

        let manager = ForgeManager::new(Box::new(mock));
        let err = manager
            .items(&ItemQuery::closed(None, None))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LoghubError::RateLimitExceeded {
                authenticated: true
            }
        ));
    }
}
