//! Implements the Forge trait for Github
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::*;
use octocrab::Octocrab;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    forge::{
        config::{Credentials, DEFAULT_PAGE_SIZE, RemoteConfig},
        traits::Forge,
        types::{ItemQuery, Milestone, RawIssue, TagRef},
    },
};

#[derive(Debug, Deserialize)]
struct CoreRate {
    remaining: u64,
}

#[derive(Debug, Deserialize)]
struct RateResources {
    core: CoreRate,
}

#[derive(Debug, Deserialize)]
struct RateLimitResponse {
    resources: RateResources,
}

#[derive(Debug, Deserialize)]
struct GitActor {
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct GitTagObject {
    tagger: GitActor,
}

#[derive(Debug, Deserialize)]
struct GitCommitObject {
    committer: GitActor,
}

#[derive(Debug, Serialize)]
struct Paged<'a, T: Serialize> {
    #[serde(flatten)]
    filters: &'a T,
    page: u32,
    per_page: u8,
}

#[derive(Debug, Serialize)]
struct MilestoneFilters {
    state: &'static str,
}

fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(
        err,
        octocrab::Error::GitHub { source, .. }
            if source.status_code == StatusCode::NOT_FOUND
    )
}

/// GitHub forge implementation using Octocrab for the REST API.
pub struct Github {
    config: RemoteConfig,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with the configured credentials and API base URL.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let builder = Octocrab::builder().base_uri(config.api_url.clone())?;

        let builder = match &config.credentials {
            Credentials::Anonymous => builder,
            Credentials::Token(token) => builder.personal_token(token.clone()),
            Credentials::Basic { username, password } => builder
                .basic_auth(
                    username.clone(),
                    password.expose_secret().to_string(),
                ),
        };

        let instance = builder.build()?;

        Ok(Self { config, instance })
    }

    fn repo_route(&self, suffix: &str) -> String {
        format!("/repos/{}/{}{suffix}", self.config.owner, self.config.repo)
    }

    async fn exists(&self, route: String) -> Result<bool> {
        let result: octocrab::Result<serde_json::Value> =
            self.instance.get(&route, None::<&()>).await;

        match result {
            Ok(_) => Ok(true),
            Err(err) if is_not_found(&err) => {
                debug!("{route} not found");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl Forge for Github {
    fn remote_config(&self) -> RemoteConfig {
        self.config.clone()
    }

    async fn rate_limit_remaining(&self) -> Result<u64> {
        let rate: RateLimitResponse =
            self.instance.get("/rate_limit", None::<&()>).await?;
        Ok(rate.resources.core.remaining)
    }

    async fn owner_exists(&self) -> Result<bool> {
        self.exists(format!("/users/{}", self.config.owner)).await
    }

    async fn repo_exists(&self) -> Result<bool> {
        self.exists(self.repo_route("")).await
    }

    async fn list_tag_refs(&self) -> Result<Vec<TagRef>> {
        let result: octocrab::Result<Vec<TagRef>> = self
            .instance
            .get(self.repo_route("/git/refs/tags"), None::<&()>)
            .await;

        match result {
            Ok(refs) => Ok(refs),
            // repositories without tags answer 404
            Err(err) if is_not_found(&err) => Ok(vec![]),
            Err(err) => Err(err.into()),
        }
    }

    async fn tag_timestamp(&self, tag: &TagRef) -> Result<DateTime<Utc>> {
        if tag.is_annotated() {
            let route = self.repo_route(&format!("/git/tags/{}", tag.object.sha));
            let object: GitTagObject =
                self.instance.get(route, None::<&()>).await?;
            return Ok(object.tagger.date);
        }

        debug!(
            "{} is a lightweight tag: using commit date of {}",
            tag.ref_name, tag.object.sha
        );

        let route =
            self.repo_route(&format!("/git/commits/{}", tag.object.sha));
        let object: GitCommitObject =
            self.instance.get(route, None::<&()>).await?;

        Ok(object.committer.date)
    }

    async fn list_milestones(&self, page: u32) -> Result<Vec<Milestone>> {
        let params = Paged {
            filters: &MilestoneFilters { state: "all" },
            page,
            per_page: DEFAULT_PAGE_SIZE,
        };

        let milestones: Vec<Milestone> = self
            .instance
            .get(self.repo_route("/milestones"), Some(&params))
            .await?;

        Ok(milestones)
    }

    async fn list_items(
        &self,
        query: &ItemQuery,
        page: u32,
    ) -> Result<Vec<RawIssue>> {
        let params = Paged {
            filters: query,
            page,
            per_page: DEFAULT_PAGE_SIZE,
        };

        let raw: Vec<RawIssue> = self
            .instance
            .get(self.repo_route("/issues"), Some(&params))
            .await?;

        Ok(raw)
    }

    async fn is_merged(&self, number: u64) -> Result<bool> {
        let merged = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .is_merged(number)
            .await?;

        Ok(merged)
    }

    async fn base_branch(&self, number: u64) -> Result<String> {
        let pr = self
            .instance
            .pulls(&self.config.owner, &self.config.repo)
            .get(number)
            .await?;

        Ok(pr.base.ref_field)
    }
}
