//! Configuration for the GitHub connection.
use secrecy::SecretString;

use crate::error::{LoghubError, Result};

/// Default root of the GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// Page size for paginated issue and milestone queries.
pub const DEFAULT_PAGE_SIZE: u8 = 100;

/// How requests to the API are authenticated.
#[derive(Debug, Clone, Default)]
pub enum Credentials {
    /// Unauthenticated requests: subject to the lowest rate limit.
    #[default]
    Anonymous,
    Token(SecretString),
    Basic {
        username: String,
        password: SecretString,
    },
}

impl Credentials {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Credentials::Anonymous)
    }
}

/// Remote repository connection configuration.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// API root, e.g. `https://api.github.com`.
    pub api_url: String,
    pub credentials: Credentials,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            owner: "".to_string(),
            repo: "".to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            credentials: Credentials::Anonymous,
        }
    }
}

impl RemoteConfig {
    /// Builds a config from an `owner/name` repository identifier.
    pub fn from_full_name(
        full_name: &str,
        api_url: Option<String>,
        credentials: Credentials,
    ) -> Result<Self> {
        let (owner, repo) = split_full_name(full_name)?;

        let api_url = match api_url {
            Some(url) => {
                url::Url::parse(&url)?;
                url.trim_end_matches('/').to_string()
            }
            None => DEFAULT_API_URL.to_string(),
        };

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            api_url,
            credentials,
        })
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Splits `owner/name` into its two non-empty halves.
pub fn split_full_name(full_name: &str) -> Result<(&str, &str)> {
    match full_name.split_once('/') {
        Some((owner, repo))
            if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
        {
            Ok((owner, repo))
        }
        _ => Err(LoghubError::InvalidRepoName(full_name.to_string())),
    }
}
