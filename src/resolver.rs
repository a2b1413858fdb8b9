//! Resolves a requested version boundary (milestone name or tag range) into
//! the filters used to query the hosting platform.
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use log::*;

use crate::{
    error::Result,
    forge::{manager::ForgeManager, types::ItemQuery},
};

/// Prefix stripped from milestone names to form the display version.
pub const VERSION_TAG_PREFIX: &str = "v";

/// What the caller asked for. Empty strings count as unset.
#[derive(Debug, Clone, Default, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct VersionBoundary {
    /// Milestone title, matched exactly.
    pub milestone: Option<String>,
    /// Lower bound tag name.
    pub since_tag: Option<String>,
    /// Upper bound tag name, only used together with `since_tag`.
    pub until_tag: Option<String>,
}

impl VersionBoundary {
    pub fn builder() -> VersionBoundaryBuilder {
        VersionBoundaryBuilder::default()
    }

    fn milestone(&self) -> Option<&str> {
        non_empty(&self.milestone)
    }

    fn since_tag(&self) -> Option<&str> {
        non_empty(&self.since_tag)
    }

    fn until_tag(&self) -> Option<&str> {
        non_empty(&self.until_tag)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Resolved boundary for the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionWindow {
    /// Items attached to a milestone.
    Milestone {
        number: u64,
        closed_at: Option<DateTime<Utc>>,
    },
    /// Items closed between two tag creation times, bounds inclusive.
    Tags {
        since: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    },
    /// Every closed item: used when both or neither of milestone and since
    /// tag are given.
    Unbounded,
}

impl VersionWindow {
    pub fn milestone(&self) -> Option<u64> {
        match self {
            VersionWindow::Milestone { number, .. } => Some(*number),
            _ => None,
        }
    }

    pub fn since(&self) -> Option<DateTime<Utc>> {
        match self {
            VersionWindow::Tags { since, .. } => Some(*since),
            _ => None,
        }
    }

    pub fn until(&self) -> Option<DateTime<Utc>> {
        match self {
            VersionWindow::Tags { until, .. } => *until,
            _ => None,
        }
    }

    /// Date shown as the release date: the milestone's close date or the
    /// upper tag's creation time.
    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        match self {
            VersionWindow::Milestone { closed_at, .. } => *closed_at,
            VersionWindow::Tags { until, .. } => *until,
            VersionWindow::Unbounded => None,
        }
    }

    /// Issues endpoint query for every closed item inside this window.
    pub fn query(&self) -> ItemQuery {
        ItemQuery::closed(self.milestone(), self.since())
    }
}

/// A [`VersionWindow`] plus the version string to display, if one could be
/// derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVersion {
    pub window: VersionWindow,
    pub version: Option<String>,
}

/// Strips a single leading [`VERSION_TAG_PREFIX`].
pub fn strip_version_prefix(name: &str) -> &str {
    name.strip_prefix(VERSION_TAG_PREFIX).unwrap_or(name)
}

/// Turns the requested boundary into a window, looking up the milestone or
/// tags on the remote.
pub async fn resolve(
    forge: &ForgeManager,
    boundary: &VersionBoundary,
) -> Result<ResolvedVersion> {
    let version = boundary.until_tag().map(String::from);

    match (boundary.milestone(), boundary.since_tag()) {
        (Some(title), None) => {
            let milestone = forge.milestone(title).await?;

            info!(
                "using milestone {} (#{})",
                milestone.title, milestone.number
            );

            Ok(ResolvedVersion {
                window: VersionWindow::Milestone {
                    number: milestone.number,
                    closed_at: milestone.closed_at,
                },
                version: Some(strip_version_prefix(title).to_string()),
            })
        }
        (None, Some(since_tag)) => {
            let since = forge.tag_timestamp(since_tag).await?;

            let until = match boundary.until_tag() {
                Some(until_tag) => Some(forge.tag_timestamp(until_tag).await?),
                None => None,
            };

            info!("using items closed from {since} until {until:?}");

            Ok(ResolvedVersion {
                window: VersionWindow::Tags { since, until },
                version,
            })
        }
        (milestone, since_tag) => {
            if milestone.is_some() && since_tag.is_some() {
                warn!(
                    "both milestone and since tag given: ignoring both and including every closed item"
                );
            } else {
                info!("no milestone or tag given: including every closed item");
            }

            Ok(ResolvedVersion {
                window: VersionWindow::Unbounded,
                version,
            })
        }
    }
}
