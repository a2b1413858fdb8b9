//! Access to the hosting platform's issues, pull requests, tags and
//! milestones.

/// Connection and authentication settings.
pub mod config;

/// GitHub API client implementation for GitHub.com and Enterprise.
pub mod github;

/// Rate-limit checks, pagination and lookups on top of a [`traits::Forge`].
pub mod manager;

/// Common trait for the platform abstraction.
pub mod traits;

/// Shared data types for items, milestones and tags.
pub mod types;
