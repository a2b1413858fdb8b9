//! Generate changelogs and release notes from the closed issues and merged
//! pull requests of a GitHub repository.
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod forge;
pub mod render;
pub mod resolver;
pub mod selection;

pub use cli::Args;
pub use command::{ChangelogRequest, create_changelog, generate_changelog};
pub use error::{LoghubError, Result};

#[cfg(test)]
pub mod test_helpers;
