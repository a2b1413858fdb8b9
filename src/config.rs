//! Configuration loading and parsing for `loghub.toml` files.
//!
//! Every field is optional. Values given on the command line take
//! precedence over the file.
use log::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{
    error::{LoghubError, Result},
    render::{DEFAULT_OUTPUT_FILE, OutputFormat},
    selection::LabelGroup,
};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "loghub.toml";

/// Root configuration structure for `loghub.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)] // Use default for missing fields
pub struct Config {
    /// Regex searched in space-joined issue labels (default: "", keep all).
    pub issue_label_regex: String,
    /// Regex searched in space-joined pull request labels (default: "",
    /// keep all).
    pub pr_label_regex: String,
    /// Ordered issue label groups (default: none).
    pub issue_label_groups: Vec<LabelGroup>,
    /// Document kind (default: changelog).
    pub output_format: OutputFormat,
    /// Custom Tera template replacing the built-in ones.
    pub template: Option<PathBuf>,
    /// Where the rendered document is written (default: CHANGELOG.temp).
    pub output_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            issue_label_regex: "".into(),
            pr_label_regex: "".into(),
            issue_label_groups: vec![],
            output_format: OutputFormat::default(),
            template: None,
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

impl Config {
    /// Loads `path`, or [`DEFAULT_CONFIG_FILE`] from the working directory
    /// when no path is given. Only an explicitly requested file has to
    /// exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                return Err(LoghubError::invalid_config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }

            debug!("no configuration found: using default");
            return Ok(Config::default());
        }

        info!("loading configuration from {}", path.display());

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;

        Ok(config)
    }
}
