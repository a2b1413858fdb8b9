//! Renders the selected issues and pull requests into a changelog or release
//! notes document.
use chrono::{DateTime, Local, NaiveDate, Utc};
use log::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::{
    error::Result,
    forge::{config::split_full_name, types::Item},
    selection::{IssueGroup, Selection},
};

pub mod templates;

/// File the rendered document is written to unless told otherwise.
pub const DEFAULT_OUTPUT_FILE: &str = "CHANGELOG.temp";
/// Shown when no version could be derived from a milestone or tag.
pub const VERSION_PLACEHOLDER: &str = "<RELEASE_VERSION>";

const RULE_WIDTH: usize = 79;

/// Kind of document to produce.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Changelog,
    #[serde(alias = "release-notes", alias = "release_notes")]
    #[value(alias = "release-notes")]
    Release,
}

/// Where the template text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Builtin(&'static str),
    File(PathBuf),
}

impl TemplateSource {
    /// A caller supplied template wins; otherwise one of the four built-ins
    /// is picked from the output format and whether issues are grouped.
    pub fn select(
        format: OutputFormat,
        grouped: bool,
        template_file: Option<&Path>,
    ) -> Self {
        if let Some(path) = template_file {
            return TemplateSource::File(path.to_path_buf());
        }

        let template = match (format, grouped) {
            (OutputFormat::Changelog, false) => templates::CHANGELOG_TEMPLATE,
            (OutputFormat::Changelog, true) => {
                templates::CHANGELOG_GROUPS_TEMPLATE
            }
            (OutputFormat::Release, false) => templates::RELEASE_TEMPLATE,
            (OutputFormat::Release, true) => templates::RELEASE_GROUPS_TEMPLATE,
        };

        TemplateSource::Builtin(template)
    }

    pub async fn load(&self) -> Result<String> {
        match self {
            TemplateSource::Builtin(template) => Ok(template.to_string()),
            TemplateSource::File(path) => {
                debug!("loading template from {}", path.display());
                Ok(fs::read_to_string(path).await?)
            }
        }
    }
}

/// Release date shown in the document: the date part of `closed_at`, or
/// `today` formatted `YYYY/MM/DD` when nothing closed the release yet.
pub fn close_date(closed_at: Option<DateTime<Utc>>, today: NaiveDate) -> String {
    match closed_at {
        Some(closed_at) => closed_at.format("%Y-%m-%d").to_string(),
        None => today.format("%Y/%m/%d").to_string(),
    }
}

#[derive(Debug, Serialize)]
struct TemplateContext<'a> {
    version: &'a str,
    close_date: &'a str,
    repo_full_name: &'a str,
    repo_owner: &'a str,
    repo_name: &'a str,
    issues: &'a [Item],
    pull_requests: &'a [Item],
    issue_label_groups: &'a [IssueGroup],
}

/// Everything the template sees besides the selection itself.
#[derive(Debug, Clone)]
pub struct DocumentMeta {
    /// `owner/name`
    pub repo_full_name: String,
    pub version: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Renders `template` against the selection.
pub fn render(
    template: &str,
    meta: &DocumentMeta,
    selection: &Selection,
) -> Result<String> {
    let (repo_owner, repo_name) = split_full_name(&meta.repo_full_name)?;
    let version = meta.version.as_deref().unwrap_or(VERSION_PLACEHOLDER);
    let close_date = close_date(meta.closed_at, Local::now().date_naive());

    let context = TemplateContext {
        version,
        close_date: &close_date,
        repo_full_name: &meta.repo_full_name,
        repo_owner,
        repo_name,
        issues: &selection.issues,
        pull_requests: &selection.pull_requests,
        issue_label_groups: &selection.groups,
    };

    let context = tera::Context::from_serialize(&context)?;
    let rendered = tera::Tera::one_off(template, &context, false)?;

    Ok(rendered)
}

/// The document framed by a rule of `#` above and below, as echoed to the
/// console.
pub fn framed(rendered: &str) -> String {
    let rule = "#".repeat(RULE_WIDTH);
    format!("{rule}\n{rendered}\n{rule}")
}

/// Prints the framed document and writes it to `output_file`.
pub async fn emit(rendered: &str, output_file: &Path) -> Result<()> {
    println!("{}", framed(rendered));

    info!("writing output to: {}", output_file.display());
    fs::write(output_file, rendered).await?;

    Ok(())
}
