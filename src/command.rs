//! The "create changelog" workflow.
//!
//! 1. **Validation**: confirm the owner and repository exist
//! 2. **Resolution**: turn the milestone or tag range into a version window
//! 3. **Fetching**: list every closed issue and pull request in the window
//! 4. **Selection**: filter and group them
//! 5. **Rendering**: render the template, print it and write it to disk
use derive_builder::Builder;
use log::*;
use std::path::PathBuf;

use crate::{
    cli::Args,
    config::Config,
    error::Result,
    forge::{github::Github, manager::ForgeManager},
    render::{
        self, DEFAULT_OUTPUT_FILE, DocumentMeta, OutputFormat, TemplateSource,
    },
    resolver::{self, VersionBoundary},
    selection::{self, SelectionFilters},
};

/// Everything needed to produce one document.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct ChangelogRequest {
    pub boundary: VersionBoundary,
    pub filters: SelectionFilters,
    pub output_format: OutputFormat,
    /// Replaces the built-in template when set.
    pub template_file: Option<PathBuf>,
    pub output_file: PathBuf,
}

impl Default for ChangelogRequest {
    fn default() -> Self {
        Self {
            boundary: VersionBoundary::default(),
            filters: SelectionFilters::default(),
            output_format: OutputFormat::default(),
            template_file: None,
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

impl ChangelogRequest {
    pub fn builder() -> ChangelogRequestBuilder {
        ChangelogRequestBuilder::default()
    }
}

/// Fetches, selects and renders without writing anything.
pub async fn generate_changelog(
    forge: &ForgeManager,
    request: &ChangelogRequest,
) -> Result<String> {
    forge.validate().await?;

    let resolved = resolver::resolve(forge, &request.boundary).await?;

    let items = forge.items(&resolved.window.query()).await?;

    let selection =
        selection::select(forge, items, &resolved.window, &request.filters)
            .await?;

    let source = TemplateSource::select(
        request.output_format,
        !selection.groups.is_empty(),
        request.template_file.as_deref(),
    );

    let template = source.load().await?;

    let meta = DocumentMeta {
        repo_full_name: forge.remote_config().full_name(),
        version: resolved.version,
        closed_at: resolved.window.closed_at(),
    };

    render::render(&template, &meta, &selection)
}

/// Generates the document, echoes it to the console and writes it to the
/// request's output file.
pub async fn create_changelog(
    forge: &ForgeManager,
    request: &ChangelogRequest,
) -> Result<String> {
    let rendered = generate_changelog(forge, request).await?;
    render::emit(&rendered, &request.output_file).await?;
    Ok(rendered)
}

/// Runs the command line invocation against GitHub.
pub async fn execute(args: &Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let request = args.changelog_request(config)?;
    let remote = args.remote_config()?;

    debug!("changelog request: {:#?}", request);

    let forge = ForgeManager::new(Box::new(Github::new(remote)?));

    create_changelog(&forge, &request).await?;

    Ok(())
}
