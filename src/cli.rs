//! CLI argument parsing and credential resolution.
use clap::Parser;
use log::*;
use secrecy::SecretString;
use std::{env, path::PathBuf};

use crate::{
    command::ChangelogRequest,
    config::Config,
    error::{LoghubError, Result},
    forge::config::{Credentials, RemoteConfig},
    render::OutputFormat,
    resolver::VersionBoundary,
    selection::{LabelGroup, SelectionFilters},
};

/// Environment variable consulted when no credentials are passed.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Generate a changelog or release notes from the closed issues and merged
/// pull requests of a GitHub repository.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Repository as owner/name (e.g. spyder-ide/spyder).
    pub repository: String,

    #[arg(short, long)]
    /// GitHub username for basic authentication.
    pub username: Option<String>,

    #[arg(short, long)]
    /// GitHub password for basic authentication.
    pub password: Option<String>,

    #[arg(short, long)]
    /// GitHub access token. Falls back to the GITHUB_TOKEN env var.
    pub token: Option<String>,

    #[arg(short, long, conflicts_with = "since_tag")]
    /// Milestone to build the changelog for. A leading "v" is stripped to
    /// form the version.
    pub milestone: Option<String>,

    #[arg(long)]
    /// Include items closed at or after this tag was created.
    pub since_tag: Option<String>,

    #[arg(long, requires = "since_tag")]
    /// Include items closed at or before this tag was created.
    pub until_tag: Option<String>,

    #[arg(short, long)]
    /// Only include pull requests merged into this branch.
    pub branch: Option<String>,

    #[arg(short, long, value_enum)]
    /// Output format (default: changelog).
    pub format: Option<OutputFormat>,

    #[arg(long)]
    /// Only include issues whose labels match this regex.
    pub issue_label_regex: Option<String>,

    #[arg(long)]
    /// Only include pull requests whose labels match this regex.
    pub pr_label_regex: Option<String>,

    #[arg(long = "issue-label-group", value_name = "NAME=LABEL", value_parser = parse_label_group)]
    /// Group issues labeled LABEL under NAME. Repeat for several groups; a
    /// bare LABEL doubles as its own name.
    pub issue_label_groups: Vec<LabelGroup>,

    #[arg(long)]
    /// Custom Tera template used instead of the built-in ones.
    pub template: Option<PathBuf>,

    #[arg(short, long)]
    /// File the result is written to (default: CHANGELOG.temp).
    pub output_file: Option<PathBuf>,

    #[arg(short, long)]
    /// Configuration file (default: loghub.toml, if present).
    pub config: Option<PathBuf>,

    #[arg(long)]
    /// API root for GitHub Enterprise (default: https://api.github.com).
    pub api_url: Option<String>,

    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}

/// Parses `NAME=LABEL`, or a bare `LABEL` used as its own name.
pub fn parse_label_group(value: &str) -> std::result::Result<LabelGroup, String> {
    let (name, label) = value.split_once('=').unwrap_or((value, value));

    if name.is_empty() || label.is_empty() {
        return Err(format!("expected NAME=LABEL, got `{value}`"));
    }

    Ok(LabelGroup::new(name, label))
}

/// Picks the credentials to use: an explicit token, then username and
/// password, then the token from the environment.
pub fn resolve_credentials(
    token: Option<&str>,
    username: Option<&str>,
    password: Option<&str>,
    env_token: Option<String>,
) -> Result<Credentials> {
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        return Ok(Credentials::Token(SecretString::from(token.to_string())));
    }

    match (username, password) {
        (Some(username), Some(password)) => {
            return Ok(Credentials::Basic {
                username: username.to_string(),
                password: SecretString::from(password.to_string()),
            });
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(LoghubError::invalid_args(
                "username and password must be given together",
            ));
        }
        (None, None) => {}
    }

    if let Some(token) = env_token.filter(|t| !t.is_empty()) {
        return Ok(Credentials::Token(SecretString::from(token)));
    }

    Ok(Credentials::Anonymous)
}

impl Args {
    /// Connection settings for the repository.
    pub fn remote_config(&self) -> Result<RemoteConfig> {
        let credentials = resolve_credentials(
            self.token.as_deref(),
            self.username.as_deref(),
            self.password.as_deref(),
            env::var(TOKEN_ENV_VAR).ok(),
        )?;

        if !credentials.is_authenticated() {
            warn!(
                "no credentials given: requests are subject to the anonymous rate limit"
            );
        }

        RemoteConfig::from_full_name(
            &self.repository,
            self.api_url.clone(),
            credentials,
        )
    }

    /// Merges the arguments over `config` into a request.
    pub fn changelog_request(&self, config: Config) -> Result<ChangelogRequest> {
        let issue_label_groups = if self.issue_label_groups.is_empty() {
            config.issue_label_groups
        } else {
            self.issue_label_groups.clone()
        };

        let filters = SelectionFilters {
            branch: self.branch.clone(),
            issue_label_regex: self
                .issue_label_regex
                .clone()
                .unwrap_or(config.issue_label_regex),
            pr_label_regex: self
                .pr_label_regex
                .clone()
                .unwrap_or(config.pr_label_regex),
            issue_label_groups,
        };

        let boundary = VersionBoundary {
            milestone: self.milestone.clone(),
            since_tag: self.since_tag.clone(),
            until_tag: self.until_tag.clone(),
        };

        Ok(ChangelogRequest {
            boundary,
            filters,
            output_format: self.format.unwrap_or(config.output_format),
            template_file: self.template.clone().or(config.template),
            output_file: self.output_file.clone().unwrap_or(config.output_file),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("loghub").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn parses_label_groups() {
        assert_eq!(
            parse_label_group("Bugs fixed=type:bug").unwrap(),
            LabelGroup::new("Bugs fixed", "type:bug")
        );
        assert_eq!(
            parse_label_group("docs").unwrap(),
            LabelGroup::new("docs", "docs")
        );
        assert!(parse_label_group("=bug").is_err());
        assert!(parse_label_group("Bugs=").is_err());
    }

    #[test]
    fn explicit_token_wins() {
        let creds =
            resolve_credentials(Some("abc"), Some("u"), Some("p"), None)
                .unwrap();
        match creds {
            Credentials::Token(t) => assert_eq!(t.expose_secret(), "abc"),
            other => panic!("unexpected credentials: {other:?}"),
        }
    }

    #[test]
    fn basic_auth_beats_environment_token() {
        let creds = resolve_credentials(
            None,
            Some("octocat"),
            Some("hunter2"),
            Some("env".into()),
        )
        .unwrap();
        assert!(matches!(
            creds,
            Credentials::Basic { ref username, .. } if username == "octocat"
        ));
    }

    #[test]
    fn falls_back_to_environment_then_anonymous() {
        let creds =
            resolve_credentials(None, None, None, Some("env".into())).unwrap();
        assert!(matches!(creds, Credentials::Token(_)));

        let creds =
            resolve_credentials(None, None, None, Some("".into())).unwrap();
        assert!(matches!(creds, Credentials::Anonymous));
    }

    #[test]
    fn username_without_password_is_an_error() {
        let err = resolve_credentials(None, Some("u"), None, None).unwrap_err();
        assert!(matches!(err, LoghubError::InvalidArgs(_)));
    }

    #[test]
    fn milestone_conflicts_with_since_tag() {
        let result = Args::try_parse_from([
            "loghub",
            "o/r",
            "--milestone",
            "v1",
            "--since-tag",
            "v0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn until_tag_requires_since_tag() {
        let result =
            Args::try_parse_from(["loghub", "o/r", "--until-tag", "v1"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_values_override_config() {
        let args = parse(&[
            "spyder-ide/loghub",
            "--since-tag",
            "v1.0",
            "--until-tag",
            "v1.1",
            "--branch",
            "main",
            "--format",
            "release-notes",
            "--pr-label-regex",
            "enhancement",
            "--issue-label-group",
            "Bugs=bug",
            "--issue-label-group",
            "docs",
        ]);

        let config = Config {
            issue_label_regex: "from-config".into(),
            pr_label_regex: "ignored".into(),
            issue_label_groups: vec![LabelGroup::new("Ignored", "x")],
            output_file: PathBuf::from("NOTES.md"),
            ..Default::default()
        };

        let request = args.changelog_request(config).unwrap();

        assert_eq!(request.boundary.since_tag.as_deref(), Some("v1.0"));
        assert_eq!(request.boundary.until_tag.as_deref(), Some("v1.1"));
        assert_eq!(request.filters.branch.as_deref(), Some("main"));
        assert_eq!(request.filters.issue_label_regex, "from-config");
        assert_eq!(request.filters.pr_label_regex, "enhancement");
        assert_eq!(
            request.filters.issue_label_groups,
            vec![LabelGroup::new("Bugs", "bug"), LabelGroup::new("docs", "docs")]
        );
        assert_eq!(request.output_format, OutputFormat::Release);
        assert_eq!(request.output_file, PathBuf::from("NOTES.md"));
        assert_eq!(request.template_file, None);
    }

    #[test]
    fn remote_config_from_args() {
        let args = parse(&["spyder-ide/loghub", "--token", "abc"]);
        let remote = args.remote_config().unwrap();
        assert_eq!(remote.owner, "spyder-ide");
        assert_eq!(remote.repo, "loghub");
        assert!(remote.credentials.is_authenticated());

        let args = parse(&["loghub", "--token", "abc"]);
        assert!(matches!(
            args.remote_config().unwrap_err(),
            LoghubError::InvalidRepoName(_)
        ));
    }
}
