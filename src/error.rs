//! Error types for loghub.
//!
//! Every condition that aborts a run is a variant of [`LoghubError`]. Nothing
//! in the library terminates the process: the binary decides what to do with
//! the error it receives.

use thiserror::Error;

/// Main error type for loghub operations.
#[derive(Error, Debug)]
pub enum LoghubError {
    // Cli args errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Repository must be given as `owner/name`, got `{0}`")]
    InvalidRepoName(String),

    // Remote lookups that found nothing
    #[error("Organization/user `{0}` seems to be invalid")]
    InvalidOwner(String),

    #[error(
        "Repository `{repo}` for organization/username `{owner}` seems to be invalid"
    )]
    InvalidRepo { owner: String, repo: String },

    #[error("You didn't pass a valid tag name: `{0}`")]
    InvalidTag(String),

    #[error("You didn't pass a valid milestone name: `{0}`")]
    InvalidMilestone(String),

    // Network/API errors
    #[error("{}", rate_limit_message(*authenticated))]
    RateLimitExceeded { authenticated: bool },

    #[error("Forge operation failed: {0}")]
    ForgeError(String),

    // Parsing and rendering errors - automatic conversions via #[from]
    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Template rendering failed: {0}")]
    TemplateError(#[from] tera::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using LoghubError
pub type Result<T> = std::result::Result<T, LoghubError>;

fn rate_limit_message(authenticated: bool) -> &'static str {
    if authenticated {
        "GitHub API rate limit exceeded! Wait for the limit to reset and try again"
    } else {
        "GitHub API rate limit exceeded! Try running loghub with user/password or token"
    }
}

impl LoghubError {
    /// Create a forge error with context
    pub fn forge(msg: impl Into<String>) -> Self {
        Self::ForgeError(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid args error
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }
}

// Implement From for octocrab errors (GitHub API). The forge does not know
// the credentials in use: ForgeManager fills in `authenticated`.
impl From<octocrab::Error> for LoghubError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("rate limit") =>
            {
                Self::RateLimitExceeded {
                    authenticated: false,
                }
            }
            _ => Self::ForgeError(format!("GitHub API error: {}", err)),
        }
    }
}
