use thiserror::Error;

#[derive(Debug, Error)]
pub enum DacError {
    #[error("manifest parse error: {0}")]
    ManifestParse(String),

    #[error("manifest schema error: {0}")]
    ManifestSchema(String),

    #[error("remote API returned HTTP {status}: {body}")]
    RemoteUnavailable { status: u16, body: String },

    #[error("bulk {action} failed for {} rule(s): HTTP {status}: {body}", .ids.len())]
    RemoteAction {
        action: String,
        status: u16,
        body: String,
        ids: Vec<String>,
    },

    #[error("remote API unreachable: {0}")]
    RemoteTransport(String),

    #[error("API key contains characters not valid in an HTTP header")]
    InvalidApiKey,

    #[error("rule not found: {0}")]
    RuleNotFound(String),

    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Git(#[from] git2::Error),
}

pub type Result<T> = std::result::Result<T, DacError>;
