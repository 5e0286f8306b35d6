use crate::ai::prompts;
use crate::ai::schema_utils::Issue;
use thiserror::Error;

/// Failure reported by the model endpoint itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamError {
    pub status: Option<u16>,
    pub message: String,
    pub request_id: Option<String>,
    /// Static remediation hints matched from the message text.
    pub hints: Vec<Issue>,
}

impl UpstreamError {
    pub fn new(status: Option<u16>, message: impl Into<String>, request_id: Option<String>) -> Self {
        let message = message.into();
        let hints = prompts::remediation_hints(&message);
        Self { status, message, request_id, hints }
    }
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{status}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Malformed Schema JSON: {0}")]
    MalformedInput(String),

    #[error("Schema Invalid: {} issue(s)", .0.len())]
    SchemaInvalid(Vec<Issue>),

    #[error("Upstream Error: {0}")]
    Upstream(UpstreamError),

    #[error("Transport Error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Unknown Error: {0}")]
    Unknown(String),
}

/// Coarse classification surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedInput,
    SchemaInvalid,
    UpstreamError,
    UnknownError,
}

impl ChainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChainError::MalformedInput(_) => ErrorKind::MalformedInput,
            ChainError::SchemaInvalid(_) => ErrorKind::SchemaInvalid,
            ChainError::Upstream(_) => ErrorKind::UpstreamError,
            ChainError::Transport(_)
            | ChainError::Json(_)
            | ChainError::Config(_)
            | ChainError::Unknown(_) => ErrorKind::UnknownError,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ChainError::MalformedInput(_) | ChainError::SchemaInvalid(_) => 400,
            ChainError::Upstream(e) => e.status.unwrap_or(500),
            _ => 500,
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            ChainError::Upstream(e) => e.request_id.as_deref(),
            _ => None,
        }
    }
}
