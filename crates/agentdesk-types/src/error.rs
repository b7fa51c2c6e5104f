use thiserror::Error;

/// Errors from repository operations (used by trait definitions in agentdesk-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// The upstream client cannot be built from the current environment.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("no upstream credential found (checked {})", .checked.join(", "))]
    MissingCredential { checked: Vec<String> },

    #[error("invalid upstream base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Errors related to agent operations.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent not found")]
    NotFound,

    #[error("invalid agent name: {0}")]
    InvalidName(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to conversation operations.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("conversation not found")]
    NotFound,

    #[error("agent not found")]
    AgentNotFound,

    #[error("message content must not be empty")]
    EmptyContent,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors raised while opening a stream, before any frame is sent.
///
/// Once a stream is open, failures are reported inside the stream instead.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("conversation not found")]
    ConversationNotFound,

    #[error("agent not found")]
    AgentNotFound,

    #[error("model '{model}' needs the upstream client, which is not configured")]
    UpstreamUnavailable { model: String },

    #[error("storage error: {0}")]
    StorageError(String),
}

impl From<RepositoryError> for AgentError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => AgentError::NotFound,
            other => AgentError::StorageError(other.to_string()),
        }
    }
}

impl From<RepositoryError> for ConversationError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ConversationError::NotFound,
            other => ConversationError::StorageError(other.to_string()),
        }
    }
}

impl From<RepositoryError> for RelayError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => RelayError::ConversationNotFound,
            other => RelayError::StorageError(other.to_string()),
        }
    }
}
