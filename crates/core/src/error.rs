use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("no transformer registered for content type `{0}`")]
    UnknownTransform(String),

    #[error("{operation} on index {index} failed: {source}")]
    UpstreamWrite {
        operation: &'static str,
        index: String,
        #[source]
        source: SearchError,
    },

    #[error("config file missing: {}", .0.display())]
    ConfigMissing(PathBuf),

    #[error("invalid config file {}: {source}", path.display())]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("index {0} does not exist")]
    IndexNotFound(String),

    #[error("content store error: {0}")]
    Content(#[from] ContentError),

    #[error("search service error: {0}")]
    Search(#[from] SearchError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("regex error: {0}")]
    RegexError(#[from] regex::Error),
}

impl IndexerError {
    pub fn upstream(operation: &'static str, index: impl Into<String>, source: SearchError) -> Self {
        Self::UpstreamWrite {
            operation,
            index: index.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("task {task_id} on {index} not published after {polls} polls")]
    TaskTimeout {
        index: String,
        task_id: u64,
        polls: u32,
    },
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("invalid response from content store: {0}")]
    BackendResponse(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("malformed content payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = IndexerError> = std::result::Result<T, E>;
