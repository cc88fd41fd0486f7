use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid search configuration: {0}")]
    Config(String),

    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The index answered with a non-success status.
    #[error("Search index returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode search response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type SearchResult<T> = Result<T, SearchError>;
