use std::io;

/// Everything that can abort a scrape. None of these are retried internally.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// Neither a category nor an id list was supplied.
    #[error("invalid query: supply at least a category or a list of arxiv ids")]
    InvalidQuery,

    /// Transport failure or non-2xx status from the API.
    #[error("failed to fetch data: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The body is not a well-formed feed, or an entry is missing a required element.
    #[error("failed to parse xml data: {0}")]
    Parse(String),

    /// An entry has no link with the required content type.
    #[error("entry {entry} has no link of type `{link_type}`")]
    MissingLink { entry: String, link_type: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error)
}

impl From<quick_xml::Error> for ScrapeError {
    fn from(err: quick_xml::Error) -> Self {
        ScrapeError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
