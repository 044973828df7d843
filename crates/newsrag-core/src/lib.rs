//! Core types shared by the newsrag crates.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Remediation shown whenever the Weaviate server cannot be reached.
pub const DOCKER_HINT: &str = "is the Weaviate container running? start it with \
`docker compose up -d` and check that ports 8080 and 50051 are free";

// ---------------------------------------------------------------------------
// NewsragError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum NewsragError {
    #[error("service unavailable after {attempts} attempt(s), last status: {last_status}")]
    ServiceUnavailable { attempts: usize, last_status: String },
    #[error("connection failed: {reason} ({hint})")]
    ConnectionFailed { reason: String, hint: String },
    #[error("http error: {0}")]
    Http(String),
    #[error("parsing error: {0}")]
    Parsing(String),
    #[error("collection error: {0}")]
    Collection(String),
    #[error("dataset error: {0}")]
    Dataset(String),
    #[error("dataset error: {} not found", .0.display())]
    DatasetNotFound(PathBuf),
    #[error("config error: {0}")]
    Config(String),
}

impl NewsragError {
    /// Build a `ConnectionFailed` carrying the standard Docker hint.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        NewsragError::ConnectionFailed {
            reason: reason.into(),
            hint: DOCKER_HINT.to_string(),
        }
    }

    /// Suggested remediation for errors the user can fix on their side.
    pub fn hint(&self) -> Option<&str> {
        match self {
            NewsragError::ConnectionFailed { hint, .. } => Some(hint.as_str()),
            NewsragError::ServiceUnavailable { .. } => Some(DOCKER_HINT),
            NewsragError::DatasetNotFound(_) => {
                Some("put the dataset in data/ or point NEWSRAG_DATASET at it")
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ArticleChunk
// ---------------------------------------------------------------------------

/// One chunk of a news article, as stored in the dataset file and inserted
/// into the collection.
///
/// Every field defaults when absent so partially populated records load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleChunk {
    pub article_content: String,
    pub chunk: String,
    pub chunk_index: i64,
    pub description: String,
    pub link: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
    pub title: String,
}

impl ArticleChunk {
    pub fn new(title: impl Into<String>, chunk: impl Into<String>, chunk_index: i64) -> Self {
        Self {
            title: title.into(),
            chunk: chunk.into(),
            chunk_index,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// RecordLoader trait (implementations in newsrag-loaders)
// ---------------------------------------------------------------------------

/// Source of dataset records.
#[async_trait]
pub trait RecordLoader: Send + Sync {
    async fn load(&self) -> Result<Vec<ArticleChunk>, NewsragError>;
}
