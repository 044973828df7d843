use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use newsrag_core::{ArticleChunk, NewsragError, RecordLoader};
use tracing::info;

/// On-disk layout of a dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// A single JSON array of records.
    JsonArray,
    /// One JSON record per line.
    JsonLines,
}

impl DatasetFormat {
    /// `.jsonl` and `.ndjson` are JSON Lines, anything else a JSON array.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("jsonl") | Some("ndjson") => DatasetFormat::JsonLines,
            _ => DatasetFormat::JsonArray,
        }
    }
}

/// Loads the pre-serialized article dataset.
pub struct DatasetLoader {
    path: PathBuf,
    format: DatasetFormat,
}

impl DatasetLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = DatasetFormat::from_path(&path);
        Self { path, format }
    }

    pub fn with_format(mut self, format: DatasetFormat) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str) -> Result<Vec<ArticleChunk>, NewsragError> {
        match self.format {
            DatasetFormat::JsonArray => serde_json::from_str(content).map_err(|e| {
                NewsragError::Dataset(format!(
                    "{} is not a JSON array of records: {e}",
                    self.path.display()
                ))
            }),
            DatasetFormat::JsonLines => content
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(i, line)| {
                    serde_json::from_str(line).map_err(|e| {
                        NewsragError::Dataset(format!(
                            "{} line {}: {e}",
                            self.path.display(),
                            i + 1
                        ))
                    })
                })
                .collect(),
        }
    }
}

#[async_trait]
impl RecordLoader for DatasetLoader {
    async fn load(&self) -> Result<Vec<ArticleChunk>, NewsragError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => NewsragError::DatasetNotFound(self.path.clone()),
                _ => NewsragError::Dataset(format!("cannot read {}: {e}", self.path.display())),
            })?;

        let records = self.parse(&content)?;
        info!(path = %self.path.display(), records = records.len(), "loaded dataset");
        Ok(records)
    }
}
