mod dataset_loader;

pub use dataset_loader::{DatasetFormat, DatasetLoader};

// Re-export ArticleChunk and RecordLoader from core for convenience
pub use newsrag_core::{ArticleChunk, RecordLoader};
