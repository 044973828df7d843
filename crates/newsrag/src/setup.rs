use newsrag_core::{NewsragError, RecordLoader};
use newsrag_weaviate::{
    BatchConfig, BatchSummary, CollectionSchema, DataType, VectorIndex, Vectorizer,
    WeaviateClient,
};
use tracing::{info, warn};

pub const DEFAULT_COLLECTION: &str = "bbc_collection";

/// Schema for [`ArticleChunk`](newsrag_core::ArticleChunk) records, vectorized
/// by the `t2v-transformers` container and reranked by `reranker-transformers`.
pub fn article_chunk_schema(name: &str) -> CollectionSchema {
    CollectionSchema::new(name)
        .with_property("article_content", DataType::Text)
        .with_property("chunk", DataType::Text)
        .with_property("chunk_index", DataType::Int)
        .with_property("description", DataType::Text)
        .with_property("link", DataType::Text)
        .with_property("pubDate", DataType::Text)
        .with_property("title", DataType::Text)
        .with_vectorizer(Vectorizer::Text2VecTransformers {
            vectorize_collection_name: false,
        })
        .with_reranker()
        .with_vector_index(VectorIndex::Hnsw)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    pub collection: String,
    pub loaded: usize,
    pub summary: BatchSummary,
    /// Object count reported by the server afterwards, if the query succeeded.
    pub count: Option<u64>,
}

/// Load the dataset, recreate the collection and insert every record.
///
/// The dataset is read before the collection is touched, so a missing file
/// leaves an existing collection intact. Any rejected object fails the setup.
pub async fn setup_collection(
    client: &WeaviateClient,
    loader: &dyn RecordLoader,
    collection_name: &str,
    batch: &BatchConfig,
) -> Result<SetupReport, NewsragError> {
    let records = loader.load().await?;
    info!(records = records.len(), "found data items");

    let collection = client
        .collections()
        .recreate(&article_chunk_schema(collection_name))
        .await?;

    let summary = collection.insert_many(&records, batch).await?;
    if !summary.is_complete() {
        return Err(NewsragError::Collection(format!(
            "{} of {} objects were rejected, first error: {}",
            summary.failed,
            records.len(),
            summary.errors.first().map(String::as_str).unwrap_or("unknown")
        )));
    }

    let count = match collection.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!(error = %e, "could not read object count");
            None
        }
    };

    Ok(SetupReport {
        collection: collection.name().to_string(),
        loaded: records.len(),
        summary,
        count,
    })
}
