use std::sync::Arc;

use newsrag_core::NewsragError;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::backend::{BackendRequest, BackendResponse, WeaviateBackend};
use crate::config::WeaviateConfig;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Text,
    Int,
    Number,
    Boolean,
    Date,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Int => "int",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub data_type: DataType,
}

impl Property {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Vectorizer {
    /// Caller supplies vectors.
    #[default]
    None,
    /// Vectors computed by the `text2vec-transformers` module.
    Text2VecTransformers { vectorize_collection_name: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VectorIndex {
    #[default]
    Hnsw,
    Flat,
}

/// Definition of a collection (a Weaviate class).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    pub name: String,
    pub properties: Vec<Property>,
    pub vectorizer: Vectorizer,
    /// Enables the `reranker-transformers` module on this collection.
    pub reranker: bool,
    pub vector_index: VectorIndex,
}

impl CollectionSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            vectorizer: Vectorizer::None,
            reranker: false,
            vector_index: VectorIndex::Hnsw,
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.properties.push(Property::new(name, data_type));
        self
    }

    pub fn with_vectorizer(mut self, vectorizer: Vectorizer) -> Self {
        self.vectorizer = vectorizer;
        self
    }

    pub fn with_reranker(mut self) -> Self {
        self.reranker = true;
        self
    }

    pub fn with_vector_index(mut self, vector_index: VectorIndex) -> Self {
        self.vector_index = vector_index;
        self
    }

    pub fn class_name(&self) -> String {
        class_name(&self.name)
    }

    /// Body for `POST /v1/schema`.
    pub fn to_class_json(&self) -> Value {
        let properties: Vec<Value> = self
            .properties
            .iter()
            .map(|p| json!({ "name": p.name, "dataType": [p.data_type.as_str()] }))
            .collect();

        let mut module_config = serde_json::Map::new();
        let vectorizer = match self.vectorizer {
            Vectorizer::None => "none",
            Vectorizer::Text2VecTransformers {
                vectorize_collection_name,
            } => {
                module_config.insert(
                    "text2vec-transformers".to_string(),
                    json!({ "vectorizeClassName": vectorize_collection_name }),
                );
                "text2vec-transformers"
            }
        };
        if self.reranker {
            module_config.insert("reranker-transformers".to_string(), json!({}));
        }

        let mut class = json!({
            "class": self.class_name(),
            "properties": properties,
            "vectorizer": vectorizer,
            "vectorIndexType": match self.vector_index {
                VectorIndex::Hnsw => "hnsw",
                VectorIndex::Flat => "flat",
            },
        });
        if !module_config.is_empty() {
            class["moduleConfig"] = Value::Object(module_config);
        }
        class
    }
}

/// Weaviate class names start with an upper-case letter; the server
/// capitalizes them on creation, so lookups must do the same.
pub fn class_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// Schema operations on a connected server. Obtained from
/// [`WeaviateClient::collections`](crate::WeaviateClient::collections).
pub struct Collections {
    config: WeaviateConfig,
    backend: Arc<dyn WeaviateBackend>,
}

impl Collections {
    pub(crate) fn new(config: WeaviateConfig, backend: Arc<dyn WeaviateBackend>) -> Self {
        Self { config, backend }
    }

    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, NewsragError> {
        self.backend.send(self.config.apply_auth(request)).await
    }

    pub async fn exists(&self, name: &str) -> Result<bool, NewsragError> {
        let url = self.config.url(&format!("/v1/schema/{}", class_name(name)));
        let resp = self.send(BackendRequest::get(url)).await?;
        match resp.status {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(NewsragError::Collection(format!(
                "schema lookup for '{name}' failed (HTTP {status}): {}",
                resp.body
            ))),
        }
    }

    /// Delete a collection and all its objects. Missing collections are fine.
    pub async fn delete(&self, name: &str) -> Result<(), NewsragError> {
        let url = self.config.url(&format!("/v1/schema/{}", class_name(name)));
        let resp = self.send(BackendRequest::delete(url)).await?;
        match resp.status {
            200 | 204 | 404 => Ok(()),
            status => Err(NewsragError::Collection(format!(
                "deleting '{name}' failed (HTTP {status}): {}",
                resp.body
            ))),
        }
    }

    pub async fn create(&self, schema: &CollectionSchema) -> Result<Collection, NewsragError> {
        let url = self.config.url("/v1/schema");
        let resp = self
            .send(BackendRequest::post(url, schema.to_class_json()))
            .await?;
        match resp.status {
            200 => {
                info!(collection = %schema.class_name(), "created collection");
                Ok(self.get(&schema.name))
            }
            422 => Err(NewsragError::Collection(format!(
                "collection '{}' already exists: {}",
                schema.name, resp.body
            ))),
            status => Err(NewsragError::Collection(format!(
                "creating '{}' failed (HTTP {status}): {}",
                schema.name, resp.body
            ))),
        }
    }

    /// Drop the collection if present, then create it from `schema`.
    pub async fn recreate(&self, schema: &CollectionSchema) -> Result<Collection, NewsragError> {
        if self.exists(&schema.name).await? {
            warn!(collection = %schema.class_name(), "collection already exists, deleting it");
            self.delete(&schema.name).await?;
        }
        self.create(schema).await
    }

    pub fn get(&self, name: &str) -> Collection {
        Collection {
            class_name: class_name(name),
            config: self.config.clone(),
            backend: self.backend.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Collection + batch insert
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Objects per `POST /v1/batch/objects` request.
    pub batch_size: usize,
    /// Log progress each time this many objects have been sent.
    pub progress_every: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            progress_every: 100,
        }
    }
}

impl BatchConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub inserted: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl BatchSummary {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Handle on a single collection.
pub struct Collection {
    class_name: String,
    config: WeaviateConfig,
    backend: Arc<dyn WeaviateBackend>,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.class_name
    }

    /// Insert `items` as objects whose properties are the serialized items.
    ///
    /// Per-object rejections are collected into the summary; a failed batch
    /// request aborts with an error.
    pub async fn insert_many<T: Serialize + Sync>(
        &self,
        items: &[T],
        config: &BatchConfig,
    ) -> Result<BatchSummary, NewsragError> {
        let mut summary = BatchSummary::default();
        if items.is_empty() {
            return Ok(summary);
        }

        let url = self.config.url("/v1/batch/objects");
        let total = items.len();
        let mut sent = 0usize;

        for chunk in items.chunks(config.batch_size.max(1)) {
            let objects = chunk
                .iter()
                .map(|item| -> Result<Value, NewsragError> {
                    let properties = serde_json::to_value(item).map_err(|e| {
                        NewsragError::Parsing(format!("cannot serialize object: {e}"))
                    })?;
                    Ok(json!({ "class": self.class_name, "properties": properties }))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let request = BackendRequest::post(url.as_str(), json!({ "objects": objects }));
            let resp = self.backend.send(self.config.apply_auth(request)).await?;
            if resp.status != 200 {
                return Err(NewsragError::Collection(format!(
                    "batch insert into '{}' failed (HTTP {}): {}",
                    self.class_name, resp.status, resp.body
                )));
            }

            let errors = object_errors(&resp.body);
            summary.failed += errors.len();
            summary.inserted += chunk.len() - errors.len().min(chunk.len());
            summary.errors.extend(errors);

            let before = sent;
            sent += chunk.len();
            if should_log_progress(before, sent, total, config.progress_every) {
                info!(collection = %self.class_name, "inserted {sent}/{total} objects");
            }
        }

        if !summary.is_complete() {
            warn!(
                collection = %self.class_name,
                failed = summary.failed,
                "some objects were rejected"
            );
        }
        Ok(summary)
    }

    /// Number of objects stored in the collection.
    pub async fn count(&self) -> Result<u64, NewsragError> {
        let query = format!("{{ Aggregate {{ {} {{ meta {{ count }} }} }} }}", self.class_name);
        let request = BackendRequest::post(self.config.url("/v1/graphql"), json!({ "query": query }));
        let resp = self.backend.send(self.config.apply_auth(request)).await?;

        if resp.status != 200 {
            return Err(NewsragError::Collection(format!(
                "count query failed (HTTP {}): {}",
                resp.status, resp.body
            )));
        }
        if let Some(errors) = resp.body.get("errors") {
            return Err(NewsragError::Collection(format!("count query failed: {errors}")));
        }

        resp.body["data"]["Aggregate"][&self.class_name][0]["meta"]["count"]
            .as_u64()
            .ok_or_else(|| {
                NewsragError::Parsing(format!("unexpected aggregate response: {}", resp.body))
            })
    }
}

/// True when `before..=sent` crosses a multiple of `every`, or the last batch went out.
fn should_log_progress(before: usize, sent: usize, total: usize, every: usize) -> bool {
    every > 0 && (sent / every > before / every || sent == total)
}

/// Error messages of rejected objects in a batch response.
fn object_errors(body: &Value) -> Vec<String> {
    let Some(results) = body.as_array() else {
        return Vec::new();
    };
    results
        .iter()
        .filter_map(|object| {
            let errors = object["result"]["errors"]["error"].as_array()?;
            if errors.is_empty() {
                return None;
            }
            let message = errors
                .iter()
                .filter_map(|e| e["message"].as_str())
                .collect::<Vec<_>>()
                .join("; ");
            Some(if message.is_empty() {
                "unknown error".to_string()
            } else {
                message
            })
        })
        .collect()
}
