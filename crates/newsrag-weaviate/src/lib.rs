//! Weaviate REST client used by the newsrag setup programs.
//!
//! [`WeaviateClient::connect`] polls `GET /v1/.well-known/ready` through a
//! [`ReadinessWaiter`] and then opens a session; the session exposes schema
//! operations through [`Collections`] and batch insert through [`Collection`].
//!
//! # Quick start
//!
//! ```rust,no_run
//! use newsrag_weaviate::{BatchConfig, CollectionSchema, DataType, WeaviateClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = WeaviateClient::connect_to_local().await?;
//! let schema = CollectionSchema::new("notes").with_property("body", DataType::Text);
//! let collection = client.collections().recreate(&schema).await?;
//! collection
//!     .insert_many(&[serde_json::json!({ "body": "hello" })], &BatchConfig::default())
//!     .await?;
//! client.close();
//! # Ok(())
//! # }
//! ```

pub mod backend;
mod client;
mod collection;
mod config;
mod readiness;

pub use backend::{
    BackendRequest, BackendResponse, FakeBackend, HttpBackend, Method, WeaviateBackend,
};
pub use client::{ServerMeta, WeaviateClient};
pub use collection::{
    class_name, BatchConfig, BatchSummary, Collection, CollectionSchema, Collections, DataType,
    Property, VectorIndex, Vectorizer,
};
pub use config::{WeaviateConfig, DEFAULT_GRPC_PORT, DEFAULT_HOST, DEFAULT_HTTP_PORT};
pub use readiness::{Backoff, ReadinessPolicy, ReadinessWaiter, ReadyReport};

// Re-export the error type for convenience.
pub use newsrag_core::NewsragError;
