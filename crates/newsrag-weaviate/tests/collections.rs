use std::sync::Arc;
use std::time::Duration;

use newsrag_weaviate::{
    BatchConfig, CollectionSchema, DataType, FakeBackend, Method, NewsragError, ReadinessPolicy,
    VectorIndex, Vectorizer, WeaviateClient, WeaviateConfig,
};
use serde::Serialize;
use serde_json::{json, Value};

async fn connected(backend: &Arc<FakeBackend>) -> WeaviateClient {
    backend
        .push_response(200, Value::Null)
        .push_response(200, json!({"version": "1.25.0"}));
    let policy = ReadinessPolicy::default().with_interval(Duration::from_millis(1));
    WeaviateClient::connect(WeaviateConfig::local(), policy, backend.clone())
        .await
        .unwrap()
}

fn article_schema() -> CollectionSchema {
    CollectionSchema::new("bbc_collection")
        .with_property("chunk", DataType::Text)
        .with_property("chunk_index", DataType::Int)
        .with_vectorizer(Vectorizer::Text2VecTransformers {
            vectorize_collection_name: false,
        })
}

#[derive(Serialize)]
struct Note {
    body: String,
}

fn notes(n: usize) -> Vec<Note> {
    (0..n)
        .map(|i| Note {
            body: format!("note {i}"),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Schema JSON
// ---------------------------------------------------------------------------

#[test]
fn transformer_schema_matches_weaviate_class_format() {
    let class = article_schema().with_reranker().to_class_json();
    assert_eq!(
        class,
        json!({
            "class": "Bbc_collection",
            "properties": [
                { "name": "chunk", "dataType": ["text"] },
                { "name": "chunk_index", "dataType": ["int"] }
            ],
            "vectorizer": "text2vec-transformers",
            "vectorIndexType": "hnsw",
            "moduleConfig": {
                "text2vec-transformers": { "vectorizeClassName": false },
                "reranker-transformers": {}
            }
        })
    );
}

#[test]
fn flat_index_is_reported() {
    let class = CollectionSchema::new("Docs")
        .with_vector_index(VectorIndex::Flat)
        .to_class_json();
    assert_eq!(class["vectorIndexType"], "flat");
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn exists_maps_200_and_404() {
    let backend = Arc::new(FakeBackend::new());
    let client = connected(&backend).await;
    backend
        .push_response(200, json!({"class": "Bbc_collection"}))
        .push_response(404, Value::Null)
        .push_response(500, json!({"error": "boom"}));

    let collections = client.collections();
    assert!(collections.exists("bbc_collection").await.unwrap());
    assert!(!collections.exists("bbc_collection").await.unwrap());
    assert!(matches!(
        collections.exists("bbc_collection").await,
        Err(NewsragError::Collection(_))
    ));

    let requests = backend.requests();
    assert_eq!(requests[2].url, "http://localhost:8080/v1/schema/Bbc_collection");
}

#[tokio::test]
async fn recreate_deletes_existing_collection_first() {
    let backend = Arc::new(FakeBackend::new());
    let client = connected(&backend).await;
    backend
        .push_response(200, json!({"class": "Bbc_collection"}))
        .push_response(200, Value::Null)
        .push_response(200, json!({"class": "Bbc_collection"}));

    let collection = client.collections().recreate(&article_schema()).await.unwrap();
    assert_eq!(collection.name(), "Bbc_collection");

    let methods: Vec<Method> = backend.requests()[2..].iter().map(|r| r.method).collect();
    assert_eq!(methods, vec![Method::Get, Method::Delete, Method::Post]);
}

#[tokio::test]
async fn recreate_skips_delete_when_missing() {
    let backend = Arc::new(FakeBackend::new());
    let client = connected(&backend).await;
    backend
        .push_response(404, Value::Null)
        .push_response(200, json!({"class": "Bbc_collection"}));

    client.collections().recreate(&article_schema()).await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[3].method, Method::Post);
    assert_eq!(requests[3].url, "http://localhost:8080/v1/schema");
    assert_eq!(
        requests[3].body.as_ref().unwrap()["vectorizer"],
        "text2vec-transformers"
    );
}

#[tokio::test]
async fn create_conflict_is_collection_error() {
    let backend = Arc::new(FakeBackend::new());
    let client = connected(&backend).await;
    backend.push_response(422, json!({"error": [{"message": "class name already exists"}]}));

    let err = client
        .collections()
        .create(&article_schema())
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("already exists"));
}

// ---------------------------------------------------------------------------
// Batch insert
// ---------------------------------------------------------------------------

#[tokio::test]
async fn insert_many_splits_into_batches() {
    let backend = Arc::new(FakeBackend::new());
    let client = connected(&backend).await;
    for _ in 0..3 {
        backend.push_response(200, json!([]));
    }

    let collection = client.collections().get("notes");
    let summary = collection
        .insert_many(&notes(250), &BatchConfig::default())
        .await
        .unwrap();

    assert_eq!(summary.inserted, 250);
    assert!(summary.is_complete());

    let batches: Vec<usize> = backend.requests()[2..]
        .iter()
        .map(|r| r.body.as_ref().unwrap()["objects"].as_array().unwrap().len())
        .collect();
    assert_eq!(batches, vec![100, 100, 50]);

    let requests = backend.requests();
    let first = &requests[2];
    assert_eq!(first.url, "http://localhost:8080/v1/batch/objects");
    assert_eq!(
        first.body.as_ref().unwrap()["objects"][0],
        json!({"class": "Notes", "properties": {"body": "note 0"}})
    );
}

#[tokio::test]
async fn insert_many_counts_rejected_objects() {
    let backend = Arc::new(FakeBackend::new());
    let client = connected(&backend).await;
    backend.push_response(
        200,
        json!([
            { "result": {} },
            { "result": { "errors": { "error": [ { "message": "invalid text property" } ] } } },
            { "result": {} }
        ]),
    );

    let summary = client
        .collections()
        .get("notes")
        .insert_many(&notes(3), &BatchConfig::default())
        .await
        .unwrap();

    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.errors, vec!["invalid text property"]);
    assert!(!summary.is_complete());
}

#[tokio::test]
async fn insert_many_fails_on_batch_http_error() {
    let backend = Arc::new(FakeBackend::new());
    let client = connected(&backend).await;
    backend.push_response(500, json!({"error": "disk full"}));

    let err = client
        .collections()
        .get("notes")
        .insert_many(&notes(2), &BatchConfig::default().with_batch_size(10))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("disk full"));
}

#[tokio::test]
async fn insert_many_with_no_items_sends_nothing() {
    let backend = Arc::new(FakeBackend::new());
    let client = connected(&backend).await;

    let summary = client
        .collections()
        .get("notes")
        .insert_many::<Note>(&[], &BatchConfig::default())
        .await
        .unwrap();

    assert_eq!(summary.inserted, 0);
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn count_reads_aggregate_meta() {
    let backend = Arc::new(FakeBackend::new());
    let client = connected(&backend).await;
    backend.push_response(
        200,
        json!({"data": {"Aggregate": {"Notes": [{"meta": {"count": 42}}]}}}),
    );

    let count = client.collections().get("notes").count().await.unwrap();
    assert_eq!(count, 42);

    let requests = backend.requests();
    let query = requests[2].body.as_ref().unwrap()["query"].as_str().unwrap().to_string();
    assert!(query.contains("Aggregate { Notes { meta { count } } }"));
}

#[tokio::test]
async fn count_surfaces_graphql_errors() {
    let backend = Arc::new(FakeBackend::new());
    let client = connected(&backend).await;
    backend.push_response(200, json!({"errors": [{"message": "unknown class"}]}));

    let err = client.collections().get("notes").count().await.unwrap_err();
    assert!(err.to_string().contains("unknown class"));
}
