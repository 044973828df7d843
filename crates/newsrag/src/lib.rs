//! newsrag — bootstrap a local Weaviate for the RAG notebooks.
//!
//! This crate re-exports the newsrag sub-crates and holds what the two
//! programs share:
//!
//! | Program | Does |
//! |---------|------|
//! | `newsrag-connect` | waits for `/v1/.well-known/ready`, connects, prints the server version |
//! | `newsrag-setup` | connects, recreates `bbc_collection`, loads and inserts the dataset |
//!
//! Both take no flags; see [`Settings`] for the environment variables.

/// Error and record types. Always available.
pub use newsrag_core as core;

/// Dataset loaders.
pub use newsrag_loaders as loaders;

/// Weaviate REST client: readiness, connection, collections, batch insert.
pub use newsrag_weaviate as weaviate;

mod settings;
mod setup;

pub use settings::{Settings, DEFAULT_DATASET};
pub use setup::{article_chunk_schema, setup_collection, SetupReport, DEFAULT_COLLECTION};

use newsrag_core::NewsragError;

/// Install the `fmt` subscriber; `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Print `err` and its remediation hint for a human at the terminal.
pub fn report_failure(err: &NewsragError) {
    eprintln!("error: {err}");
    // ConnectionFailed already carries the hint in its message.
    if matches!(err, NewsragError::ConnectionFailed { .. }) {
        return;
    }
    if let Some(hint) = err.hint() {
        eprintln!("hint: {hint}");
    }
}
