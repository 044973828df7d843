use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use newsrag_core::NewsragError;
use newsrag_weaviate::{
    BatchConfig, ReadinessPolicy, WeaviateConfig, DEFAULT_GRPC_PORT, DEFAULT_HOST,
    DEFAULT_HTTP_PORT,
};

use crate::setup::DEFAULT_COLLECTION;

pub const DEFAULT_DATASET: &str = "data/bbc_data.json";

/// Everything the programs read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub weaviate: WeaviateConfig,
    pub readiness: ReadinessPolicy,
    pub collection: String,
    pub dataset: PathBuf,
    pub batch: BatchConfig,
}

impl Settings {
    /// Read settings from the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, NewsragError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, NewsragError> {
        let mut weaviate = WeaviateConfig::new(
            lookup("WEAVIATE_SCHEME").unwrap_or_else(|| "http".to_string()),
            lookup("WEAVIATE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            parse(&lookup, "WEAVIATE_PORT", DEFAULT_HTTP_PORT)?,
        )
        .with_grpc_port(parse(&lookup, "WEAVIATE_GRPC_PORT", DEFAULT_GRPC_PORT)?);
        if let Some(key) = lookup("WEAVIATE_API_KEY").filter(|k| !k.is_empty()) {
            weaviate = weaviate.with_api_key(key);
        }

        let interval_secs: f64 = parse(&lookup, "NEWSRAG_READY_INTERVAL_SECS", 2.0)?;
        let interval = Duration::try_from_secs_f64(interval_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .ok_or_else(|| {
                NewsragError::Config(format!(
                    "NEWSRAG_READY_INTERVAL_SECS must be a positive number, got {interval_secs}"
                ))
            })?;
        let timeout = Duration::from_secs(parse(&lookup, "NEWSRAG_READY_TIMEOUT_SECS", 60u64)?);

        let batch_size: usize = parse(&lookup, "NEWSRAG_BATCH_SIZE", 100)?;
        if batch_size == 0 {
            return Err(NewsragError::Config(
                "NEWSRAG_BATCH_SIZE must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            weaviate,
            readiness: ReadinessPolicy::from_timeout(timeout, interval),
            collection: lookup("NEWSRAG_COLLECTION")
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            dataset: PathBuf::from(
                lookup("NEWSRAG_DATASET").unwrap_or_else(|| DEFAULT_DATASET.to_string()),
            ),
            batch: BatchConfig::default().with_batch_size(batch_size),
        })
    }
}

fn parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, NewsragError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| NewsragError::Config(format!("invalid {key}={raw:?}: {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, NewsragError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_docker_compose() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.weaviate.base_url(), "http://localhost:8080");
        assert_eq!(s.weaviate.grpc_port, 50051);
        assert!(s.weaviate.api_key.is_none());
        assert_eq!(s.readiness.interval, Duration::from_secs(2));
        assert_eq!(s.readiness.max_attempts, 30);
        assert_eq!(s.collection, "bbc_collection");
        assert_eq!(s.dataset, PathBuf::from("data/bbc_data.json"));
        assert_eq!(s.batch.batch_size, 100);
    }

    #[test]
    fn overrides_are_applied() {
        let s = settings(&[
            ("WEAVIATE_HOST", "weaviate"),
            ("WEAVIATE_PORT", "9090"),
            ("WEAVIATE_API_KEY", "secret"),
            ("NEWSRAG_READY_INTERVAL_SECS", "0.5"),
            ("NEWSRAG_READY_TIMEOUT_SECS", "10"),
            ("NEWSRAG_COLLECTION", "articles"),
            ("NEWSRAG_DATASET", "/tmp/articles.jsonl"),
            ("NEWSRAG_BATCH_SIZE", "25"),
        ])
        .unwrap();
        assert_eq!(s.weaviate.base_url(), "http://weaviate:9090");
        assert_eq!(s.weaviate.api_key.as_deref(), Some("secret"));
        assert_eq!(s.readiness.interval, Duration::from_millis(500));
        assert_eq!(s.readiness.max_attempts, 20);
        assert_eq!(s.collection, "articles");
        assert_eq!(s.batch.batch_size, 25);
    }

    #[test]
    fn empty_api_key_is_ignored() {
        let s = settings(&[("WEAVIATE_API_KEY", "")]).unwrap();
        assert!(s.weaviate.api_key.is_none());
    }

    #[test]
    fn bad_numbers_are_config_errors() {
        let err = settings(&[("WEAVIATE_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, NewsragError::Config(_)));
        assert!(err.to_string().contains("WEAVIATE_PORT"));

        assert!(settings(&[("NEWSRAG_READY_INTERVAL_SECS", "-1")]).is_err());
        assert!(settings(&[("NEWSRAG_BATCH_SIZE", "0")]).is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        for raw in ["0", "0.0", "1e-12"] {
            let err = settings(&[("NEWSRAG_READY_INTERVAL_SECS", raw)]).unwrap_err();
            assert!(matches!(err, NewsragError::Config(_)), "{raw}");
            assert!(err.to_string().contains("NEWSRAG_READY_INTERVAL_SECS"));
        }
    }

    #[test]
    fn sub_millisecond_interval_covers_the_timeout() {
        let s = settings(&[
            ("NEWSRAG_READY_INTERVAL_SECS", "0.0005"),
            ("NEWSRAG_READY_TIMEOUT_SECS", "1"),
        ])
        .unwrap();
        assert_eq!(s.readiness.interval, Duration::from_micros(500));
        assert_eq!(s.readiness.max_attempts, 2000);
    }
}
