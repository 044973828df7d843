use std::sync::Arc;

use newsrag_core::NewsragError;
use tracing::{info, instrument};

use crate::backend::{BackendRequest, HttpBackend, WeaviateBackend};
use crate::collection::Collections;
use crate::config::WeaviateConfig;
use crate::readiness::{ReadinessPolicy, ReadinessWaiter};

/// Server metadata read from `GET /v1/meta` while connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerMeta {
    pub version: String,
    pub hostname: String,
}

/// An open session against a Weaviate server.
///
/// Only obtainable through [`WeaviateClient::connect`], so holding one means
/// the server answered both the readiness poll and the metadata request.
pub struct WeaviateClient {
    config: WeaviateConfig,
    backend: Arc<dyn WeaviateBackend>,
    meta: ServerMeta,
}

impl WeaviateClient {
    /// Connect to `http://localhost:8080` with the default readiness policy.
    pub async fn connect_to_local() -> Result<Self, NewsragError> {
        Self::connect(
            WeaviateConfig::local(),
            ReadinessPolicy::default(),
            Arc::new(HttpBackend::new()),
        )
        .await
    }

    /// Wait for readiness, then open the session.
    ///
    /// Either failure is reported as `ConnectionFailed` with a remediation hint.
    #[instrument(skip_all, fields(url = %config.base_url()))]
    pub async fn connect(
        config: WeaviateConfig,
        policy: ReadinessPolicy,
        backend: Arc<dyn WeaviateBackend>,
    ) -> Result<Self, NewsragError> {
        ReadinessWaiter::new(backend.clone(), policy)
            .wait(&config)
            .await
            .map_err(|e| NewsragError::connection_failed(format!("Weaviate is not ready: {e}")))?;

        let request = config.apply_auth(BackendRequest::get(config.url("/v1/meta")));
        let response = backend.send(request).await.map_err(|e| {
            NewsragError::connection_failed(format!("cannot reach {}: {e}", config.base_url()))
        })?;

        if !response.is_success() {
            return Err(NewsragError::connection_failed(format!(
                "GET /v1/meta returned HTTP {}: {}",
                response.status, response.body
            )));
        }

        let meta = ServerMeta {
            version: response.body["version"]
                .as_str()
                .unwrap_or("unknown")
                .to_string(),
            hostname: response.body["hostname"].as_str().unwrap_or("").to_string(),
        };
        info!(version = %meta.version, "connected to Weaviate");

        Ok(Self {
            config,
            backend,
            meta,
        })
    }

    pub fn config(&self) -> &WeaviateConfig {
        &self.config
    }

    pub fn meta(&self) -> &ServerMeta {
        &self.meta
    }

    pub fn collections(&self) -> Collections {
        Collections::new(self.config.clone(), self.backend.clone())
    }

    /// End the session. REST holds no server-side state, so this only logs.
    pub fn close(self) {
        info!(url = %self.config.base_url(), "closed Weaviate session");
    }
}
