use crate::backend::BackendRequest;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_GRPC_PORT: u16 = 50051;

/// Where the Weaviate server lives and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaviateConfig {
    /// HTTP scheme: `http` or `https`.
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// gRPC port exposed by the container. Recorded for clients that need it;
    /// everything in this crate goes over REST.
    pub grpc_port: u16,
    /// Optional API key, sent as a bearer token.
    pub api_key: Option<String>,
}

impl WeaviateConfig {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
            grpc_port: DEFAULT_GRPC_PORT,
            api_key: None,
        }
    }

    /// `http://localhost:8080`, gRPC on 50051.
    pub fn local() -> Self {
        Self::new("http", DEFAULT_HOST, DEFAULT_HTTP_PORT)
    }

    pub fn with_grpc_port(mut self, grpc_port: u16) -> Self {
        self.grpc_port = grpc_port;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    pub fn ready_url(&self) -> String {
        format!("{}/v1/.well-known/ready", self.base_url())
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    pub(crate) fn apply_auth(&self, request: BackendRequest) -> BackendRequest {
        match self.api_key {
            Some(ref key) => request.with_header("Authorization", format!("Bearer {key}")),
            None => request,
        }
    }
}

impl Default for WeaviateConfig {
    fn default() -> Self {
        Self::local()
    }
}
