//! REST-style path router for plain API endpoints.
//!
//! The router dispatches by exact path match after stripping leading and
//! trailing slashes. Unmatched paths, including the root, answer with a
//! directory document listing the registered endpoints. Handler failures
//! surface as `{"error": ...}` with status 500; this surface is not
//! webhook-shaped, so a 5xx is the honest signal here.

pub mod validate;

use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::{Map, Value, json};

use crate::error::{ErrorBody, HandlerError, ValidationError};

/// Canonical API request: GET with query parameters or POST with a JSON
/// body. Anything else is an unsupported shape the validators reject.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    Get { query: BTreeMap<String, String> },
    PostJson { body: Value },
    Unsupported,
}

impl ApiRequest {
    pub fn get<I, K, V>(query: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Get {
            query: query
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn post_json(body: Value) -> Self {
        Self::PostJson { body }
    }

    /// Uniform parameter lookup across both request shapes.
    pub fn param(&self, name: &str) -> Option<Value> {
        match self {
            Self::Get { query } => query.get(name).map(|v| Value::String(v.clone())),
            Self::PostJson { body } => body.get(name).cloned(),
            Self::Unsupported => None,
        }
    }

    /// Parameter as a string, however it arrived.
    pub fn string_param(&self, name: &str) -> Option<String> {
        match self.param(name)? {
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

/// A single API endpoint handler.
///
/// Success is the raw JSON-serializable value wrapped in `ApiResponse::ok`;
/// validation failures come back as `ApiResponse::bad_request`. An `Err`
/// is an internal fault the router converts to a 500 envelope.
#[async_trait]
pub trait ApiHandler: Send + Sync {
    async fn handle(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError>;
}

struct FnApiHandler<F> {
    func: F,
}

#[async_trait]
impl<F, Fut> ApiHandler for FnApiHandler<F>
where
    F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ApiResponse, HandlerError>> + Send + 'static,
{
    async fn handle(&self, request: &ApiRequest) -> Result<ApiResponse, HandlerError> {
        (self.func)(request.clone()).await
    }
}

/// JSON body plus HTTP status, decoupled from the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// Success: the raw JSON-serializable value, status 200.
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    /// Standard error envelope, default status 400.
    pub fn error(message: impl Into<String>, status: u16) -> Self {
        Self {
            status,
            body: json!(ErrorBody::new(message)),
        }
    }

    pub fn bad_request(err: &ValidationError) -> Self {
        Self::error(err.to_string(), 400)
    }
}

impl From<&ValidationError> for ApiResponse {
    fn from(err: &ValidationError) -> Self {
        Self::bad_request(err)
    }
}

/// Maps endpoint paths to handlers. Like the intent registry, it is
/// populated during startup and read-only afterwards.
pub struct ApiRouter {
    name: String,
    version: String,
    handlers: BTreeMap<String, Arc<dyn ApiHandler>>,
}

impl ApiRouter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "1.0.0".to_string(),
            handlers: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a handler under `path` (stored slash-stripped).
    pub fn register(&mut self, path: impl Into<String>, handler: Arc<dyn ApiHandler>) {
        let path = path.into();
        let path = path.trim_matches('/').to_string();
        tracing::debug!(path = %path, "Registered API handler");
        self.handlers.insert(path, handler);
    }

    pub fn register_fn<F, Fut>(&mut self, path: impl Into<String>, func: F)
    where
        F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ApiResponse, HandlerError>> + Send + 'static,
    {
        self.register(path, Arc::new(FnApiHandler { func }));
    }

    /// Registered endpoint paths, sorted.
    pub fn endpoints(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    /// Route `path` to its handler, or answer with the directory document.
    pub async fn handle(&self, path: &str, request: &ApiRequest) -> ApiResponse {
        let path = path.trim_matches('/');

        let Some(handler) = self.handlers.get(path) else {
            return self.directory();
        };

        let invocation = AssertUnwindSafe(handler.handle(request)).catch_unwind();
        match invocation.await {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => {
                tracing::error!(path = %path, error = %error, "Error in API handler");
                ApiResponse::error(format!("Error processing request: {error}"), 500)
            }
            Err(_) => {
                tracing::error!(path = %path, "API handler panicked");
                ApiResponse::error("Error processing request: internal failure", 500)
            }
        }
    }

    /// Directory-style response for unknown paths, root included.
    pub fn directory(&self) -> ApiResponse {
        let mut body = Map::new();
        body.insert("name".to_string(), json!(format!("{} API", self.name)));
        body.insert("version".to_string(), json!(self.version));
        body.insert("endpoints".to_string(), json!(self.endpoints()));
        ApiResponse::ok(Value::Object(body))
    }
}
