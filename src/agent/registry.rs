//! Intent handler registry and dispatch.
//!
//! The registry owns the mapping from intent name to handler plus two
//! special slots: a fallback (intent present but unrecognized) and a
//! default (no intent present at all). Dispatch resolves with strict
//! precedence and contains every handler failure at its boundary, since
//! the calling platform expects a 200-with-JSON-body even on internal
//! failure.
//!
//! Registration happens during startup while the owner still holds the
//! registry exclusively; `Dispatcher::new` consumes it, so the mapping is
//! frozen before the first request can arrive.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;

use crate::agent::request::AgentRequest;
use crate::agent::response::AgentResponse;
use crate::config::DispatchConfig;
use crate::error::HandlerError;

/// A single intent handler: the whole pluggable surface is this one method.
#[async_trait]
pub trait IntentHandler: Send + Sync {
    async fn handle(&self, request: &AgentRequest) -> Result<AgentResponse, HandlerError>;
}

/// Adapter so plain async closures register directly, no wrapper type at
/// the call site.
struct FnHandler<F> {
    func: F,
}

#[async_trait]
impl<F, Fut> IntentHandler for FnHandler<F>
where
    F: Fn(AgentRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<AgentResponse, HandlerError>> + Send + 'static,
{
    async fn handle(&self, request: &AgentRequest) -> Result<AgentResponse, HandlerError> {
        (self.func)(request.clone()).await
    }
}

/// Registry mapping intent names to handlers.
#[derive(Default)]
pub struct IntentRegistry {
    handlers: HashMap<String, Arc<dyn IntentHandler>>,
    fallback: Option<Arc<dyn IntentHandler>>,
    default: Option<Arc<dyn IntentHandler>>,
}

impl IntentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the handler for `name`. Last write wins, so
    /// tests can hot-patch handlers without ceremony.
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn IntentHandler>) {
        let name = name.into();
        tracing::debug!(intent = %name, "Registered handler for intent");
        self.handlers.insert(name, handler);
    }

    /// Register a plain async closure as a handler.
    pub fn register_fn<F, Fut>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(AgentRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<AgentResponse, HandlerError>> + Send + 'static,
    {
        self.register(name, Arc::new(FnHandler { func }));
    }

    /// Set the handler for intents present but unrecognized.
    pub fn set_fallback(&mut self, handler: Arc<dyn IntentHandler>) {
        self.fallback = Some(handler);
    }

    pub fn set_fallback_fn<F, Fut>(&mut self, func: F)
    where
        F: Fn(AgentRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<AgentResponse, HandlerError>> + Send + 'static,
    {
        self.set_fallback(Arc::new(FnHandler { func }));
    }

    /// Set the handler invoked when no intent is present at all.
    pub fn set_default(&mut self, handler: Arc<dyn IntentHandler>) {
        self.default = Some(handler);
    }

    pub fn set_default_fn<F, Fut>(&mut self, func: F)
    where
        F: Fn(AgentRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<AgentResponse, HandlerError>> + Send + 'static,
    {
        self.set_default(Arc::new(FnHandler { func }));
    }

    /// Pure lookup; absence is represented, never raised.
    pub fn resolve(&self, intent_name: &str) -> Option<Arc<dyn IntentHandler>> {
        self.handlers.get(intent_name).cloned()
    }

    /// Registered intent names, for introspection only.
    pub fn registered_names(&self) -> BTreeSet<String> {
        self.handlers.keys().cloned().collect()
    }
}

/// Resolves and invokes handlers under uniform error containment.
pub struct Dispatcher {
    registry: IntentRegistry,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Consume the registry, freezing registration.
    pub fn new(registry: IntentRegistry, config: DispatchConfig) -> Self {
        Self { registry, config }
    }

    pub fn registered_names(&self) -> BTreeSet<String> {
        self.registry.registered_names()
    }

    /// Resolve and invoke the handler for `request`.
    ///
    /// Precedence is strict: an explicit match always wins over the
    /// fallback; the fallback always wins over the not-handled
    /// diagnostic; the default is consulted only when the intent name is
    /// literally empty, never as a catch-all for unmatched intents.
    pub async fn dispatch(&self, request: &AgentRequest) -> AgentResponse {
        let intent_name = request.intent_name.as_str();
        tracing::info!(intent = %intent_name, session = %request.session_id, "Processing intent");

        if intent_name.is_empty() {
            if let Some(handler) = self.registry.default.clone() {
                tracing::debug!("No intent specified, using default handler");
                return self.invoke(handler, request, "default").await;
            }
        }

        if let Some(handler) = self.registry.resolve(intent_name) {
            return self.invoke(handler, request, intent_name).await;
        }

        if let Some(handler) = self.registry.fallback.clone() {
            tracing::debug!(intent = %intent_name, "No handler found, using fallback handler");
            return self.invoke(handler, request, "fallback").await;
        }

        tracing::warn!(intent = %intent_name, "No handler found for intent");
        AgentResponse::new(format!(
            "Sorry, I don't know how to handle the intent: {intent_name}"
        ))
    }

    /// Invoke one handler, containing error returns, panics, and (when
    /// configured) deadline overruns. Nothing a handler does may unwind
    /// past this point.
    async fn invoke(
        &self,
        handler: Arc<dyn IntentHandler>,
        request: &AgentRequest,
        label: &str,
    ) -> AgentResponse {
        let invocation = AssertUnwindSafe(handler.handle(request)).catch_unwind();

        let outcome = match self.config.handler_timeout {
            Some(deadline) => match tokio::time::timeout(deadline, invocation).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::error!(
                        handler = %label,
                        timeout_ms = deadline.as_millis() as u64,
                        "Handler exceeded its deadline"
                    );
                    return apologetic(&format!(
                        "handler timed out after {}ms",
                        deadline.as_millis()
                    ));
                }
            },
            None => invocation.await,
        };

        match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => {
                tracing::error!(handler = %label, error = %error, "Error handling intent");
                apologetic(&error.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(handler = %label, panic = %message, "Handler panicked");
                apologetic(&message)
            }
        }
    }
}

fn apologetic(detail: &str) -> AgentResponse {
    AgentResponse::new(format!(
        "Sorry, I encountered an error processing your request: {detail}"
    ))
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
