//! Core agent: canonical request/response model, intent registry and
//! dispatch, session contexts, and rich-content builders.

pub mod content;
pub mod context;
pub mod registry;
pub mod request;
pub mod response;

use std::collections::BTreeSet;

use serde_json::Value;

pub use self::content::{
    Accordion, ActionLink, Button, ChipOption, Chips, ContentBlock, Image, InfoCard, ListBlock,
    ListItem, RichContent, Table,
};
pub use self::context::{ContextFactory, FollowupEvent, OutputContext};
pub use self::registry::{Dispatcher, IntentHandler, IntentRegistry};
pub use self::request::AgentRequest;
pub use self::response::{AgentResponse, WebhookResponse};

use crate::config::{AgentConfig, DispatchConfig};

/// The webhook fulfillment pipeline: parse, normalize, dispatch, format.
///
/// Construction consumes the registry, so handler registration is frozen
/// before the agent is shared. One agent serves all requests; it holds no
/// per-request state.
pub struct WebhookAgent {
    name: String,
    dispatcher: Dispatcher,
    contexts: ContextFactory,
}

impl WebhookAgent {
    pub fn new(agent: AgentConfig, dispatch: DispatchConfig, registry: IntentRegistry) -> Self {
        Self {
            name: agent.name.clone(),
            dispatcher: Dispatcher::new(registry, dispatch),
            contexts: ContextFactory::new(agent),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Factory handlers use to build fully-qualified contexts.
    pub fn contexts(&self) -> &ContextFactory {
        &self.contexts
    }

    pub fn registered_intents(&self) -> BTreeSet<String> {
        self.dispatcher.registered_names()
    }

    /// Handle a raw webhook body.
    ///
    /// Never fails: an unparseable or empty body produces a degraded but
    /// well-formed wire document, because the platform expects a response
    /// body on every conversational turn.
    pub async fn handle_raw(&self, body: &[u8]) -> Value {
        let document: Value = match serde_json::from_slice(body) {
            Ok(document) => document,
            Err(error) => {
                tracing::error!(%error, "Webhook body is not valid JSON");
                return AgentResponse::new(format!(
                    "Sorry, I couldn't understand your request: {error}"
                ))
                .to_value();
            }
        };
        if document.is_null() {
            tracing::error!("Webhook body is empty");
            return AgentResponse::new(
                "Sorry, I couldn't understand your request: request body is empty",
            )
            .to_value();
        }
        self.handle_document(&document).await
    }

    /// Handle an already-parsed webhook document.
    pub async fn handle_document(&self, document: &Value) -> Value {
        let request = AgentRequest::from_webhook(document);
        let response = self.dispatcher.dispatch(&request).await;
        response.to_value()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn agent_with_greet() -> WebhookAgent {
        let mut registry = IntentRegistry::new();
        registry.register_fn("greet", |req: AgentRequest| async move {
            Ok(AgentResponse::new(format!("hi from {}", req.session_id)))
        });
        WebhookAgent::new(
            AgentConfig::default(),
            DispatchConfig::default(),
            registry,
        )
    }

    #[tokio::test]
    async fn pipeline_runs_end_to_end() {
        let agent = agent_with_greet();
        let body = json!({
            "session": "projects/p/agent/sessions/s-1",
            "queryResult": {"intent": {"displayName": "greet"}}
        });
        let value = agent.handle_document(&body).await;
        assert_eq!(value["fulfillmentText"], json!("hi from s-1"));
    }

    #[tokio::test]
    async fn invalid_json_body_degrades_gracefully() {
        let agent = agent_with_greet();
        let value = agent.handle_raw(b"{not json").await;
        let text = value["fulfillmentText"].as_str().unwrap();
        assert!(text.starts_with("Sorry, I couldn't understand your request"));
    }

    #[tokio::test]
    async fn null_body_degrades_gracefully() {
        let agent = agent_with_greet();
        let value = agent.handle_raw(b"null").await;
        let text = value["fulfillmentText"].as_str().unwrap();
        assert!(text.contains("request body is empty"));
    }

    #[tokio::test]
    async fn unknown_intent_still_yields_a_wire_document() {
        let agent = agent_with_greet();
        let body = json!({
            "queryResult": {"intent": {"displayName": "mystery"}}
        });
        let value = agent.handle_document(&body).await;
        assert!(
            value["fulfillmentText"]
                .as_str()
                .unwrap()
                .contains("mystery")
        );
    }
}
