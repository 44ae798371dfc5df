//! dialogate — webhook fulfillment gateway for conversational agents.
//!
//! The gateway normalizes inbound webhook documents into a canonical
//! request, dispatches the detected intent to a registered handler with
//! strict precedence (explicit match, then fallback, then a diagnostic;
//! the default handler only when no intent is present), and serializes
//! the handler's response into the platform wire format: fulfillment
//! text, grouped rich content, output contexts, and follow-up events.
//! A REST-style path router with parameter validation covers the plain
//! API surface on the same listener.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dialogate::agent::{AgentResponse, IntentRegistry, WebhookAgent};
//! use dialogate::api::ApiRouter;
//! use dialogate::channels::web::{GatewayState, start_server};
//! use dialogate::config::Config;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::resolve()?;
//!
//! let mut registry = IntentRegistry::new();
//! registry.register_fn("greet", |_req| async {
//!     Ok(AgentResponse::new("Hello!"))
//! });
//!
//! let agent = Arc::new(WebhookAgent::new(
//!     config.agent.clone(),
//!     config.dispatch.clone(),
//!     registry,
//! ));
//! let api = Arc::new(ApiRouter::new(config.agent.name.clone()));
//! let state = Arc::new(GatewayState::new(agent, api));
//!
//! let addr = format!("{}:{}", config.gateway.host, config.gateway.port).parse()?;
//! start_server(addr, state).await?;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod api;
pub mod channels;
pub mod client;
pub mod config;
pub mod error;
pub mod testing;

pub use crate::agent::{
    AgentRequest, AgentResponse, IntentHandler, IntentRegistry, WebhookAgent,
};
pub use crate::config::Config;
pub use crate::error::Error;
