//! Gateway binary: serve the HTTP surfaces, inspect routes, or simulate
//! an intent request locally.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use dialogate::agent::{AgentResponse, IntentRegistry, WebhookAgent};
use dialogate::api::ApiRouter;
use dialogate::channels::web::{GatewayState, start_server};
use dialogate::config::{Config, LoggingConfig};
use dialogate::testing::WebhookRequestBuilder;

#[derive(Parser)]
#[command(name = "dialogate", version, about = "Webhook fulfillment gateway")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP gateway.
    Serve,
    /// List registered intents and API endpoints.
    Routes,
    /// Feed a synthetic intent request through the pipeline and print the
    /// wire response.
    Simulate {
        /// Intent name; empty string exercises the default handler.
        intent: String,
        /// Parameters as key=value pairs, repeatable.
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::resolve()?;
    init_tracing(&config.logging);

    let cli = Cli::parse();
    let agent = Arc::new(build_agent(&config));
    let api = Arc::new(ApiRouter::new(config.agent.name.clone()));

    match cli.command {
        Command::Serve => {
            let addr: SocketAddr = format!("{}:{}", config.gateway.host, config.gateway.port)
                .parse()
                .context("invalid gateway address")?;
            let state = Arc::new(GatewayState::new(agent, api));
            start_server(addr, state.clone()).await?;
            tokio::signal::ctrl_c().await?;
            state.shutdown().await;
        }
        Command::Routes => {
            println!("intents:");
            for name in agent.registered_intents() {
                println!("  {name}");
            }
            println!("api endpoints:");
            for path in api.endpoints() {
                println!("  {path}");
            }
        }
        Command::Simulate { intent, params } => {
            let mut builder = if intent.is_empty() {
                WebhookRequestBuilder::without_intent()
            } else {
                WebhookRequestBuilder::intent(&intent)
            };
            for pair in &params {
                let (key, value) = pair
                    .split_once('=')
                    .with_context(|| format!("parameter '{pair}' is not KEY=VALUE"))?;
                builder = builder.with_parameter(key, Value::String(value.to_string()));
            }
            let document = builder.build();
            let response = agent.handle_document(&document).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

/// Wire up the baseline agent: a default greeting and a fallback that
/// names the unmatched intent. Deployments register their real handlers
/// here before the registry is frozen.
fn build_agent(config: &Config) -> WebhookAgent {
    let mut registry = IntentRegistry::new();

    registry.set_default_fn(|_req| async { Ok(AgentResponse::new("How can I help you?")) });
    registry.set_fallback_fn(|req: dialogate::agent::AgentRequest| async move {
        Ok(AgentResponse::new(format!(
            "I'm not sure how to handle '{}' yet.",
            req.intent_name
        )))
    });

    WebhookAgent::new(config.agent.clone(), config.dispatch.clone(), registry)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
