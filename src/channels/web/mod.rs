//! HTTP channel: axum server for the webhook and API surfaces.

pub mod server;
pub mod types;

pub use server::{GatewayState, start_server};
