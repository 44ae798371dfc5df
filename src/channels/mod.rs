//! Transport channels exposing the gateway.

pub mod web;
