//! End-to-end tests for the REST surface: path routing, parameter
//! validation envelopes, and the directory response for unknown paths.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{Value, json};

use dialogate::agent::{IntentRegistry, WebhookAgent};
use dialogate::api::{ApiRequest, ApiResponse, ApiRouter, validate::validate_params};
use dialogate::channels::web::{GatewayState, start_server};
use dialogate::config::{AgentConfig, DispatchConfig};
use dialogate::error::HandlerError;

fn is_bind_permission_error<E: std::fmt::Display>(err: &E) -> bool {
    err.to_string().contains("Operation not permitted") || err.to_string().contains("Failed to bind")
}

fn build_router() -> ApiRouter {
    let mut router = ApiRouter::new("portfolio-advisor");
    router.register_fn("analyze_symbol", |req: ApiRequest| async move {
        if let Err(err) = validate_params(&req, &["symbol"]) {
            return Ok(ApiResponse::bad_request(&err));
        }
        let symbol = req
            .string_param("symbol")
            .ok_or_else(|| HandlerError::msg("symbol unreadable"))?
            .to_uppercase();
        Ok(ApiResponse::ok(json!({
            "symbol": symbol,
            "volatility": 22.8,
        })))
    });
    router.register_fn("sector_analysis", |_req| async {
        Err(HandlerError::msg("analysis store unavailable"))
    });
    router
}

async fn start_test_server() -> Option<(SocketAddr, Arc<GatewayState>)> {
    let agent = Arc::new(WebhookAgent::new(
        AgentConfig::default(),
        DispatchConfig::default(),
        IntentRegistry::new(),
    ));
    let state = Arc::new(GatewayState::new(agent, Arc::new(build_router())));

    let addr: SocketAddr = "127.0.0.1:0".parse().expect("valid addr");
    match start_server(addr, state.clone()).await {
        Ok(bound) => Some((bound, state)),
        Err(e) if is_bind_permission_error(&e) => None,
        Err(e) => panic!("Failed to start test server: {e:?}"),
    }
}

#[tokio::test]
async fn get_with_query_parameters_succeeds() {
    let Some((addr, state)) = start_test_server().await else {
        return;
    };

    let response = reqwest::get(format!("http://{addr}/analyze_symbol?symbol=aapl"))
        .await
        .expect("request failed");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("JSON body");
    assert_eq!(body["symbol"], json!("AAPL"));

    state.shutdown().await;
}

#[tokio::test]
async fn missing_parameter_names_it_in_the_400() {
    let Some((addr, state)) = start_test_server().await else {
        return;
    };

    let response = reqwest::get(format!("http://{addr}/analyze_symbol"))
        .await
        .expect("request failed");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("JSON body");
    assert_eq!(body["error"], json!("Missing required parameters: symbol"));

    state.shutdown().await;
}

#[tokio::test]
async fn post_json_body_parameters_are_accepted() {
    let Some((addr, state)) = start_test_server().await else {
        return;
    };

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/analyze_symbol"))
        .json(&json!({"symbol": "msft"}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("JSON body");
    assert_eq!(body["symbol"], json!("MSFT"));

    state.shutdown().await;
}

#[tokio::test]
async fn post_without_json_body_is_an_unsupported_shape() {
    let Some((addr, state)) = start_test_server().await else {
        return;
    };

    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/analyze_symbol"))
        .body("plain text")
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("JSON body");
    assert_eq!(
        body["error"],
        json!("Request must be either GET with query parameters or POST with JSON body")
    );

    state.shutdown().await;
}

#[tokio::test]
async fn handler_failure_is_a_500_envelope() {
    let Some((addr, state)) = start_test_server().await else {
        return;
    };

    let response = reqwest::get(format!("http://{addr}/sector_analysis"))
        .await
        .expect("request failed");
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.expect("JSON body");
    assert!(
        body["error"]
            .as_str()
            .expect("error message")
            .contains("analysis store unavailable")
    );

    state.shutdown().await;
}

#[tokio::test]
async fn unknown_path_and_root_return_the_directory() {
    let Some((addr, state)) = start_test_server().await else {
        return;
    };

    for path in ["/", "/no_such_endpoint"] {
        let response = reqwest::get(format!("http://{addr}{path}"))
            .await
            .expect("request failed");
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.expect("JSON body");
        assert_eq!(body["name"], json!("portfolio-advisor API"));
        assert_eq!(body["version"], json!("1.0.0"));
        assert_eq!(
            body["endpoints"],
            json!(["analyze_symbol", "sector_analysis"])
        );
    }

    state.shutdown().await;
}

#[tokio::test]
async fn unsupported_method_is_rejected() {
    let Some((addr, state)) = start_test_server().await else {
        return;
    };

    let client = reqwest::Client::new();
    let response = client
        .put(format!("http://{addr}/analyze_symbol"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 400);

    state.shutdown().await;
}
