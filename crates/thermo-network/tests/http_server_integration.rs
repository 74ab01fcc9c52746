//! Integration tests for HttpServer
//!
//! These tests speak plain HTTP/1.1 over a TCP socket and check both the
//! response and the effect on the shared state.

use std::net::SocketAddr;
use std::time::Duration;
use thermo_core::{FanMode, HvacMode, SharedState, ThermostatSettings};
use thermo_network::{HttpServer, HttpServerConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

struct Running {
    addr: SocketAddr,
    state: SharedState,
    shutdown: CancellationToken,
    task: JoinHandle<Result<(), thermo_network::HttpServerError>>,
}

async fn start() -> Running {
    let state = SharedState::new(ThermostatSettings::default());
    let config = HttpServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
    };
    let server = HttpServer::bind(config, state.clone()).await.unwrap();
    let addr = server.local_addr().unwrap();

    let shutdown = CancellationToken::new();
    let task = tokio::spawn(server.serve(shutdown.clone()));

    Running {
        addr,
        state,
        shutdown,
        task,
    }
}

/// Send a raw request and return (status code, body).
async fn request(addr: SocketAddr, method: &str, path: &str, body: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    timeout(Duration::from_secs(5), stream.read_to_string(&mut response))
        .await
        .expect("response timeout")
        .unwrap();

    let status = response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("malformed status line");
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();
    (status, body)
}

async fn stop(running: Running) {
    running.shutdown.cancel();
    timeout(Duration::from_secs(5), running.task)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_get_renders_form() {
    let running = start().await;

    let (status, body) = request(running.addr, "GET", "/", "").await;

    assert_eq!(status, 200);
    assert!(body.contains("<form"));
    assert!(body.contains("sensor not ready"));
    stop(running).await;
}

#[tokio::test]
async fn test_post_mutates_state() {
    let running = start().await;

    let (status, body) = request(
        running.addr,
        "POST",
        "/",
        "hvacmode=heat&fanmode=auto&cooltemp=78.5&hightemp=66&offsetvalue=-0.75",
    )
    .await;

    assert_eq!(status, 200);
    assert!(body.contains("Settings updated."));
    assert_eq!(
        running.state.settings(),
        ThermostatSettings {
            hvac_mode: HvacMode::Heat,
            fan_mode: FanMode::Auto,
            heat_setpoint: 66.0,
            cool_setpoint: 78.5,
            calibration_offset: -0.75,
        }
    );
    assert_eq!(running.state.snapshot().mode_changes, 1);
    stop(running).await;
}

#[tokio::test]
async fn test_invalid_post_leaves_state_alone() {
    let running = start().await;

    let (status, body) = request(running.addr, "POST", "/", "hvacmode=off&hightemp=hot").await;

    assert_eq!(status, 400);
    assert!(body.contains("hightemp"));
    assert_eq!(running.state.settings(), ThermostatSettings::default());
    stop(running).await;
}

#[tokio::test]
async fn test_status_json() {
    let running = start().await;
    running
        .state
        .modify_settings(|s| s.hvac_mode = HvacMode::Off);

    let (status, body) = request(running.addr, "GET", "/api/status", "").await;

    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["settings"]["hvac_mode"], "off");
    assert_eq!(json["temperature"], serde_json::Value::Null);
    assert_eq!(json["actuators"]["heater_on"], false);
    assert_eq!(json["ready"], false);
    stop(running).await;
}

#[tokio::test]
async fn test_concurrent_posts_are_serialized() {
    let running = start().await;

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..20 {
        let addr = running.addr;
        tasks.spawn(async move {
            let body = format!("hightemp={}", 60 + i);
            request(addr, "POST", "/", &body).await.0
        });
    }
    while let Some(status) = tasks.join_next().await {
        assert_eq!(status.unwrap(), 200);
    }

    assert_eq!(running.state.snapshot().settings_revision, 20);
    stop(running).await;
}
