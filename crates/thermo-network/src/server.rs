//! HTTP server for the settings form.
//!
//! # Routes
//!
//! | Method | Path          | Response                          |
//! |--------|---------------|-----------------------------------|
//! | GET    | `/`           | status page and settings form     |
//! | POST   | `/`           | apply the form, render the result |
//! | GET    | `/api/status` | JSON status snapshot              |
//!
//! Each connection is served on its own task; the handlers touch nothing but
//! [`SharedState`].
//!
//! # Example Usage
//!
//! ```no_run
//! use thermo_core::{SharedState, ThermostatSettings};
//! use thermo_network::{HttpServer, HttpServerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = SharedState::new(ThermostatSettings::default());
//! let config = HttpServerConfig {
//!     bind_addr: "127.0.0.1:8080".parse()?,
//! };
//!
//! let server = HttpServer::bind(config, state).await?;
//! server.serve(CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

use crate::form::{FormHandler, FormMethod, FormResponse};
use axum::extract::{Form, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use thermo_core::constants::DEFAULT_HTTP_ADDR;
use thermo_core::{ActuatorState, SharedState, ThermostatSettings};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Configuration for the HTTP server
///
/// # Example
///
/// ```
/// use thermo_network::HttpServerConfig;
///
/// let config = HttpServerConfig {
///     bind_addr: "0.0.0.0:8080".parse().unwrap(),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_HTTP_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8080))),
        }
    }
}

/// Errors that can occur during HTTP server operations
#[derive(Debug, Error)]
pub enum HttpServerError {
    /// Failed to bind to address
    #[error("Failed to bind to {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON body of `GET /api/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub settings: ThermostatSettings,
    pub actuators: ActuatorState,

    /// Adjusted temperature in °F, absent while the sensor is not ready.
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,

    /// Seconds since the last good reading.
    pub sample_age_secs: Option<u64>,
    pub consecutive_read_failures: u32,
    pub ready: bool,
}

impl StatusResponse {
    fn from_state(state: &SharedState) -> Self {
        let snapshot = state.snapshot();
        let valid = snapshot.sample.valid;
        Self {
            settings: snapshot.settings,
            actuators: snapshot.actuators,
            temperature: snapshot.adjusted_temperature(),
            humidity: valid.then_some(snapshot.sample.raw_humidity),
            sample_age_secs: snapshot.sample_age().map(|age| age.as_secs()),
            consecutive_read_failures: snapshot.consecutive_read_failures,
            ready: snapshot.ready,
        }
    }
}

/// Build the application router over `state`.
pub fn router(state: SharedState) -> Router {
    let handler = FormHandler::new(state.clone());
    Router::new()
        .route("/", get(page_handler).post(submit_handler))
        .with_state(handler)
        .merge(
            Router::new()
                .route("/api/status", get(status_handler))
                .with_state(state),
        )
}

async fn page_handler(State(handler): State<FormHandler>) -> FormResponse {
    handler.handle::<&str, &str>(FormMethod::Get, &[])
}

async fn submit_handler(
    State(handler): State<FormHandler>,
    Form(fields): Form<Vec<(String, String)>>,
) -> FormResponse {
    debug!(fields = fields.len(), "form submitted");
    handler.handle(FormMethod::Post, &fields)
}

async fn status_handler(State(state): State<SharedState>) -> Json<StatusResponse> {
    Json(StatusResponse::from_state(&state))
}

/// HTTP server bound to a listening socket.
#[derive(Debug)]
pub struct HttpServer {
    listener: TcpListener,
    state: SharedState,
}

impl HttpServer {
    /// Bind the server to the configured address
    ///
    /// # Errors
    ///
    /// Returns `BindFailed` if the address is in use or not permitted.
    pub async fn bind(config: HttpServerConfig, state: SharedState) -> Result<Self, HttpServerError> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| HttpServerError::BindFailed {
                addr: config.bind_addr,
                source,
            })?;

        info!(addr = %config.bind_addr, "HTTP server listening");
        Ok(Self { listener, state })
    }

    /// Address actually bound, useful when binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, HttpServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve requests until `shutdown` is cancelled.
    ///
    /// In-flight requests are allowed to finish.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<(), HttpServerError> {
        let app = router(self.state);

        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}
