//! HTTP interface for the thermostat.
//!
//! A status page with a settings form, served by axum. The form logic lives in
//! [`form::FormHandler`], a synchronous handler that knows nothing about the
//! transport; [`server`] wires it to routes.

pub mod form;
pub mod page;
pub mod server;

pub use form::{FormHandler, FormMethod, FormResponse, FormUpdate};
pub use server::{HttpServer, HttpServerConfig, HttpServerError, StatusResponse, router};
