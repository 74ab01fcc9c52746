//! The form handler behind `GET /` and `POST /`.
//!
//! [`FormHandler::handle`] is synchronous and transport-agnostic: it takes the
//! request method and the decoded form fields and returns a status and an
//! HTML body. Its only effect is a single [`SharedState::modify_settings`]
//! call on a valid `POST`.
//!
//! | Field         | Setting              | Values                          |
//! |---------------|----------------------|---------------------------------|
//! | `hvacmode`    | HVAC mode            | `ac`, `heat`, `off`             |
//! | `fanmode`     | fan mode             | `auto`; anything else means on  |
//! | `cooltemp`    | cool setpoint        | decimal                         |
//! | `hightemp`    | heat setpoint        | decimal                         |
//! | `offsetvalue` | calibration offset   | decimal                         |
//!
//! Every field present is validated before anything is applied; one bad field
//! rejects the whole request. Blank numeric fields and unknown field names are
//! ignored.

use crate::page;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thermo_core::{Error, FanMode, HvacMode, Result, SharedState, ThermostatSettings};
use tracing::{debug, info, warn};

/// Request method as far as the form is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Get,
    Post,
    Other,
}

/// Status and rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormResponse {
    pub status: StatusCode,
    pub body: String,
}

impl IntoResponse for FormResponse {
    fn into_response(self) -> Response {
        (self.status, Html(self.body)).into_response()
    }
}

/// Validated form submission. `None` leaves the setting unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FormUpdate {
    pub hvac_mode: Option<HvacMode>,
    pub fan_mode: Option<FanMode>,
    pub cool_setpoint: Option<f64>,
    pub heat_setpoint: Option<f64>,
    pub calibration_offset: Option<f64>,
}

impl FormUpdate {
    /// Validate the raw fields.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidFieldValue` for the first field that does not
    /// parse.
    pub fn parse<K: AsRef<str>, V: AsRef<str>>(fields: &[(K, V)]) -> Result<Self> {
        let mut update = FormUpdate::default();

        for (name, value) in fields {
            let (name, value) = (name.as_ref(), value.as_ref().trim());
            match name {
                "hvacmode" => {
                    update.hvac_mode = Some(
                        value
                            .parse()
                            .map_err(|_| Error::invalid_field(name, value))?,
                    );
                }
                "fanmode" => {
                    update.fan_mode = Some(if value.eq_ignore_ascii_case("auto") {
                        FanMode::Auto
                    } else {
                        FanMode::On
                    });
                }
                "cooltemp" => update.cool_setpoint = parse_degrees(name, value)?,
                "hightemp" => update.heat_setpoint = parse_degrees(name, value)?,
                "offsetvalue" => update.calibration_offset = parse_degrees(name, value)?,
                _ => debug!(field = name, "ignoring unknown form field"),
            }
        }

        Ok(update)
    }

    /// Returns `true` if no setting would change.
    pub fn is_empty(&self) -> bool {
        *self == FormUpdate::default()
    }

    /// Apply every present field to `settings`.
    pub fn apply(&self, settings: &mut ThermostatSettings) {
        if let Some(mode) = self.hvac_mode {
            settings.hvac_mode = mode;
        }
        if let Some(fan) = self.fan_mode {
            settings.fan_mode = fan;
        }
        if let Some(cool) = self.cool_setpoint {
            settings.cool_setpoint = cool;
        }
        if let Some(heat) = self.heat_setpoint {
            settings.heat_setpoint = heat;
        }
        if let Some(offset) = self.calibration_offset {
            settings.calibration_offset = offset;
        }
    }
}

fn parse_degrees(name: &str, value: &str) -> Result<Option<f64>> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| Error::invalid_field(name, value))
}

/// Form handler bound to the shared state.
#[derive(Debug, Clone)]
pub struct FormHandler {
    state: SharedState,
}

impl FormHandler {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Handle one request.
    pub fn handle<K: AsRef<str>, V: AsRef<str>>(
        &self,
        method: FormMethod,
        fields: &[(K, V)],
    ) -> FormResponse {
        match method {
            FormMethod::Get => self.render(StatusCode::OK, None),
            FormMethod::Post => self.submit(fields),
            FormMethod::Other => FormResponse {
                status: StatusCode::METHOD_NOT_ALLOWED,
                body: "method not allowed\n".to_string(),
            },
        }
    }

    fn submit<K: AsRef<str>, V: AsRef<str>>(&self, fields: &[(K, V)]) -> FormResponse {
        let update = match FormUpdate::parse(fields) {
            Ok(update) => update,
            Err(e) => {
                warn!(error = %e, "rejected form submission");
                return self.render(StatusCode::BAD_REQUEST, Some(&e.to_string()));
            }
        };

        if update.is_empty() {
            return self.render(StatusCode::OK, None);
        }

        let settings = self.state.modify_settings(|s| {
            update.apply(s);
            *s
        });
        info!(
            mode = %settings.hvac_mode,
            fan = %settings.fan_mode,
            heat = settings.heat_setpoint,
            cool = settings.cool_setpoint,
            offset = settings.calibration_offset,
            "settings updated from web form"
        );

        self.render(StatusCode::OK, Some("Settings updated."))
    }

    fn render(&self, status: StatusCode, message: Option<&str>) -> FormResponse {
        FormResponse {
            status,
            body: page::render(&self.state.snapshot(), message),
        }
    }
}
