//! Line-based operator console.
//!
//! Reads one command per line, applies it to the shared state, and writes a
//! reply. Parsing and execution are separate so the same [`Console`] serves
//! the process's stdin and the tests' in-memory streams.

use crate::commands::{Command, HELP};
use futures::StreamExt;
use thermo_core::{Result, SharedState, StateSnapshot};
use thermo_storage::SettingsStore;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What the console should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print the text and keep reading.
    Reply(String),
    /// Nothing to print.
    Silent,
    /// Shut the thermostat down.
    Quit,
}

/// Executes console commands against the shared state.
#[derive(Debug, Clone)]
pub struct Console {
    state: SharedState,
    store: SettingsStore,
}

impl Console {
    pub fn new(state: SharedState, store: SettingsStore) -> Self {
        Self { state, store }
    }

    /// Execute one parsed command.
    ///
    /// # Errors
    ///
    /// Only `s` can fail, when the settings file cannot be written.
    pub async fn execute(&self, command: Command) -> Result<Outcome> {
        let reply = match command {
            Command::Help => HELP.to_string(),
            Command::Print => print_sample(&self.state.snapshot()),
            Command::PrintSettings => print_settings(&self.state.snapshot()),
            Command::Save => {
                let settings = self.state.settings();
                self.store.save(&settings).await?;
                format!("settings saved to {}", self.store.path().display())
            }
            Command::Quit => return Ok(Outcome::Quit),
            Command::SetHeatSetpoint(value) => {
                self.state.modify_settings(|s| s.heat_setpoint = value);
                format!("heat setpoint set to {value:.2}")
            }
            Command::SetCoolSetpoint(value) => {
                self.state.modify_settings(|s| s.cool_setpoint = value);
                format!("cool setpoint set to {value:.2}")
            }
            Command::SetOffset(value) => {
                self.state.modify_settings(|s| s.calibration_offset = value);
                format!("calibration offset set to {value:.2}")
            }
            Command::SetHvacMode(mode) => {
                let previous = self
                    .state
                    .modify_settings(|s| std::mem::replace(&mut s.hvac_mode, mode));
                if previous != mode {
                    info!(from = %previous, to = %mode, "HVAC mode changed from console");
                }
                format!("HVAC mode set to {mode}")
            }
            Command::SetFanMode(mode) => {
                self.state.modify_settings(|s| s.fan_mode = mode);
                format!("fan mode set to {mode}")
            }
        };
        Ok(Outcome::Reply(reply))
    }

    /// Parse and execute one input line.
    ///
    /// Errors are turned into a reply; the console never stops on bad input.
    pub async fn handle_line(&self, line: &str) -> Outcome {
        if line.trim().is_empty() {
            return Outcome::Silent;
        }

        let result = match line.parse::<Command>() {
            Ok(command) => self.execute(command).await,
            Err(e) => Err(e),
        };

        result.unwrap_or_else(|e| {
            debug!(line, error = %e, "console command rejected");
            Outcome::Reply(format!("error: {e}"))
        })
    }

    /// Serve commands from `input` until `q`, cancellation, or end of input.
    ///
    /// End of input only stops the console; the thermostat keeps running.
    /// `q` cancels `shutdown`.
    pub async fn run<R, W>(self, input: R, mut output: W, shutdown: CancellationToken)
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = FramedRead::new(input, LinesCodec::new());

        loop {
            let line = tokio::select! {
                () = shutdown.cancelled() => break,
                line = lines.next() => line,
            };

            let outcome = match line {
                Some(Ok(line)) => self.handle_line(&line).await,
                Some(Err(e)) => {
                    warn!(error = %e, "console input failed, console disabled");
                    break;
                }
                None => {
                    info!("console input closed, thermostat keeps running");
                    break;
                }
            };

            match outcome {
                Outcome::Reply(text) => {
                    if let Err(e) = write_reply(&mut output, &text).await {
                        warn!(error = %e, "console output failed");
                    }
                }
                Outcome::Silent => {}
                Outcome::Quit => {
                    info!("shutdown requested from console");
                    shutdown.cancel();
                    break;
                }
            }
        }
    }
}

async fn write_reply<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}

fn print_sample(snapshot: &StateSnapshot) -> String {
    match snapshot.adjusted_temperature() {
        Some(temperature) => format!(
            "temperature {temperature:.2}°F, humidity {:.1}%",
            snapshot.sample.raw_humidity
        ),
        None => "sensor not ready".to_string(),
    }
}

fn print_settings(snapshot: &StateSnapshot) -> String {
    let settings = &snapshot.settings;
    let status = if snapshot.ready { "ready" } else { "warming up" };
    format!(
        "HVAC mode:      {}\n\
         fan mode:       {}\n\
         heat setpoint:  {:.2}\n\
         cool setpoint:  {:.2}\n\
         offset:         {:.2}\n\
         actuators:      {}\n\
         status:         {status}",
        settings.hvac_mode,
        settings.fan_mode,
        settings.heat_setpoint,
        settings.cool_setpoint,
        settings.calibration_offset,
        snapshot.actuators,
    )
}
