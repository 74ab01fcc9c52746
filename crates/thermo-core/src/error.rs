use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Settings persistence
    #[error("Config parse error: {0}")]
    ConfigParse(String),

    // Sensor
    #[error("Sensor not ready")]
    SensorNotReady,

    #[error("Sensor read failed: {0}")]
    SensorReadFailure(String),

    // Operator input
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidFieldValue { field: String, value: String },

    // Actuators
    #[error("Actuator command failed on {channel}: {message}")]
    ActuatorCommandFailure { channel: String, message: String },

    #[error("Invalid phase transition from {from} to {to}")]
    InvalidPhaseTransition { from: String, to: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new invalid field value error.
    pub fn invalid_field(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidFieldValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a new actuator command failure.
    pub fn actuator(channel: impl ToString, message: impl Into<String>) -> Self {
        Self::ActuatorCommandFailure {
            channel: channel.to_string(),
            message: message.into(),
        }
    }

    /// Returns `true` for errors that must stop the control loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ActuatorCommandFailure { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
