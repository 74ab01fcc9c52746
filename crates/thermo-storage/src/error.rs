use thiserror::Error;

/// Settings persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The file exists but does not hold five well-formed settings lines.
    #[error("Settings parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Reading, writing or renaming the file failed.
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Returns `true` if the file was missing rather than unreadable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

impl From<StorageError> for thermo_core::Error {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Io(e) => thermo_core::Error::Io(e),
            parse @ StorageError::Parse { .. } => thermo_core::Error::ConfigParse(parse.to_string()),
        }
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
