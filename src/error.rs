use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes for each failure class.
pub mod exit_codes {
    /// Run completed (including runs that matched no files).
    pub const SUCCESS: u8 = 0;

    /// Unexpected failure not covered by a more specific code.
    pub const UNEXPECTED: u8 = 1;

    /// Invalid configuration or command-line arguments.
    pub const CONFIG: u8 = 2;

    /// The token encoder could not be initialized.
    pub const TOKENIZER: u8 = 3;

    /// The root directory is missing or is not a directory.
    pub const ROOT_NOT_FOUND: u8 = 4;

    /// An output chunk could not be written.
    pub const WRITE: u8 = 5;
}

/// Error types for the combine-files library.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// The scan root is missing or not a directory.
    #[error("Root directory not found: '{path}'")]
    RootNotFound {
        /// Root that was requested
        path: PathBuf,
    },

    /// The BPE encoder failed to load.
    #[error("Failed to initialize {encoding} tokenizer: {message}")]
    Tokenizer {
        /// Encoding name
        encoding: &'static str,
        /// Error message
        message: String,
    },

    /// Writing an output chunk failed.
    #[error("Failed to write '{path}': {message}")]
    Write {
        /// Output file path
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// JSON serialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message
        message: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a root-not-found error.
    #[must_use]
    pub fn root_not_found(path: impl Into<PathBuf>) -> Self {
        Self::RootNotFound { path: path.into() }
    }

    /// Creates a tokenizer initialization error.
    #[must_use]
    pub fn tokenizer(encoding: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Tokenizer {
            encoding,
            message: message.to_string(),
        }
    }

    /// Creates an output write error.
    #[must_use]
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Maps the error to the process exit code for its failure class.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config { .. } => exit_codes::CONFIG,
            Self::Tokenizer { .. } => exit_codes::TOKENIZER,
            Self::RootNotFound { .. } => exit_codes::ROOT_NOT_FOUND,
            Self::Write { .. } => exit_codes::WRITE,
            Self::Io { .. } | Self::Serialization { .. } => exit_codes::UNEXPECTED,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}
