//! Error types for the training launcher

use thiserror::Error;

/// Result type alias using the launcher Error
pub type Result<T> = std::result::Result<T, Error>;

/// Exit code reported when the job could not be configured
pub const EXIT_CONFIGURATION: i32 = 2;

/// Exit code reported when the external process could not be started
pub const EXIT_LAUNCH: i32 = 3;

/// Exit code reported for I/O failures while waiting on the training process
pub const EXIT_INTERNAL: i32 = 1;

/// Core error type for the training launcher
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(
        "Configuration error: unknown COMM_HOOK_TYPE {value:?} (expected one of \
         FP16_COMPRESS, POWER_SGD, FP16_POWER_SGD, BATCHED_POWER_SGD, FP16_BATCHED_POWER_SGD)"
    )]
    UnknownCompressionScheme { value: String },

    // Launch errors
    #[error("Launch error: failed to start {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Training process terminated by signal {signal}")]
    SignalTermination { signal: i32 },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Shorthand for a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Returns true if the error was raised before any process started
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Configuration { .. } | Error::UnknownCompressionScheme { .. }
        )
    }

    /// No launcher error is retried automatically
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Process exit code the launcher binary reports for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Configuration { .. } | Error::UnknownCompressionScheme { .. } => {
                EXIT_CONFIGURATION
            }
            Error::Launch { .. } => EXIT_LAUNCH,
            Error::SignalTermination { signal } => 128 + signal,
            Error::Io(_) | Error::Serialization(_) => EXIT_INTERNAL,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
