//! Error handling for the forecaster
//!
//! The prediction pipeline can fail in exactly two ways (the model never
//! loaded, or the model failed on a request); the remaining variants cover
//! the surfaces around it: form input, configuration and file I/O.

use thiserror::Error;

/// Main error type for the forecaster
#[derive(Error, Debug)]
pub enum ForecastError {
    /// The model artifact could not be loaded. Every prediction is refused.
    #[error("Model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    /// The loaded model failed on a request. The cached model is unaffected.
    #[error("Inference failed: {message}")]
    InferenceFailure { message: String },

    #[error("Invalid input for {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for Result with ForecastError
pub type ForecastResult<T> = Result<T, ForecastError>;

impl ForecastError {
    /// Create a model unavailable error
    pub fn model_unavailable(reason: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            reason: reason.into(),
        }
    }

    /// Create an inference failure
    pub fn inference(message: impl Into<String>) -> Self {
        Self::InferenceFailure {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

impl From<figment::Error> for ForecastError {
    fn from(err: figment::Error) -> Self {
        ForecastError::config(err.to_string())
    }
}
