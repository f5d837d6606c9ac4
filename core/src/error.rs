//! Error types for the core crate.

use std::path::PathBuf;

use thiserror::Error;


/// Failure loading or validating [`crate::settings::Settings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}


/// Argument validation failure inside a command handler.
///
/// The `Display` text is the exact line shown to the operator. These errors
/// are always reported through the console and never leave the handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    /// Wrong argument count or shape; the handler prints its usage block.
    #[error("invalid arguments")]
    Usage,

    #[error("Error: '{0}' is not a number!")]
    NotANumber(String),
}


/// Parse an integer argument strictly.
pub fn parse_int(token: &str) -> Result<i64, ArgError> {
    token
        .parse::<i64>()
        .map_err(|_| ArgError::NotANumber(token.to_string()))
}


/// Parse a floating point argument strictly. `NaN` is rejected.
pub fn parse_float(token: &str) -> Result<f64, ArgError> {
    match token.parse::<f64>() {
        Ok(value) if !value.is_nan() => Ok(value),
        _ => Err(ArgError::NotANumber(token.to_string())),
    }
}
