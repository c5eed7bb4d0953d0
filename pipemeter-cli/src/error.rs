//! Error handling for the CLI application

use pipemeter_core::ArgError;
use std::fmt;

/// Errors that stop an invocation before the relay starts
///
/// Every variant is answered the same way: the input is passed through
/// unchanged and the process fails.
#[derive(Debug)]
pub enum CliError {
    /// Unknown option or uncastable value
    Argument(ArgError),
    /// Configuration file could not be read or parsed
    Config(String),
    /// `buf_size` below one byte
    InvalidBufferSize(i64),
    /// `bar_format` is not a valid progress template
    Template(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Argument(err) => write!(f, "Invalid argument: {err}"),
            CliError::Config(msg) => write!(f, "Configuration error: {msg}"),
            CliError::InvalidBufferSize(size) => {
                write!(f, "Invalid buffer size: {size} (must be at least 1)")
            }
            CliError::Template(msg) => write!(f, "Invalid bar format: {msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Argument(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ArgError> for CliError {
    fn from(err: ArgError) -> Self {
        CliError::Argument(err)
    }
}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, anyhow::Error>;
