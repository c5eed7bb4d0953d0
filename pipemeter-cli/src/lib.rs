//! pipemeter CLI library
//!
//! This library provides the command-line driver for `pipemeter`, a filter
//! that copies stdin to stdout while drawing a progress meter on stderr.

pub mod config;
pub mod driver;
pub mod error;
pub mod progress;

pub use error::{CliError, CliResult};
