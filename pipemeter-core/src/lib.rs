//! Delimiter-counting stream relay and typed option schema
//!
//! This crate holds the deterministic half of `pipemeter`: the relay that
//! copies a byte stream while reporting one unit of progress per delimited
//! segment, and the machinery that turns `--name=value` arguments into typed
//! values checked against a declared option table.
//!
//! # Example
//!
//! ```rust
//! use pipemeter_core::relay::relay;
//!
//! let mut output = Vec::new();
//! let mut segments = 0;
//! relay(&b"a\nb\nc"[..], &mut output, b"\n", 1, |n| segments += n).unwrap();
//!
//! assert_eq!(output, b"a\nb\nc");
//! assert_eq!(segments, 3);
//! ```

pub mod cast;
pub mod error;
pub mod relay;
pub mod schema;
pub mod tokenize;

pub use cast::{cast, TypeTag, Value};
pub use error::ArgError;
pub use relay::stream::{BufferMode, RelayWriter};
pub use relay::{relay, RelaySummary};
pub use schema::{extract_schema, OptionSpec, Schema, EXCLUDED_OPTIONS};
pub use tokenize::tokenize;
