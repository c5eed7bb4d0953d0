//! Command-line driver
//!
//! Resolves the arguments, then relays stdin to stdout with the meter's
//! `update` as the progress callback. When the arguments cannot be resolved
//! the input is still passed through unchanged before the invocation fails,
//! so a broken command never stalls or truncates a pipeline.

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::progress::{Meter, MeterOptions};
use anyhow::Context;
use pipemeter_core::relay::{relay, DEFAULT_BUF_SIZE, DEFAULT_DELIMITER};
use pipemeter_core::schema::{
    render_option_list, BUF_SIZE, DELIM, EXCLUDED_OPTIONS, EXTRA_OPTIONS, METER_OPTIONS,
};
use pipemeter_core::{tokenize, Schema, Value};
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// Short usage banner
pub const USAGE: &str = "Usage:\n  pipemeter [--help | options]\n";

const VERSION_FLAGS: &[&str] = &["-v", "--version"];
const HELP_FLAGS: &[&str] = &["-h", "--help"];

/// Typed arguments keyed by option name
pub type TypedArgs = BTreeMap<String, Value>;

/// The streams one invocation works on
pub struct Session<R, W, E> {
    pub input: R,
    pub output: W,
    pub errors: E,
}

/// Relay settings popped off the typed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub delimiter: Vec<u8>,
    pub buf_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_vec(),
            buf_size: DEFAULT_BUF_SIZE,
        }
    }
}

impl RelayConfig {
    /// Remove `delim` and `buf_size` from `args`
    pub fn take_from(args: &mut TypedArgs) -> Result<Self, CliError> {
        let mut config = Self::default();

        if let Some(delim) = args.remove(DELIM).as_ref().and_then(Value::as_char) {
            let mut utf8 = [0u8; 4];
            config.delimiter = delim.encode_utf8(&mut utf8).as_bytes().to_vec();
        }
        if let Some(size) = args.remove(BUF_SIZE).as_ref().and_then(Value::as_int) {
            config.buf_size = usize::try_from(size)
                .ok()
                .filter(|&n| n > 0)
                .ok_or(CliError::InvalidBufferSize(size))?;
        }

        Ok(config)
    }
}

/// Full help text
pub fn help_text() -> String {
    format!(
        "{USAGE}\nOptions:\n  -h, --help     Print this help and exit\n  \
         -v, --version  Print version and exit\n\n{}\n  Extra CLI Options\n\n{}",
        render_option_list(METER_OPTIONS, EXCLUDED_OPTIONS),
        render_option_list(EXTRA_OPTIONS, EXCLUDED_OPTIONS),
    )
}

/// Cast configuration defaults, then command-line pairs, against `schema`
///
/// Later values win, so the command line overrides the file.
pub fn resolve_arguments(
    argv: &[String],
    config: &CliConfig,
    schema: &Schema,
) -> Result<TypedArgs, CliError> {
    let mut typed = TypedArgs::new();

    for (name, raw) in config.default_pairs()?.into_iter().chain(tokenize(argv)) {
        let tag = schema.type_of(&name)?;
        let value = tag.cast(&raw)?;
        log::debug!("option {name} = {value:?}");
        typed.insert(name, value);
    }

    Ok(typed)
}

fn prepare(
    argv: &[String],
    config: Result<CliConfig, CliError>,
) -> Result<(RelayConfig, Meter), CliError> {
    let config = config?;
    let mut args = resolve_arguments(argv, &config, &Schema::standard())?;
    let relay_config = RelayConfig::take_from(&mut args)?;
    let meter = Meter::new(&MeterOptions::from_args(&args))?;
    Ok((relay_config, meter))
}

fn wants(argv: &[String], flags: &[&str]) -> bool {
    argv.iter().any(|arg| flags.contains(&arg.as_str()))
}

/// Run one invocation
pub fn run<R, W, E>(
    argv: &[String],
    config: Result<CliConfig, CliError>,
    session: Session<R, W, E>,
) -> CliResult<()>
where
    R: Read,
    W: Write,
    E: Write,
{
    let Session {
        input,
        mut output,
        mut errors,
    } = session;

    if wants(argv, VERSION_FLAGS) {
        writeln!(output, "{}", env!("CARGO_PKG_VERSION"))?;
        output.flush()?;
        return Ok(());
    }
    if wants(argv, HELP_FLAGS) {
        writeln!(output, "{}", help_text())?;
        output.flush()?;
        return Ok(());
    }

    match prepare(argv, config) {
        Ok((relay_config, mut meter)) => {
            log::info!(
                "relaying with buffer size {} and delimiter {:?}",
                relay_config.buf_size,
                String::from_utf8_lossy(&relay_config.delimiter)
            );
            let summary = relay(
                input,
                &mut output,
                &relay_config.delimiter,
                relay_config.buf_size,
                |n| meter.update(n),
            )
            .context("failed to relay standard input")?;
            meter.close();
            log::info!(
                "relayed {} bytes in {} segments",
                summary.bytes,
                summary.segments
            );
            Ok(())
        }
        Err(err) => {
            log::warn!("{err}; passing input through unchanged");
            write!(errors, "\nError:\n{USAGE}")?;
            errors.flush()?;
            relay(input, &mut output, DEFAULT_DELIMITER, 1, |_| {})
                .context("failed to pass standard input through")?;
            Err(err.into())
        }
    }
}
