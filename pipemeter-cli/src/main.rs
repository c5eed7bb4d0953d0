use anyhow::{Context, Result};
use pipemeter_cli::config::CliConfig;
use pipemeter_cli::driver::{self, Session};
use pipemeter_core::relay::stream;
use pipemeter_core::BufferMode;
use std::io;

fn main() -> Result<()> {
    init_logging();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let config = CliConfig::from_env();
    let mode = config
        .as_ref()
        .map(CliConfig::buffer_mode)
        .unwrap_or(BufferMode::Unbuffered);

    let input = stream::open_input().context("failed to duplicate standard input")?;
    let output = stream::open_output(mode).context("failed to duplicate standard output")?;

    driver::run(
        &argv,
        config,
        Session {
            input,
            output,
            errors: io::stderr(),
        },
    )
}

/// Initialize logging; stdout carries relayed data only
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}
