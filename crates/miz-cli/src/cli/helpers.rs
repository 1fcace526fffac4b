use super::CliError;
use anyhow::anyhow;
use miz_core::serialization::format_fixed_f64;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const ENERGY_PRECISION: usize = 6;

pub(super) fn init_logging(verbose: u8) -> Result<(), CliError> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| CliError::from(anyhow!("failed to install log subscriber: {error}")))
}

pub(super) fn display_input(input: &Path) -> String {
    let rendered = input.display().to_string();
    if rendered.ends_with(".castep") {
        rendered
    } else {
        format!("{rendered}.castep")
    }
}

pub(super) fn format_energy(value: f64) -> String {
    format_fixed_f64(value, 0, ENERGY_PRECISION)
}
