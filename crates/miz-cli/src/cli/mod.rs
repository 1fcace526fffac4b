mod commands;
mod helpers;

use clap::Parser;
use miz_core::domain::MizError;

pub fn run_from_env() -> i32 {
    let cli = match parse(std::env::args()) {
        Ok(Parsed::Run(cli)) => cli,
        Ok(Parsed::Exit(code)) => return code,
        Err(error) => return report_error(&error),
    };

    if let Err(error) = helpers::init_logging(cli.verbose) {
        return report_error(&error);
    }

    match commands::run_correction_command(cli.correction) {
        Ok(code) => code,
        Err(error) => report_error(&error),
    }
}

/// Parses and runs without installing a log subscriber.
#[cfg(test)]
pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("miz-correction".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    match parse(full_args)? {
        Parsed::Run(cli) => commands::run_correction_command(cli.correction),
        Parsed::Exit(code) => Ok(code),
    }
}

enum Parsed {
    Run(Cli),
    Exit(i32),
}

fn parse<I, S>(args: I) -> Result<Parsed, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    match Cli::try_parse_from(&args) {
        Ok(cli) => Ok(Parsed::Run(cli)),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(Parsed::Exit(0))
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

fn report_error(error: &CliError) -> i32 {
    let diagnostic = error.as_miz_error();
    eprintln!("{}", diagnostic.diagnostic_line());
    if let Some(summary_line) = diagnostic.fatal_exit_line() {
        eprintln!("{}", summary_line);
    }
    diagnostic.exit_code()
}

#[derive(Parser)]
#[command(
    name = "miz-correction",
    version,
    about = "Mizoguchi correction of CASTEP core-loss transition energies",
    long_about = "Calculates the Mizoguchi et al. correction to the transition energy of plane-wave \
pseudopotential EELS/XAS spectra from a .castep file. The .castep, .cell and .param files must sit \
next to each other; a CASTEP --dryrun is performed to obtain the ground-state all-electron energy.\n\n\
Example: miz-correction -e Al -i Al2O3 -t -138442.0450689 -c castep19"
)]
struct Cli {
    #[command(flatten)]
    correction: commands::CorrectionArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(MizError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_miz_error(&self) -> MizError {
        match self {
            Self::Usage(message) => MizError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => MizError::internal("SYS.CLI", format!("{error:#}")),
        }
    }
}
