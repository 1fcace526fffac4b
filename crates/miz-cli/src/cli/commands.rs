use super::CliError;
use super::helpers::{display_input, format_energy};
use miz_core::dryrun::{CastepExecutor, DryrunPolicy};
use miz_core::{CorrectionConfig, run_correction};
use std::path::PathBuf;
use tracing::debug;

#[derive(clap::Args)]
pub(super) struct CorrectionArgs {
    /// Element carrying the core hole in the core-loss calculation
    #[arg(short = 'e', long)]
    element: String,

    /// Seed of the core-loss calculation (<seed> or <seed>.castep)
    #[arg(short = 'i', long = "inputfile", value_name = "SEED")]
    input: PathBuf,

    /// Total singlepoint free energy (E-0.5TS) of the cell without a core hole, in eV;
    /// enables the full corrected transition energy
    #[arg(
        short = 't',
        long = "totalenergy",
        value_name = "EV",
        allow_negative_numbers = true
    )]
    total_energy: Option<f64>,

    /// CASTEP binary on PATH, e.g. castep.mpi or castep19
    #[arg(short = 'c', long = "castep", value_name = "BINARY")]
    castep: String,

    /// Report output path (default: <seed>-miz_correction.txt beside the seed)
    #[arg(long)]
    report: Option<PathBuf>,

    /// JSON-lines result log to append to (default: miz_correction.jsonl beside the seed)
    #[arg(long)]
    record: Option<PathBuf>,

    /// Run the dry run even when <seed>-dryrun.castep already exists
    #[arg(long)]
    rerun_dryrun: bool,
}

impl CorrectionArgs {
    fn into_config(self) -> CorrectionConfig {
        CorrectionConfig {
            element: self.element,
            input: self.input,
            castep_binary: self.castep,
            ground_state_energy: self.total_energy,
            report_path: self.report,
            record_path: self.record,
            dryrun_policy: if self.rerun_dryrun {
                DryrunPolicy::AlwaysRun
            } else {
                DryrunPolicy::ReuseExisting
            },
        }
    }
}

pub(super) fn run_correction_command(args: CorrectionArgs) -> Result<i32, CliError> {
    let config = args.into_config();
    debug!(?config, "resolved correction configuration");
    let executor = CastepExecutor::new(config.castep_binary.clone());

    println!(
        "Getting Ecore for {} in {}",
        config.element.trim(),
        display_input(&config.input)
    );
    let outcome = run_correction(&config, &executor).map_err(CliError::Compute)?;
    let correction = &outcome.correction;

    if outcome.dryrun_reused {
        println!("CASTEP dry run already completed, reused {}", outcome.dryrun_log.display());
    }
    println!(
        "The E_core(atom) for {} in {} is {}",
        correction.element,
        correction.seed,
        format_energy(correction.e_core)
    );

    match (correction.cell, correction.transition_energy) {
        (Some(cell), Some(e_te)) => {
            println!(
                "Now calculating full Mizoguchi correction with supplied ground state energy of {} eV",
                format_energy(cell.e_gs_cell)
            );
            println!("Mizoguchi corrected transition energy is {} eV", format_energy(e_te));
        }
        _ => println!("No ground state energy supplied, skipping the full Mizoguchi correction."),
    }

    println!("Report: {}", outcome.report_path.display());
    println!("Record appended to: {}", outcome.record_path.display());
    println!("Finished.");
    Ok(0)
}
