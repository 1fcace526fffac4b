use crate::castep::{read_castep_log, scan_core_loss_log, scan_dryrun_log};
use crate::correction::{CellEnergies, CoreEnergyTerms, MizoguchiCorrection};
use crate::domain::{ElementSymbol, MizError, MizResult, SeedName};
use crate::dryrun::{DryrunExecutor, DryrunPolicy, ensure_dryrun_log};
use crate::report::{CorrectionRecord, append_record, write_report};
use std::path::PathBuf;
use tracing::info;

pub const REPORT_SUFFIX: &str = "-miz_correction.txt";
pub const RECORD_FILE_NAME: &str = "miz_correction.jsonl";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectionConfig {
    pub element: String,
    pub input: PathBuf,
    pub castep_binary: String,
    /// Ground-state cell free energy (E-0.5TS) in eV; enables E_TE.
    pub ground_state_energy: Option<f64>,
    pub report_path: Option<PathBuf>,
    pub record_path: Option<PathBuf>,
    pub dryrun_policy: DryrunPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionOutcome {
    pub correction: MizoguchiCorrection,
    pub report_path: PathBuf,
    pub record_path: PathBuf,
    pub dryrun_log: PathBuf,
    pub dryrun_reused: bool,
}

pub fn default_report_path(seed: &SeedName) -> PathBuf {
    seed.directory().join(format!("{}{}", seed.name(), REPORT_SUFFIX))
}

pub fn default_record_path(seed: &SeedName) -> PathBuf {
    seed.directory().join(RECORD_FILE_NAME)
}

pub fn run_correction(
    config: &CorrectionConfig,
    executor: &dyn DryrunExecutor,
) -> MizResult<CorrectionOutcome> {
    let element = ElementSymbol::parse(&config.element)?;
    let seed = SeedName::from_input(&config.input)?;

    let castep_path = seed.castep_path();
    info!(element = %element, log = %castep_path.display(), "getting Ecore");
    let core_loss = scan_core_loss_log(&read_castep_log(&castep_path)?, element)?;

    let dryrun = ensure_dryrun_log(&seed, element, executor, config.dryrun_policy)?;
    let e_gs_all = scan_dryrun_log(&read_castep_log(&dryrun.log_path)?, element)?;

    let terms = CoreEnergyTerms {
        e_exc_all: core_loss.e_exc_all,
        e_gs_all,
        e_exc_val: core_loss.e_exc_val,
        e_gs_val: core_loss.e_gs_val,
    };
    let mut correction = MizoguchiCorrection::from_terms(element, seed.clone(), terms)?;
    info!(e_core = correction.e_core, "E_core(atom) computed");

    if let Some(e_gs_cell) = config.ground_state_energy {
        let e_exc_cell = match core_loss.excited_cell_energy() {
            Some(parsed) => parsed?,
            None => {
                return Err(MizError::input_validation(
                    "INPUT.CASTEP_FINAL_ENERGY",
                    format!("final energy in {} not found", castep_path.display()),
                ));
            }
        };
        correction = correction.with_cell_energies(CellEnergies {
            e_exc_cell,
            e_gs_cell,
        })?;
        info!(
            e_gs_cell,
            e_exc_cell,
            e_te = ?correction.transition_energy,
            "transition energy computed"
        );
    }

    let report_path = config
        .report_path
        .clone()
        .unwrap_or_else(|| default_report_path(&seed));
    let record_path = config
        .record_path
        .clone()
        .unwrap_or_else(|| default_record_path(&seed));

    write_report(&report_path, &correction)?;
    append_record(&record_path, &CorrectionRecord::new(&correction, dryrun.reused))?;

    Ok(CorrectionOutcome {
        correction,
        report_path,
        record_path,
        dryrun_log: dryrun.log_path,
        dryrun_reused: dryrun.reused,
    })
}
