//! Marker-driven extraction of the handful of energies the correction needs
//! from CASTEP `.castep` logs. This is not a general CASTEP output parser.

mod parser;

use crate::domain::{ElementSymbol, EnergyTerm, MizError, MizResult};
use parser::{atomic_energy_below, cell_energy_on_line};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const ALL_ELECTRON_MARKER: &str = "Atomic calculation";
pub const PSEUDO_ATOM_MARKER: &str = "Pseudo atomic";
pub const CELL_ENERGY_MARKER: &str = "NB est. 0K energy";
pub const DRYRUN_MARKER: &str = "DRYRUN";

/// Energies recovered from the core-loss `.castep` log, in eV.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreLossLog {
    pub e_exc_all: f64,
    pub e_exc_val: f64,
    pub e_gs_val: f64,
    pub e_exc_cell: Option<CellEnergyLine>,
}

impl CoreLossLog {
    /// Parses the last cell-energy line, if the log had one.
    pub fn excited_cell_energy(&self) -> Option<MizResult<f64>> {
        self.e_exc_cell.as_ref().map(CellEnergyLine::energy)
    }
}

/// The last `NB est. 0K energy` line, kept unparsed until E_TE needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEnergyLine {
    line_index: usize,
    text: String,
}

impl CellEnergyLine {
    pub fn line_number(&self) -> usize {
        self.line_index + 1
    }

    pub fn energy(&self) -> MizResult<f64> {
        cell_energy_on_line(&self.text, self.line_index)
    }
}

pub fn read_castep_log(path: &Path) -> MizResult<String> {
    fs::read_to_string(path).map_err(|source| {
        MizError::io_system(
            "IO.CASTEP_READ",
            format!("{} not found or unreadable: {}", path.display(), source),
        )
    })
}

/// Scans a core-loss log. Repeated markers overwrite earlier values, so a
/// log holding several runs yields the energies of the last one.
pub fn scan_core_loss_log(source: &str, element: ElementSymbol) -> MizResult<CoreLossLog> {
    let lines: Vec<&str> = source.lines().collect();
    let site_label = element.site_label();
    let species_label = element.species_label();

    let mut e_exc_all = None;
    let mut e_exc_val = None;
    let mut e_gs_val = None;
    let mut e_exc_cell = None;

    for (index, line) in lines.iter().enumerate() {
        if line.contains(DRYRUN_MARKER) {
            return Err(MizError::input_validation(
                "INPUT.CASTEP_DRYRUN_PRESENT",
                format!(
                    "a DRYRUN calculation was already appended to this log (line {}); \
                     remove it from the .castep file, the correction would be inaccurate",
                    index + 1
                ),
            ));
        }

        if line.contains(ALL_ELECTRON_MARKER) && line.contains(&site_label) {
            e_exc_all = Some(atomic_energy_below(
                &lines,
                index,
                EnergyTerm::ExcitedAllElectron,
            )?);
        }
        if line.contains(PSEUDO_ATOM_MARKER) && line.contains(&site_label) {
            e_exc_val = Some(atomic_energy_below(&lines, index, EnergyTerm::ExcitedPseudo)?);
        }
        if line.contains(PSEUDO_ATOM_MARKER) && line.contains(&species_label) {
            e_gs_val = Some(atomic_energy_below(&lines, index, EnergyTerm::GroundPseudo)?);
        }
        if line.contains(CELL_ENERGY_MARKER) {
            e_exc_cell = Some(CellEnergyLine {
                line_index: index,
                text: (*line).to_string(),
            });
        }
    }

    let missing: Vec<&str> = [
        (EnergyTerm::ExcitedAllElectron, e_exc_all),
        (EnergyTerm::ExcitedPseudo, e_exc_val),
        (EnergyTerm::GroundPseudo, e_gs_val),
    ]
    .iter()
    .filter(|(_, value)| value.is_none())
    .map(|(term, _)| term.as_str())
    .collect();

    match (e_exc_all, e_exc_val, e_gs_val) {
        (Some(e_exc_all), Some(e_exc_val), Some(e_gs_val)) => {
            debug!(
                element = %element,
                e_exc_all,
                e_exc_val,
                e_gs_val,
                cell_energy_line = ?e_exc_cell.as_ref().map(CellEnergyLine::line_number),
                "core-loss log scanned"
            );
            Ok(CoreLossLog {
                e_exc_all,
                e_exc_val,
                e_gs_val,
                e_exc_cell,
            })
        }
        _ => Err(MizError::input_validation(
            "INPUT.CASTEP_MISSING_TERMS",
            format!(
                "failed to find all values for Ecore for element {}; missing {}",
                element,
                missing.join(", ")
            ),
        )),
    }
}

/// Scans the dry-run log for the ground-state all-electron energy.
pub fn scan_dryrun_log(source: &str, element: ElementSymbol) -> MizResult<f64> {
    let lines: Vec<&str> = source.lines().collect();
    let site_label = element.site_label();

    let mut e_gs_all = None;
    for (index, line) in lines.iter().enumerate() {
        if line.contains(ALL_ELECTRON_MARKER) && line.contains(&site_label) {
            e_gs_all = Some(atomic_energy_below(
                &lines,
                index,
                EnergyTerm::GroundAllElectron,
            )?);
        }
    }

    let e_gs_all = e_gs_all.ok_or_else(|| {
        MizError::input_validation(
            "INPUT.DRYRUN_MISSING_TERMS",
            format!(
                "failed to find {} for element {} in the dry-run log",
                EnergyTerm::GroundAllElectron,
                element
            ),
        )
    })?;
    debug!(element = %element, e_gs_all, "dry-run log scanned");
    Ok(e_gs_all)
}
