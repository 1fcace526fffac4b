use crate::correction::MizoguchiCorrection;
use crate::domain::{EnergyTerm, MizError, MizResult};
use crate::serialization::{append_text_line, format_fixed_f64, write_text_artifact};
use serde::Serialize;
use std::path::Path;

const VALUE_WIDTH: usize = 18;
const VALUE_PRECISION: usize = 6;

/// One line of the appended JSON-lines result log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionRecord {
    pub seed: String,
    pub element: String,
    pub e_exc_all: f64,
    pub e_gs_all: f64,
    pub e_exc_val: f64,
    pub e_gs_val: f64,
    pub e_core: f64,
    pub e_gs_cell: Option<f64>,
    pub e_exc_cell: Option<f64>,
    pub transition_energy: Option<f64>,
    pub dryrun_reused: bool,
}

impl CorrectionRecord {
    pub fn new(correction: &MizoguchiCorrection, dryrun_reused: bool) -> Self {
        Self {
            seed: correction.seed.name().to_string(),
            element: correction.element.to_string(),
            e_exc_all: correction.terms.e_exc_all,
            e_gs_all: correction.terms.e_gs_all,
            e_exc_val: correction.terms.e_exc_val,
            e_gs_val: correction.terms.e_gs_val,
            e_core: correction.e_core,
            e_gs_cell: correction.cell.map(|cell| cell.e_gs_cell),
            e_exc_cell: correction.cell.map(|cell| cell.e_exc_cell),
            transition_energy: correction.transition_energy,
            dryrun_reused,
        }
    }
}

pub fn render_report(correction: &MizoguchiCorrection) -> String {
    let mut lines = Vec::with_capacity(24);
    lines.push("Mizoguchi transition-energy correction".to_string());
    lines.push("======================================".to_string());
    lines.push(format!("seed:    {}", correction.seed));
    lines.push(format!(
        "element: {} (Z = {})",
        correction.element,
        correction.element.atomic_number()
    ));
    lines.push(String::new());

    lines.push("Atomic energies (eV)".to_string());
    for (term, value) in correction.terms.entries() {
        lines.push(term_line(term, value));
    }
    lines.push(String::new());
    lines.push(format!(
        "E_core(atom) for {} in {}: {} eV",
        correction.element,
        correction.seed,
        format_fixed_f64(correction.e_core, 0, VALUE_PRECISION)
    ));
    lines.push(String::new());

    match (correction.cell, correction.transition_energy) {
        (Some(cell), Some(e_te)) => {
            lines.push("Cell energies (eV)".to_string());
            lines.push(term_line(EnergyTerm::GroundCell, cell.e_gs_cell));
            lines.push(term_line(EnergyTerm::ExcitedCell, cell.e_exc_cell));
            lines.push(String::new());
            lines.push(format!(
                "Mizoguchi corrected transition energy: {} eV",
                format_fixed_f64(e_te, 0, VALUE_PRECISION)
            ));
        }
        _ => lines.push(
            "No ground state energy supplied; full Mizoguchi correction not computed.".to_string(),
        ),
    }

    lines.join("\n")
}

pub fn write_report(path: &Path, correction: &MizoguchiCorrection) -> MizResult<()> {
    write_text_artifact(path, &render_report(correction)).map_err(|source| {
        MizError::io_system(
            "IO.REPORT_WRITE",
            format!("failed to write report '{}': {}", path.display(), source),
        )
    })
}

pub fn append_record(path: &Path, record: &CorrectionRecord) -> MizResult<()> {
    let line = serde_json::to_string(record).map_err(|source| {
        MizError::internal(
            "SYS.RECORD_ENCODE",
            format!("failed to encode result record: {}", source),
        )
    })?;
    append_text_line(path, &line).map_err(|source| {
        MizError::io_system(
            "IO.RECORD_APPEND",
            format!("failed to append record to '{}': {}", path.display(), source),
        )
    })
}

fn term_line(term: EnergyTerm, value: f64) -> String {
    format!(
        "  {:<11} {:<32} {}",
        term.as_str(),
        term.description(),
        format_fixed_f64(value, VALUE_WIDTH, VALUE_PRECISION)
    )
}
