use crate::domain::{ElementSymbol, EnergyTerm, MizError, MizResult, SeedName};

/// Atomic energies entering E_core(atom), in eV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoreEnergyTerms {
    pub e_exc_all: f64,
    pub e_gs_all: f64,
    pub e_exc_val: f64,
    pub e_gs_val: f64,
}

impl CoreEnergyTerms {
    pub fn entries(&self) -> [(EnergyTerm, f64); 4] {
        [
            (EnergyTerm::ExcitedAllElectron, self.e_exc_all),
            (EnergyTerm::GroundAllElectron, self.e_gs_all),
            (EnergyTerm::ExcitedPseudo, self.e_exc_val),
            (EnergyTerm::GroundPseudo, self.e_gs_val),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellEnergies {
    pub e_exc_cell: f64,
    pub e_gs_cell: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MizoguchiCorrection {
    pub element: ElementSymbol,
    pub seed: SeedName,
    pub terms: CoreEnergyTerms,
    pub e_core: f64,
    pub cell: Option<CellEnergies>,
    pub transition_energy: Option<f64>,
}

impl MizoguchiCorrection {
    pub fn from_terms(
        element: ElementSymbol,
        seed: SeedName,
        terms: CoreEnergyTerms,
    ) -> MizResult<Self> {
        let e_core = core_correction(&terms)?;
        Ok(Self {
            element,
            seed,
            terms,
            e_core,
            cell: None,
            transition_energy: None,
        })
    }

    pub fn with_cell_energies(mut self, cell: CellEnergies) -> MizResult<Self> {
        let e_te = transition_energy(cell.e_exc_cell, cell.e_gs_cell, self.e_core)?;
        self.cell = Some(cell);
        self.transition_energy = Some(e_te);
        Ok(self)
    }
}

/// `E_core = (E_exc_all - E_gs_all) - (E_exc_val - E_gs_val)`.
pub fn core_correction(terms: &CoreEnergyTerms) -> MizResult<f64> {
    let value = (terms.e_exc_all - terms.e_gs_all) - (terms.e_exc_val - terms.e_gs_val);
    require_finite(value, "E_core(atom)")
}

/// `E_TE = (E_exc_cell - E_gs_cell) + E_core`.
pub fn transition_energy(e_exc_cell: f64, e_gs_cell: f64, e_core: f64) -> MizResult<f64> {
    require_finite((e_exc_cell - e_gs_cell) + e_core, "E_TE")
}

fn require_finite(value: f64, label: &str) -> MizResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MizError::computation(
            "RUN.NON_FINITE_ENERGY",
            format!("{} evaluated to {}", label, value),
        ))
    }
}
