//! Mizoguchi correction of core-loss transition energies computed with
//! CASTEP core-hole pseudopotentials.

pub mod castep;
pub mod correction;
pub mod domain;
pub mod dryrun;
pub mod report;
pub mod serialization;
pub mod workflow;

pub use workflow::{CorrectionConfig, CorrectionOutcome, run_correction};
