pub mod errors;

pub use errors::{MizError, MizErrorCategory, MizResult};

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const ELEMENT_SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

const CASTEP_EXTENSION: &str = ".castep";
const DRYRUN_SUFFIX: &str = "-dryrun";

/// Chemical symbol of the element carrying the core hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementSymbol {
    symbol: &'static str,
}

impl ElementSymbol {
    pub fn parse(raw: &str) -> MizResult<Self> {
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(MizError::input_validation(
                "INPUT.ELEMENT",
                "element symbol must not be empty",
            ));
        }

        ELEMENT_SYMBOLS
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(normalized))
            .map(|symbol| Self { symbol: *symbol })
            .ok_or_else(|| {
                MizError::input_validation(
                    "INPUT.ELEMENT",
                    format!("'{}' is not a known element symbol", normalized),
                )
            })
    }

    pub const fn as_str(&self) -> &'static str {
        self.symbol
    }

    pub fn atomic_number(&self) -> usize {
        ELEMENT_SYMBOLS
            .iter()
            .position(|candidate| *candidate == self.symbol)
            .map_or(0, |index| index + 1)
    }

    /// Marker for the core-hole species, e.g. `Al:`.
    pub fn site_label(&self) -> String {
        format!("{}:", self.symbol)
    }

    /// Marker for the ground-state species, e.g. `Al `.
    pub fn species_label(&self) -> String {
        format!("{} ", self.symbol)
    }
}

impl Display for ElementSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol)
    }
}

/// A CASTEP job name shared by the `.cell`, `.param` and `.castep` files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedName {
    directory: PathBuf,
    name: String,
}

impl SeedName {
    pub fn from_input(input: impl AsRef<Path>) -> MizResult<Self> {
        let input = input.as_ref();
        let file_name = input
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                MizError::input_validation(
                    "INPUT.SEED",
                    format!("'{}' does not name a CASTEP seed", input.display()),
                )
            })?;

        let name = file_name
            .strip_suffix(CASTEP_EXTENSION)
            .unwrap_or(file_name)
            .to_string();
        if name.is_empty() {
            return Err(MizError::input_validation(
                "INPUT.SEED",
                format!("'{}' does not name a CASTEP seed", input.display()),
            ));
        }

        let directory = input
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        Ok(Self { directory, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn dryrun(&self) -> Self {
        Self {
            directory: self.directory.clone(),
            name: format!("{}{}", self.name, DRYRUN_SUFFIX),
        }
    }

    pub fn file(&self, extension: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", self.name, extension))
    }

    pub fn castep_path(&self) -> PathBuf {
        self.file("castep")
    }

    pub fn cell_path(&self) -> PathBuf {
        self.file("cell")
    }

    pub fn param_path(&self) -> PathBuf {
        self.file("param")
    }
}

impl Display for SeedName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnergyTerm {
    ExcitedAllElectron,
    GroundAllElectron,
    ExcitedPseudo,
    GroundPseudo,
    ExcitedCell,
    GroundCell,
}

impl EnergyTerm {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExcitedAllElectron => "E_exc_all",
            Self::GroundAllElectron => "E_gs_all",
            Self::ExcitedPseudo => "E_exc_val",
            Self::GroundPseudo => "E_gs_val",
            Self::ExcitedCell => "E_exc_cell",
            Self::GroundCell => "E_gs_cell",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::ExcitedAllElectron => "all-electron atom, core hole",
            Self::GroundAllElectron => "all-electron atom, ground state",
            Self::ExcitedPseudo => "pseudo atom, core hole",
            Self::GroundPseudo => "pseudo atom, ground state",
            Self::ExcitedCell => "cell total energy, core hole",
            Self::GroundCell => "cell total energy, ground state",
        }
    }
}

impl Display for EnergyTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}
