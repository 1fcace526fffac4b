use crate::domain::{EnergyTerm, MizError, MizResult};

/// Atomic-solver reports put the converged energy two lines below the
/// header, e.g. `Converged in 53 iterations to an ae energy of -10859.391 eV`.
const ENERGY_LINE_OFFSET: usize = 2;

pub(super) fn atomic_energy_below(
    lines: &[&str],
    marker_index: usize,
    term: EnergyTerm,
) -> MizResult<f64> {
    let value_index = marker_index + ENERGY_LINE_OFFSET;
    let line = lines.get(value_index).ok_or_else(|| {
        MizError::input_validation(
            "INPUT.CASTEP_TRUNCATED",
            format!(
                "{} marker at line {} is not followed by an energy line",
                term,
                marker_index + 1
            ),
        )
    })?;

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let token = tokens
        .len()
        .checked_sub(2)
        .and_then(|index| tokens.get(index))
        .copied()
        .unwrap_or("");

    parse_energy(token, term, value_index)
}

pub(super) fn cell_energy_on_line(line: &str, line_index: usize) -> MizResult<f64> {
    let token = line
        .split_once('=')
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .unwrap_or("");
    parse_energy(token, EnergyTerm::ExcitedCell, line_index)
}

fn parse_energy(token: &str, term: EnergyTerm, line_index: usize) -> MizResult<f64> {
    token
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            MizError::input_validation(
                "INPUT.CASTEP_NUMBER",
                format!(
                    "expected a numeric {} value at line {} but found '{}'",
                    term,
                    line_index + 1,
                    token
                ),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::{atomic_energy_below, cell_energy_on_line};
    use crate::domain::EnergyTerm;

    #[test]
    fn atomic_energy_is_the_token_before_the_unit() {
        let lines = [
            "   Atomic calculation performed for Al: 1s1 2s2 2p6 3s2 3p1",
            "",
            "   Converged in 53 iterations to an ae energy of -6497.452 eV",
        ];
        let value = atomic_energy_below(&lines, 0, EnergyTerm::ExcitedAllElectron)
            .expect("energy should parse");
        assert_eq!(value, -6497.452);
    }

    #[test]
    fn missing_energy_line_is_reported_with_marker_position() {
        let lines = ["   Atomic calculation performed for Al: 1s1", ""];
        let error = atomic_energy_below(&lines, 0, EnergyTerm::ExcitedAllElectron)
            .expect_err("truncated log should fail");
        assert_eq!(error.placeholder(), "INPUT.CASTEP_TRUNCATED");
        assert!(error.message().contains("line 1"));
    }

    #[test]
    fn non_numeric_energy_token_is_rejected() {
        let lines = ["Pseudo atomic calculation performed for Al 3s2 3p1", "", "did not converge"];
        let error = atomic_energy_below(&lines, 0, EnergyTerm::GroundPseudo)
            .expect_err("non-numeric value should fail");
        assert_eq!(error.placeholder(), "INPUT.CASTEP_NUMBER");
        assert!(error.message().contains("E_gs_val"));
        assert!(error.message().contains("line 3"));
    }

    #[test]
    fn cell_energy_is_the_first_token_after_equals() {
        let value = cell_energy_on_line(
            "NB est. 0K energy (E-0.5TS)      =  -138440.3291553     eV",
            10,
        )
        .expect("cell energy should parse");
        assert_eq!(value, -138440.3291553);
    }
}
