//! Staging and execution of the ground-state CASTEP dry run that supplies
//! the all-electron ground-state atomic energy.

mod executor;

pub use executor::{CastepExecutor, DryrunExecutor};

use crate::domain::{ElementSymbol, MizError, MizResult, SeedName};
use crate::serialization::write_text_artifact;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DryrunPolicy {
    #[default]
    ReuseExisting,
    AlwaysRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryrunInputs {
    pub cell_path: PathBuf,
    pub param_path: PathBuf,
    pub stripped_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryrunOutcome {
    pub log_path: PathBuf,
    pub reused: bool,
}

/// Writes `<seed>-dryrun.cell` and `<seed>-dryrun.param`.
///
/// Lines naming the core-hole site (`<El>:`) that carry an inline `{...}`
/// pseudopotential definition are cut at the first `{`, so the dry run
/// generates the ground-state potential instead.
pub fn stage_dryrun_inputs(seed: &SeedName, element: ElementSymbol) -> MizResult<DryrunInputs> {
    let dryrun_seed = seed.dryrun();
    let source_cell = seed.cell_path();
    let cell_source = fs::read_to_string(&source_cell).map_err(|source| {
        MizError::io_system(
            "IO.CELL_READ",
            format!("{} not found or unreadable: {}", source_cell.display(), source),
        )
    })?;

    let (cell_contents, stripped_lines) = strip_site_definitions(&cell_source, element);
    let cell_path = dryrun_seed.cell_path();
    write_text_artifact(&cell_path, &cell_contents).map_err(|source| {
        MizError::io_system(
            "IO.DRYRUN_CELL_WRITE",
            format!("failed to write '{}': {}", cell_path.display(), source),
        )
    })?;

    let source_param = seed.param_path();
    let param_path = dryrun_seed.param_path();
    fs::copy(&source_param, &param_path).map_err(|source| {
        MizError::io_system(
            "IO.DRYRUN_PARAM_COPY",
            format!(
                "failed to copy '{}' to '{}': {}",
                source_param.display(),
                param_path.display(),
                source
            ),
        )
    })?;

    Ok(DryrunInputs {
        cell_path,
        param_path,
        stripped_lines,
    })
}

pub fn ensure_dryrun_log(
    seed: &SeedName,
    element: ElementSymbol,
    executor: &dyn DryrunExecutor,
    policy: DryrunPolicy,
) -> MizResult<DryrunOutcome> {
    let inputs = stage_dryrun_inputs(seed, element)?;
    info!(
        cell = %inputs.cell_path.display(),
        param = %inputs.param_path.display(),
        stripped = inputs.stripped_lines,
        "dry-run inputs staged"
    );
    let dryrun_seed = seed.dryrun();
    let log_path = dryrun_seed.castep_path();

    let reused = policy == DryrunPolicy::ReuseExisting && log_path.is_file();
    if reused {
        warn!(log = %log_path.display(), "CASTEP dry run already completed, reusing its log");
    } else {
        info!(seed = %dryrun_seed, "running CASTEP dry run");
        executor.run_dryrun(dryrun_seed.directory(), dryrun_seed.name())?;
    }

    if !log_path.is_file() {
        return Err(MizError::io_system(
            "IO.DRYRUN_LOG_MISSING",
            format!(
                "dry run finished but '{}' was not produced",
                log_path.display()
            ),
        ));
    }

    Ok(DryrunOutcome {
        log_path,
        reused,
    })
}

fn strip_site_definitions(source: &str, element: ElementSymbol) -> (String, usize) {
    let site_label = element.site_label();
    let mut stripped = 0;
    let mut contents = String::with_capacity(source.len());

    for line in source.split_inclusive('\n') {
        match line.split_once('{') {
            Some((head, _)) if line.contains(&site_label) => {
                contents.push_str(head);
                contents.push('\n');
                stripped += 1;
            }
            _ => contents.push_str(line),
        }
    }

    (contents, stripped)
}

#[cfg(test)]
mod tests {
    use super::{
        DryrunExecutor, DryrunPolicy, ensure_dryrun_log, stage_dryrun_inputs,
        strip_site_definitions,
    };
    use crate::domain::{ElementSymbol, MizError, MizErrorCategory, MizResult, SeedName};
    use std::cell::Cell;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const CELL: &str = "\
%BLOCK POSITIONS_FRAC
Al:exc 0.0 0.0 0.0
Al     0.5 0.5 0.5
%ENDBLOCK POSITIONS_FRAC

%BLOCK SPECIES_POT
Al:exc 2|2.0|5|6|7|30U:40:31:32(qc=4.5){1s1.00}
%ENDBLOCK SPECIES_POT
";

    struct RecordingExecutor {
        calls: Cell<usize>,
        log: Option<&'static str>,
    }

    impl DryrunExecutor for RecordingExecutor {
        fn run_dryrun(&self, directory: &Path, dryrun_seed: &str) -> MizResult<()> {
            self.calls.set(self.calls.get() + 1);
            if let Some(log) = self.log {
                fs::write(directory.join(format!("{dryrun_seed}.castep")), log)
                    .expect("dry-run log should be written");
            }
            Ok(())
        }
    }

    struct FailingExecutor;

    impl DryrunExecutor for FailingExecutor {
        fn run_dryrun(&self, _directory: &Path, _dryrun_seed: &str) -> MizResult<()> {
            Err(MizError::computation("RUN.CASTEP_DRYRUN", "castep exited with code 1"))
        }
    }

    fn aluminium() -> ElementSymbol {
        ElementSymbol::parse("Al").expect("Al should parse")
    }

    fn stage_seed(dir: &Path) -> SeedName {
        fs::write(dir.join("Al2O3.cell"), CELL).expect("cell should be written");
        fs::write(dir.join("Al2O3.param"), "task : spectral\n").expect("param should be written");
        SeedName::from_input(dir.join("Al2O3.castep")).expect("seed should parse")
    }

    #[test]
    fn only_site_lines_with_inline_definitions_are_stripped() {
        let (contents, stripped) = strip_site_definitions(CELL, aluminium());
        assert_eq!(stripped, 1);
        assert!(contents.contains("Al:exc 2|2.0|5|6|7|30U:40:31:32(qc=4.5)\n"));
        assert!(!contents.contains('{'));
        assert!(contents.contains("Al:exc 0.0 0.0 0.0\n"));
        assert!(contents.contains("Al     0.5 0.5 0.5\n"));
    }

    #[test]
    fn braces_on_other_species_are_preserved() {
        let (contents, stripped) =
            strip_site_definitions("O:exc 2|1.1|15{1s1.00}\n", aluminium());
        assert_eq!(stripped, 0);
        assert_eq!(contents, "O:exc 2|1.1|15{1s1.00}\n");
    }

    #[test]
    fn staging_writes_dryrun_cell_and_param() {
        let temp = TempDir::new().expect("tempdir should be created");
        let seed = stage_seed(temp.path());

        let inputs = stage_dryrun_inputs(&seed, aluminium()).expect("staging should succeed");

        assert_eq!(inputs.cell_path, temp.path().join("Al2O3-dryrun.cell"));
        assert_eq!(inputs.stripped_lines, 1);
        let param = fs::read_to_string(&inputs.param_path).expect("param copy should exist");
        assert_eq!(param, "task : spectral\n");
    }

    #[test]
    fn staging_requires_param_file() {
        let temp = TempDir::new().expect("tempdir should be created");
        fs::write(temp.path().join("Al2O3.cell"), CELL).expect("cell should be written");
        let seed = SeedName::from_input(temp.path().join("Al2O3")).expect("seed should parse");

        let error = stage_dryrun_inputs(&seed, aluminium()).expect_err("missing param should fail");
        assert_eq!(error.category(), MizErrorCategory::IoSystemError);
        assert_eq!(error.placeholder(), "IO.DRYRUN_PARAM_COPY");
    }

    #[test]
    fn staging_requires_cell_file() {
        let temp = TempDir::new().expect("tempdir should be created");
        let seed = SeedName::from_input(temp.path().join("Al2O3")).expect("seed should parse");

        let error = stage_dryrun_inputs(&seed, aluminium()).expect_err("missing cell should fail");
        assert_eq!(error.placeholder(), "IO.CELL_READ");
    }

    #[test]
    fn existing_dryrun_log_is_reused_by_default() {
        let temp = TempDir::new().expect("tempdir should be created");
        let seed = stage_seed(temp.path());
        fs::write(temp.path().join("Al2O3-dryrun.castep"), "previous run\n")
            .expect("existing log should be written");
        let executor = RecordingExecutor {
            calls: Cell::new(0),
            log: None,
        };

        let outcome = ensure_dryrun_log(&seed, aluminium(), &executor, DryrunPolicy::default())
            .expect("dry run should be reused");

        assert!(outcome.reused);
        assert_eq!(executor.calls.get(), 0);
        let staged = fs::read_to_string(temp.path().join("Al2O3-dryrun.cell"))
            .expect("inputs should be staged even when the log is reused");
        assert!(!staged.contains('{'));
    }

    #[test]
    fn always_run_policy_invokes_executor_even_with_existing_log() {
        let temp = TempDir::new().expect("tempdir should be created");
        let seed = stage_seed(temp.path());
        fs::write(temp.path().join("Al2O3-dryrun.castep"), "previous run\n")
            .expect("existing log should be written");
        let executor = RecordingExecutor {
            calls: Cell::new(0),
            log: Some("fresh run\n"),
        };

        let outcome = ensure_dryrun_log(&seed, aluminium(), &executor, DryrunPolicy::AlwaysRun)
            .expect("dry run should execute");

        assert!(!outcome.reused);
        assert_eq!(executor.calls.get(), 1);
        let log = fs::read_to_string(outcome.log_path).expect("log should exist");
        assert_eq!(log, "fresh run\n");
    }

    #[test]
    fn executor_that_writes_no_log_is_reported() {
        let temp = TempDir::new().expect("tempdir should be created");
        let seed = stage_seed(temp.path());
        let executor = RecordingExecutor {
            calls: Cell::new(0),
            log: None,
        };

        let error = ensure_dryrun_log(&seed, aluminium(), &executor, DryrunPolicy::default())
            .expect_err("missing log should fail");
        assert_eq!(error.placeholder(), "IO.DRYRUN_LOG_MISSING");
        assert_eq!(executor.calls.get(), 1);
    }

    #[test]
    fn executor_failures_propagate() {
        let temp = TempDir::new().expect("tempdir should be created");
        let seed = stage_seed(temp.path());

        let error = ensure_dryrun_log(&seed, aluminium(), &FailingExecutor, DryrunPolicy::default())
            .expect_err("executor failure should propagate");
        assert_eq!(error.category(), MizErrorCategory::ComputationError);
    }
}
