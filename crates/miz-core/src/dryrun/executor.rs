use crate::domain::{MizError, MizResult};
use std::path::Path;
use std::process::Command;
use tracing::debug;

pub trait DryrunExecutor {
    /// Runs the dry run for `dryrun_seed` inside `directory`, leaving
    /// `<dryrun_seed>.castep` behind.
    fn run_dryrun(&self, directory: &Path, dryrun_seed: &str) -> MizResult<()>;
}

/// Shells out to a CASTEP binary found on `PATH` (e.g. `castep.mpi`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastepExecutor {
    binary: String,
}

impl CastepExecutor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl DryrunExecutor for CastepExecutor {
    fn run_dryrun(&self, directory: &Path, dryrun_seed: &str) -> MizResult<()> {
        let mut command = Command::new(&self.binary);
        command
            .current_dir(directory)
            .arg("--dryrun")
            .arg(dryrun_seed);
        debug!(?command, "spawning CASTEP");

        let status = command.status().map_err(|source| {
            MizError::io_system(
                "IO.CASTEP_EXEC",
                format!(
                    "CASTEP --dryrun execution failed, check '{}' is on your PATH: {}",
                    self.binary, source
                ),
            )
        })?;

        if status.success() {
            return Ok(());
        }

        let status_text = status.code().map_or_else(
            || "terminated by signal".to_string(),
            |code| format!("exit code {}", code),
        );
        Err(MizError::computation(
            "RUN.CASTEP_DRYRUN",
            format!("'{} --dryrun {}' failed with {}", self.binary, dryrun_seed, status_text),
        ))
    }
}
