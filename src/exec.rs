// In: src/exec.rs

//! The external command executor boundary.
//!
//! Every numerical or image operation the pipeline needs is performed by an
//! external tool (`mrconvert`, `mrmath`, `mrthreshold`, ...). This module
//! describes one such invocation as an `ExternalCommand` with explicit named
//! outputs, and hides the actual process spawning behind the `CommandRunner`
//! trait so the orchestrator can be exercised against a scripted stand-in.
//!
//! Chains that the source tooling would express as anonymous shell pipes are
//! instead issued as sequential commands, each with its own named output, so
//! that every intermediate artifact stays inspectable on disk.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::DwimaskError;

//==================================================================================
// 1. Command Description
//==================================================================================

/// A single blocking invocation of an external image-processing operation.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    /// The operation name, i.e. the executable to invoke.
    pub name: String,
    /// Textual argument list, passed through untouched.
    pub args: Vec<String>,
    /// Files the operation is expected to have written on success. A declared
    /// output that is missing after a zero exit status is treated as a
    /// failure of the command itself.
    pub outputs: Vec<PathBuf>,
}

impl ExternalCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Appends one textual argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends a path-valued argument without declaring it as an output.
    pub fn path_arg(mut self, path: impl AsRef<Path>) -> Self {
        self.args.push(path.as_ref().display().to_string());
        self
    }

    /// Appends a path-valued argument and declares it as an expected output.
    pub fn output_arg(mut self, path: impl AsRef<Path>) -> Self {
        self.args.push(path.as_ref().display().to_string());
        self.outputs.push(path.as_ref().to_path_buf());
        self
    }

    /// Appends several textual arguments at once.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl std::fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.args.join(" "))
    }
}

//==================================================================================
// 2. The Runner Seam
//==================================================================================

/// The sole gateway through which the pipeline reaches external tooling.
///
/// Implementations are synchronous and blocking: `run` returns only once the
/// operation has completed (or failed), so pipeline ordering is total.
pub trait CommandRunner {
    fn run(&self, command: &ExternalCommand) -> Result<(), DwimaskError>;
}

//==================================================================================
// 3. The Production Implementation
//==================================================================================

/// Runs commands as real child processes via `std::process::Command`.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ExternalCommand) -> Result<(), DwimaskError> {
        log::debug!("running: {}", command);

        let output = Command::new(&command.name)
            .args(&command.args)
            .output()
            .map_err(|e| {
                DwimaskError::execution(
                    &command.name,
                    format!("failed to launch: {}", e),
                )
            })?;

        if !output.status.success() {
            // Propagate the tool's own diagnostics verbatim.
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DwimaskError::execution(
                &command.name,
                format!(
                    "exit status {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            ));
        }

        // A declared output must exist after a successful run; the operation
        // is treated as atomic with respect to its outputs.
        for declared in &command.outputs {
            if !declared.exists() {
                return Err(DwimaskError::execution(
                    &command.name,
                    format!(
                        "completed without producing declared output '{}'",
                        declared.display()
                    ),
                ));
            }
        }

        Ok(())
    }
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_args_and_outputs() {
        let cmd = ExternalCommand::new("mrmath")
            .arg("input.mif")
            .arg("max")
            .output_arg("input_max.mif")
            .args(["-axis", "3"]);

        assert_eq!(cmd.name, "mrmath");
        assert_eq!(cmd.args, vec!["input.mif", "max", "input_max.mif", "-axis", "3"]);
        assert_eq!(cmd.outputs, vec![PathBuf::from("input_max.mif")]);
    }

    #[test]
    fn test_display_joins_operation_and_args() {
        let cmd = ExternalCommand::new("mrconvert")
            .arg("a.mif")
            .arg("b.nii");
        assert_eq!(cmd.to_string(), "mrconvert a.mif b.nii");
    }

    #[test]
    fn test_system_runner_reports_launch_failure() {
        let cmd = ExternalCommand::new("dwimask-test-no-such-binary").arg("x");
        let err = SystemRunner.run(&cmd).unwrap_err();
        assert!(matches!(err, DwimaskError::Execution { .. }));
    }

    #[test]
    fn test_system_runner_checks_declared_outputs() {
        // `true` exits zero but writes nothing, so the declared output check
        // must fire.
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never-written.mif");
        let cmd = ExternalCommand::new("true").output_arg(&missing);
        let err = SystemRunner.run(&cmd).unwrap_err();
        match err {
            DwimaskError::Execution { stage, detail } => {
                assert_eq!(stage, "true");
                assert!(detail.contains("declared output"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
