// In: src/scratch.rs

//! The scratch workspace manager.
//!
//! Every pipeline invocation owns a uniquely named scratch directory; all
//! intermediate images are staged there and nothing is ever written to the
//! user-visible output path until final export. The directory is a guard
//! object: dropping it restores the previous working directory and removes
//! the tree on every exit path, unless diagnostic retention was requested.

use rand::distr::Alphanumeric;
use rand::Rng;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::MaskConfig;
use crate::error::DwimaskError;

/// Attempts made to find an unclaimed directory name before giving up.
const CREATE_ATTEMPTS: usize = 16;
/// Length of the random suffix appended to the configured prefix.
const SUFFIX_LEN: usize = 6;

/// Produces a short random alphanumeric string.
pub(crate) fn random_suffix(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

//==================================================================================
// 1. The Workspace Guard
//==================================================================================

/// A scratch directory scoped to one pipeline invocation.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    retain: bool,
    /// Working directory to restore on drop, set once `enter` has run.
    previous_dir: Option<PathBuf>,
}

impl ScratchDir {
    /// Creates a new, empty, uniquely named scratch directory under the
    /// configured root (the process working directory by default).
    pub fn create(config: &MaskConfig) -> Result<Self, DwimaskError> {
        let root = match &config.scratch_root {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };

        for _ in 0..CREATE_ATTEMPTS {
            let candidate = root.join(format!(
                "{}{}",
                config.scratch_prefix,
                random_suffix(SUFFIX_LEN)
            ));
            match fs::create_dir(&candidate) {
                Ok(()) => {
                    log::info!("created scratch directory: {}", candidate.display());
                    return Ok(Self {
                        path: candidate,
                        retain: config.retain_scratch,
                        previous_dir: None,
                    });
                }
                // Another invocation claimed this name first; roll again.
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(DwimaskError::Internal(format!(
            "could not find an unclaimed scratch directory name under '{}' \
             after {} attempts",
            root.display(),
            CREATE_ATTEMPTS
        )))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves a bare artifact name to an absolute path inside the workspace.
    pub fn path_in(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Switches the process working directory into the workspace, so that
    /// subsequent commands can refer to staged artifacts by bare name. The
    /// previous directory is restored when the guard drops.
    pub fn enter(&mut self) -> Result<(), DwimaskError> {
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(&self.path)?;
        self.previous_dir = Some(previous);
        Ok(())
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Some(previous) = self.previous_dir.take() {
            if let Err(e) = std::env::set_current_dir(&previous) {
                log::warn!(
                    "could not restore working directory '{}': {}",
                    previous.display(),
                    e
                );
            }
        }
        if self.retain {
            log::info!(
                "scratch directory retained for inspection: {}",
                self.path.display()
            );
            return;
        }
        // A failed teardown is reported but must never mask the error that
        // triggered it.
        if let Err(e) = fs::remove_dir_all(&self.path) {
            log::warn!(
                "could not remove scratch directory '{}': {}",
                self.path.display(),
                e
            );
        }
    }
}

//==================================================================================
// Test Support
//==================================================================================

/// Serializes tests that move the process working directory. The working
/// directory is process-global, so such tests cannot run concurrently.
#[cfg(test)]
pub(crate) fn cwd_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

//==================================================================================
// Unit Tests
//==================================================================================
