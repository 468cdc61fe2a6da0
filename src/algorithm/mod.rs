// In: src/algorithm/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Algorithm Layer
// ====================================================================================
//
// Masking algorithms are interchangeable strategies behind a fixed contract.
// The orchestrator never inspects an algorithm's internals; it only asks:
//
//   1. [needs_mean_bzero] -> does the shared mean-b=0 synthesis step have to
//         run before `execute`?
//   2. [get_inputs]       -> stage any algorithm-specific auxiliary images
//         into the workspace (runs before the workspace context switch,
//         mirroring the staging of the primary DWI).
//   3. [execute]          -> run the algorithm-specific command sequence
//         against already-staged artifacts and return the workspace-relative
//         path of the candidate mask.
//
// New algorithms are added purely by registering another implementation of
// this contract; the orchestrator does not change. The registry is populated
// once at process startup from a fixed set of variants; there is no runtime
// reflection.
// ====================================================================================

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::DwimaskError;
use crate::exec::CommandRunner;
use crate::scratch::ScratchDir;

mod bet;
mod mean;
mod template;
mod trace;

pub use bet::Bet;
pub use mean::Mean;
pub use template::{Template, TemplateSpec};
pub use trace::Trace;

//==================================================================================
// 1. The Strategy Contract
//==================================================================================

/// Everything an algorithm may draw on while staging or executing.
pub struct AlgorithmContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub scratch: &'a ScratchDir,
    /// The original, user-supplied DWI path (not the staged copy).
    pub original_input: &'a Path,
    /// Template image/mask pair, present only when the caller supplied one.
    pub template: Option<&'a TemplateSpec>,
}

/// The capability set every masking algorithm must satisfy.
pub trait MaskingAlgorithm: std::fmt::Debug {
    /// The registry key this algorithm is selected by.
    fn name(&self) -> &'static str;

    /// Whether the shared mean-b=0 synthesis step must run before `execute`.
    fn needs_mean_bzero(&self) -> bool {
        false
    }

    /// Stages algorithm-specific auxiliary inputs into the workspace.
    /// Runs before the workspace context switch; paths must therefore be
    /// resolved through `ctx.scratch.path_in`.
    fn get_inputs(&self, _ctx: &AlgorithmContext) -> Result<(), DwimaskError> {
        Ok(())
    }

    /// Runs the algorithm using only artifacts already staged in the
    /// workspace (`input.mif`, plus `bzero.nii` if requested) and returns the
    /// workspace-relative path to its candidate mask.
    fn execute(&self, ctx: &AlgorithmContext) -> Result<PathBuf, DwimaskError>;
}

//==================================================================================
// 2. The Registry
//==================================================================================

/// Resolves a user-supplied algorithm name to a concrete strategy.
pub struct AlgorithmRegistry {
    algorithms: BTreeMap<&'static str, Box<dyn MaskingAlgorithm>>,
}

impl AlgorithmRegistry {
    /// An empty registry; mainly useful to tests.
    pub fn new() -> Self {
        Self {
            algorithms: BTreeMap::new(),
        }
    }

    /// The registry of built-in algorithms, populated at process startup.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for algorithm in [
            Box::new(Bet) as Box<dyn MaskingAlgorithm>,
            Box::new(Mean),
            Box::new(Template),
            Box::new(Trace),
        ] {
            registry
                .register(algorithm)
                .expect("built-in algorithm names are distinct");
        }
        registry
    }

    /// Registers an algorithm under its declared name. A second registration
    /// under the same name is rejected rather than silently shadowing the
    /// first.
    pub fn register(&mut self, algorithm: Box<dyn MaskingAlgorithm>) -> Result<(), DwimaskError> {
        let name = algorithm.name();
        if self.algorithms.contains_key(name) {
            return Err(DwimaskError::Configuration(format!(
                "algorithm '{}' is already registered",
                name
            )));
        }
        self.algorithms.insert(name, algorithm);
        Ok(())
    }

    /// Resolves `name` to its registered strategy.
    pub fn resolve(&self, name: &str) -> Result<&dyn MaskingAlgorithm, DwimaskError> {
        self.algorithms
            .get(name)
            .map(|boxed| boxed.as_ref())
            .ok_or_else(|| {
                DwimaskError::Configuration(format!("unknown algorithm: {}", name))
            })
    }

    /// Registered algorithm names, in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        self.algorithms.keys().copied().collect()
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Stub(&'static str);

    impl MaskingAlgorithm for Stub {
        fn name(&self) -> &'static str {
            self.0
        }
        fn execute(&self, _ctx: &AlgorithmContext) -> Result<PathBuf, DwimaskError> {
            Ok(PathBuf::from("stub_mask.mif"))
        }
    }

    #[test]
    fn test_builtins_are_registered() {
        let registry = AlgorithmRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["bet", "mean", "template", "trace"]);
    }

    #[test]
    fn test_unknown_algorithm_is_a_configuration_error() {
        let registry = AlgorithmRegistry::with_builtins();
        match registry.resolve("watershed").unwrap_err() {
            DwimaskError::Configuration(msg) => {
                assert_eq!(msg, "unknown algorithm: watershed");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = AlgorithmRegistry::new();
        registry.register(Box::new(Stub("dup"))).unwrap();
        let err = registry.register(Box::new(Stub("dup"))).unwrap_err();
        assert!(matches!(err, DwimaskError::Configuration(_)));
        // The original registration survives.
        assert!(registry.resolve("dup").is_ok());
    }

    #[test]
    fn test_mean_bzero_requirements_are_declared() {
        let registry = AlgorithmRegistry::with_builtins();
        assert!(registry.resolve("bet").unwrap().needs_mean_bzero());
        assert!(registry.resolve("template").unwrap().needs_mean_bzero());
        assert!(!registry.resolve("mean").unwrap().needs_mean_bzero());
        assert!(!registry.resolve("trace").unwrap().needs_mean_bzero());
    }
}
