// In: src/pipeline/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Mask Synthesis Pipeline
// ====================================================================================
//
// One invocation is one strictly sequential pass:
//
//   1. [Resolve]   algorithm name -> strategy (fail fast, no scratch yet)
//   2. [Validate]  output path conflict, header dimensionality, gradient table
//   3. [Stage]     scratch workspace + canonicalized copy of the DWI
//   4. [Preprocess] optional mean b=0 synthesis; unconditional validity mask
//   5. [Delegate]  strategy produces a candidate mask in the workspace
//   6. [Enforce]   candidate AND validity mask -> no voxel without valid
//                  diffusion signal survives, regardless of the algorithm
//   7. [Export]    stride-normalized, bit-typed copy to the output path,
//                  metadata propagated from the original input
//
// Each stage's output is exclusively owned by the next stage's input; no two
// stages mutate the same artifact. Any failure is fatal to the invocation and
// the scratch guard releases the workspace on every exit path.
// ====================================================================================

use std::fs;
use std::path::{Path, PathBuf};

use crate::algorithm::{AlgorithmContext, AlgorithmRegistry, TemplateSpec};
use crate::config::MaskConfig;
use crate::error::DwimaskError;
use crate::exec::{CommandRunner, ExternalCommand};
use crate::gradient::{resolve_gradient_import, GradImport};
use crate::header::ImageHeader;
use crate::scratch::ScratchDir;
use crate::strides::{format_strides, normalize_strides};


//==================================================================================
// 1. Workspace Artifact Names
//==================================================================================

/// The staged, stride-canonicalized copy of the input DWI.
const STAGED_DWI: &str = "input.mif";
/// The extracted b=0 volumes, prior to averaging.
const BZERO_VOLUMES: &str = "bzero_volumes.mif";
const MEAN_BZERO: &str = "mean_bzero.mif";
/// The mean b=0 image consumed by algorithms that requested it.
const BZERO: &str = "bzero.nii";
const INPUT_MAX: &str = "input_max.mif";
/// True wherever any diffusion volume carries a strictly-positive value.
const VALIDITY_MASK: &str = "input_pos_mask.mif";
const COMBINED_MASK: &str = "combined_mask.mif";

//==================================================================================
// 2. Invocation Request
//==================================================================================

/// Everything the caller supplies for one mask derivation.
#[derive(Debug, Clone)]
pub struct MaskRequest {
    /// Path to the input DWI series.
    pub input: PathBuf,
    /// Destination for the output mask.
    pub output: PathBuf,
    /// Name of the masking algorithm to dispatch to.
    pub algorithm: String,
    /// Explicitly supplied gradient table, if any.
    pub grad: Option<GradImport>,
    /// Template image/mask pair for algorithms that need one.
    pub template: Option<TemplateSpec>,
}

//==================================================================================
// 3. The execute() Flow
//==================================================================================

/// Runs the whole mask synthesis pipeline for one request.
pub fn run_pipeline(
    request: &MaskRequest,
    config: &MaskConfig,
    registry: &AlgorithmRegistry,
    runner: &dyn CommandRunner,
) -> Result<(), DwimaskError> {
    // -- Stage 1: resolve the strategy before touching the filesystem.
    let algorithm = registry.resolve(&request.algorithm)?;

    // -- Stage 2: fail-fast validation, all before scratch creation.
    let output = absolutize(&request.output)?;
    check_output_path(&output, config)?;

    let input = fs::canonicalize(&request.input)?;
    let header = ImageHeader::read(&input, runner)?;
    header.check_dwi()?;
    let grad_args = resolve_gradient_import(request.grad.as_ref(), &header)?;

    // -- Stage 3: scratch workspace and staging.
    let mut scratch = ScratchDir::create(config)?;

    log::info!("staging DWI into scratch workspace");
    runner.run(
        &ExternalCommand::new("mrconvert")
            .path_arg(&input)
            .output_arg(scratch.path_in(STAGED_DWI))
            .args(["-strides", "0,0,0,1"])
            .args(grad_args),
    )?;

    {
        let ctx = AlgorithmContext {
            runner,
            scratch: &scratch,
            original_input: &input,
            template: request.template.as_ref(),
        };
        algorithm.get_inputs(&ctx)?;
    }

    scratch.enter()?;

    // -- Stage 4: shared pre-processing.
    if algorithm.needs_mean_bzero() {
        synthesize_mean_bzero(runner)?;
    }
    compute_validity_mask(runner)?;

    // The output mask inherits the staged DWI's spatial stride signature,
    // rebased onto consecutive small positive integers.
    let staged_header = ImageHeader::read(STAGED_DWI, runner)?;
    let strides = normalize_strides(staged_header.spatial_strides()?);

    // -- Stage 5: delegate to the strategy.
    log::info!("running masking algorithm '{}'", algorithm.name());
    let ctx = AlgorithmContext {
        runner,
        scratch: &scratch,
        original_input: &input,
        template: request.template.as_ref(),
    };
    let candidate = algorithm.execute(&ctx)?;
    if !candidate.exists() {
        return Err(DwimaskError::execution(
            algorithm.name(),
            format!(
                "algorithm did not produce its candidate mask '{}'",
                candidate.display()
            ),
        ));
    }

    // -- Stages 6 and 7: enforce the validity invariant, then export.
    compose_and_export(runner, config, &candidate, &input, &output, &strides)?;

    log::info!("output mask written to {}", output.display());
    Ok(())
}

//==================================================================================
// 4. Stage Helpers
//==================================================================================

/// Rejects an already-existing output destination unless overwrite was
/// explicitly allowed.
fn check_output_path(output: &Path, config: &MaskConfig) -> Result<(), DwimaskError> {
    if output.exists() && !config.force_overwrite {
        return Err(DwimaskError::Validation(format!(
            "output path '{}' already exists (use -force to overwrite)",
            output.display()
        )));
    }
    Ok(())
}

/// Extracts the b=0 volumes from the staged DWI, averages them along the
/// volume axis and writes `bzero.nii` with a fixed canonical stride ordering.
/// Three sequential commands with named intermediates; no anonymous pipes.
fn synthesize_mean_bzero(runner: &dyn CommandRunner) -> Result<(), DwimaskError> {
    log::info!("synthesizing mean b=0 image");
    runner.run(
        &ExternalCommand::new("dwiextract")
            .arg(STAGED_DWI)
            .output_arg(BZERO_VOLUMES)
            .arg("-bzero"),
    )?;
    runner.run(
        &ExternalCommand::new("mrmath")
            .arg(BZERO_VOLUMES)
            .arg("mean")
            .output_arg(MEAN_BZERO)
            .args(["-axis", "3"]),
    )?;
    runner.run(
        &ExternalCommand::new("mrconvert")
            .arg(MEAN_BZERO)
            .output_arg(BZERO)
            .args(["-strides", "+1,+2,+3"]),
    )
}

/// Computes the validity mask: the voxel-wise maximum across the volume axis,
/// thresholded as strictly greater than zero. Runs for every algorithm, and
/// is never mutated afterwards.
fn compute_validity_mask(runner: &dyn CommandRunner) -> Result<(), DwimaskError> {
    log::info!("computing DWI validity mask");
    runner.run(
        &ExternalCommand::new("mrmath")
            .arg(STAGED_DWI)
            .arg("max")
            .output_arg(INPUT_MAX)
            .args(["-axis", "3"]),
    )?;
    runner.run(
        &ExternalCommand::new("mrthreshold")
            .arg(INPUT_MAX)
            .output_arg(VALIDITY_MASK)
            .args(["-abs", "0"])
            .args(["-comparison", "gt"]),
    )
}

/// Intersects the candidate mask with the validity mask and exports the
/// result, bit-typed and stride-normalized, with the original input's
/// metadata propagated into the output.
fn compose_and_export(
    runner: &dyn CommandRunner,
    config: &MaskConfig,
    candidate: &Path,
    original_input: &Path,
    output: &Path,
    strides: &[i64; 3],
) -> Result<(), DwimaskError> {
    runner.run(
        &ExternalCommand::new("mrcalc")
            .path_arg(candidate)
            .arg(VALIDITY_MASK)
            .arg("-mult")
            .output_arg(COMBINED_MASK),
    )?;

    let mut export = ExternalCommand::new("mrconvert")
        .arg(COMBINED_MASK)
        .output_arg(output)
        .args(["-strides", &format_strides(strides)])
        .args(["-datatype", "bit"])
        .arg("-copy_properties")
        .path_arg(original_input);
    if config.force_overwrite {
        export = export.arg("-force");
    }
    runner.run(&export)
}

/// Resolves a user path against the current working directory, before the
/// workspace context switch makes relative paths ambiguous.
fn absolutize(path: &Path) -> Result<PathBuf, DwimaskError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
