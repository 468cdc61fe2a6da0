// In: src/algorithm/trace.rs

//! Masking based on thresholding the product of the per-shell trace images.
//! The shell product suppresses voxels that are bright in only a subset of
//! shells (e.g. CSF at low b-values).

use std::path::PathBuf;

use super::{AlgorithmContext, MaskingAlgorithm};
use crate::error::DwimaskError;
use crate::exec::ExternalCommand;

#[derive(Debug)]
pub struct Trace;

impl MaskingAlgorithm for Trace {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn execute(&self, ctx: &AlgorithmContext) -> Result<PathBuf, DwimaskError> {
        ctx.runner.run(
            &ExternalCommand::new("dwishellmath")
                .arg("input.mif")
                .arg("mean")
                .output_arg("shell_traces.mif"),
        )?;
        ctx.runner.run(
            &ExternalCommand::new("mrmath")
                .arg("shell_traces.mif")
                .arg("product")
                .output_arg("shell_trace_product.mif")
                .args(["-axis", "3"]),
        )?;
        ctx.runner.run(
            &ExternalCommand::new("mrthreshold")
                .arg("shell_trace_product.mif")
                .output_arg("trace_mask_init.mif"),
        )?;
        ctx.runner.run(
            &ExternalCommand::new("maskfilter")
                .arg("trace_mask_init.mif")
                .arg("median")
                .output_arg("trace_mask_median.mif"),
        )?;
        ctx.runner.run(
            &ExternalCommand::new("maskfilter")
                .arg("trace_mask_median.mif")
                .arg("connect")
                .output_arg("trace_mask.mif")
                .arg("-largest"),
        )?;
        Ok(PathBuf::from("trace_mask.mif"))
    }
}
