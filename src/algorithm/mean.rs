// In: src/algorithm/mean.rs

//! Masking based on thresholding the mean of the per-shell mean images,
//! followed by mask cleaning.

use std::path::PathBuf;

use super::{AlgorithmContext, MaskingAlgorithm};
use crate::error::DwimaskError;
use crate::exec::ExternalCommand;

#[derive(Debug)]
pub struct Mean;

impl MaskingAlgorithm for Mean {
    fn name(&self) -> &'static str {
        "mean"
    }

    fn execute(&self, ctx: &AlgorithmContext) -> Result<PathBuf, DwimaskError> {
        // One mean image per b-value shell, then averaged across shells.
        ctx.runner.run(
            &ExternalCommand::new("dwishellmath")
                .arg("input.mif")
                .arg("mean")
                .output_arg("shell_means.mif"),
        )?;
        ctx.runner.run(
            &ExternalCommand::new("mrmath")
                .arg("shell_means.mif")
                .arg("mean")
                .output_arg("shell_mean_average.mif")
                .args(["-axis", "3"]),
        )?;
        ctx.runner.run(
            &ExternalCommand::new("mrthreshold")
                .arg("shell_mean_average.mif")
                .output_arg("mean_mask_init.mif"),
        )?;
        // Keep the largest connected component and fill interior holes.
        ctx.runner.run(
            &ExternalCommand::new("maskfilter")
                .arg("mean_mask_init.mif")
                .arg("connect")
                .output_arg("mean_mask_connected.mif")
                .arg("-largest"),
        )?;
        ctx.runner.run(
            &ExternalCommand::new("maskfilter")
                .arg("mean_mask_connected.mif")
                .arg("fill")
                .output_arg("mean_mask.mif"),
        )?;
        Ok(PathBuf::from("mean_mask.mif"))
    }
}
