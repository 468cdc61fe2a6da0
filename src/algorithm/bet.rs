// In: src/algorithm/bet.rs

//! Brain extraction via FSL's `bet` on the mean b=0 image.

use std::path::PathBuf;

use super::{AlgorithmContext, MaskingAlgorithm};
use crate::error::DwimaskError;
use crate::exec::ExternalCommand;

#[derive(Debug)]
pub struct Bet;

impl MaskingAlgorithm for Bet {
    fn name(&self) -> &'static str {
        "bet"
    }

    fn needs_mean_bzero(&self) -> bool {
        true
    }

    fn execute(&self, ctx: &AlgorithmContext) -> Result<PathBuf, DwimaskError> {
        // `bet <in> <out>` with -m writes the binary mask as <out>_mask.
        ctx.runner.run(
            &ExternalCommand::new("bet")
                .arg("bzero.nii")
                .arg("bet")
                .arg("-m")
                .arg("-R"),
        )?;
        Ok(PathBuf::from("bet_mask.nii.gz"))
    }
}
