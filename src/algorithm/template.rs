// In: src/algorithm/template.rs

//! Masking by registering a template image to the mean b=0 image and pulling
//! the template's mask back through the estimated transform.
//!
//! This is the one built-in algorithm that stages auxiliary inputs: the
//! template image and its mask are copied into the workspace by `get_inputs`,
//! alongside the primary DWI staging and before the workspace context switch.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{AlgorithmContext, MaskingAlgorithm};
use crate::error::DwimaskError;
use crate::exec::ExternalCommand;

/// A template image together with its binary mask, both in template space.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TemplateSpec {
    pub image: PathBuf,
    pub mask: PathBuf,
}

#[derive(Debug)]
pub struct Template;

impl Template {
    fn spec<'a>(ctx: &AlgorithmContext<'a>) -> Result<&'a TemplateSpec, DwimaskError> {
        ctx.template.ok_or_else(|| {
            DwimaskError::Configuration(
                "the 'template' algorithm requires the -template option".to_string(),
            )
        })
    }

    fn stage(
        ctx: &AlgorithmContext,
        source: &Path,
        name: &str,
    ) -> Result<(), DwimaskError> {
        ctx.runner.run(
            &ExternalCommand::new("mrconvert")
                .path_arg(source)
                .output_arg(ctx.scratch.path_in(name)),
        )
    }
}

impl MaskingAlgorithm for Template {
    fn name(&self) -> &'static str {
        "template"
    }

    fn needs_mean_bzero(&self) -> bool {
        true
    }

    fn get_inputs(&self, ctx: &AlgorithmContext) -> Result<(), DwimaskError> {
        let spec = Self::spec(ctx)?;
        Self::stage(ctx, &spec.image, "template_image.nii")?;
        Self::stage(ctx, &spec.mask, "template_mask.nii")
    }

    fn execute(&self, ctx: &AlgorithmContext) -> Result<PathBuf, DwimaskError> {
        // get_inputs already demanded the template pair; re-check regardless
        // so execute is safe to call in isolation.
        Self::spec(ctx)?;

        ctx.runner.run(
            &ExternalCommand::new("mrregister")
                .arg("bzero.nii")
                .arg("template_image.nii")
                .args(["-type", "affine"])
                .arg("-affine")
                .output_arg("affine.txt"),
        )?;
        ctx.runner.run(
            &ExternalCommand::new("mrtransform")
                .arg("template_mask.nii")
                .output_arg("template_mask_warped.mif")
                .args(["-linear", "affine.txt"])
                .arg("-inverse")
                .args(["-interp", "nearest"]),
        )?;
        ctx.runner.run(
            &ExternalCommand::new("mrconvert")
                .arg("template_mask_warped.mif")
                .output_arg("template_mask_final.mif")
                .args(["-datatype", "bit"]),
        )?;
        Ok(PathBuf::from("template_mask_final.mif"))
    }
}
