//! dwimask CLI — derive a binary brain mask from a DWI series.

use clap::Parser;
use std::path::PathBuf;

use dwimask::algorithm::{AlgorithmRegistry, TemplateSpec};
use dwimask::config::MaskConfig;
use dwimask::exec::SystemRunner;
use dwimask::gradient::GradImport;
use dwimask::pipeline::{run_pipeline, MaskRequest};

#[derive(Parser)]
#[command(name = "dwimask")]
#[command(about = "Derive a binary brain mask from a diffusion-weighted MRI series")]
#[command(version = dwimask::VERSION)]
struct Cli {
    /// Masking algorithm to apply (bet, mean, template, trace).
    algorithm: String,

    /// Path to the input DWI series.
    input: PathBuf,

    /// Path to write the output mask.
    output: PathBuf,

    /// Import the diffusion gradient table from an MRtrix-format file.
    #[arg(long, conflicts_with = "fslgrad")]
    grad: Option<PathBuf>,

    /// Import the diffusion gradient table from an FSL bvecs/bvals pair.
    #[arg(long, num_args = 2, value_names = ["BVECS", "BVALS"])]
    fslgrad: Option<Vec<PathBuf>>,

    /// Template image and its mask, for the 'template' algorithm.
    #[arg(long, num_args = 2, value_names = ["IMAGE", "MASK"])]
    template: Option<Vec<PathBuf>>,

    /// Overwrite the output path if it already exists.
    #[arg(long)]
    force: bool,

    /// Keep the scratch workspace on disk for inspection.
    #[arg(long)]
    nocleanup: bool,

    /// Parent directory for the scratch workspace.
    #[arg(long, value_name = "DIR")]
    scratch: Option<PathBuf>,
}

impl Cli {
    fn grad_import(&self) -> Option<GradImport> {
        if let Some(path) = &self.grad {
            return Some(GradImport::Grad { path: path.clone() });
        }
        self.fslgrad.as_ref().map(|pair| GradImport::FslGrad {
            bvecs: pair[0].clone(),
            bvals: pair[1].clone(),
        })
    }

    fn template_spec(&self) -> Option<TemplateSpec> {
        self.template.as_ref().map(|pair| TemplateSpec {
            image: pair[0].clone(),
            mask: pair[1].clone(),
        })
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = MaskConfig {
        retain_scratch: cli.nocleanup,
        force_overwrite: cli.force,
        scratch_root: cli.scratch.clone(),
        ..MaskConfig::default()
    };
    let request = MaskRequest {
        input: cli.input.clone(),
        output: cli.output.clone(),
        algorithm: cli.algorithm.clone(),
        grad: cli.grad_import(),
        template: cli.template_spec(),
    };

    let registry = AlgorithmRegistry::with_builtins();
    let runner = SystemRunner;

    if let Err(e) = run_pipeline(&request, &config, &registry, &runner) {
        eprintln!("dwimask: {}", e);
        std::process::exit(1);
    }
}
