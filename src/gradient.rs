// In: src/gradient.rs

//! Diffusion gradient table resolution.
//!
//! A DWI series is uninterpretable without its gradient table. Exactly one
//! source must be resolvable before any scratch work starts: an explicitly
//! supplied import always wins, otherwise an embedded `dw_scheme` entry in
//! the image header is used, otherwise the invocation fails fast.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::DwimaskError;
use crate::header::{ImageHeader, DW_SCHEME_KEY};

//==================================================================================
// 1. Explicit Import Options
//==================================================================================

/// An explicitly supplied gradient table, in either accepted external format.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum GradImport {
    /// A single gradient file in MRtrix format.
    Grad { path: PathBuf },
    /// An FSL-style bvecs/bvals file pair.
    FslGrad { bvecs: PathBuf, bvals: PathBuf },
}

impl GradImport {
    /// The argument list that forwards this import to the staging conversion.
    pub fn to_args(&self) -> Vec<String> {
        match self {
            GradImport::Grad { path } => {
                vec!["-grad".to_string(), path.display().to_string()]
            }
            GradImport::FslGrad { bvecs, bvals } => vec![
                "-fslgrad".to_string(),
                bvecs.display().to_string(),
                bvals.display().to_string(),
            ],
        }
    }
}

//==================================================================================
// 2. Resolution
//==================================================================================

/// Resolves the gradient table source for this invocation.
///
/// Returns the import arguments to append to the staging conversion; an empty
/// list means the table is embedded in the header and travels with the image.
pub fn resolve_gradient_import(
    explicit: Option<&GradImport>,
    header: &ImageHeader,
) -> Result<Vec<String>, DwimaskError> {
    if let Some(import) = explicit {
        return Ok(import.to_args());
    }
    if header.keyval().contains_key(DW_SCHEME_KEY) {
        return Ok(Vec::new());
    }
    Err(DwimaskError::Configuration(
        "no diffusion gradient table: supply one in the image header, \
         or via the -grad / -fslgrad option"
            .to_string(),
    ))
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn header_with_scheme() -> ImageHeader {
        ImageHeader::parse(
            "dwi.mif",
            r#"{
                "size": [96, 96, 60, 33],
                "strides": [1, 2, 3, 4],
                "keyval": { "dw_scheme": [[0,0,0,0]] }
            }"#,
        )
        .unwrap()
    }

    fn header_without_scheme() -> ImageHeader {
        ImageHeader::parse(
            "dwi.mif",
            r#"{ "size": [96, 96, 60, 33], "strides": [1, 2, 3, 4] }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_explicit_grad_wins_over_embedded_scheme() {
        let import = GradImport::Grad {
            path: PathBuf::from("grad.b"),
        };
        let args = resolve_gradient_import(Some(&import), &header_with_scheme()).unwrap();
        assert_eq!(args, vec!["-grad", "grad.b"]);
    }

    #[test]
    fn test_fslgrad_produces_paired_args() {
        let import = GradImport::FslGrad {
            bvecs: PathBuf::from("bvecs"),
            bvals: PathBuf::from("bvals"),
        };
        let args = resolve_gradient_import(Some(&import), &header_without_scheme()).unwrap();
        assert_eq!(args, vec!["-fslgrad", "bvecs", "bvals"]);
    }

    #[test]
    fn test_embedded_scheme_resolves_to_no_extra_args() {
        let args = resolve_gradient_import(None, &header_with_scheme()).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_missing_table_is_a_configuration_error() {
        let err = resolve_gradient_import(None, &header_without_scheme()).unwrap_err();
        match err {
            DwimaskError::Configuration(msg) => {
                assert!(msg.contains("no diffusion gradient table"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
