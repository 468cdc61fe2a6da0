// In: src/header.rs

//! The image header reader.
//!
//! Static metadata for an on-disk image (axis sizes, per-axis strides and the
//! string-keyed key/value table) is obtained by asking the external `mrinfo`
//! operation for a JSON dump and parsing it with `serde_json`. Reading a
//! header never mutates the source image.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DwimaskError;
use crate::exec::{CommandRunner, ExternalCommand};
use crate::scratch::random_suffix;

/// Metadata key under which an embedded diffusion gradient table is stored.
pub const DW_SCHEME_KEY: &str = "dw_scheme";

//==================================================================================
// 1. Header Struct & JSON Dump Shape
//==================================================================================

/// Immutable static metadata for one image reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHeader {
    path: PathBuf,
    size: Vec<u64>,
    strides: Vec<i64>,
    keyval: Map<String, Value>,
}

/// The subset of the `mrinfo -json_all` dump the pipeline consumes.
#[derive(Debug, Deserialize)]
struct HeaderDump {
    size: Vec<u64>,
    strides: Vec<i64>,
    #[serde(default)]
    keyval: Map<String, Value>,
}

//==================================================================================
// 2. Reading & Validation
//==================================================================================

impl ImageHeader {
    /// Reads the header of the image at `path`.
    ///
    /// Fails with an I/O error if the path is unreadable, and with an
    /// execution error if the external reader rejects the image.
    pub fn read(path: impl AsRef<Path>, runner: &dyn CommandRunner) -> Result<Self, DwimaskError> {
        let path = path.as_ref();
        // Surface an unreadable path as a plain I/O error before involving
        // the external reader.
        fs::metadata(path)?;

        let dump_path =
            std::env::temp_dir().join(format!("dwimask-header-{}.json", random_suffix(6)));

        let command = ExternalCommand::new("mrinfo")
            .path_arg(path)
            .arg("-json_all")
            .output_arg(&dump_path);
        let result = runner.run(&command).and_then(|()| {
            let json = fs::read_to_string(&dump_path)?;
            Self::parse(path, &json)
        });

        // The dump is a throwaway; a failed removal is not worth failing over.
        if let Err(e) = fs::remove_file(&dump_path) {
            log::debug!("could not remove header dump '{}': {}", dump_path.display(), e);
        }
        result
    }

    /// Parses a JSON header dump. Split out from `read` so the parsing logic
    /// is testable without external tooling.
    pub fn parse(path: impl AsRef<Path>, json: &str) -> Result<Self, DwimaskError> {
        let dump: HeaderDump = serde_json::from_str(json)?;
        if dump.size.len() != dump.strides.len() {
            return Err(DwimaskError::Validation(format!(
                "image '{}' reports {} axes but {} strides",
                path.as_ref().display(),
                dump.size.len(),
                dump.strides.len()
            )));
        }
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            size: dump.size,
            strides: dump.strides,
            keyval: dump.keyval,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Per-axis voxel counts.
    pub fn size(&self) -> &[u64] {
        &self.size
    }

    /// The count of non-unity axes.
    pub fn dimensionality(&self) -> usize {
        self.size.iter().filter(|&&s| s > 1).count()
    }

    /// Signed strides of the three spatial axes.
    pub fn spatial_strides(&self) -> Result<[i64; 3], DwimaskError> {
        match self.strides[..] {
            [a, b, c, ..] => Ok([a, b, c]),
            _ => Err(DwimaskError::Validation(format!(
                "image '{}' has fewer than 3 stride entries",
                self.path.display()
            ))),
        }
    }

    /// The string-keyed metadata table.
    pub fn keyval(&self) -> &Map<String, Value> {
        &self.keyval
    }

    /// Validates that the image is usable as a DWI series: three non-unity
    /// spatial axes plus a fourth (volume) axis.
    pub fn check_dwi(&self) -> Result<(), DwimaskError> {
        if self.size.len() < 4 {
            return Err(DwimaskError::Validation(format!(
                "image '{}' does not contain a volume axis (got {} axes)",
                self.path.display(),
                self.size.len()
            )));
        }
        if self.size[..3].iter().any(|&s| s <= 1) {
            return Err(DwimaskError::Validation(format!(
                "image '{}' does not contain 3 non-unity spatial dimensions",
                self.path.display()
            )));
        }
        Ok(())
    }
}

//==================================================================================
// Unit Tests
//==================================================================================
