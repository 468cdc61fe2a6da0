//! This file is the root of the `dwimask` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`pipeline`,
//!     `algorithm`, etc.) so the Rust compiler knows they exist.
//! 2.  Exposing the crate version for the CLI.
//!
//! The library derives a binary brain mask from a diffusion-weighted MRI
//! series by sequencing external image-processing commands, with the masking
//! technique selected through a registry of interchangeable strategies. One
//! invariant holds regardless of the chosen strategy: no voxel without valid
//! diffusion signal is ever marked as masked-in.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod algorithm;
pub mod config;
pub mod error;
pub mod exec;
pub mod gradient;
pub mod header;
pub mod pipeline;
pub mod scratch;
pub mod strides;
