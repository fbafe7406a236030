//! High-level entry crate for the `roofline-rs` toolbox.
//!
//! Reconstructs 3D roof outlines from building footprints detected on
//! overlapping oriented aerial images. The typical workflow is one call:
//!
//! ```no_run
//! use roofline::{reconstruct, ReconstructionConfig, SceneInput};
//!
//! # fn main() -> anyhow::Result<()> {
//! let scene: SceneInput = serde_json::from_str(&std::fs::read_to_string("scene.json")?)?;
//! let report = reconstruct(scene, &ReconstructionConfig::default())?;
//! for group in &report.groups {
//!     println!(
//!         "building {}: {} solved edges, {} rings ({:?})",
//!         group.id,
//!         group.edges.len(),
//!         group.rings.len(),
//!         group.closure
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//!
//! For custom workflows the stage functions are available individually:
//! scene assembly, grouping and elevation, segment matching, edge solving
//! and outline closure all take and return plain data, so intermediate
//! results can be inspected or replaced.
//!
//! ## Module organization
//!
//! - [`core`]: math, camera and terrain models, geometry primitives,
//! - [`linear`]: closed-form solvers (plane intersection, elevation),
//! - [`pipeline`]: the staged reconstruction and its report types.

pub use roofline_core as core;
pub use roofline_linear as linear;
pub use roofline_pipeline as pipeline;

pub use roofline_pipeline::{
    reconstruct, ReconstructionConfig, ReconstructionReport, SceneInput,
};
