//! Reconstruction pipeline for `roofline-rs`.
//!
//! This crate orchestrates multi-view roof reconstruction over one aerial
//! survey:
//! - [`scene`]: deserialized survey input to working arenas,
//! - [`grouping`]: cross-image footprint association and parallax-based
//!   elevation estimation,
//! - [`matching`]: two-pass clustering of ring edges into cross-image
//!   edge groups,
//! - [`solving`]: per-edge-group viewing-plane intersection, endpoints
//!   and validity gates,
//! - [`closure`]: roof-outline closure with its fallback ladder,
//! - [`pipeline`] and [`report`]: the end-to-end driver and its JSON
//!   output.
//!
//! Building groups are independent after the elevation stage and are
//! processed in parallel.

pub mod closure;
pub mod config;
pub mod grouping;
pub mod matching;
pub mod pipeline;
pub mod report;
pub mod scene;
pub mod solving;

pub use closure::{close_group, ClosureOutcome};
pub use config::ReconstructionConfig;
pub use grouping::{estimate_group_elevation, group_buildings};
pub use matching::{build_segments, match_segments};
pub use pipeline::reconstruct;
pub use report::{EdgeRecord, GroupRecord, ReconstructionReport, ReportSummary};
pub use scene::{FootprintInput, ReferenceFootprintInput, Scene, SceneInput, TerrainInput};
pub use solving::solve_edge_groups;
