//! Core math and geometry primitives for `roofline-rs`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec2`, `Pt3`, ...),
//! - the aerial camera model (pinhole + radial distortion) with iterative
//!   ground projection against a terrain model,
//! - shared geometry primitives: viewing planes, 2D line equations,
//!   skew-line closest points, polygon operations,
//! - arena-backed identifiers and a disjoint-set union used by the
//!   connected-component passes,
//! - the error taxonomy shared by all reconstruction stages.
//!
//! Reconstruction pipeline:
//! `image rings -> ground rings -> edge segments -> viewing planes`
//!
//! Everything downstream (matching, plane intersection, closure) lives in
//! `roofline-linear` and `roofline-pipeline`.

/// Aerial camera model and ground projection.
pub mod camera;
/// Disjoint-set union with path compression.
pub mod dsu;
/// Error taxonomy for the reconstruction stages.
pub mod error;
/// Geometry primitives: planes, lines, polygons.
pub mod geometry;
/// Dense arena identifiers.
pub mod ids;
/// Linear algebra type aliases and helpers.
pub mod math;
/// Terrain elevation models.
pub mod terrain;
/// Data holders: footprints, edge segments, groups.
pub mod types;

pub use camera::*;
pub use dsu::DisjointSet;
pub use error::*;
pub use geometry::*;
pub use ids::*;
pub use math::*;
pub use terrain::*;
pub use types::*;
