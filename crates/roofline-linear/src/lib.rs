//! Closed-form solvers for `roofline-rs`.
//!
//! This crate contains the linear estimation steps of the reconstruction:
//! - [`solve_edge_line`]: weighted least-squares intersection of viewing
//!   planes with studentized-residual outlier rejection,
//! - [`segment_endpoints`]: finite endpoints of a solved roof-edge line
//!   from the contributing apex rays,
//! - [`estimate_pair_height`]: similar-triangle building height from two
//!   camera apexes and the two ground centroids.
//!
//! All functions are pure over a single group's data and can run in
//! parallel across groups.

mod elevation;
mod endpoints;
mod plane_intersection;

pub use elevation::{correlation_score, estimate_pair_height, FootprintObservation, HeightEstimate};
pub use endpoints::{segment_endpoints, EndpointResult};
pub use plane_intersection::{solve_edge_line, EdgeObservation, LineSolveResult, SolveOptions};
