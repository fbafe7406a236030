//! Data holders shared by the pipeline stages.

mod building;
mod group;
mod segment;

pub use building::{Building, BuildingSource};
pub use group::{
    BuildingGroup, ClosureMethod, CornerIntersection, ElevationEstimate, ElevationMethod,
    MatchedEdgeGroup,
};
pub use segment::EdgeSegment;
