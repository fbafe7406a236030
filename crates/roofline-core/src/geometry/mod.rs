//! Shared geometry primitives.
//!
//! Viewing planes through a camera apex, implicit 2D lines for the
//! matcher's distance tests, closest points between skew 3D lines, and
//! polygon operations on footprint rings.

mod line2;
mod line3;
mod plane;
mod polygon;

pub use line2::ImplicitLine2;
pub use line3::Line3;
pub use plane::ViewingPlane;
pub use polygon::{
    overlap_area, ring_area_xy, ring_bbox_xy, ring_centroid, ring_iou, ring_is_simple_xy,
    smooth_ring,
};
