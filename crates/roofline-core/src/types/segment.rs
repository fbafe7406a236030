use crate::geometry::ViewingPlane;
use crate::ids::{BuildingId, CameraId, SegmentId};
use crate::math::{Pt2, Pt3, Real, Vec2};

/// One detected roof-edge segment on one image, lifted to its viewing
/// plane.
///
/// `ring_prev`/`ring_next` always reference the two ring-adjacent edges of
/// the same polygon on the same image; every segment has degree exactly 2
/// until closure pruning marks it removed.
#[derive(Debug, Clone)]
pub struct EdgeSegment {
    pub id: SegmentId,
    pub building: BuildingId,
    pub camera: CameraId,
    /// Camera apex, copied here so solvers need no camera lookup.
    pub apex: Pt3,
    pub image_p0: Pt2,
    pub image_p1: Pt2,
    /// Endpoints ray-projected onto the terrain.
    pub world_line: [Pt3; 2],
    /// Plane through the apex and both world endpoints.
    pub plane: Option<ViewingPlane>,
    pub ring_prev: SegmentId,
    pub ring_next: SegmentId,
    pub removed: bool,
    /// Solved edge elevation, kept for the re-projection fallback.
    pub solved_height: Option<Real>,
}

impl EdgeSegment {
    /// Planimetric unit direction of the ground-projected segment.
    pub fn direction_xy(&self) -> Vec2 {
        let u = Vec2::new(
            self.world_line[0].x - self.world_line[1].x,
            self.world_line[0].y - self.world_line[1].y,
        );
        let n = u.norm();
        if n <= Real::EPSILON {
            Vec2::zeros()
        } else {
            u / n
        }
    }

    /// Planimetric midpoint of the ground-projected segment.
    pub fn midpoint_xy(&self) -> Vec2 {
        Vec2::new(
            0.5 * (self.world_line[0].x + self.world_line[1].x),
            0.5 * (self.world_line[0].y + self.world_line[1].y),
        )
    }

    /// 3D length of the ground-projected segment.
    pub fn length(&self) -> Real {
        (self.world_line[0] - self.world_line[1]).norm()
    }

    /// Compute the viewing plane from the apex and the world endpoints.
    pub fn compute_plane(&mut self) {
        self.plane =
            ViewingPlane::from_apex_and_segment(&self.apex, &self.world_line[0], &self.world_line[1])
                .ok();
    }
}
