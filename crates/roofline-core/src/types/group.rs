use serde::{Deserialize, Serialize};

use crate::geometry::Line3;
use crate::ids::{BuildingGroupId, BuildingId, EdgeGroupId, SegmentId};
use crate::math::{Pt3, Real, Vec2, Vec3};

/// How a building group's roof outline was finally closed.
///
/// Variants are ordered from the most to the least trustworthy method, so
/// `max` over a group's components yields the crudest fallback used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClosureMethod {
    /// Attempt 1: pruning plus direct cycle closure.
    Photogrammetric,
    /// Attempt 2: two loose ends bridged, then closed.
    Bridging,
    /// Attempt 3: longest-chain heuristic walk.
    LongestChain,
    /// Attempt 4: nearest-to-nadir footprint re-projected with per-edge
    /// elevations.
    Reprojection,
}

/// How a building group's elevation was estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElevationMethod {
    /// Mean of pairwise similar-triangle estimates over well-correlated
    /// image pairs.
    PairwiseTriangulation,
    /// No qualifying pair; the 10 m default was applied.
    DefaultHeight,
}

/// Group elevation with its provenance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ElevationEstimate {
    /// Height above terrain, meters.
    pub height: Real,
    pub method: ElevationMethod,
    /// Number of image pairs supporting the estimate.
    pub supporting_pairs: usize,
}

impl Default for ElevationEstimate {
    fn default() -> Self {
        Self {
            height: 10.0,
            method: ElevationMethod::DefaultHeight,
            supporting_pairs: 0,
        }
    }
}

/// Corner produced by intersecting two adjacent edge groups, tagged with
/// the neighbor that produced it.
#[derive(Debug, Clone, Copy)]
pub struct CornerIntersection {
    pub point: Pt3,
    pub with: EdgeGroupId,
}

/// Connected component of per-image footprints depicting one physical
/// building.
#[derive(Debug, Clone)]
pub struct BuildingGroup {
    pub id: BuildingGroupId,
    pub buildings: Vec<BuildingId>,
    pub elevation: ElevationEstimate,
    pub edge_groups: Vec<EdgeGroupId>,
    /// Closed rings in world coordinates; possibly several per building.
    pub rings: Vec<Vec<Pt3>>,
    pub closure: Option<ClosureMethod>,
}

impl BuildingGroup {
    pub fn new(id: BuildingGroupId, buildings: Vec<BuildingId>) -> Self {
        Self {
            id,
            buildings,
            elevation: ElevationEstimate::default(),
            edge_groups: Vec::new(),
            rings: Vec::new(),
            closure: None,
        }
    }
}

/// Cluster of cross-image edge segments depicting one physical roof edge,
/// with its solved 3D line.
#[derive(Debug, Clone)]
pub struct MatchedEdgeGroup {
    pub id: EdgeGroupId,
    pub building_group: BuildingGroupId,
    pub segments: Vec<SegmentId>,
    /// Solved line `X0 + λ·u` with the `dx = 1` convention.
    pub line: Option<Line3>,
    pub p1: Option<Pt3>,
    pub p2: Option<Pt3>,
    /// Mean absolute least-squares residual.
    pub mean_residual: Real,
    /// Mean apex-ray to solved-line distance.
    pub d_mean: Real,
    pub length: Real,
    /// Planimetric unit direction of the solved segment.
    pub dir_xy: Option<Vec2>,
    pub neighbors: Vec<EdgeGroupId>,
    pub intersections: Vec<CornerIntersection>,
    pub removed: bool,
    /// Synthesized by a closure repair rather than solved from planes.
    pub synthetic: bool,
}

impl MatchedEdgeGroup {
    pub fn new(id: EdgeGroupId, building_group: BuildingGroupId, segments: Vec<SegmentId>) -> Self {
        Self {
            id,
            building_group,
            segments,
            line: None,
            p1: None,
            p2: None,
            mean_residual: 0.0,
            d_mean: 0.0,
            length: 0.0,
            dir_xy: None,
            neighbors: Vec::new(),
            intersections: Vec::new(),
            removed: false,
            synthetic: false,
        }
    }

    /// Synthetic repair edge between two known endpoints.
    pub fn from_endpoints(id: EdgeGroupId, building_group: BuildingGroupId, p1: Pt3, p2: Pt3) -> Self {
        let mut group = Self::new(id, building_group, Vec::new());
        group.synthetic = true;
        group.set_endpoints(p1, p2);
        group
    }

    pub fn is_valid(&self) -> bool {
        !self.removed
    }

    /// Set the endpoints and refresh every derived quantity.
    pub fn set_endpoints(&mut self, p1: Pt3, p2: Pt3) {
        let u = p2 - p1;
        self.length = u.norm();
        if self.length > Real::EPSILON {
            self.line = Some(Line3::new(p1, u / self.length));
        }
        let u_xy = Vec2::new(u.x, u.y);
        let n_xy = u_xy.norm();
        self.dir_xy = (n_xy > Real::EPSILON).then(|| u_xy / n_xy);
        self.p1 = Some(p1);
        self.p2 = Some(p2);
    }

    /// |dot| of the planimetric directions; 0.0 when either is undefined.
    pub fn dot_xy(&self, other: &MatchedEdgeGroup) -> Real {
        match (self.dir_xy, other.dir_xy) {
            (Some(a), Some(b)) => a.dot(&b).abs(),
            _ => 0.0,
        }
    }

    /// Elevation of the solved line at abscissa `x`.
    pub fn elevation_at_x(&self, x: Real) -> Option<Real> {
        let (p1, p2) = (self.p1?, self.p2?);
        let dx = p2.x - p1.x;
        if dx.abs() <= Real::EPSILON {
            return Some(0.5 * (p1.z + p2.z));
        }
        Some(p1.z + (x - p1.x) * (p2.z - p1.z) / dx)
    }

    /// Pair up endpoints with `other` by proximity: first the closest
    /// cross pair, then the two remaining points.
    pub fn nearest_endpoint_pairs(&self, other: &MatchedEdgeGroup) -> Option<[(Pt3, Pt3); 2]> {
        let (p1, p2) = (self.p1?, self.p2?);
        let (q1, q2) = (other.p1?, other.p2?);
        let d11 = (p1 - q1).norm();
        let d12 = (p1 - q2).norm();
        let d21 = (p2 - q1).norm();
        let d22 = (p2 - q2).norm();
        let min = d11.min(d12).min(d21).min(d22);
        if min == d11 {
            Some([(p1, q1), (p2, q2)])
        } else if min == d12 {
            Some([(p1, q2), (p2, q1)])
        } else if min == d21 {
            Some([(p2, q1), (p1, q2)])
        } else {
            Some([(p2, q2), (p1, q1)])
        }
    }

    /// Record a corner, deduplicated within 0.1 m against rounding noise.
    pub fn add_intersection(&mut self, point: Pt3, with: EdgeGroupId) {
        const EPSILON: Real = 0.1;
        if self
            .intersections
            .iter()
            .any(|i| (i.point - point).norm() < EPSILON)
        {
            return;
        }
        self.intersections.push(CornerIntersection { point, with });
    }

    /// Direction for the solver's sanity checks; `None` before solving.
    pub fn direction(&self) -> Option<Vec3> {
        self.line.map(|l| l.dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn group_between(p1: Pt3, p2: Pt3) -> MatchedEdgeGroup {
        MatchedEdgeGroup::from_endpoints(EdgeGroupId(0), BuildingGroupId(0), p1, p2)
    }

    #[test]
    fn derived_quantities_from_endpoints() {
        let g = group_between(Pt3::new(0.0, 0.0, 10.0), Pt3::new(6.0, 8.0, 10.0));
        assert_relative_eq!(g.length, 10.0);
        let dir = g.dir_xy.unwrap();
        assert_relative_eq!(dir.x, 0.6, epsilon = 1e-12);
        assert_relative_eq!(dir.y, 0.8, epsilon = 1e-12);
        assert!(g.synthetic);
    }

    #[test]
    fn elevation_interpolates_along_x() {
        let g = group_between(Pt3::new(0.0, 0.0, 10.0), Pt3::new(10.0, 0.0, 20.0));
        assert_relative_eq!(g.elevation_at_x(5.0).unwrap(), 15.0);
    }

    #[test]
    fn endpoint_pairing_picks_closest() {
        let g1 = group_between(Pt3::new(0.0, 0.0, 0.0), Pt3::new(10.0, 0.0, 0.0));
        let g2 = group_between(Pt3::new(10.5, 5.0, 0.0), Pt3::new(0.5, 5.0, 0.0));
        let [(a, b), (c, d)] = g1.nearest_endpoint_pairs(&g2).unwrap();
        // p1=(0,0) pairs with q2=(0.5,5), the rest pairs together.
        assert_relative_eq!(a.x, 0.0);
        assert_relative_eq!(b.x, 0.5);
        assert_relative_eq!(c.x, 10.0);
        assert_relative_eq!(d.x, 10.5);
    }

    #[test]
    fn intersections_deduplicated() {
        let mut g = group_between(Pt3::new(0.0, 0.0, 0.0), Pt3::new(10.0, 0.0, 0.0));
        g.add_intersection(Pt3::new(1.0, 1.0, 0.0), EdgeGroupId(1));
        g.add_intersection(Pt3::new(1.0, 1.05, 0.0), EdgeGroupId(2));
        g.add_intersection(Pt3::new(4.0, 0.0, 0.0), EdgeGroupId(3));
        assert_eq!(g.intersections.len(), 2);
    }
}
