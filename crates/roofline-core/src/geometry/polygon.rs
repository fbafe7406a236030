use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;

use crate::math::{Pt2, Pt3, Real, Vec2};

/// Signed shoelace area of a closed ring (no repeated last vertex).
fn shoelace(path: &[[Real; 2]]) -> Real {
    let n = path.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..n {
        let [x1, y1] = path[i];
        let [x2, y2] = path[(i + 1) % n];
        acc += x1 * y2 - x2 * y1;
    }
    0.5 * acc
}

fn ring_to_path(ring: &[Pt3]) -> Vec<[Real; 2]> {
    ring.iter().map(|p| [p.x, p.y]).collect()
}

/// Planimetric area of a ground ring.
pub fn ring_area_xy(ring: &[Pt3]) -> Real {
    shoelace(&ring_to_path(ring)).abs()
}

/// Planimetric bounding box `(min_x, min_y, max_x, max_y)`.
pub fn ring_bbox_xy(ring: &[Pt3]) -> (Real, Real, Real, Real) {
    let mut bbox = (Real::MAX, Real::MAX, Real::MIN, Real::MIN);
    for p in ring {
        bbox.0 = bbox.0.min(p.x);
        bbox.1 = bbox.1.min(p.y);
        bbox.2 = bbox.2.max(p.x);
        bbox.3 = bbox.3.max(p.y);
    }
    bbox
}

/// Vertex centroid with the mean vertex elevation as z.
pub fn ring_centroid(ring: &[Pt3]) -> Pt3 {
    let n = ring.len().max(1) as Real;
    let mut c = Pt3::origin();
    for p in ring {
        c.x += p.x;
        c.y += p.y;
        c.z += p.z;
    }
    Pt3::new(c.x / n, c.y / n, c.z / n)
}

/// Planimetric overlap area of two ground rings.
pub fn overlap_area(a: &[Pt3], b: &[Pt3]) -> Real {
    if a.len() < 3 || b.len() < 3 {
        return 0.0;
    }
    let subject = vec![ring_to_path(a)];
    let clip = vec![ring_to_path(b)];
    let shapes = subject.overlay(&clip, OverlayRule::Intersect, FillRule::EvenOdd);

    let mut area = 0.0;
    for shape in &shapes {
        for (i, contour) in shape.iter().enumerate() {
            let signed = shoelace(contour).abs();
            // First contour is the outer boundary, the rest are holes.
            if i == 0 {
                area += signed;
            } else {
                area -= signed;
            }
        }
    }
    area.max(0.0)
}

/// Intersection-over-union of two ground rings.
pub fn ring_iou(a: &[Pt3], b: &[Pt3]) -> Real {
    let inter = overlap_area(a, b);
    let union = ring_area_xy(a) + ring_area_xy(b) - inter;
    if union <= 0.0 {
        0.0
    } else {
        inter / union
    }
}

/// True when no two non-adjacent ring edges cross.
pub fn ring_is_simple_xy(ring: &[Pt3]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let seg = |i: usize| (ring[i], ring[(i + 1) % n]);
    for i in 0..n {
        for j in (i + 1)..n {
            // Skip adjacent edges (they share a vertex).
            if j == i || (j + 1) % n == i || (i + 1) % n == j {
                continue;
            }
            let (a1, a2) = seg(i);
            let (b1, b2) = seg(j);
            if segments_cross(&a1, &a2, &b1, &b2) {
                return false;
            }
        }
    }
    true
}

fn orient(a: &Pt3, b: &Pt3, c: &Pt3) -> Real {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn segments_cross(a1: &Pt3, a2: &Pt3, b1: &Pt3, b2: &Pt3) -> bool {
    let d1 = orient(b1, b2, a1);
    let d2 = orient(b1, b2, a2);
    let d3 = orient(a1, a2, b1);
    let d4 = orient(a1, a2, b2);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Merge near-colinear consecutive edges of an image-space ring so that one
/// polygon edge corresponds to one physical wall.
///
/// A vertex survives only when the unit directions of its incident edges
/// have a dot product at most `dot_threshold` (cyclic, so the seam between
/// the last and first edge is checked too). Returns `None` when fewer than
/// 4 vertices remain: such a footprint cannot describe a building outline.
pub fn smooth_ring(ring: &[Pt2], dot_threshold: Real) -> Option<Vec<Pt2>> {
    let n = ring.len();
    if n < 3 {
        return None;
    }
    let dir = |from: &Pt2, to: &Pt2| -> Option<Vec2> {
        let u = Vec2::new(to.x - from.x, to.y - from.y);
        let norm = u.norm();
        (norm > Real::EPSILON).then(|| u / norm)
    };

    let mut kept = Vec::with_capacity(n);
    for i in 0..n {
        let prev = &ring[(i + n - 1) % n];
        let cur = &ring[i];
        let next = &ring[(i + 1) % n];
        match (dir(prev, cur), dir(cur, next)) {
            (Some(u1), Some(u2)) => {
                if u1.dot(&u2) <= dot_threshold {
                    kept.push(*cur);
                }
            }
            // Zero-length edge: drop the duplicated vertex.
            _ => {}
        }
    }

    (kept.len() >= 4).then_some(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(x0: Real, y0: Real, side: Real) -> Vec<Pt3> {
        vec![
            Pt3::new(x0, y0, 0.0),
            Pt3::new(x0 + side, y0, 0.0),
            Pt3::new(x0 + side, y0 + side, 0.0),
            Pt3::new(x0, y0 + side, 0.0),
        ]
    }

    #[test]
    fn square_area_and_centroid() {
        let ring = square(0.0, 0.0, 10.0);
        assert_relative_eq!(ring_area_xy(&ring), 100.0);
        let c = ring_centroid(&ring);
        assert_relative_eq!(c.x, 5.0);
        assert_relative_eq!(c.y, 5.0);
    }

    #[test]
    fn half_overlapping_squares() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(5.0, 0.0, 10.0);
        assert_relative_eq!(overlap_area(&a, &b), 50.0, epsilon = 1e-6);
        assert_relative_eq!(ring_iou(&a, &b), 50.0 / 150.0, epsilon = 1e-6);
    }

    #[test]
    fn disjoint_squares_have_zero_iou() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(100.0, 100.0, 10.0);
        assert_relative_eq!(ring_iou(&a, &b), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn bowtie_is_not_simple() {
        let bowtie = vec![
            Pt3::new(0.0, 0.0, 0.0),
            Pt3::new(10.0, 10.0, 0.0),
            Pt3::new(10.0, 0.0, 0.0),
            Pt3::new(0.0, 10.0, 0.0),
        ];
        assert!(!ring_is_simple_xy(&bowtie));
        assert!(ring_is_simple_xy(&square(0.0, 0.0, 10.0)));
    }

    #[test]
    fn smoothing_removes_colinear_vertex() {
        let ring = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(5.0, 0.0), // colinear with neighbors
            Pt2::new(10.0, 0.0),
            Pt2::new(10.0, 10.0),
            Pt2::new(0.0, 10.0),
        ];
        let smoothed = smooth_ring(&ring, 0.99).unwrap();
        assert_eq!(smoothed.len(), 4);
        assert!(!smoothed.contains(&Pt2::new(5.0, 0.0)));
    }

    #[test]
    fn degenerate_footprint_rejected() {
        // A sliver that collapses to fewer than 4 corners.
        let ring = vec![Pt2::new(0.0, 0.0), Pt2::new(5.0, 0.0), Pt2::new(10.0, 0.0)];
        assert!(smooth_ring(&ring, 0.99).is_none());
    }
}
