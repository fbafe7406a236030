//! Cycle ordering and corner extraction.

use std::collections::HashSet;

use roofline_core::{ring_is_simple_xy, Pt3, Real, Vec2};

use crate::config::ClosureConfig;

use super::{ClosureEdge, Workspace};

/// Order the live edges into one continuous cycle.
///
/// Requires every live edge to have exactly two live neighbors. Returns
/// `None` when the walk revisits an edge, dead-ends, or does not return to
/// its start: the graph is then not a simple cycle.
pub(super) fn ordered_cycle(ws: &Workspace) -> Option<Vec<usize>> {
    let active = ws.active();
    if active.len() <= 1 {
        return None;
    }
    let mut remaining: HashSet<usize> = active.iter().copied().collect();
    let start = active[0];
    remaining.remove(&start);
    let mut ordered = vec![start];
    let mut prev = start;
    let mut current = *ws.active_neighbors(start).first()?;
    while !remaining.is_empty() {
        if !remaining.remove(&current) {
            return None;
        }
        ordered.push(current);
        let next = ws
            .active_neighbors(current)
            .into_iter()
            .find(|&n| n != prev)?;
        prev = current;
        current = next;
    }
    (current == start).then_some(ordered)
}

/// Planimetric intersection of the two supporting lines, robust to
/// vertical (constant-x) edges. `None` when the directions are parallel.
pub(super) fn intersect_xy(e1: &ClosureEdge, e2: &ClosureEdge) -> Option<Vec2> {
    let r = Vec2::new(e1.p2.x - e1.p1.x, e1.p2.y - e1.p1.y);
    let s = Vec2::new(e2.p2.x - e2.p1.x, e2.p2.y - e2.p1.y);
    let denom = r.x * s.y - r.y * s.x;
    if denom.abs() <= 1e-12 * r.norm().max(1.0) * s.norm().max(1.0) {
        return None;
    }
    let w = Vec2::new(e2.p1.x - e1.p1.x, e2.p1.y - e1.p1.y);
    let t = (w.x * s.y - w.y * s.x) / denom;
    Some(Vec2::new(e1.p1.x + t * r.x, e1.p1.y + t * r.y))
}

/// The 3D corner of two non-parallel edges: planimetric line intersection
/// with the mean of both edges' elevations there.
pub(super) fn corner_point(e1: &ClosureEdge, e2: &ClosureEdge) -> Option<Pt3> {
    let p = intersect_xy(e1, e2)?;
    let z = 0.5 * (e1.z_at(p) + e2.z_at(p));
    z.is_finite().then(|| Pt3::new(p.x, p.y, z))
}

/// Corner vertices of an ordered cycle.
///
/// Consecutive edges with a real corner (planimetric dot below the
/// parallel threshold) contribute their line intersection; near-parallel
/// consecutive edges mark a missing wall and contribute their two nearest
/// endpoints instead, leaving a visible gap.
pub(super) fn corner_ring(ws: &Workspace, cycle: &[usize], config: &ClosureConfig) -> Vec<Pt3> {
    let mut corners = Vec::with_capacity(cycle.len());
    for k in 0..cycle.len() {
        let e1 = &ws.edges[cycle[k]];
        let e2 = &ws.edges[cycle[(k + 1) % cycle.len()]];
        if e1.dot_xy(e2) < config.parallel_dot {
            if let Some(corner) = corner_point(e1, e2) {
                corners.push(corner);
                continue;
            }
        }
        let [(p, q), _] = e1.nearest_pair(e2);
        corners.push(p);
        corners.push(q);
    }
    corners
}

/// Final gate on an extracted ring: drop duplicate consecutive corners,
/// require at least three vertices, no corner gap above the threshold and
/// a simple planimetric polygon.
pub(super) fn validate_ring(corners: Vec<Pt3>, max_corner_gap: Real) -> Option<Vec<Pt3>> {
    const MERGE_EPSILON: Real = 1e-6;
    let mut ring: Vec<Pt3> = Vec::with_capacity(corners.len());
    for corner in corners {
        if ring.last().is_some_and(|last| (last - corner).norm() < MERGE_EPSILON) {
            continue;
        }
        ring.push(corner);
    }
    while ring.len() > 1
        && (ring[0] - ring[ring.len() - 1]).norm() < MERGE_EPSILON
    {
        ring.pop();
    }
    if ring.len() < 3 {
        return None;
    }
    let coherent = (0..ring.len())
        .all(|i| (ring[i] - ring[(i + 1) % ring.len()]).norm() <= max_corner_gap);
    if !coherent {
        log::debug!("ring rejected: corner gap above {max_corner_gap} m");
        return None;
    }
    if !ring_is_simple_xy(&ring) {
        log::debug!("ring rejected: planimetric self-intersection");
        return None;
    }
    Some(ring)
}
