//! Endpoint adjustment onto recorded corners.
//!
//! Before ring extraction, every pair of linked non-parallel edges records
//! its corner on both members. Each edge then snaps its endpoints onto its
//! corners: one corner replaces the nearest endpoint, two replace both,
//! and more than two split the edge into extra wall pieces between the
//! surplus corners.

use roofline_core::{Pt3, Real};

use crate::config::ClosureConfig;

use super::ring::corner_point;
use super::{ClosureEdge, Workspace};

/// Record the corner of every linked non-parallel pair on both edges.
pub(super) fn record_corners(ws: &mut Workspace, config: &ClosureConfig) {
    for edge in &mut ws.edges {
        edge.intersections.clear();
    }
    for i in ws.active() {
        for j in ws.active_neighbors(i) {
            if j <= i {
                continue;
            }
            if ws.edges[i].dot_xy(&ws.edges[j]) >= config.parallel_dot {
                continue;
            }
            let Some(corner) = corner_point(&ws.edges[i], &ws.edges[j]) else {
                continue;
            };
            ws.edges[i].add_intersection(corner);
            ws.edges[j].add_intersection(corner);
        }
    }
}

/// Projection of a corner along the edge, for ordering surplus corners.
fn abscissa_along(edge: &ClosureEdge, p: &Pt3) -> Real {
    let u = edge.p2 - edge.p1;
    (p - edge.p1).dot(&u)
}

/// Snap every live edge's endpoints onto its recorded corners.
pub(super) fn snap_to_corners(ws: &mut Workspace, config: &ClosureConfig) {
    record_corners(ws, config);

    let mut spawned: Vec<ClosureEdge> = Vec::new();
    for edge in ws.edges.iter_mut().filter(|e| !e.removed) {
        match edge.intersections.len() {
            0 => {}
            1 => {
                let corner = edge.intersections[0];
                if (edge.p1 - corner).norm() < (edge.p2 - corner).norm() {
                    edge.p1 = corner;
                } else {
                    edge.p2 = corner;
                }
            }
            2 => {
                let (i1, i2) = (edge.intersections[0], edge.intersections[1]);
                couple_endpoints(edge, i1, i2);
            }
            _ => {
                // Surplus corners mean the group stands for more than one
                // wall: order them along the edge, keep the first span and
                // spawn one piece per remaining consecutive pair.
                let mut sorted = edge.intersections.clone();
                sorted.sort_by(|a, b| {
                    abscissa_along(edge, a).total_cmp(&abscissa_along(edge, b))
                });
                couple_endpoints(edge, sorted[0], sorted[1]);
                for pair in sorted[1..].windows(2) {
                    spawned.push(ClosureEdge::new(pair[0], pair[1]));
                }
            }
        }
    }
    // Spawned pieces start unlinked; they only survive if a later repair
    // wires them in.
    for piece in spawned {
        ws.push(piece);
    }
}

/// Assign two corners to the edge's endpoints by nearest coupling.
fn couple_endpoints(edge: &mut ClosureEdge, i1: Pt3, i2: Pt3) {
    let direct = (edge.p1 - i1).norm() + (edge.p2 - i2).norm();
    let crossed = (edge.p1 - i2).norm() + (edge.p2 - i1).norm();
    if direct <= crossed {
        edge.p1 = i1;
        edge.p2 = i2;
    } else {
        edge.p1 = i2;
        edge.p2 = i1;
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{edge, rectangle_workspace};
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rectangle_corners_are_a_fixpoint() {
        let mut ws = rectangle_workspace();
        snap_to_corners(&mut ws, &ClosureConfig::default());
        assert_eq!(ws.edges.len(), 4);
        assert_relative_eq!(ws.edges[0].p1.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ws.edges[0].p2.x, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn overshooting_endpoint_snaps_back() {
        // The bottom edge overshoots the right wall by 3 m.
        let mut ws = Workspace::default();
        let a = ws.push(edge((0.0, 0.0, 12.0), (23.0, 0.0, 12.0)));
        let b = ws.push(edge((20.0, 0.0, 12.0), (20.0, 10.0, 12.0)));
        let c = ws.push(edge((20.0, 10.0, 12.0), (0.0, 10.0, 12.0)));
        let d = ws.push(edge((0.0, 10.0, 12.0), (0.0, 0.0, 12.0)));
        ws.link(a, b);
        ws.link(b, c);
        ws.link(c, d);
        ws.link(d, a);
        snap_to_corners(&mut ws, &ClosureConfig::default());
        assert_relative_eq!(ws.edges[a].p2.x, 20.0, epsilon = 1e-9);
        assert_relative_eq!(ws.edges[a].p2.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn single_corner_moves_nearest_endpoint() {
        let mut ws = Workspace::default();
        let a = ws.push(edge((0.0, 0.0, 12.0), (20.0, 0.0, 12.0)));
        let b = ws.push(edge((21.0, -5.0, 12.0), (21.0, 5.0, 12.0)));
        ws.link(a, b);
        snap_to_corners(&mut ws, &ClosureConfig::default());
        assert_relative_eq!(ws.edges[a].p2.x, 21.0, epsilon = 1e-9);
        assert_relative_eq!(ws.edges[a].p1.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn surplus_corners_spawn_wall_pieces() {
        // A long edge crossed by three perpendicular walls.
        let mut ws = Workspace::default();
        let long = ws.push(edge((0.0, 0.0, 12.0), (30.0, 0.0, 12.0)));
        for x in [0.0, 15.0, 30.0] {
            let wall = ws.push(edge((x, 0.0, 12.0), (x, 10.0, 12.0)));
            ws.link(long, wall);
        }
        snap_to_corners(&mut ws, &ClosureConfig::default());
        assert_eq!(ws.edges.len(), 5);
        // The original keeps the first span, the piece covers the rest.
        assert_relative_eq!(ws.edges[long].p1.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(ws.edges[long].p2.x, 15.0, epsilon = 1e-9);
        let piece = ws.edges.last().unwrap();
        assert_relative_eq!(piece.p1.x, 15.0, epsilon = 1e-9);
        assert_relative_eq!(piece.p2.x, 30.0, epsilon = 1e-9);
    }
}
