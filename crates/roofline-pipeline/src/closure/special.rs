//! Small-building repairs.
//!
//! Buildings that survive solving with only two or three real edges are
//! usually rectangles missing one or two sides. Before the generic
//! attempts run, these configurations are completed explicitly: two
//! parallel edges get both end walls bridged, two perpendicular edges get
//! the opposite corner mirrored, and three mutually perpendicular edges
//! get their single missing side.

use roofline_core::Pt3;

use crate::config::ClosureConfig;

use super::{ClosureEdge, Workspace};

/// Complete a component with exactly two or three solved edges.
pub(super) fn repair(ws: &mut Workspace, config: &ClosureConfig) {
    let solid: Vec<usize> = ws
        .active()
        .into_iter()
        .filter(|&i| !ws.edges[i].fictive)
        .collect();
    match solid.as_slice() {
        &[a, b] => two_edge_repair(ws, a, b, config),
        &[a, b, c] => three_edge_repair(ws, [a, b, c], config),
        _ => {}
    }
}

/// Drop every fictive bridge; the repair wires the full cycle itself.
fn drop_fictives(ws: &mut Workspace) {
    for i in 0..ws.edges.len() {
        if ws.edges[i].fictive {
            ws.edges[i].removed = true;
        }
    }
}

fn two_edge_repair(ws: &mut Workspace, a: usize, b: usize, config: &ClosureConfig) {
    let dot = ws.edges[a].dot_xy(&ws.edges[b]);
    if dot >= config.parallel_dot {
        // Two parallel walls: bridge both pairs of facing endpoints.
        drop_fictives(ws);
        let [near, far] = ws.edges[a].nearest_pair(&ws.edges[b]);
        let g0 = ws.push(ClosureEdge::new(near.0, near.1));
        let g1 = ws.push(ClosureEdge::new(far.0, far.1));
        ws.set_links(a, &[g0, g1]);
        ws.set_links(b, &[g0, g1]);
    } else if dot <= config.perpendicular_dot {
        // Two perpendicular walls: mirror the missing corner and close
        // the parallelogram.
        drop_fictives(ws);
        let [near, far] = ws.edges[a].nearest_pair(&ws.edges[b]);
        let opposite = Pt3::new(
            far.0.x + far.1.x - near.1.x,
            far.0.y + far.1.y - near.1.y,
            far.0.z + far.1.z - near.1.z,
        );
        let g0 = ws.push(ClosureEdge::new(far.0, opposite));
        let g1 = ws.push(ClosureEdge::new(far.1, opposite));
        ws.set_links(a, &[g0, b]);
        ws.set_links(b, &[a, g1]);
        ws.link(g0, g1);
    }
}

fn three_edge_repair(ws: &mut Workspace, solid: [usize; 3], config: &ClosureConfig) {
    // The base edge neighbors both others and is roughly perpendicular to
    // each; the missing side joins the others' far endpoints.
    let base_of = |ws: &Workspace, base: usize, o1: usize, o2: usize| {
        let neighbors = ws.active_neighbors(base);
        neighbors.contains(&o1)
            && neighbors.contains(&o2)
            && ws.edges[base].dot_xy(&ws.edges[o1]) < config.base_dot
            && ws.edges[base].dot_xy(&ws.edges[o2]) < config.base_dot
    };
    let [a, b, c] = solid;
    let found = [(a, b, c), (b, a, c), (c, a, b)]
        .into_iter()
        .find(|&(base, o1, o2)| base_of(ws, base, o1, o2));
    let Some((base, o1, o2)) = found else {
        return;
    };

    let [_, far1] = ws.edges[base].nearest_pair(&ws.edges[o1]);
    let [_, far2] = ws.edges[base].nearest_pair(&ws.edges[o2]);
    let g0 = ws.push(ClosureEdge::new(far1.1, far2.1));
    ws.set_links(o1, &[g0, base]);
    ws.set_links(o2, &[base, g0]);
}
