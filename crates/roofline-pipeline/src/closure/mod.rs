//! Roof-outline closure.
//!
//! The solved edge groups of one building form a graph whose links come
//! from ring adjacency on the source footprints; unsolved runs are bridged
//! by fictive edges. Closure tries four methods of decreasing fidelity on
//! each connected component: degree pruning plus direct cycle traversal,
//! bridging two loose ends, a longest-chain walk over inter-corner chunks,
//! and finally re-projecting the footprint nearest to nadir with per-edge
//! elevations. A failed component never aborts its siblings.

mod adjust;
mod chain;
mod reproject;
mod ring;
mod special;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use roofline_core::{
    ring_area_xy, BuildingGroup, ClosureMethod, EdgeSegment, MatchedEdgeGroup, Pt3, Real, Vec2,
};

use crate::config::ClosureConfig;
use crate::scene::Scene;

/// Wall-clock budget for one building group's closure, checked between
/// components, between attempts and inside the longest-chain walk.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline(Option<Instant>);

impl Deadline {
    pub fn from_budget(budget_secs: Option<Real>) -> Self {
        Self(budget_secs.map(|s| Instant::now() + Duration::from_secs_f64(s)))
    }

    pub fn unlimited() -> Self {
        Self(None)
    }

    pub fn exceeded(&self) -> bool {
        self.0.is_some_and(|t| Instant::now() > t)
    }
}

/// One edge of the closure graph, mutable copy of a solved edge group or a
/// synthesized repair.
#[derive(Debug, Clone)]
pub(crate) struct ClosureEdge {
    pub p1: Pt3,
    pub p2: Pt3,
    /// Bridges an unsolved run of a footprint ring; its endpoints are
    /// refreshed from the neighbors before ring extraction.
    pub fictive: bool,
    pub removed: bool,
    /// Corner points recorded against neighboring edges.
    pub intersections: Vec<Pt3>,
}

impl ClosureEdge {
    pub fn new(p1: Pt3, p2: Pt3) -> Self {
        Self {
            p1,
            p2,
            fictive: false,
            removed: false,
            intersections: Vec::new(),
        }
    }

    pub fn bridge(p1: Pt3, p2: Pt3) -> Self {
        Self {
            fictive: true,
            ..Self::new(p1, p2)
        }
    }

    /// Planimetric unit direction, `None` for a vertical or degenerate
    /// edge.
    pub fn dir_xy(&self) -> Option<Vec2> {
        let u = Vec2::new(self.p2.x - self.p1.x, self.p2.y - self.p1.y);
        let n = u.norm();
        (n > Real::EPSILON).then(|| u / n)
    }

    /// |dot| of the planimetric directions; 0.0 when either is undefined,
    /// so degenerate edges count as corners rather than parallels.
    pub fn dot_xy(&self, other: &ClosureEdge) -> Real {
        match (self.dir_xy(), other.dir_xy()) {
            (Some(a), Some(b)) => a.dot(&b).abs(),
            _ => 0.0,
        }
    }

    /// Elevation of the supporting line at the planimetric point `p`,
    /// linearly extrapolated beyond the endpoints.
    pub fn z_at(&self, p: Vec2) -> Real {
        let u = Vec2::new(self.p2.x - self.p1.x, self.p2.y - self.p1.y);
        let len2 = u.norm_squared();
        if len2 <= Real::EPSILON {
            return 0.5 * (self.p1.z + self.p2.z);
        }
        let t = Vec2::new(p.x - self.p1.x, p.y - self.p1.y).dot(&u) / len2;
        self.p1.z + t * (self.p2.z - self.p1.z)
    }

    /// Endpoint pairs with `other`: first the closest cross pair, then the
    /// two remaining points.
    pub fn nearest_pair(&self, other: &ClosureEdge) -> [(Pt3, Pt3); 2] {
        let (p1, p2, q1, q2) = (self.p1, self.p2, other.p1, other.p2);
        let d11 = (p1 - q1).norm();
        let d12 = (p1 - q2).norm();
        let d21 = (p2 - q1).norm();
        let d22 = (p2 - q2).norm();
        let min = d11.min(d12).min(d21).min(d22);
        if min == d11 {
            [(p1, q1), (p2, q2)]
        } else if min == d12 {
            [(p1, q2), (p2, q1)]
        } else if min == d21 {
            [(p2, q1), (p1, q2)]
        } else {
            [(p2, q2), (p1, q1)]
        }
    }

    /// Record a corner, deduplicated within 0.1 m against rounding noise.
    pub fn add_intersection(&mut self, point: Pt3) {
        const EPSILON: Real = 0.1;
        if self
            .intersections
            .iter()
            .all(|i| (i - point).norm() >= EPSILON)
        {
            self.intersections.push(point);
        }
    }
}

/// Closure graph: edges plus a symmetric adjacency list.
#[derive(Debug, Clone, Default)]
pub(crate) struct Workspace {
    pub edges: Vec<ClosureEdge>,
    pub links: Vec<Vec<usize>>,
}

impl Workspace {
    pub fn push(&mut self, edge: ClosureEdge) -> usize {
        self.edges.push(edge);
        self.links.push(Vec::new());
        self.edges.len() - 1
    }

    pub fn link(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        if !self.links[a].contains(&b) {
            self.links[a].push(b);
        }
        if !self.links[b].contains(&a) {
            self.links[b].push(a);
        }
    }

    /// Replace `i`'s neighbor set, keeping the adjacency symmetric.
    pub fn set_links(&mut self, i: usize, neighbors: &[usize]) {
        for &old in &std::mem::take(&mut self.links[i]) {
            self.links[old].retain(|&n| n != i);
        }
        for &n in neighbors {
            self.link(i, n);
        }
    }

    pub fn active(&self) -> Vec<usize> {
        (0..self.edges.len())
            .filter(|&i| !self.edges[i].removed)
            .collect()
    }

    pub fn active_neighbors(&self, i: usize) -> Vec<usize> {
        self.links[i]
            .iter()
            .copied()
            .filter(|&n| !self.edges[n].removed)
            .collect()
    }

    pub fn degree(&self, i: usize) -> usize {
        self.active_neighbors(i).len()
    }

    pub fn reset_removed(&mut self) {
        for edge in &mut self.edges {
            edge.removed = false;
        }
    }

    /// Remove edges with fewer than two live neighbors until the graph is
    /// stable, bounded by `rounds` sweeps.
    pub fn prune(&mut self, rounds: usize) {
        for _ in 0..rounds {
            let doomed: Vec<usize> = self
                .active()
                .into_iter()
                .filter(|&i| self.degree(i) < 2)
                .collect();
            if doomed.is_empty() {
                break;
            }
            for i in doomed {
                self.edges[i].removed = true;
            }
        }
    }

    /// Set every live fictive edge's endpoints to the closest endpoint
    /// pair of its two neighbors; fictives without exactly two neighbors
    /// are removed.
    pub fn refresh_fictive_endpoints(&mut self) {
        let updates: Vec<(usize, Option<(Pt3, Pt3)>)> = self
            .active()
            .into_iter()
            .filter(|&i| self.edges[i].fictive)
            .map(|i| {
                let neighbors = self.active_neighbors(i);
                let span = match neighbors.as_slice() {
                    &[a, b] => {
                        let [(p, q), _] = self.edges[a].nearest_pair(&self.edges[b]);
                        Some((p, q))
                    }
                    _ => None,
                };
                (i, span)
            })
            .collect();
        for (i, span) in updates {
            match span {
                Some((p, q)) => {
                    self.edges[i].p1 = p;
                    self.edges[i].p2 = q;
                }
                None => self.edges[i].removed = true,
            }
        }
    }

    /// Remove a fictive edge when another live edge already joins the same
    /// two neighbors.
    pub fn drop_duplicate_fictives(&mut self) {
        for i in 0..self.edges.len() {
            if self.edges[i].removed || !self.edges[i].fictive {
                continue;
            }
            let neighbors = self.active_neighbors(i);
            let [v1, v2] = match neighbors.as_slice() {
                &[v1, v2] => [v1, v2],
                _ => continue,
            };
            let duplicated = self.active().into_iter().any(|s| {
                s != i && {
                    let ns = self.active_neighbors(s);
                    ns.contains(&v1) && ns.contains(&v2)
                }
            });
            if duplicated {
                self.edges[i].removed = true;
            }
        }
    }

    pub fn all_degree_two(&self) -> bool {
        self.active().into_iter().all(|i| self.degree(i) == 2)
    }

    /// Split the live graph into connected components, each an independent
    /// sub-workspace.
    pub fn components(&self) -> Vec<Workspace> {
        let mut seen = vec![false; self.edges.len()];
        let mut parts = Vec::new();
        for start in self.active() {
            if seen[start] {
                continue;
            }
            let mut members = Vec::new();
            let mut stack = vec![start];
            seen[start] = true;
            while let Some(i) = stack.pop() {
                members.push(i);
                for n in self.active_neighbors(i) {
                    if !seen[n] {
                        seen[n] = true;
                        stack.push(n);
                    }
                }
            }
            members.sort_unstable();
            let rank: HashMap<usize, usize> = members
                .iter()
                .enumerate()
                .map(|(r, &i)| (i, r))
                .collect();
            let mut part = Workspace::default();
            for &i in &members {
                part.push(self.edges[i].clone());
            }
            for &i in &members {
                for n in self.active_neighbors(i) {
                    part.link(rank[&i], rank[&n]);
                }
            }
            parts.push(part);
        }
        parts
    }
}

/// Build the closure graph of one building group.
///
/// Every valid solved edge group becomes one edge. For each footprint
/// ring, consecutive distinct solved edges are linked, and each maximal
/// run of unsolved segments between two different solved edges gets a
/// fictive bridge placed on the run's ground span.
pub(crate) fn build_workspace(
    segments: &[EdgeSegment],
    edge_groups: &[MatchedEdgeGroup],
) -> Workspace {
    let mut ws = Workspace::default();
    let mut seg_edge: Vec<Option<usize>> = vec![None; segments.len()];
    for group in edge_groups {
        if group.removed {
            continue;
        }
        let (Some(p1), Some(p2)) = (group.p1, group.p2) else {
            continue;
        };
        let e = ws.push(ClosureEdge::new(p1, p2));
        for &sid in &group.segments {
            seg_edge[sid.index()] = Some(e);
        }
    }

    // Arena order within one building is ring order.
    let mut rings: HashMap<u32, Vec<usize>> = HashMap::new();
    for (i, segment) in segments.iter().enumerate() {
        rings.entry(segment.building.0).or_default().push(i);
    }
    let mut ordered: Vec<&Vec<usize>> = rings.values().collect();
    ordered.sort_by_key(|r| r.first().copied());
    for ring in ordered {
        wire_ring(&mut ws, segments, &seg_edge, ring);
    }
    ws
}

/// Link one footprint ring's solved edges and bridge its unsolved runs.
fn wire_ring(
    ws: &mut Workspace,
    segments: &[EdgeSegment],
    seg_edge: &[Option<usize>],
    ring: &[usize],
) {
    // Collapse the cyclic sequence: consecutive segments of the same edge
    // group merge, as do consecutive unsolved segments. Entries keep one
    // representative segment for the gap geometry.
    let mut entries: Vec<(Option<usize>, usize)> = Vec::new();
    for &s in ring {
        let e = seg_edge[s];
        if entries.last().map(|&(last, _)| last) == Some(e) {
            continue;
        }
        entries.push((e, s));
    }
    while entries.len() > 1 && entries.first().map(|e| e.0) == entries.last().map(|e| e.0) {
        entries.pop();
    }
    if entries.iter().all(|(e, _)| e.is_none()) {
        return;
    }

    let n = entries.len();
    for i in 0..n {
        let (here, gap_segment) = entries[i];
        let (next, _) = entries[(i + 1) % n];
        match (here, next) {
            (Some(a), Some(b)) => ws.link(a, b),
            (None, _) => {
                let prev = entries[(i + n - 1) % n].0;
                let (Some(a), Some(b)) = (prev, next) else {
                    continue;
                };
                if a == b {
                    continue;
                }
                let anchor = &segments[gap_segment];
                let bridge = ws.push(ClosureEdge::bridge(
                    anchor.world_line[0],
                    anchor.world_line[1],
                ));
                ws.link(a, bridge);
                ws.link(bridge, b);
            }
            _ => {}
        }
    }
}

/// Result of closing one building group.
#[derive(Debug, Clone, Default)]
pub struct ClosureOutcome {
    /// Closed rings in world coordinates, open form (no repeated last
    /// vertex); possibly several for multi-component buildings.
    pub rings: Vec<Vec<Pt3>>,
    /// Crudest method that produced a ring, `None` when every attempt
    /// failed.
    pub method: Option<ClosureMethod>,
}

/// Close one building group's roof outline.
///
/// Each connected component of the edge graph is closed independently;
/// when no component yields a coherent ring, the footprint re-projection
/// fallback produces one from the image geometry alone.
pub fn close_group(
    scene: &Scene,
    group: &BuildingGroup,
    segments: &[EdgeSegment],
    edge_groups: &[MatchedEdgeGroup],
    config: &ClosureConfig,
) -> ClosureOutcome {
    let deadline = Deadline::from_budget(config.group_deadline_secs);

    let mut outcome = ClosureOutcome::default();
    for mut component in build_workspace(segments, edge_groups).components() {
        if deadline.exceeded() {
            log::warn!(
                "building group {}: closure budget exhausted, falling back",
                group.id.0
            );
            break;
        }
        special::repair(&mut component, config);
        if let Some((ring, method)) = close_component(&component, config, &deadline) {
            outcome.rings.push(ring);
            outcome.method = outcome.method.max(Some(method));
        }
    }

    if outcome.rings.is_empty()
        || undersized(&outcome.rings, footprint_area(scene, group), config.min_area_ratio)
    {
        if let Some(ring) = reproject::footprint_ring(scene, group, segments) {
            outcome.rings = vec![ring];
            outcome.method = Some(ClosureMethod::Reprojection);
        } else if outcome.rings.is_empty() {
            log::info!("building group {}: no closed outline", group.id.0);
        }
    }
    outcome
}

/// Mean ground area of the group's valid image-sourced footprints.
fn footprint_area(scene: &Scene, group: &BuildingGroup) -> Real {
    let areas: Vec<Real> = group
        .buildings
        .iter()
        .map(|&id| &scene.buildings[id.index()])
        .filter(|b| b.valid && b.source.is_image_sourced())
        .map(|b| b.ground_area())
        .collect();
    if areas.is_empty() {
        return 0.0;
    }
    areas.iter().sum::<Real>() / areas.len() as Real
}

/// True when the closed outlines cover too little of the observed
/// footprint to be trusted.
fn undersized(rings: &[Vec<Pt3>], reference_area: Real, min_ratio: Real) -> bool {
    if reference_area <= 0.0 {
        return false;
    }
    let closed: Real = rings.iter().map(|r| ring_area_xy(r)).sum();
    closed < min_ratio * reference_area
}

/// The first three closure attempts on one connected component.
fn close_component(
    component: &Workspace,
    config: &ClosureConfig,
    deadline: &Deadline,
) -> Option<(Vec<Pt3>, ClosureMethod)> {
    if deadline.exceeded() {
        return None;
    }
    let mut ws = component.clone();
    if let Some(ring) = attempt_cycle(&mut ws, config) {
        return Some((ring, ClosureMethod::Photogrammetric));
    }

    // The bridge attempt reuses the pruned state: loose ends only exist
    // relative to what the first attempt kept.
    if deadline.exceeded() {
        return None;
    }
    if bridge_loose_ends(&mut ws) {
        if let Some(ring) = attempt_cycle(&mut ws, config) {
            return Some((ring, ClosureMethod::Bridging));
        }
    }

    if deadline.exceeded() {
        return None;
    }
    ws.reset_removed();
    chain::longest_chain_ring(&mut ws, config, deadline)
        .map(|ring| (ring, ClosureMethod::LongestChain))
}

/// Prune, refresh fictives, snap endpoints to corners, then walk the cycle
/// and intersect consecutive edges into corner vertices.
fn attempt_cycle(ws: &mut Workspace, config: &ClosureConfig) -> Option<Vec<Pt3>> {
    ws.prune(config.prune_rounds);
    ws.refresh_fictive_endpoints();
    ws.drop_duplicate_fictives();
    ws.prune(config.prune_rounds);
    adjust::snap_to_corners(ws, config);
    ws.prune(config.prune_rounds);

    if !ws.all_degree_two() {
        return None;
    }
    let cycle = ring::ordered_cycle(ws)?;
    let corners = ring::corner_ring(ws, &cycle, config);
    ring::validate_ring(corners, config.max_corner_gap)
}

/// Revive the graph, drop under-connected fictives and bridge the two
/// loose ends if there are exactly two. Returns false when the
/// configuration does not apply.
fn bridge_loose_ends(ws: &mut Workspace) -> bool {
    ws.reset_removed();
    for i in 0..ws.edges.len() {
        if ws.edges[i].fictive && ws.degree(i) < 2 {
            ws.edges[i].removed = true;
        }
    }
    let loose: Vec<usize> = ws
        .active()
        .into_iter()
        .filter(|&i| ws.degree(i) == 1)
        .collect();
    let [s0, s1] = match loose.as_slice() {
        &[s0, s1] => [s0, s1],
        _ => return false,
    };

    // The free endpoint of a loose edge is the one away from its only
    // surviving neighbor.
    let free_endpoint = |ws: &Workspace, i: usize| {
        let v = ws.active_neighbors(i)[0];
        let [_, (far, _)] = ws.edges[i].nearest_pair(&ws.edges[v]);
        far
    };
    let p = free_endpoint(ws, s0);
    let q = free_endpoint(ws, s1);
    let g = ws.push(ClosureEdge::new(p, q));
    ws.link(s0, g);
    ws.link(s1, g);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    pub(super) fn edge(p1: (Real, Real, Real), p2: (Real, Real, Real)) -> ClosureEdge {
        ClosureEdge::new(
            Pt3::new(p1.0, p1.1, p1.2),
            Pt3::new(p2.0, p2.1, p2.2),
        )
    }

    /// Rectangle [0,20]x[0,10] at z=12 as four closure edges in a cycle.
    pub(super) fn rectangle_workspace() -> Workspace {
        let mut ws = Workspace::default();
        let a = ws.push(edge((0.0, 0.0, 12.0), (20.0, 0.0, 12.0)));
        let b = ws.push(edge((20.0, 0.0, 12.0), (20.0, 10.0, 12.0)));
        let c = ws.push(edge((20.0, 10.0, 12.0), (0.0, 10.0, 12.0)));
        let d = ws.push(edge((0.0, 10.0, 12.0), (0.0, 0.0, 12.0)));
        ws.link(a, b);
        ws.link(b, c);
        ws.link(c, d);
        ws.link(d, a);
        ws
    }

    #[test]
    fn prune_removes_dangling_chains() {
        let mut ws = rectangle_workspace();
        let tail = ws.push(edge((0.0, 0.0, 12.0), (-5.0, -5.0, 12.0)));
        ws.link(3, tail);
        ws.prune(15);
        assert!(ws.edges[tail].removed);
        assert_eq!(ws.active().len(), 4);
    }

    #[test]
    fn prune_cascades_through_chains() {
        let mut ws = rectangle_workspace();
        let t1 = ws.push(edge((0.0, 0.0, 12.0), (-5.0, 0.0, 12.0)));
        let t2 = ws.push(edge((-5.0, 0.0, 12.0), (-10.0, 0.0, 12.0)));
        ws.link(3, t1);
        ws.link(t1, t2);
        ws.prune(15);
        assert!(ws.edges[t1].removed && ws.edges[t2].removed);
    }

    #[test]
    fn fictive_endpoints_snap_to_neighbor_gap() {
        let mut ws = Workspace::default();
        let a = ws.push(edge((0.0, 0.0, 10.0), (20.0, 0.0, 10.0)));
        let b = ws.push(edge((20.0, 10.0, 10.0), (0.0, 10.0, 10.0)));
        let f = ws.push(ClosureEdge::bridge(
            Pt3::new(25.0, 3.0, 0.0),
            Pt3::new(25.0, 7.0, 0.0),
        ));
        ws.link(a, f);
        ws.link(f, b);
        ws.refresh_fictive_endpoints();
        // Closest endpoint pair of a and b spans x = 20 or x = 0; the two
        // candidates tie, so only the gap width is fixed.
        let span = (ws.edges[f].p1 - ws.edges[f].p2).norm();
        assert_relative_eq!(span, 10.0, epsilon = 1e-9);
        assert_relative_eq!(ws.edges[f].p1.x, ws.edges[f].p2.x, epsilon = 1e-9);
    }

    #[test]
    fn duplicate_fictive_is_dropped() {
        let mut ws = Workspace::default();
        let a = ws.push(edge((0.0, 0.0, 10.0), (20.0, 0.0, 10.0)));
        let b = ws.push(edge((20.0, 10.0, 10.0), (0.0, 10.0, 10.0)));
        let f1 = ws.push(ClosureEdge::bridge(
            Pt3::new(20.0, 0.0, 10.0),
            Pt3::new(20.0, 10.0, 10.0),
        ));
        let f2 = ws.push(ClosureEdge::bridge(
            Pt3::new(20.0, 0.0, 10.0),
            Pt3::new(20.0, 10.0, 10.0),
        ));
        ws.link(a, f1);
        ws.link(f1, b);
        ws.link(a, f2);
        ws.link(f2, b);
        ws.drop_duplicate_fictives();
        let survivors = [f1, f2]
            .iter()
            .filter(|&&f| !ws.edges[f].removed)
            .count();
        assert_eq!(survivors, 1);
    }

    #[test]
    fn components_split_disjoint_cycles() {
        let mut ws = rectangle_workspace();
        let a = ws.push(edge((100.0, 0.0, 5.0), (120.0, 0.0, 5.0)));
        let b = ws.push(edge((120.0, 0.0, 5.0), (110.0, 15.0, 5.0)));
        let c = ws.push(edge((110.0, 15.0, 5.0), (100.0, 0.0, 5.0)));
        ws.link(a, b);
        ws.link(b, c);
        ws.link(c, a);
        let parts = ws.components();
        assert_eq!(parts.len(), 2);
        let mut sizes: Vec<usize> = parts.iter().map(|p| p.edges.len()).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![3, 4]);
    }

    #[test]
    fn perfect_rectangle_closes_photogrammetrically() {
        let ws = rectangle_workspace();
        let (ring, method) =
            close_component(&ws, &ClosureConfig::default(), &Deadline::unlimited()).unwrap();
        assert_eq!(method, ClosureMethod::Photogrammetric);
        assert_eq!(ring.len(), 4);
        for corner in &ring {
            assert_relative_eq!(corner.z, 12.0, epsilon = 1e-9);
            assert!(corner.x.abs() < 1e-9 || (corner.x - 20.0).abs() < 1e-9);
            assert!(corner.y.abs() < 1e-9 || (corner.y - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn loose_ends_are_bridged() {
        // Rectangle missing one side: a (bottom), b (right), c (top).
        let mut ws = Workspace::default();
        let a = ws.push(edge((0.0, 0.0, 12.0), (20.0, 0.0, 12.0)));
        let b = ws.push(edge((20.0, 0.0, 12.0), (20.0, 10.0, 12.0)));
        let c = ws.push(edge((20.0, 10.0, 12.0), (0.0, 10.0, 12.0)));
        let d = ws.push(edge((-2.0, 10.0, 12.0), (-2.0, 5.0, 12.0)));
        ws.link(a, b);
        ws.link(b, c);
        ws.link(c, d);
        let (ring, method) =
            close_component(&ws, &ClosureConfig::default(), &Deadline::unlimited()).unwrap();
        assert_eq!(method, ClosureMethod::Bridging);
        assert!(ring.len() >= 4);
    }

    #[test]
    fn tiny_closed_area_triggers_the_fallback_gate() {
        let sliver = vec![vec![
            Pt3::new(0.0, 0.0, 12.0),
            Pt3::new(3.0, 0.0, 12.0),
            Pt3::new(3.0, 2.0, 12.0),
            Pt3::new(0.0, 2.0, 12.0),
        ]];
        // 6 m2 closed against a 200 m2 footprint.
        assert!(undersized(&sliver, 200.0, 0.2));
        assert!(!undersized(&sliver, 25.0, 0.2));
        // Without an observed footprint the gate never fires.
        assert!(!undersized(&sliver, 0.0, 0.2));
    }

    #[test]
    fn empty_workspace_yields_nothing() {
        let ws = Workspace::default();
        assert!(close_component(&ws, &ClosureConfig::default(), &Deadline::unlimited()).is_none());
    }

    #[test]
    fn expired_deadline_stops_the_attempts() {
        let ws = rectangle_workspace();
        let deadline = Deadline::from_budget(Some(0.0));
        std::thread::sleep(Duration::from_millis(2));
        assert!(deadline.exceeded());
        assert!(close_component(&ws, &ClosureConfig::default(), &deadline).is_none());
    }
}
