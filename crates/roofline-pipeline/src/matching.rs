//! Cross-image roof-edge matching.
//!
//! Within one building group, segments from different images depicting
//! the same physical roof edge are clustered in two passes. The coarse
//! pass matches on direction, perpendicular distance and midpoint
//! proximity; its matched pairs vote for a median planimetric translation
//! between the two footprints, which absorbs the systematic offset left
//! by a wrong elevation hint. The fine pass re-matches with the
//! translation applied and a tighter distance bound; only its links make
//! it into the final [`MatchedEdgeGroup`]s.

use std::collections::HashMap;

use roofline_core::{
    distance_2d, median, BuildingGroup, BuildingId, DisjointSet, EdgeGroupId, EdgeSegment,
    ImplicitLine2, MatchedEdgeGroup, Real, SegmentId, Vec2,
};

use crate::config::MatchingConfig;
use crate::scene::Scene;

/// Build the edge-segment arena of one building group.
///
/// Every image-sourced footprint contributes one segment per ring edge,
/// with `ring_prev`/`ring_next` wired to its cyclic neighbors. Segment
/// ids are local to the returned arena.
pub fn build_segments(scene: &Scene, group: &BuildingGroup) -> Vec<EdgeSegment> {
    let mut segments = Vec::new();
    for &building_id in &group.buildings {
        let building = &scene.buildings[building_id.index()];
        let Some(camera_id) = building.source.camera() else {
            continue;
        };
        let n = building.ring_ground.len();
        if n < 3 {
            continue;
        }
        let base = segments.len();
        for i in 0..n {
            let j = (i + 1) % n;
            segments.push(EdgeSegment {
                id: SegmentId::from(base + i),
                building: building_id,
                camera: camera_id,
                apex: scene.camera(camera_id).apex,
                image_p0: building.ring_image[i],
                image_p1: building.ring_image[j],
                world_line: [building.ring_ground[i], building.ring_ground[j]],
                plane: None,
                ring_prev: SegmentId::from(base + (i + n - 1) % n),
                ring_next: SegmentId::from(base + j),
                removed: false,
                solved_height: None,
            });
        }
    }
    segments
}

/// Candidate-side geometry of one building's segments, optionally shifted
/// by a planimetric translation.
struct CandidateArrays {
    indices: Vec<usize>,
    dirs: Vec<Vec2>,
    lines: Vec<ImplicitLine2>,
    midpoints: Vec<Vec2>,
    half_lengths: Vec<Real>,
}

impl CandidateArrays {
    fn build(segments: &[EdgeSegment], indices: &[usize], shift: Vec2) -> Self {
        let mut dirs = Vec::with_capacity(indices.len());
        let mut lines = Vec::with_capacity(indices.len());
        let mut midpoints = Vec::with_capacity(indices.len());
        let mut half_lengths = Vec::with_capacity(indices.len());
        for &i in indices {
            let s = &segments[i];
            let p0 = Vec2::new(s.world_line[0].x + shift.x, s.world_line[0].y + shift.y);
            let p1 = Vec2::new(s.world_line[1].x + shift.x, s.world_line[1].y + shift.y);
            dirs.push(s.direction_xy());
            lines.push(ImplicitLine2::from_points(p0, p1));
            midpoints.push(0.5 * (p0 + p1));
            half_lengths.push(0.5 * (p1 - p0).norm());
        }
        Self {
            indices: indices.to_vec(),
            dirs,
            lines,
            midpoints,
            half_lengths,
        }
    }

    /// The matching candidate for `segment`: aligned, close to the line,
    /// midpoints within the candidate's half length, nearest midpoint
    /// wins.
    fn find_match(
        &self,
        segment: &EdgeSegment,
        direction_dot: Real,
        line_distance: Real,
    ) -> Option<usize> {
        let dir = segment.direction_xy();
        let midpoint = segment.midpoint_xy();
        let mut best: Option<(usize, Real)> = None;
        for k in 0..self.indices.len() {
            if dir.dot(&self.dirs[k]).abs() <= direction_dot {
                continue;
            }
            if self.lines[k].distance_to(midpoint) >= line_distance {
                continue;
            }
            let d = (self.midpoints[k] - midpoint).norm();
            if d >= self.half_lengths[k] {
                continue;
            }
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((self.indices[k], d));
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Symmetric matching pass between two footprints' segments.
///
/// `offset_b` is the planimetric displacement of side B relative to side
/// A; candidates are shifted to cancel it before the distance tests.
fn matching_pass(
    segments: &[EdgeSegment],
    side_a: &[usize],
    side_b: &[usize],
    offset_b: Vec2,
    direction_dot: Real,
    line_distance: Real,
    links: &mut Vec<(usize, usize)>,
) {
    let arrays_b = CandidateArrays::build(segments, side_b, -offset_b);
    for &s in side_a {
        if let Some(m) = arrays_b.find_match(&segments[s], direction_dot, line_distance) {
            links.push((s, m));
        }
    }
    let arrays_a = CandidateArrays::build(segments, side_a, offset_b);
    for &s in side_b {
        if let Some(m) = arrays_a.find_match(&segments[s], direction_dot, line_distance) {
            links.push((s, m));
        }
    }
}

/// Median planimetric translation voted by the coarse-pass components.
///
/// Each connected component of coarse links contributes when it can be
/// reduced to one segment per image with near-equal lengths; the two
/// segments' endpoint offsets vote, and the median over all components
/// wins. Components of three or more keep their two most length-similar
/// members.
fn median_translation(
    segments: &[EdgeSegment],
    links: &[(usize, usize)],
    members: &[usize],
    length_similarity: Real,
) -> Vec2 {
    let mut local = HashMap::new();
    for (rank, &i) in members.iter().enumerate() {
        local.insert(i, rank);
    }
    let mut dsu = DisjointSet::new(members.len());
    for &(a, b) in links {
        if let (Some(&ra), Some(&rb)) = (local.get(&a), local.get(&b)) {
            dsu.union(ra, rb);
        }
    }

    let mut dxs = Vec::new();
    let mut dys = Vec::new();
    for component in dsu.components(2) {
        let mut pair: Vec<usize> = component.iter().map(|&r| members[r]).collect();
        if pair.len() >= 3 {
            let Some(best) = most_similar_cross_pair(segments, &pair, length_similarity) else {
                continue;
            };
            pair = vec![best.0, best.1];
        }
        let (g0, g1) = (&segments[pair[0]], &segments[pair[1]]);
        if (g0.length() - g1.length()).abs() >= length_similarity {
            continue;
        }
        let p0 = g0.world_line[0];
        let p1 = g0.world_line[1];
        let (q0, q1) = (g1.world_line[0], g1.world_line[1]);
        // Match extremities by proximity before differencing.
        let (q0, q1) = if distance_2d(&p0, &q0) < distance_2d(&p0, &q1) {
            (q0, q1)
        } else {
            (q1, q0)
        };
        dxs.push(q0.x - p0.x);
        dxs.push(q1.x - p1.x);
        dys.push(q0.y - p0.y);
        dys.push(q1.y - p1.y);
    }

    match (median(&dxs), median(&dys)) {
        (Some(dx), Some(dy)) => Vec2::new(dx, dy),
        _ => Vec2::zeros(),
    }
}

/// The two members from different images with the closest lengths.
fn most_similar_cross_pair(
    segments: &[EdgeSegment],
    members: &[usize],
    length_similarity: Real,
) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, Real)> = None;
    for (k, &a) in members.iter().enumerate() {
        for &b in &members[k + 1..] {
            if segments[a].camera == segments[b].camera {
                continue;
            }
            let diff = (segments[a].length() - segments[b].length()).abs();
            if diff < length_similarity && best.map_or(true, |(_, _, bd)| diff < bd) {
                best = Some((a, b, diff));
            }
        }
    }
    best.map(|(a, b, _)| (a, b))
}

/// Cluster one group's segments into matched edge groups.
pub fn match_segments(
    scene: &Scene,
    group: &BuildingGroup,
    segments: &[EdgeSegment],
    config: &MatchingConfig,
) -> Vec<MatchedEdgeGroup> {
    // Segment indices per footprint, in arena order.
    let mut by_building: HashMap<BuildingId, Vec<usize>> = HashMap::new();
    for (i, s) in segments.iter().enumerate() {
        by_building.entry(s.building).or_default().push(i);
    }

    let mut fine_links: Vec<(usize, usize)> = Vec::new();
    for (k, &b1) in group.buildings.iter().enumerate() {
        for &b2 in &group.buildings[k + 1..] {
            let (bd1, bd2) = (
                &scene.buildings[b1.index()],
                &scene.buildings[b2.index()],
            );
            let (Some(c1), Some(c2)) = (bd1.source.camera(), bd2.source.camera()) else {
                continue;
            };
            if scene.camera(c1).image == scene.camera(c2).image {
                continue;
            }
            if bd1.iou(bd2) <= config.min_pair_iou {
                continue;
            }
            let (Some(side_a), Some(side_b)) = (by_building.get(&b1), by_building.get(&b2))
            else {
                continue;
            };

            let mut coarse_links = Vec::new();
            matching_pass(
                segments,
                side_a,
                side_b,
                Vec2::zeros(),
                config.direction_dot,
                config.coarse_line_distance,
                &mut coarse_links,
            );
            let members: Vec<usize> = side_a.iter().chain(side_b.iter()).copied().collect();
            let shift =
                median_translation(segments, &coarse_links, &members, config.length_similarity);

            matching_pass(
                segments,
                side_a,
                side_b,
                shift,
                config.direction_dot,
                config.fine_line_distance,
                &mut fine_links,
            );
        }
    }

    let mut dsu = DisjointSet::new(segments.len());
    for &(a, b) in &fine_links {
        dsu.union(a, b);
    }

    let mut groups = Vec::new();
    for component in dsu.components(2) {
        let id = EdgeGroupId::from(groups.len());
        let members: Vec<SegmentId> = component.iter().map(|&i| SegmentId::from(i)).collect();
        groups.push(MatchedEdgeGroup::new(id, group.id, members));
    }
    log::debug!(
        "building group {}: {} segments -> {} edge groups",
        group.id.0,
        segments.len(),
        groups.len()
    );
    groups
}
