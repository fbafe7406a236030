//! Per-edge-group 3D solving.
//!
//! Each matched edge group lifts its segments to viewing planes and
//! intersects them into one 3D line, then delimits it with endpoints and
//! applies the validity gates. Groups that fail any step are marked
//! removed; the closure stage treats their segments like unsolved ones.

use roofline_core::{EdgeSegment, MatchedEdgeGroup, Real, SegmentId, TerrainModel};
use roofline_linear::{segment_endpoints, solve_edge_line, EdgeObservation, SolveOptions};

use crate::config::SolveConfig;

/// True when every other apex lies close to the first segment's viewing
/// plane: all images were shot from nearly the same flight axis as the
/// edge, and the intersection is numerically meaningless.
fn is_degenerate(observations: &[EdgeObservation], max_apex_distance: Real) -> bool {
    let Some(first) = observations.first() else {
        return true;
    };
    observations[1..]
        .iter()
        .all(|obs| first.plane.distance_to(&obs.apex) < max_apex_distance)
}

/// Height of a solved edge above the terrain under its midpoint.
fn height_above_terrain(
    terrain: &dyn TerrainModel,
    group: &MatchedEdgeGroup,
) -> Option<Real> {
    let (p1, p2) = (group.p1?, group.p2?);
    let x = 0.5 * (p1.x + p2.x);
    let y = 0.5 * (p1.y + p2.y);
    let z = 0.5 * (p1.z + p2.z);
    Some(z - terrain.elevation(x, y))
}

/// Solve every edge group of one building group in place.
///
/// Surviving groups carry their endpoints, residuals and planimetric
/// line; their segments get the solved height as elevation hint for the
/// re-projection fallback. `segments` is the arena the groups index into.
pub fn solve_edge_groups(
    terrain: &dyn TerrainModel,
    segments: &mut [EdgeSegment],
    edge_groups: &mut [MatchedEdgeGroup],
    config: &SolveConfig,
) {
    let options = SolveOptions {
        studentized_threshold: config.studentized_threshold,
        horizontal_weight: config.horizontal_weight,
        collocation_lambda: config.collocation_lambda,
    };

    for group in edge_groups.iter_mut() {
        for &sid in &group.segments {
            segments[sid.index()].compute_plane();
        }
        let observations: Vec<(SegmentId, EdgeObservation)> = group
            .segments
            .iter()
            .filter_map(|&sid| {
                EdgeObservation::from_segment(&segments[sid.index()]).map(|obs| (sid, obs))
            })
            .collect();

        if observations.len() < 2 {
            group.removed = true;
            continue;
        }
        let planes: Vec<EdgeObservation> =
            observations.iter().map(|(_, obs)| obs.clone()).collect();
        if is_degenerate(&planes, config.degenerate_apex_distance) {
            log::debug!(
                "edge group {}: apexes coplanar with the edge, skipping solve",
                group.id.0
            );
            group.removed = true;
            continue;
        }

        let solved = match solve_edge_line(&planes, &options) {
            Ok(solved) => solved,
            Err(err) => {
                log::debug!("edge group {}: {err:#}", group.id.0);
                group.removed = true;
                continue;
            }
        };
        let kept_obs: Vec<EdgeObservation> =
            solved.kept.iter().map(|&i| planes[i].clone()).collect();
        let endpoints = match segment_endpoints(&solved.line, &kept_obs) {
            Ok(endpoints) => endpoints,
            Err(err) => {
                log::debug!("edge group {}: {err:#}", group.id.0);
                group.removed = true;
                continue;
            }
        };

        group.segments = solved.kept.iter().map(|&i| observations[i].0).collect();
        group.mean_residual = solved.mean_residual;
        group.d_mean = endpoints.d_mean;
        group.set_endpoints(endpoints.p1, endpoints.p2);

        let height = height_above_terrain(terrain, group);
        let valid = group.segments.len() >= 2
            && group.length <= config.max_length
            && group.d_mean <= config.max_d_mean
            && height.is_some_and(|h| {
                h >= config.min_height_above_terrain && h <= config.max_height_above_terrain
            });
        if !valid {
            log::debug!(
                "edge group {}: rejected (length {:.1}, d_mean {:.2}, height {:?})",
                group.id.0,
                group.length,
                group.d_mean,
                height
            );
            group.removed = true;
            continue;
        }

        if let Some(h) = height {
            for &sid in &group.segments {
                segments[sid.index()].solved_height = Some(h);
            }
        }
    }
}
