//! Footprint re-projection fallback.
//!
//! When no closure attempt yields a coherent ring, the building still gets
//! an outline from pure image geometry: the footprint observed closest to
//! nadir is re-projected onto the terrain, each vertex raised by the best
//! elevation available for its two incident edges (the edge's own solved
//! height, then its ring neighbors', then the group mean).

use roofline_core::{distance_2d, ring_centroid, BuildingGroup, EdgeSegment, Pt3, Real};

use crate::scene::Scene;

/// Elevation hint of one edge segment.
fn segment_hint(segments: &[EdgeSegment], index: usize, group_mean: Real) -> Real {
    let segment = &segments[index];
    if let Some(h) = segment.solved_height {
        return h;
    }
    let prev = segments[segment.ring_prev.index()].solved_height;
    let next = segments[segment.ring_next.index()].solved_height;
    match (prev, next) {
        (Some(a), Some(b)) => 0.5 * (a + b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => group_mean,
    }
}

/// Re-project the group's nearest-to-nadir footprint with per-vertex
/// elevation hints. `None` when the group has no usable image footprint
/// or a vertex ray misses the terrain.
pub(super) fn footprint_ring(
    scene: &Scene,
    group: &BuildingGroup,
    segments: &[EdgeSegment],
) -> Option<Vec<Pt3>> {
    let mut best: Option<(usize, Real)> = None;
    for &bid in &group.buildings {
        let building = &scene.buildings[bid.index()];
        let Some(camera) = building.source.camera() else {
            continue;
        };
        if !building.valid || building.ring_ground.is_empty() {
            continue;
        }
        let centroid = ring_centroid(&building.ring_ground);
        let off_nadir = distance_2d(&scene.camera(camera).apex, &centroid);
        if best.is_none_or(|(_, d)| off_nadir < d) {
            best = Some((bid.index(), off_nadir));
        }
    }
    let (chosen, _) = best?;
    let building = &scene.buildings[chosen];
    let camera = scene.camera(building.source.camera()?);

    // Arena order within one building is ring order: vertex i joins the
    // edges i-1 and i.
    let ring_segments: Vec<usize> = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| s.building.index() == chosen)
        .map(|(i, _)| i)
        .collect();
    let n = building.ring_image.len();
    let mean = group.elevation.height;

    let mut ring = Vec::with_capacity(n);
    for i in 0..n {
        let hint = if ring_segments.len() == n {
            0.5 * (segment_hint(segments, ring_segments[(i + n - 1) % n], mean)
                + segment_hint(segments, ring_segments[i], mean))
        } else {
            mean
        };
        match camera.image_to_world(&building.ring_image[i], scene.terrain.as_ref(), hint) {
            Ok(p) => ring.push(p),
            Err(err) => {
                log::debug!(
                    "building group {}: re-projection failed at vertex {i}: {err}",
                    group.id.0
                );
                return None;
            }
        }
    }
    (ring.len() >= 3).then_some(ring)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconstructionConfig;
    use crate::grouping::group_buildings;
    use crate::matching::build_segments;
    use crate::scene::{FootprintInput, Scene, SceneInput, TerrainInput};
    use approx::assert_relative_eq;
    use roofline_core::{CameraModel, ElevationEstimate, ElevationMethod, Pt2, Vec2};

    /// Two nadir cameras observing a 20 x 10 roof at 12 m.
    fn roof_scene() -> (Scene, Vec<BuildingGroup>) {
        let cameras = vec![
            CameraModel::nadir(
                "img_1",
                Pt3::new(10.0, 5.0, 1000.0),
                10_000.0,
                Vec2::new(5000.0, 5000.0),
            ),
            CameraModel::nadir(
                "img_2",
                Pt3::new(800.0, 5.0, 1000.0),
                10_000.0,
                Vec2::new(5000.0, 5000.0),
            ),
        ];
        let corners = [
            Pt3::new(0.0, 0.0, 12.0),
            Pt3::new(20.0, 0.0, 12.0),
            Pt3::new(20.0, 10.0, 12.0),
            Pt3::new(0.0, 10.0, 12.0),
        ];
        let footprints = cameras
            .iter()
            .enumerate()
            .map(|(c, camera)| FootprintInput {
                camera: c,
                ring_image: corners
                    .iter()
                    .map(|p| {
                        let px: Pt2 = camera.world_to_image(p).unwrap();
                        [px.x, px.y]
                    })
                    .collect(),
            })
            .collect();
        let input = SceneInput {
            cameras,
            terrain: TerrainInput::default(),
            footprints,
            reference_footprints: Vec::new(),
        };
        let config = ReconstructionConfig::default();
        let mut scene = Scene::from_input(input, &config).unwrap();
        let groups = group_buildings(&mut scene, &config.grouping);
        (scene, groups)
    }

    #[test]
    fn solved_heights_recover_the_roof() {
        let (scene, mut groups) = roof_scene();
        assert_eq!(groups.len(), 1);
        let group = &mut groups[0];
        group.elevation = ElevationEstimate {
            height: 12.0,
            method: ElevationMethod::PairwiseTriangulation,
            supporting_pairs: 1,
        };
        let mut segments = build_segments(&scene, group);
        for segment in &mut segments {
            segment.solved_height = Some(12.0);
        }

        let ring = footprint_ring(&scene, group, &segments).unwrap();
        assert_eq!(ring.len(), 4);
        // The nadir-most image is img_1; with the right hint the corners
        // come back exactly.
        assert_relative_eq!(ring[0].x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(ring[0].y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(ring[0].z, 12.0, epsilon = 1e-6);
        assert_relative_eq!(ring[2].x, 20.0, epsilon = 1e-6);
        assert_relative_eq!(ring[2].y, 10.0, epsilon = 1e-6);
    }

    #[test]
    fn unsolved_edges_borrow_the_group_mean() {
        let (scene, mut groups) = roof_scene();
        let group = &mut groups[0];
        group.elevation.height = 12.0;
        let segments = build_segments(&scene, group);

        let ring = footprint_ring(&scene, group, &segments).unwrap();
        assert_eq!(ring.len(), 4);
        assert_relative_eq!(ring[0].z, 12.0, epsilon = 1e-6);
        assert_relative_eq!(ring[0].x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn reference_only_group_has_no_fallback() {
        let (scene, _) = roof_scene();
        let group = BuildingGroup::new(roofline_core::BuildingGroupId(0), Vec::new());
        assert!(footprint_ring(&scene, &group, &[]).is_none());
    }
}
