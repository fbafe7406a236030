//! Cross-image building association.
//!
//! Footprints from different images depicting the same physical building
//! are joined into [`BuildingGroup`]s: a uniform grid over footprint
//! bounding boxes proposes candidates, each footprint greedily picks its
//! largest-overlap counterpart per other image, and the symmetric matches
//! are merged with a disjoint-set union. The group elevation is then
//! estimated from the parallax between its footprints.

use std::collections::HashMap;

use roofline_core::{
    overlap_area, ring_bbox_xy, BuildingGroup, BuildingGroupId, BuildingId, DisjointSet,
    ElevationEstimate, ElevationMethod, Real,
};
use roofline_linear::{correlation_score, estimate_pair_height, FootprintObservation};

use crate::config::{ElevationConfig, GroupingConfig};
use crate::scene::Scene;

/// Uniform grid over footprint bounding boxes.
struct GridIndex {
    cell: Real,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl GridIndex {
    fn build(scene: &Scene, indices: &[usize], cell: Real) -> Self {
        let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for &i in indices {
            let (min_x, min_y, max_x, max_y) = ring_bbox_xy(&scene.buildings[i].ring_ground);
            for cx in (min_x / cell).floor() as i64..=(max_x / cell).floor() as i64 {
                for cy in (min_y / cell).floor() as i64..=(max_y / cell).floor() as i64 {
                    cells.entry((cx, cy)).or_default().push(i);
                }
            }
        }
        Self { cell, cells }
    }

    /// Candidates sharing at least one grid cell with `ring`'s bbox.
    fn candidates(&self, scene: &Scene, building: usize) -> Vec<usize> {
        let (min_x, min_y, max_x, max_y) = ring_bbox_xy(&scene.buildings[building].ring_ground);
        let mut found = Vec::new();
        for cx in (min_x / self.cell).floor() as i64..=(max_x / self.cell).floor() as i64 {
            for cy in (min_y / self.cell).floor() as i64..=(max_y / self.cell).floor() as i64 {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    for &c in bucket {
                        if c != building && !found.contains(&c) {
                            found.push(c);
                        }
                    }
                }
            }
        }
        found
    }
}

/// Source image of a building, or `None` for reference-database imports.
fn image_of<'a>(scene: &'a Scene, building: usize) -> Option<&'a str> {
    scene.buildings[building]
        .source
        .camera()
        .map(|id| scene.camera(id).image.as_str())
}

/// True when the two footprints are allowed to depict the same building.
fn can_pair(scene: &Scene, a: usize, b: usize) -> bool {
    match (image_of(scene, a), image_of(scene, b)) {
        (Some(img_a), Some(img_b)) => img_a != img_b,
        // A reference footprint can anchor any image, but two reference
        // footprints never merge.
        (None, None) => false,
        _ => true,
    }
}

/// Associate footprints across images and return one group per connected
/// component. Invalid footprints stay ungrouped.
pub fn group_buildings(scene: &mut Scene, config: &GroupingConfig) -> Vec<BuildingGroup> {
    let valid: Vec<usize> = (0..scene.buildings.len())
        .filter(|&i| scene.buildings[i].valid)
        .collect();
    let index = GridIndex::build(scene, &valid, config.grid_cell);

    let mut dsu = DisjointSet::new(scene.buildings.len());
    for &b1 in &valid {
        // Best counterpart per other image, by overlap area.
        let mut best: HashMap<Option<&str>, (usize, Real)> = HashMap::new();
        for b2 in index.candidates(scene, b1) {
            if !can_pair(scene, b1, b2) {
                continue;
            }
            let area = overlap_area(
                &scene.buildings[b1].ring_ground,
                &scene.buildings[b2].ring_ground,
            );
            if area <= 0.0 {
                continue;
            }
            let entry = best.entry(image_of(scene, b2)).or_insert((b2, area));
            if area > entry.1 {
                *entry = (b2, area);
            }
        }
        for &(b2, _) in best.values() {
            dsu.union(b1, b2);
        }
    }

    let components: Vec<Vec<usize>> = dsu
        .components(1)
        .into_iter()
        .filter(|c| c.iter().all(|&i| scene.buildings[i].valid))
        .collect();

    let mut groups = Vec::with_capacity(components.len());
    for (g, members) in components.into_iter().enumerate() {
        let id = BuildingGroupId::from(g);
        let buildings: Vec<BuildingId> = members.iter().map(|&i| BuildingId::from(i)).collect();
        for &i in &members {
            scene.buildings[i].group = Some(id);
        }
        groups.push(BuildingGroup::new(id, buildings));
    }
    log::info!(
        "grouped {} footprints into {} buildings",
        valid.len(),
        groups.len()
    );
    groups
}

/// Estimate a group's height above terrain from its footprint pairs.
///
/// Every cross-image pair with a correlation score under the threshold
/// votes with its similar-triangle estimate; the mean wins. Without a
/// qualifying pair, or when the mean leaves the plausible band, the
/// default height applies.
pub fn estimate_group_elevation(
    scene: &Scene,
    group: &BuildingGroup,
    config: &ElevationConfig,
) -> ElevationEstimate {
    let observations: Vec<(usize, FootprintObservation)> = group
        .buildings
        .iter()
        .filter_map(|&id| {
            let building = &scene.buildings[id.index()];
            let camera = building.source.camera()?;
            Some((
                id.index(),
                FootprintObservation {
                    apex: scene.camera(camera).apex,
                    ring_ground: building.ring_ground.clone(),
                },
            ))
        })
        .collect();

    let mut sum = 0.0;
    let mut count = 0usize;
    for i1 in 0..observations.len() {
        for i2 in i1 + 1..observations.len() {
            let (b1, obs1) = &observations[i1];
            let (b2, obs2) = &observations[i2];
            if !can_pair(scene, *b1, *b2) {
                continue;
            }
            let Ok(score) = correlation_score(obs1, obs2) else {
                continue;
            };
            if score < config.max_correlation_score {
                if let Ok(estimate) = estimate_pair_height(obs1, obs2) {
                    sum += estimate.delta_z;
                    count += 1;
                }
            }
        }
    }

    if count == 0 {
        return ElevationEstimate {
            height: config.default_height,
            method: ElevationMethod::DefaultHeight,
            supporting_pairs: 0,
        };
    }
    let mean = sum / count as Real;
    if mean < config.min_height || mean >= config.max_height {
        return ElevationEstimate {
            height: config.default_height,
            method: ElevationMethod::DefaultHeight,
            supporting_pairs: count,
        };
    }
    ElevationEstimate {
        height: mean,
        method: ElevationMethod::PairwiseTriangulation,
        supporting_pairs: count,
    }
}
