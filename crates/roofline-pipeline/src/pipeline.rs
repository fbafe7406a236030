//! End-to-end reconstruction driver.
//!
//! Staging: scene assembly, cross-image grouping, per-group elevation and
//! footprint re-projection, then one independent worker per building group
//! running matching, solving and closure. Groups are processed in parallel;
//! a failed group degrades to an unclosed record instead of aborting the
//! run.

use anyhow::Result;
use rayon::prelude::*;

use roofline_core::BuildingGroup;

use crate::closure::close_group;
use crate::config::ReconstructionConfig;
use crate::grouping::{estimate_group_elevation, group_buildings};
use crate::matching::{build_segments, match_segments};
use crate::report::{GroupRecord, ReconstructionReport};
use crate::scene::{Scene, SceneInput};
use crate::solving::solve_edge_groups;

/// Run the full reconstruction on one survey.
pub fn reconstruct(input: SceneInput, config: &ReconstructionConfig) -> Result<ReconstructionReport> {
    let mut scene = Scene::from_input(input, config)?;
    log::info!(
        "scene: {} cameras, {} footprints",
        scene.cameras.len(),
        scene.buildings.len()
    );

    let mut groups = group_buildings(&mut scene, &config.grouping);
    for group in &mut groups {
        group.elevation = estimate_group_elevation(&scene, group, &config.elevation);
        scene.reproject_buildings(&group.buildings, group.elevation.height)?;
    }

    let scene = &scene;
    let records: Vec<GroupRecord> = groups
        .par_iter_mut()
        .map(|group| reconstruct_group(scene, group, config))
        .collect();

    let report = ReconstructionReport::assemble(scene, records);
    log::info!(
        "reconstructed {} buildings: {} photogrammetric, {} bridged, {} longest-chain, {} re-projected, {} unclosed",
        report.summary.building_groups,
        report.summary.photogrammetric,
        report.summary.bridged,
        report.summary.longest_chain,
        report.summary.reprojected,
        report.summary.unclosed,
    );
    Ok(report)
}

/// Match, solve and close one building group.
fn reconstruct_group(
    scene: &Scene,
    group: &mut BuildingGroup,
    config: &ReconstructionConfig,
) -> GroupRecord {
    let mut segments = build_segments(scene, group);
    let mut edge_groups = match_segments(scene, group, &segments, &config.matching);
    solve_edge_groups(
        scene.terrain.as_ref(),
        &mut segments,
        &mut edge_groups,
        &config.solve,
    );
    group.edge_groups = edge_groups
        .iter()
        .filter(|g| !g.removed)
        .map(|g| g.id)
        .collect();

    let outcome = close_group(scene, group, &segments, &edge_groups, &config.closure);
    group.rings = outcome.rings;
    group.closure = outcome.method;
    GroupRecord::new(scene, group, &edge_groups)
}
