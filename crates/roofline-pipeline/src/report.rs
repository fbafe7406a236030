//! Serialized reconstruction results.
//!
//! One record per building group with its solved edges and closed rings,
//! plus run-level counters. The report serializes to JSON and is the
//! pipeline's only output artifact.

use serde::{Deserialize, Serialize};

use roofline_core::{
    BuildingGroup, ClosureMethod, ElevationEstimate, MatchedEdgeGroup, Pt3, Real,
};

use crate::scene::Scene;

/// One solved roof edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: u32,
    /// Number of image segments that survived the outlier rejection.
    pub segments: usize,
    pub p1: Pt3,
    pub p2: Pt3,
    pub length: Real,
    pub mean_residual: Real,
    /// Mean apex-ray to solved-line distance, meters.
    pub d_mean: Real,
}

/// One reconstructed building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: u32,
    /// Source images of the member footprints; reference-database members
    /// report their origin string.
    pub sources: Vec<String>,
    pub elevation: ElevationEstimate,
    pub edges: Vec<EdgeRecord>,
    /// Closed roof outlines in world coordinates, open form (no repeated
    /// last vertex).
    pub rings: Vec<Vec<Pt3>>,
    pub closure: Option<ClosureMethod>,
}

impl GroupRecord {
    /// Assemble the record of one processed group. `edge_groups` is the
    /// group's full arena; removed entries are skipped.
    pub fn new(scene: &Scene, group: &BuildingGroup, edge_groups: &[MatchedEdgeGroup]) -> Self {
        let sources = group
            .buildings
            .iter()
            .map(|&id| {
                let building = &scene.buildings[id.index()];
                match building.source.camera() {
                    Some(camera) => scene.camera(camera).image.clone(),
                    None => "reference".to_string(),
                }
            })
            .collect();
        let edges = edge_groups
            .iter()
            .filter(|g| !g.removed)
            .filter_map(|g| {
                Some(EdgeRecord {
                    id: g.id.0,
                    segments: g.segments.len(),
                    p1: g.p1?,
                    p2: g.p2?,
                    length: g.length,
                    mean_residual: g.mean_residual,
                    d_mean: g.d_mean,
                })
            })
            .collect();
        Self {
            id: group.id.0,
            sources,
            elevation: group.elevation,
            edges,
            rings: group.rings.clone(),
            closure: group.closure,
        }
    }
}

/// Run-level counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub footprints: usize,
    pub valid_footprints: usize,
    pub building_groups: usize,
    pub solved_edges: usize,
    /// Groups per winning closure method.
    pub photogrammetric: usize,
    pub bridged: usize,
    pub longest_chain: usize,
    pub reprojected: usize,
    pub unclosed: usize,
}

/// Full output of one reconstruction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructionReport {
    pub summary: ReportSummary,
    pub groups: Vec<GroupRecord>,
}

impl ReconstructionReport {
    pub fn assemble(scene: &Scene, groups: Vec<GroupRecord>) -> Self {
        let mut summary = ReportSummary {
            footprints: scene.buildings.len(),
            valid_footprints: scene.buildings.iter().filter(|b| b.valid).count(),
            building_groups: groups.len(),
            ..ReportSummary::default()
        };
        for group in &groups {
            summary.solved_edges += group.edges.len();
            match group.closure {
                Some(ClosureMethod::Photogrammetric) => summary.photogrammetric += 1,
                Some(ClosureMethod::Bridging) => summary.bridged += 1,
                Some(ClosureMethod::LongestChain) => summary.longest_chain += 1,
                Some(ClosureMethod::Reprojection) => summary.reprojected += 1,
                None => summary.unclosed += 1,
            }
        }
        Self { summary, groups }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_round_trips_through_json() {
        let report = ReconstructionReport {
            summary: ReportSummary {
                footprints: 2,
                valid_footprints: 2,
                building_groups: 1,
                solved_edges: 4,
                photogrammetric: 1,
                ..ReportSummary::default()
            },
            groups: vec![GroupRecord {
                id: 0,
                sources: vec!["img_1".into(), "img_2".into()],
                elevation: ElevationEstimate::default(),
                edges: vec![EdgeRecord {
                    id: 0,
                    segments: 2,
                    p1: Pt3::new(0.0, 0.0, 12.0),
                    p2: Pt3::new(20.0, 0.0, 12.0),
                    length: 20.0,
                    mean_residual: 0.01,
                    d_mean: 0.1,
                }],
                rings: vec![vec![
                    Pt3::new(0.0, 0.0, 12.0),
                    Pt3::new(20.0, 0.0, 12.0),
                    Pt3::new(20.0, 10.0, 12.0),
                    Pt3::new(0.0, 10.0, 12.0),
                ]],
                closure: Some(ClosureMethod::Photogrammetric),
            }],
        };
        let text = serde_json::to_string_pretty(&report).unwrap();
        let back: ReconstructionReport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.groups.len(), 1);
        assert_eq!(back.groups[0].rings[0].len(), 4);
        assert_eq!(back.summary.photogrammetric, 1);
    }
}
