//! End-to-end reconstruction on a synthetic two-image survey.

use approx::assert_relative_eq;
use roofline_core::{CameraModel, ClosureMethod, Pt3, Real, Vec2};
use roofline_pipeline::{
    reconstruct, FootprintInput, ReconstructionConfig, ReferenceFootprintInput, SceneInput,
    TerrainInput,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Corners of a flat rectangular roof at 12 m, rotated 45 degrees off the
/// axes, open ring. The rotation keeps every edge's viewing plane well
/// away from both camera apexes and every edge direction away from the
/// `dx = 0` degeneracy of the line parameterization.
fn roof_corners() -> [Pt3; 4] {
    [
        Pt3::new(0.0, 0.0, 12.0),
        Pt3::new(14.0, 14.0, 12.0),
        Pt3::new(7.0, 21.0, 12.0),
        Pt3::new(-7.0, 7.0, 12.0),
    ]
}

/// Two nadir cameras on a north-south 500 m baseline, at 45 degrees to
/// every roof edge. Footprints are exact projections of the roof corners.
fn two_image_survey() -> SceneInput {
    let cameras = vec![
        CameraModel::nadir(
            "img_1",
            Pt3::new(10.0, -240.0, 1000.0),
            10_000.0,
            Vec2::new(5000.0, 5000.0),
        ),
        CameraModel::nadir(
            "img_2",
            Pt3::new(10.0, 260.0, 1000.0),
            10_000.0,
            Vec2::new(5000.0, 5000.0),
        ),
    ];
    let footprints = cameras
        .iter()
        .enumerate()
        .map(|(c, camera)| FootprintInput {
            camera: c,
            ring_image: roof_corners()
                .iter()
                .map(|p| {
                    let px = camera.world_to_image(p).unwrap();
                    [px.x, px.y]
                })
                .collect(),
        })
        .collect();
    SceneInput {
        cameras,
        terrain: TerrainInput::default(),
        footprints,
        reference_footprints: Vec::new(),
    }
}

#[test]
fn two_image_survey_reconstructs_the_roof() {
    init_logs();
    let report = reconstruct(two_image_survey(), &ReconstructionConfig::default()).unwrap();

    assert_eq!(report.summary.building_groups, 1);
    assert_eq!(report.summary.solved_edges, 4);
    assert_eq!(report.summary.photogrammetric, 1);

    let group = &report.groups[0];
    assert_eq!(group.closure, Some(ClosureMethod::Photogrammetric));
    // Parallax over the 500 m baseline recovers the height to first order.
    assert!((group.elevation.height - 12.0).abs() < 0.5);

    // Every solved edge sits at the true roof height.
    for edge in &group.edges {
        assert_relative_eq!(edge.p1.z, 12.0, epsilon = 1e-6);
        assert_relative_eq!(edge.p2.z, 12.0, epsilon = 1e-6);
        assert!(edge.d_mean < 1e-6);
    }

    // The closed ring lands on the true corners.
    assert_eq!(group.rings.len(), 1);
    let ring = &group.rings[0];
    assert_eq!(ring.len(), 4);
    for corner in ring {
        assert_relative_eq!(corner.z, 12.0, epsilon = 1e-6);
        assert!(roof_corners()
            .iter()
            .any(|truth| (*corner - *truth).norm() < 1e-6));
    }
}

#[test]
fn reference_footprint_joins_the_group() {
    init_logs();
    let mut scene = two_image_survey();
    scene.reference_footprints.push(ReferenceFootprintInput {
        origin: "reference".to_string(),
        ring_ground: roof_corners().map(|p| [p.x, p.y, 0.0]).to_vec(),
    });

    let report = reconstruct(scene, &ReconstructionConfig::default()).unwrap();
    assert_eq!(report.summary.building_groups, 1);

    let group = &report.groups[0];
    assert_eq!(group.sources.len(), 3);
    assert!(group.sources.iter().any(|s| s == "reference"));
    // The reference footprint contributes no segments; the outline still
    // closes photogrammetrically from the two images.
    assert_eq!(group.closure, Some(ClosureMethod::Photogrammetric));
    assert_eq!(group.rings[0].len(), 4);
}

#[test]
fn disjoint_buildings_make_separate_groups() {
    init_logs();
    let mut scene = two_image_survey();
    // A second roof 300 m east, seen on both images.
    let offset = Pt3::new(300.0, 0.0, 0.0) - Pt3::origin();
    for (c, camera) in scene.cameras.clone().iter().enumerate() {
        scene.footprints.push(FootprintInput {
            camera: c,
            ring_image: roof_corners()
                .iter()
                .map(|p| {
                    let px = camera.world_to_image(&(p + offset)).unwrap();
                    [px.x, px.y]
                })
                .collect(),
        });
    }

    let report = reconstruct(scene, &ReconstructionConfig::default()).unwrap();
    assert_eq!(report.summary.building_groups, 2);
    assert_eq!(report.summary.photogrammetric, 2);
    for group in &report.groups {
        assert_eq!(group.rings.len(), 1);
        for corner in &group.rings[0] {
            assert_relative_eq!(corner.z, 12.0, epsilon = 1e-6);
        }
    }
}

#[test]
fn reclosing_a_closed_outline_is_stable() {
    init_logs();
    let report = reconstruct(two_image_survey(), &ReconstructionConfig::default()).unwrap();
    let ring = report.groups[0].rings[0].clone();

    // Feed the closed outline back in as the detected footprints: the
    // second run must land on the same corners.
    let mut scene = two_image_survey();
    for (footprint, camera) in scene.footprints.iter_mut().zip(&scene.cameras) {
        footprint.ring_image = ring
            .iter()
            .map(|p| {
                let px = camera.world_to_image(p).unwrap();
                [px.x, px.y]
            })
            .collect();
    }
    let second = reconstruct(scene, &ReconstructionConfig::default()).unwrap();
    let again = &second.groups[0].rings[0];
    assert_eq!(again.len(), ring.len());
    for p in again {
        assert!(ring.iter().any(|q| (*p - *q).norm() < 1e-6));
    }
}

#[test]
fn flat_terrain_offset_is_carried_through() {
    init_logs();
    // Same survey over terrain at 100 m; the roof sits at 112 m.
    let mut scene = two_image_survey();
    scene.terrain = TerrainInput::Flat { elevation: 100.0 };
    let lifted: Vec<Pt3> = roof_corners()
        .iter()
        .map(|p| Pt3::new(p.x, p.y, p.z + 100.0))
        .collect();
    for (footprint, camera) in scene.footprints.iter_mut().zip(&scene.cameras) {
        footprint.ring_image = lifted
            .iter()
            .map(|p| {
                let px = camera.world_to_image(p).unwrap();
                [px.x, px.y]
            })
            .collect();
    }

    let report = reconstruct(scene, &ReconstructionConfig::default()).unwrap();
    let group = &report.groups[0];
    assert_eq!(group.closure, Some(ClosureMethod::Photogrammetric));
    for corner in &group.rings[0] {
        assert_relative_eq!(corner.z, 112.0, epsilon = 1e-6);
    }
    let height: Real = group.elevation.height;
    assert!((height - 12.0).abs() < 0.5);
}
