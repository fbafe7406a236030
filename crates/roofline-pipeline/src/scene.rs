//! Scene assembly: deserialized survey input to working arenas.
//!
//! A scene holds the oriented cameras, the terrain model, and one
//! [`Building`] per detected footprint per image. Image rings are smoothed
//! so one polygon edge corresponds to one wall, then ray-projected onto
//! the terrain.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use roofline_core::{
    smooth_ring, Building, BuildingId, BuildingSource, CameraId, CameraModel, FlatTerrain, Pt2,
    RasterTerrain, Real, TerrainModel,
};

use crate::config::ReconstructionConfig;

/// Terrain description in the scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerrainInput {
    Flat {
        elevation: Real,
    },
    Raster {
        origin_x: Real,
        origin_y: Real,
        resolution: Real,
        width: usize,
        height: usize,
        data: Vec<f32>,
    },
}

impl Default for TerrainInput {
    fn default() -> Self {
        Self::Flat { elevation: 0.0 }
    }
}

/// One detected footprint in the scene file: an image-space ring on one
/// camera's image. The ring is open (no repeated last vertex).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FootprintInput {
    /// Index into the scene's camera list.
    pub camera: usize,
    pub ring_image: Vec<[Real; 2]>,
}

/// Footprint imported from a topographic reference database, already in
/// world coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceFootprintInput {
    pub origin: String,
    pub ring_ground: Vec<[Real; 3]>,
}

/// Serialized survey: cameras, terrain, detections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneInput {
    pub cameras: Vec<CameraModel>,
    #[serde(default)]
    pub terrain: TerrainInput,
    pub footprints: Vec<FootprintInput>,
    #[serde(default)]
    pub reference_footprints: Vec<ReferenceFootprintInput>,
}

/// Working scene shared read-only by the per-group workers.
pub struct Scene {
    pub cameras: Vec<CameraModel>,
    pub terrain: Box<dyn TerrainModel>,
    pub buildings: Vec<Building>,
}

impl Scene {
    /// Assemble the working arenas from a scene file.
    ///
    /// Footprints that collapse below 4 vertices under smoothing, or whose
    /// rays miss the terrain, are kept in the arena flagged invalid so the
    /// report can account for them.
    pub fn from_input(input: SceneInput, config: &ReconstructionConfig) -> Result<Self> {
        if input.cameras.is_empty() {
            bail!("scene has no cameras");
        }
        let terrain: Box<dyn TerrainModel> = match input.terrain {
            TerrainInput::Flat { elevation } => Box::new(FlatTerrain(elevation)),
            TerrainInput::Raster {
                origin_x,
                origin_y,
                resolution,
                width,
                height,
                data,
            } => Box::new(RasterTerrain::new(
                origin_x, origin_y, resolution, width, height, data,
            )?),
        };

        let mut buildings = Vec::with_capacity(input.footprints.len());
        for (i, footprint) in input.footprints.into_iter().enumerate() {
            if footprint.camera >= input.cameras.len() {
                bail!(
                    "footprint {} references camera {} but the scene has {}",
                    i,
                    footprint.camera,
                    input.cameras.len()
                );
            }
            let ring: Vec<Pt2> = footprint
                .ring_image
                .iter()
                .map(|&[x, y]| Pt2::new(x, y))
                .collect();
            let id = BuildingId::from(buildings.len());
            let source = BuildingSource::Photogrammetric {
                camera: CameraId::from(footprint.camera),
            };
            let mut building = match smooth_ring(&ring, config.footprint.smoothing_dot) {
                Some(smoothed) => Building::new(id, source, smoothed),
                None => {
                    log::debug!("footprint {i} degenerates under smoothing, skipping");
                    let mut b = Building::new(id, source, ring);
                    b.valid = false;
                    b
                }
            };
            // Projection failures invalidate the footprint but not the run.
            if building.valid {
                let camera = &input.cameras[footprint.camera];
                match project_ring(camera, &building.ring_image, terrain.as_ref(), 0.0) {
                    Ok(ground) => building.ring_ground = ground,
                    Err(err) => {
                        log::warn!("footprint {i} does not project onto the terrain: {err:#}");
                        building.valid = false;
                    }
                }
            }
            buildings.push(building);
        }

        for reference in input.reference_footprints {
            let id = BuildingId::from(buildings.len());
            let ring: Vec<_> = reference
                .ring_ground
                .iter()
                .map(|&[x, y, z]| roofline_core::Pt3::new(x, y, z))
                .collect();
            let mut building = Building::new(
                id,
                BuildingSource::ReferenceDatabase {
                    origin: reference.origin,
                },
                Vec::new(),
            );
            building.valid = ring.len() >= 4;
            building.ring_ground = ring;
            buildings.push(building);
        }

        Ok(Self {
            cameras: input.cameras,
            terrain,
            buildings,
        })
    }

    pub fn camera(&self, id: CameraId) -> &CameraModel {
        &self.cameras[id.index()]
    }

    /// Re-project every image-sourced footprint of `building_ids` with a
    /// new elevation hint.
    pub fn reproject_buildings(&mut self, building_ids: &[BuildingId], estim_z: Real) -> Result<()> {
        for &id in building_ids {
            let building = &self.buildings[id.index()];
            let Some(camera_id) = building.source.camera() else {
                continue;
            };
            if !building.valid {
                continue;
            }
            let ground = project_ring(
                &self.cameras[camera_id.index()],
                &building.ring_image,
                self.terrain.as_ref(),
                estim_z,
            )
            .with_context(|| format!("re-projecting footprint {}", id.0))?;
            self.buildings[id.index()].ring_ground = ground;
        }
        Ok(())
    }
}

/// Ray-project an image ring onto the terrain raised by `estim_z`.
pub fn project_ring(
    camera: &CameraModel,
    ring_image: &[Pt2],
    terrain: &dyn TerrainModel,
    estim_z: Real,
) -> Result<Vec<roofline_core::Pt3>> {
    ring_image
        .iter()
        .map(|pixel| Ok(camera.image_to_world(pixel, terrain, estim_z)?))
        .collect()
}
