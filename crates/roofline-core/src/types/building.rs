use serde::{Deserialize, Serialize};

use crate::geometry::{ring_area_xy, ring_iou};
use crate::ids::{BuildingGroupId, BuildingId, CameraId, SegmentId};
use crate::math::{Pt2, Pt3, Real};

/// Where a building footprint comes from.
///
/// Image-oriented footprints carry their camera and can be re-projected by
/// the closure fallback; reference-database footprints cannot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingSource {
    /// Detected on an aerial image.
    Photogrammetric { camera: CameraId },
    /// Imported from a topographic reference database.
    ReferenceDatabase { origin: String },
}

impl BuildingSource {
    pub fn is_image_sourced(&self) -> bool {
        matches!(self, Self::Photogrammetric { .. })
    }

    pub fn camera(&self) -> Option<CameraId> {
        match self {
            Self::Photogrammetric { camera } => Some(*camera),
            Self::ReferenceDatabase { .. } => None,
        }
    }
}

/// One building footprint on one image.
#[derive(Debug, Clone)]
pub struct Building {
    pub id: BuildingId,
    pub source: BuildingSource,
    /// Smoothed image-space ring, one edge per physical wall.
    pub ring_image: Vec<Pt2>,
    /// Ring projected onto the terrain with the current elevation hint.
    pub ring_ground: Vec<Pt3>,
    pub valid: bool,
    pub group: Option<BuildingGroupId>,
    /// Edge segments in ring order; filled by the matching stage.
    pub segments: Vec<SegmentId>,
}

impl Building {
    pub fn new(id: BuildingId, source: BuildingSource, ring_image: Vec<Pt2>) -> Self {
        Self {
            id,
            source,
            ring_image,
            ring_ground: Vec::new(),
            valid: true,
            group: None,
            segments: Vec::new(),
        }
    }

    pub fn ground_area(&self) -> Real {
        ring_area_xy(&self.ring_ground)
    }

    /// Planimetric intersection-over-union of the ground footprints.
    pub fn iou(&self, other: &Building) -> Real {
        ring_iou(&self.ring_ground, &other.ring_ground)
    }
}
