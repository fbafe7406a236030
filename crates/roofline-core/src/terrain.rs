use serde::{Deserialize, Serialize};

use crate::error::ReconstructionError;
use crate::math::Real;

/// Digital terrain model: bare-earth elevation lookup.
///
/// Shared read-only by every pipeline stage; implementations must be
/// `Sync` so groups can be processed in parallel.
pub trait TerrainModel: Sync {
    /// Ground elevation at planimetric coordinates `(x, y)`.
    fn elevation(&self, x: Real, y: Real) -> Real;
}

/// Constant-elevation terrain, mostly for tests and flat survey areas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlatTerrain(pub Real);

impl TerrainModel for FlatTerrain {
    fn elevation(&self, _x: Real, _y: Real) -> Real {
        self.0
    }
}

/// Regular elevation raster with bilinear interpolation.
///
/// Row-major grid; cell `(0, 0)` is the north-west corner at
/// `(origin_x, origin_y)`, y decreasing with rows as in the source
/// orthophoto products. Queries outside the raster clamp to the border.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterTerrain {
    pub origin_x: Real,
    pub origin_y: Real,
    pub resolution: Real,
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl RasterTerrain {
    pub fn new(
        origin_x: Real,
        origin_y: Real,
        resolution: Real,
        width: usize,
        height: usize,
        data: Vec<f32>,
    ) -> Result<Self, ReconstructionError> {
        if resolution <= 0.0 {
            return Err(ReconstructionError::Configuration(
                "terrain raster resolution must be positive".into(),
            ));
        }
        if data.len() != width * height || width == 0 || height == 0 {
            return Err(ReconstructionError::Configuration(format!(
                "terrain raster size mismatch: {}x{} grid with {} samples",
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            origin_x,
            origin_y,
            resolution,
            width,
            height,
            data,
        })
    }

    fn sample(&self, col: usize, row: usize) -> Real {
        let col = col.min(self.width - 1);
        let row = row.min(self.height - 1);
        self.data[row * self.width + col] as Real
    }
}

impl TerrainModel for RasterTerrain {
    fn elevation(&self, x: Real, y: Real) -> Real {
        let fc = ((x - self.origin_x) / self.resolution).clamp(0.0, (self.width - 1) as Real);
        let fr = ((self.origin_y - y) / self.resolution).clamp(0.0, (self.height - 1) as Real);
        let (c0, r0) = (fc.floor() as usize, fr.floor() as usize);
        let (dc, dr) = (fc - c0 as Real, fr - r0 as Real);

        let z00 = self.sample(c0, r0);
        let z10 = self.sample(c0 + 1, r0);
        let z01 = self.sample(c0, r0 + 1);
        let z11 = self.sample(c0 + 1, r0 + 1);

        let top = z00 * (1.0 - dc) + z10 * dc;
        let bottom = z01 * (1.0 - dc) + z11 * dc;
        top * (1.0 - dr) + bottom * dr
    }
}
