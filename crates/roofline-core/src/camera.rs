use serde::{Deserialize, Serialize};

use crate::error::ReconstructionError;
use crate::math::{Mat3, Pt2, Pt3, Real, Vec2, Vec3};
use crate::terrain::TerrainModel;

/// Radial distortion `r' = r·(1 + k1·r² + k2·r⁴ + k3·r⁶)` on normalized
/// image coordinates, undistorted by fixed-point iteration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RadialDistortion {
    pub k1: Real,
    pub k2: Real,
    pub k3: Real,
}

impl RadialDistortion {
    fn factor(&self, r2: Real) -> Real {
        1.0 + r2 * (self.k1 + r2 * (self.k2 + r2 * self.k3))
    }

    fn distort(&self, p: Vec2) -> Vec2 {
        p * self.factor(p.norm_squared())
    }

    fn undistort(&self, p: Vec2) -> Vec2 {
        let mut u = p;
        for _ in 0..8 {
            u = p / self.factor(u.norm_squared());
        }
        u
    }
}

/// Oriented aerial camera: pinhole with radial distortion.
///
/// `rotation` maps world vectors into the camera frame; the optical axis is
/// the camera +z axis, so a nadir camera has its +z pointing straight down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraModel {
    /// Source image name, used to forbid same-image matches.
    pub image: String,
    /// Projection center in world coordinates.
    pub apex: Pt3,
    /// World-to-camera rotation.
    pub rotation: Mat3,
    /// Focal length in pixels.
    pub focal: Real,
    /// Principal point in pixels.
    pub principal: Vec2,
    #[serde(default)]
    pub distortion: RadialDistortion,
}

impl CameraModel {
    /// Strictly vertical camera looking down at `apex`, y axis flipped so
    /// image rows grow southward.
    pub fn nadir(image: impl Into<String>, apex: Pt3, focal: Real, principal: Vec2) -> Self {
        let rotation = Mat3::from_diagonal(&Vec3::new(1.0, -1.0, -1.0));
        Self {
            image: image.into(),
            apex,
            rotation,
            focal,
            principal,
            distortion: RadialDistortion::default(),
        }
    }

    /// Project a world point to pixel coordinates. `None` when the point is
    /// behind the projection center.
    pub fn world_to_image(&self, p: &Pt3) -> Option<Pt2> {
        let pc = self.rotation * (p - self.apex);
        if pc.z <= Real::EPSILON {
            return None;
        }
        let normalized = Vec2::new(pc.x / pc.z, pc.y / pc.z);
        let distorted = self.distortion.distort(normalized);
        Some(Pt2::new(
            self.principal.x + self.focal * distorted.x,
            self.principal.y + self.focal * distorted.y,
        ))
    }

    /// Unit world-space direction of the viewing ray through `pixel`.
    pub fn pixel_ray(&self, pixel: &Pt2) -> Vec3 {
        let normalized = Vec2::new(
            (pixel.x - self.principal.x) / self.focal,
            (pixel.y - self.principal.y) / self.focal,
        );
        let undistorted = self.distortion.undistort(normalized);
        let dir_cam = Vec3::new(undistorted.x, undistorted.y, 1.0);
        (self.rotation.transpose() * dir_cam).normalize()
    }

    /// Intersect the viewing ray through `pixel` with the terrain raised by
    /// `estim_z` meters.
    ///
    /// Ray marching against the horizontal plane at the current elevation
    /// estimate, re-sampling the terrain at each planimetric solution.
    /// Converges when two successive estimates differ by less than 0.1 m,
    /// capped at 3 iterations.
    pub fn image_to_world(
        &self,
        pixel: &Pt2,
        terrain: &dyn TerrainModel,
        estim_z: Real,
    ) -> Result<Pt3, ReconstructionError> {
        const PRECISION: Real = 0.1;
        const MAX_ITERS: usize = 3;

        let dir = self.pixel_ray(pixel);
        if dir.z.abs() <= 1e-9 {
            return Err(ReconstructionError::GeometricFailure(format!(
                "viewing ray through pixel ({:.1}, {:.1}) is horizontal",
                pixel.x, pixel.y
            )));
        }

        let mut z = terrain.elevation(self.apex.x, self.apex.y) + estim_z;
        let mut point = self.apex;
        for _ in 0..MAX_ITERS {
            let l = (z - self.apex.z) / dir.z;
            point = self.apex + l * dir;
            let z_new = terrain.elevation(point.x, point.y) + estim_z;
            if (z_new - z).abs() < PRECISION {
                point.z = z_new;
                return Ok(point);
            }
            z = z_new;
        }
        point.z = z;
        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::FlatTerrain;
    use approx::assert_relative_eq;

    fn test_camera() -> CameraModel {
        CameraModel::nadir(
            "img_1",
            Pt3::new(100.0, 200.0, 1500.0),
            10_000.0,
            Vec2::new(5000.0, 5000.0),
        )
    }

    #[test]
    fn nadir_projection_round_trip_on_ground() {
        let cam = test_camera();
        let terrain = FlatTerrain(50.0);
        let ground = Pt3::new(130.0, 180.0, 50.0);

        let pixel = cam.world_to_image(&ground).unwrap();
        let back = cam.image_to_world(&pixel, &terrain, 0.0).unwrap();

        assert_relative_eq!(back.x, ground.x, epsilon = 1e-6);
        assert_relative_eq!(back.y, ground.y, epsilon = 1e-6);
        assert_relative_eq!(back.z, ground.z, epsilon = 1e-6);
    }

    #[test]
    fn elevated_point_needs_elevation_hint() {
        let cam = test_camera();
        let terrain = FlatTerrain(50.0);
        let roof = Pt3::new(150.0, 250.0, 62.0); // 12m above ground

        let pixel = cam.world_to_image(&roof).unwrap();

        // Without a hint, the ray overshoots past the roof point.
        let no_hint = cam.image_to_world(&pixel, &terrain, 0.0).unwrap();
        assert!((no_hint.x - roof.x).abs() > 0.1);

        // With the roof height as hint, the point is recovered.
        let with_hint = cam.image_to_world(&pixel, &terrain, 12.0).unwrap();
        assert_relative_eq!(with_hint.x, roof.x, epsilon = 1e-6);
        assert_relative_eq!(with_hint.y, roof.y, epsilon = 1e-6);
        assert_relative_eq!(with_hint.z, roof.z, epsilon = 1e-6);
    }

    #[test]
    fn distortion_round_trip() {
        let mut cam = test_camera();
        cam.distortion = RadialDistortion {
            k1: -1e-2,
            k2: 4e-4,
            k3: 0.0,
        };
        let p = Pt3::new(400.0, -100.0, 0.0);
        let pixel = cam.world_to_image(&p).unwrap();
        let ray = cam.pixel_ray(&pixel);

        // The recovered ray must pass through the original point.
        let l = (p.z - cam.apex.z) / ray.z;
        let hit = cam.apex + l * ray;
        assert_relative_eq!(hit.x, p.x, epsilon = 1e-4);
        assert_relative_eq!(hit.y, p.y, epsilon = 1e-4);
    }

    #[test]
    fn distorted_pixel_projects_back_through_the_terrain() {
        let mut cam = test_camera();
        cam.distortion = RadialDistortion {
            k1: -1e-2,
            k2: 4e-4,
            k3: 0.0,
        };
        let terrain = FlatTerrain(50.0);
        let roof = Pt3::new(320.0, 90.0, 62.0);

        let pixel = cam.world_to_image(&roof).unwrap();
        let back = cam.image_to_world(&pixel, &terrain, 12.0).unwrap();
        assert_relative_eq!(back.x, roof.x, epsilon = 1e-4);
        assert_relative_eq!(back.y, roof.y, epsilon = 1e-4);
        assert_relative_eq!(back.z, roof.z, epsilon = 1e-6);
    }

    #[test]
    fn point_behind_camera_rejected() {
        let cam = test_camera();
        assert!(cam.world_to_image(&Pt3::new(100.0, 200.0, 2000.0)).is_none());
    }
}
