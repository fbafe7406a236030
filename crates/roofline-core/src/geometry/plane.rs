use crate::error::ReconstructionError;
use crate::math::{Pt3, Real, Vec3};

/// Viewing plane `ax + by + cz + d = 0` through a camera apex and a
/// ground-projected edge segment.
///
/// The normal is the cross product of the two apex-to-endpoint unit rays
/// and is deliberately kept unnormalized: its magnitude is the sine of the
/// angle subtended by the segment, so short or grazing segments contribute
/// weaker rows to the least-squares system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewingPlane {
    pub a: Real,
    pub b: Real,
    pub c: Real,
    pub d: Real,
}

impl ViewingPlane {
    /// Plane through `apex` and both endpoints of the world-space segment.
    pub fn from_apex_and_segment(
        apex: &Pt3,
        p0: &Pt3,
        p1: &Pt3,
    ) -> Result<Self, ReconstructionError> {
        let r0 = p0 - apex;
        let r1 = p1 - apex;
        let (n0, n1) = (r0.norm(), r1.norm());
        if n0 <= Real::EPSILON || n1 <= Real::EPSILON {
            return Err(ReconstructionError::GeometricFailure(
                "segment endpoint coincides with camera apex".into(),
            ));
        }
        let normal = (r0 / n0).cross(&(r1 / n1));
        if normal.norm() <= 1e-12 {
            return Err(ReconstructionError::GeometricFailure(
                "apex rays are colinear, viewing plane undefined".into(),
            ));
        }
        let d = -(normal.x * p0.x + normal.y * p0.y + normal.z * p0.z);
        Ok(Self {
            a: normal.x,
            b: normal.y,
            c: normal.z,
            d,
        })
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::new(self.a, self.b, self.c)
    }

    /// Perpendicular distance from `p` to the plane.
    pub fn distance_to(&self, p: &Pt3) -> Real {
        let n = self.normal();
        (self.a * p.x + self.b * p.y + self.c * p.z + self.d).abs() / n.norm()
    }
}
