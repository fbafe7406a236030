use crate::math::{Pt3, Real, Vec3};

/// 3D line `origin + λ·dir`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3 {
    pub origin: Pt3,
    pub dir: Vec3,
}

impl Line3 {
    pub fn new(origin: Pt3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    /// Point on the line with the given x coordinate.
    ///
    /// Only meaningful for lines solved with the `dx = 1` convention, where
    /// the direction's x component never vanishes.
    pub fn point_at_x(&self, x: Real) -> Pt3 {
        let l = (x - self.origin.x) / self.dir.x;
        self.origin + l * self.dir
    }

    /// Closest point on `self` to the line `(other_origin, other_dir)`,
    /// with the separation between the two closest points.
    ///
    /// Standard skew-line formula via the mutual perpendicular; falls back
    /// to the origin projection when the lines are near-parallel.
    pub fn closest_point_to_line(&self, other_origin: &Pt3, other_dir: &Vec3) -> (Pt3, Real) {
        let u1 = self.dir / self.dir.norm();
        let u2 = other_dir / other_dir.norm();

        let w = other_origin - self.origin;
        let u1u2 = u1.dot(&u2);

        let n1 = u1 - u1u2 * u2;
        let n2 = u2 - u1u2 * u1;

        let denom1 = u1.dot(&n1);
        let denom2 = u2.dot(&n2);
        if denom1.abs() <= 1e-12 || denom2.abs() <= 1e-12 {
            // Near-parallel lines: project the other origin onto self.
            let l1 = w.dot(&u1);
            let p1 = self.origin + l1 * u1;
            return (p1, (p1 - other_origin).cross(&u2).norm());
        }

        let l1 = w.dot(&n1) / denom1;
        let l2 = -w.dot(&n2) / denom2;

        let p1 = self.origin + l1 * u1;
        let p2 = other_origin + l2 * u2;
        (p1, (p1 - p2).norm())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn point_at_x_walks_the_line() {
        let line = Line3::new(Pt3::new(2.0, 1.0, 10.0), Vec3::new(1.0, 0.5, 0.0));
        let p = line.point_at_x(6.0);
        assert_relative_eq!(p.x, 6.0);
        assert_relative_eq!(p.y, 3.0);
        assert_relative_eq!(p.z, 10.0);
    }

    #[test]
    fn closest_point_of_crossing_lines() {
        // x axis vs a line crossing above it at x=3 with 2m separation.
        let line = Line3::new(Pt3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let (p, d) = line.closest_point_to_line(&Pt3::new(3.0, -5.0, 2.0), &Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(p.x, 3.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(d, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn intersecting_lines_have_zero_distance() {
        let line = Line3::new(Pt3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 1.0, 0.0));
        let (p, d) =
            line.closest_point_to_line(&Pt3::new(4.0, 0.0, 5.0), &Vec3::new(-1.0, 1.0, 0.0));
        assert_relative_eq!(d, 0.0, epsilon = 1e-9);
        assert_relative_eq!(p.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-9);
    }
}
