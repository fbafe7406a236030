use nalgebra::{Matrix3, Matrix4, Point2, Point3, Vector2, Vector3};

pub type Real = f64;

pub type Vec2 = Vector2<Real>;
pub type Vec3 = Vector3<Real>;
pub type Pt2 = Point2<Real>;
pub type Pt3 = Point3<Real>;
pub type Mat3 = Matrix3<Real>;
pub type Mat4 = Matrix4<Real>;

/// Median of a sample, `None` when empty.
///
/// Used by the edge matcher to derive a translation correction that is
/// robust to a few badly matched segment pairs.
pub fn median(values: &[Real]) -> Option<Real> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some(0.5 * (sorted[n / 2 - 1] + sorted[n / 2]))
    }
}

/// Planimetric (xy) distance between two 3D points.
pub fn distance_2d(a: &Pt3, b: &Pt3) -> Real {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn median_is_robust_to_one_outlier() {
        let m = median(&[0.1, 0.2, 0.15, 50.0, 0.12]).unwrap();
        assert!(m < 0.25, "outlier leaked into median: {m}");
    }
}
