use anyhow::{ensure, Result};
use roofline_core::{Line3, Pt3, Real};

use crate::plane_intersection::EdgeObservation;

/// Finite extent of a solved roof-edge line.
#[derive(Debug, Clone, Copy)]
pub struct EndpointResult {
    pub p1: Pt3,
    pub p2: Pt3,
    /// Mean distance between the solved line and the apex rays through the
    /// observed endpoints; the quality gate for the solve.
    pub d_mean: Real,
    pub length: Real,
}

/// Delimit the solved `line` with finite endpoints.
///
/// Every observation contributes two apex rays, one through each ground
/// endpoint; the point of `line` closest to each ray marks where that
/// observation saw the edge end. Nothing guarantees that endpoint 0 of one
/// image corresponds to endpoint 0 of another, so candidates are bucketed
/// by proximity to the first observation's pair. The final endpoints are
/// taken at the abscissae voted by the longest observed segment, which is
/// the least likely to be truncated by an occlusion.
pub fn segment_endpoints(line: &Line3, observations: &[EdgeObservation]) -> Result<EndpointResult> {
    ensure!(!observations.is_empty(), "no observations to delimit with");

    let mut side1: Vec<Pt3> = Vec::with_capacity(observations.len());
    let mut side2: Vec<Pt3> = Vec::with_capacity(observations.len());
    let mut distance_sum = 0.0;

    for obs in observations {
        let ray_foot = |endpoint: Pt3| {
            let dir = (obs.apex - endpoint).normalize();
            line.closest_point_to_line(&endpoint, &dir)
        };
        let (p0, d0) = ray_foot(obs.world_line[0]);
        let (p1, d1) = ray_foot(obs.world_line[1]);
        distance_sum += d0 + d1;

        match side1.first() {
            None => {
                side1.push(p0);
                side2.push(p1);
            }
            Some(&first1) => {
                let first2 = side2[0];
                if (p0 - first1).norm() < (p0 - first2).norm() {
                    side1.push(p0);
                    side2.push(p1);
                } else {
                    side1.push(p1);
                    side2.push(p0);
                }
            }
        }
    }

    let longest = observations
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.length().total_cmp(&b.length()))
        .map(|(i, _)| i)
        .unwrap_or(0);

    let p1 = line.point_at_x(side1[longest].x);
    let p2 = line.point_at_x(side2[longest].x);

    Ok(EndpointResult {
        p1,
        p2,
        d_mean: distance_sum / (2 * observations.len()) as Real,
        length: (p2 - p1).norm(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roofline_core::{Vec3, ViewingPlane};

    fn observe(apex: Pt3, p0: Pt3, p1: Pt3) -> EdgeObservation {
        let to_ground = |p: Pt3| {
            let t = apex.z / (apex.z - p.z);
            apex + t * (p - apex)
        };
        let g0 = to_ground(p0);
        let g1 = to_ground(p1);
        let plane = ViewingPlane::from_apex_and_segment(&apex, &g0, &g1).unwrap();
        EdgeObservation {
            plane,
            world_line: [g0, g1],
            apex,
        }
    }

    #[test]
    fn endpoints_from_consistent_views() {
        let line = Line3::new(Pt3::new(0.0, 5.0, 12.0), Vec3::new(1.0, 0.0, 0.0));
        let a = Pt3::new(0.0, 5.0, 12.0);
        let b = Pt3::new(20.0, 5.0, 12.0);
        let obs = vec![
            observe(Pt3::new(10.0, -500.0, 1000.0), a, b),
            observe(Pt3::new(10.0, 500.0, 1000.0), a, b),
        ];

        let result = segment_endpoints(&line, &obs).unwrap();
        assert_relative_eq!(result.d_mean, 0.0, epsilon = 1e-9);
        assert_relative_eq!(result.length, 20.0, epsilon = 1e-6);
        let (lo, hi) = if result.p1.x < result.p2.x {
            (result.p1, result.p2)
        } else {
            (result.p2, result.p1)
        };
        assert_relative_eq!(lo.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(hi.x, 20.0, epsilon = 1e-6);
        assert_relative_eq!(lo.y, 5.0, epsilon = 1e-9);
        assert_relative_eq!(lo.z, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn swapped_endpoint_order_is_rebucketed() {
        // Second view lists its endpoints in the opposite order; the longer
        // (second) segment still defines the final extent.
        let line = Line3::new(Pt3::new(0.0, 5.0, 12.0), Vec3::new(1.0, 0.0, 0.0));
        let obs = vec![
            observe(
                Pt3::new(10.0, -500.0, 1000.0),
                Pt3::new(2.0, 5.0, 12.0),
                Pt3::new(18.0, 5.0, 12.0),
            ),
            observe(
                Pt3::new(10.0, 500.0, 1000.0),
                Pt3::new(20.0, 5.0, 12.0),
                Pt3::new(0.0, 5.0, 12.0),
            ),
        ];

        let result = segment_endpoints(&line, &obs).unwrap();
        assert_relative_eq!(result.length, 20.0, epsilon = 1e-6);
        let xs = [result.p1.x, result.p2.x];
        assert!(xs.contains(&0.0) || xs.iter().any(|x| x.abs() < 1e-6));
        assert!(xs.iter().any(|x| (x - 20.0).abs() < 1e-6));
    }

    #[test]
    fn distance_reflects_misfit() {
        // Line offset 1 m sideways from what the rays actually intersect:
        // near-vertical rays pass roughly 1 m from it.
        let line = Line3::new(Pt3::new(0.0, 6.0, 12.0), Vec3::new(1.0, 0.0, 0.0));
        let a = Pt3::new(0.0, 5.0, 12.0);
        let b = Pt3::new(20.0, 5.0, 12.0);
        let obs = vec![
            observe(Pt3::new(10.0, -500.0, 1000.0), a, b),
            observe(Pt3::new(10.0, 500.0, 1000.0), a, b),
        ];

        let result = segment_endpoints(&line, &obs).unwrap();
        assert!(result.d_mean > 0.5 && result.d_mean < 1.5);
    }
}
