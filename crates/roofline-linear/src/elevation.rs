use anyhow::{ensure, Result};
use roofline_core::{ring_area_xy, ring_centroid, Pt3, Real};

/// One image's view of a building footprint, for height estimation.
#[derive(Debug, Clone)]
pub struct FootprintObservation {
    /// Camera apex of the image the footprint was detected on.
    pub apex: Pt3,
    /// Footprint ring projected onto the terrain.
    pub ring_ground: Vec<Pt3>,
}

/// Similar-triangle height estimate from one image pair.
#[derive(Debug, Clone, Copy)]
pub struct HeightEstimate {
    /// Estimated height of the roof above the terrain-projected
    /// footprints, meters.
    pub delta_z: Real,
    /// Signed distance of the second centroid to the plane through both
    /// apexes and the first centroid. Near zero when the two projections
    /// disagree only along the epipolar direction, i.e. when the offset
    /// really is parallax.
    pub plane_distance: Real,
}

/// Estimate a building's height from the parallax between two
/// terrain-projected footprints of it.
///
/// A roof at height `h` above the terrain is projected `Δx` away from its
/// true position, where by similar triangles `Δx / h = Δl / H` with `Δl`
/// the apex baseline and `H` the mean flying height above the footprints'
/// ground. Inverting gives `h = Δx·H / Δl` from the centroid offset of
/// the two footprints.
pub fn estimate_pair_height(
    first: &FootprintObservation,
    second: &FootprintObservation,
) -> Result<HeightEstimate> {
    ensure!(
        first.ring_ground.len() >= 3 && second.ring_ground.len() >= 3,
        "footprint rings need at least 3 vertices"
    );

    let s1 = first.apex;
    let s2 = second.apex;
    let c1 = ring_centroid(&first.ring_ground);
    let c2 = ring_centroid(&second.ring_ground);

    let baseline = (s1 - s2).norm();
    ensure!(baseline > Real::EPSILON, "coincident camera apexes");

    // Plane through both apexes and the first centroid; the second
    // centroid's distance to it measures how much of the offset is NOT
    // explainable as parallax.
    let u = s1 - s2;
    let v = s1 - c1;
    let normal = u.cross(&v);
    let norm = normal.norm();
    ensure!(norm > Real::EPSILON, "apexes and centroid are colinear");
    let plane_distance = (c2 - s1).dot(&(normal / norm));

    let delta_x = (c1 - c2).norm();
    // Flying height above the footprints' ground, not above sea level.
    let flying_height = 0.5 * (s1.z + s2.z) - 0.5 * (c1.z + c2.z);
    ensure!(
        flying_height > Real::EPSILON,
        "camera apexes are not above the footprints"
    );
    let delta_z = delta_x * flying_height / baseline;

    Ok(HeightEstimate {
        delta_z,
        plane_distance,
    })
}

/// Geometric correlation score between two footprints of a candidate
/// building pair; lower is better. Sums the vertex-count difference, the
/// area-ratio excess over 1, and the parallax-consistency residual of the
/// height estimate.
pub fn correlation_score(
    first: &FootprintObservation,
    second: &FootprintObservation,
) -> Result<Real> {
    let area1 = ring_area_xy(&first.ring_ground);
    let area2 = ring_area_xy(&second.ring_ground);
    ensure!(
        area1 > Real::EPSILON && area2 > Real::EPSILON,
        "degenerate footprint area"
    );
    let ratio = if area1 > area2 {
        area1 / area2
    } else {
        area2 / area1
    };

    let vertex_gap =
        (first.ring_ground.len() as Real - second.ring_ground.len() as Real).abs();
    let estimate = estimate_pair_height(first, second)?;

    Ok(vertex_gap + (ratio - 1.0) + estimate.plane_distance.abs())
}
