use anyhow::{bail, ensure, Result};
use nalgebra::{DMatrix, DVector};
use roofline_core::{EdgeSegment, Line3, Pt3, Real, Vec3, ViewingPlane};

/// One segment's contribution to a roof-edge solve.
#[derive(Debug, Clone)]
pub struct EdgeObservation {
    /// Viewing plane through the apex and the ground endpoints.
    pub plane: ViewingPlane,
    /// Ground-projected segment endpoints.
    pub world_line: [Pt3; 2],
    /// Camera apex.
    pub apex: Pt3,
}

impl EdgeObservation {
    /// `None` when the segment's viewing plane is degenerate.
    pub fn from_segment(segment: &EdgeSegment) -> Option<Self> {
        segment.plane.map(|plane| Self {
            plane,
            world_line: segment.world_line,
            apex: segment.apex,
        })
    }

    pub fn length(&self) -> Real {
        (self.world_line[0] - self.world_line[1]).norm()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SolveOptions {
    /// Studentized-residual threshold above which the worst segment is
    /// dropped and the system re-solved.
    pub studentized_threshold: Real,
    /// Weight of the pseudo-constraint `dz = 0` (roof edges are assumed
    /// near-horizontal unless the data says otherwise).
    pub horizontal_weight: Real,
    /// Collocation abscissa offset: each plane constrains the line at
    /// λ = 0 and λ = ±`collocation_lambda`.
    pub collocation_lambda: Real,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            studentized_threshold: 2.0,
            horizontal_weight: 10.0,
            collocation_lambda: 1e5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineSolveResult {
    /// Solved line with the `X0 = (x̄, Y0, Z0)`, `u = (1, dy, dz)`
    /// convention.
    pub line: Line3,
    /// Indices of the observations that survived outlier rejection.
    pub kept: Vec<usize>,
    /// Mean absolute residual of the final solve.
    pub mean_residual: Real,
}

/// Intersect the viewing planes of a matched-edge group into a single 3D
/// line by constrained weighted least squares.
///
/// The line is parameterized as `X0 + λ·u` with `X0 = (x̄, Y0, Z0)` and
/// `u = (1, dy, dz)`: the x origin is pinned to the barycenter of the
/// ground endpoints and the direction's x component to 1, removing the
/// scale ambiguity. Each plane `ax + by + cz + d = 0` contributes three
/// collocation rows (λ = 0, ±λ₀) of the overdetermined system, plus one
/// strongly weighted row tying `dz` to 0.
///
/// After each solve, residuals are studentized against the residual
/// covariance `σ₀²·(P⁻¹ − A·N⁻¹·Aᵀ)` and the segment owning the worst
/// residual above the threshold is removed, until the system is clean or
/// fewer than two planes remain (which is an error).
pub fn solve_edge_line(
    observations: &[EdgeObservation],
    opts: &SolveOptions,
) -> Result<LineSolveResult> {
    ensure!(
        observations.len() >= 2,
        "need at least 2 viewing planes (got {})",
        observations.len()
    );

    let mut active: Vec<usize> = (0..observations.len()).collect();

    loop {
        if active.len() < 2 {
            bail!("outlier rejection left fewer than 2 planes");
        }

        let x_bar = active
            .iter()
            .map(|&i| observations[i].world_line[0].x + observations[i].world_line[1].x)
            .sum::<Real>()
            / (2 * active.len()) as Real;

        let n = active.len();
        let rows = 3 * n + 1;
        let mut a = DMatrix::<Real>::zeros(rows, 4);
        let mut b = DVector::<Real>::zeros(rows);
        let mut w = DVector::<Real>::from_element(rows, 1.0);

        for (i, &obs_i) in active.iter().enumerate() {
            let p = observations[obs_i].plane;
            for (k, &l) in [0.0, opts.collocation_lambda, -opts.collocation_lambda]
                .iter()
                .enumerate()
            {
                let r = 3 * i + k;
                a[(r, 0)] = p.b;
                a[(r, 1)] = l * p.b;
                a[(r, 2)] = p.c;
                a[(r, 3)] = l * p.c;
                b[r] = -p.d - p.a * x_bar - p.a * l;
            }
        }
        a[(rows - 1, 3)] = 1.0;
        w[rows - 1] = opts.horizontal_weight;

        // Weighted normal equations: x̂ = (AᵀPA)⁻¹ AᵀPB.
        let pa = DMatrix::from_fn(rows, 4, |r, c| w[r] * a[(r, c)]);
        let n_mat = a.transpose() * &pa;
        let k_vec = pa.transpose() * &b;
        let Some(n_inv) = n_mat.try_inverse() else {
            bail!("normal-equation matrix is singular");
        };
        let x_hat = &n_inv * k_vec;
        if !x_hat.iter().all(|v| v.is_finite()) {
            bail!("non-finite line solution");
        }

        let v = &b - &a * &x_hat;
        let dof = (rows - 4) as Real;
        let sigma0 = v
            .iter()
            .zip(w.iter())
            .map(|(vi, wi)| wi * vi * vi)
            .sum::<Real>()
            / dof;
        let mean_residual = v.norm() / n as Real;

        // Studentized residual search; the horizontal-constraint row is
        // excluded. A vanishing variance factor means the fit is exact and
        // there is nothing left to reject.
        let mut worst: Option<(usize, Real)> = None;
        if sigma0.is_finite() && sigma0 > 1e-18 {
            for r in 0..rows - 1 {
                let a_r = a.row(r).transpose();
                let h = (a_r.transpose() * &n_inv * &a_r)[(0, 0)];
                let var = sigma0 * (1.0 / w[r] - h);
                if var <= 0.0 {
                    continue;
                }
                let t = v[r].abs() / var.sqrt();
                if !t.is_finite() {
                    bail!("non-finite studentized residual");
                }
                if worst.map_or(true, |(_, tw)| t > tw) {
                    worst = Some((r, t));
                }
            }
        }

        match worst {
            Some((r, t)) if t > opts.studentized_threshold => {
                log::debug!(
                    "dropping plane {} (studentized residual {:.2})",
                    active[r / 3],
                    t
                );
                active.remove(r / 3);
            }
            _ => {
                let line = Line3::new(
                    Pt3::new(x_bar, x_hat[0], x_hat[2]),
                    Vec3::new(1.0, x_hat[1], x_hat[3]),
                );
                return Ok(LineSolveResult {
                    line,
                    kept: active,
                    mean_residual,
                });
            }
        }
    }
}
