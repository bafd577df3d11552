//! Position and clock bias solver
use log::{debug, trace, warn};
use nalgebra::{DVector, Matrix1x4, Matrix4, MatrixXx4, Vector3, Vector4};

use crate::{
    catalog::SatellitePosition,
    cfg::SolverOpts,
    constants::{MIN_SATELLITES, SPEED_OF_LIGHT_M_S},
    dop::DilutionOfPrecision,
    Error,
};

/// Receiver position and clock bias
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReceiverEstimate {
    /// ECEF position [m]
    pub position: Vector3<f64>,
    /// Clock bias, expressed in meters
    pub clock_bias_m: f64,
}

impl std::fmt::Display for ReceiverEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "x={:.3}m y={:.3}m z={:.3}m dt={:.11E}s",
            self.position[0],
            self.position[1],
            self.position[2],
            self.clock_bias_s()
        )
    }
}

impl ReceiverEstimate {
    /// Builds new [ReceiverEstimate] from ECEF coordinates [m]
    /// and clock bias [m].
    pub fn new(ecef_m: (f64, f64, f64), clock_bias_m: f64) -> Self {
        Self {
            clock_bias_m,
            position: Vector3::new(ecef_m.0, ecef_m.1, ecef_m.2),
        }
    }

    /// Clock bias in seconds
    pub fn clock_bias_s(&self) -> f64 {
        self.clock_bias_m / SPEED_OF_LIGHT_M_S
    }

    /// Applies the (dx, dy, dz, dcdt) correction
    pub(crate) fn update(&mut self, dx: &Vector4<f64>) {
        self.position[0] += dx[0];
        self.position[1] += dx[1];
        self.position[2] += dx[2];
        self.clock_bias_m += dx[3];
    }

    fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite()) && self.clock_bias_m.is_finite()
    }
}

/// Linearized contribution of one satellite
struct MatrixContribution {
    /// Design matrix row
    a: Matrix1x4<f64>,
    /// Misclosure
    w: f64,
}

impl MatrixContribution {
    fn new(
        estimate: &ReceiverEstimate,
        sat: &SatellitePosition,
        pseudorange_m: f64,
    ) -> Result<Self, Error> {
        let los = estimate.position - sat.position;
        let rho = los.norm();
        if !rho.is_finite() || rho <= 0.0 {
            return Err(Error::NonFiniteState);
        }
        let corrected = pseudorange_m - sat.correction_m;
        Ok(Self {
            a: Matrix1x4::new(los[0] / rho, los[1] / rho, los[2] / rho, -1.0),
            w: (rho - estimate.clock_bias_m) - corrected,
        })
    }
}

/// Inverts a normal matrix, rejecting singular or badly conditioned ones.
/// Returns the covariance matrix.
pub(crate) fn checked_inverse(
    n: &Matrix4<f64>,
    max_condition_number: f64,
) -> Result<Matrix4<f64>, Error> {
    if n.iter().any(|v| !v.is_finite()) {
        return Err(Error::NonFiniteState);
    }

    let eigen = n.symmetric_eigen();
    let (min, max) = eigen
        .eigenvalues
        .iter()
        .fold((f64::INFINITY, 0.0_f64), |(min, max), lambda| {
            (min.min(*lambda), max.max(lambda.abs()))
        });

    if max == 0.0 || min <= max * f64::EPSILON {
        return Err(Error::SingularGeometry(f64::INFINITY));
    }

    let condition = max / min;
    if condition > max_condition_number {
        return Err(Error::SingularGeometry(condition));
    }

    let inv = n.try_inverse().ok_or(Error::MatrixInversion)?;
    if inv.iter().any(|v| !v.is_finite()) {
        return Err(Error::MatrixInversion);
    }
    Ok(inv)
}

/// Converged (or iteration capped) least squares [Solution]
#[derive(Debug, Clone)]
pub struct Solution {
    /// Final [ReceiverEstimate]
    pub estimate: ReceiverEstimate,
    /// Final normal matrix N = AᵗA
    pub normal: Matrix4<f64>,
    /// Final covariance matrix N⁻¹
    pub covariance: Matrix4<f64>,
    /// Number of iterations
    pub iterations: usize,
    /// False when the iteration limit was reached first
    pub converged: bool,
    /// Misclosures at the final estimate [m], one per satellite
    pub residuals: DVector<f64>,
}

impl Solution {
    /// Number of satellites that contributed
    pub fn num_satellites(&self) -> usize {
        self.residuals.len()
    }

    /// Root mean square of the final misclosures [m]
    pub fn residuals_rms(&self) -> f64 {
        if self.residuals.is_empty() {
            0.0
        } else {
            (self.residuals.norm_squared() / self.residuals.len() as f64).sqrt()
        }
    }

    /// Dilution of precision, in the local frame at
    /// latitude / longitude expressed in radians.
    pub fn dop(&self, lat_rad: f64, lon_rad: f64) -> Result<DilutionOfPrecision, Error> {
        DilutionOfPrecision::from_covariance(&self.covariance, lat_rad, lon_rad)
    }
}

/// [Solver] resolves the receiver position and clock bias
/// from at least 4 pseudo ranges, by Gauss-Newton iteration.
/// All observations are equally weighted.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    opts: SolverOpts,
}

impl Solver {
    pub fn new(opts: &SolverOpts) -> Self {
        Self { opts: opts.clone() }
    }

    /// Resolves from the Earth center with null clock bias.
    /// ## Inputs
    /// - satellites: [SatellitePosition]s
    /// - pseudoranges: raw pseudo range [m] of each satellite
    pub fn solve(
        &self,
        satellites: &[SatellitePosition],
        pseudoranges: &[f64],
    ) -> Result<Solution, Error> {
        self.solve_from(ReceiverEstimate::default(), satellites, pseudoranges)
    }

    /// Resolves starting from this initial [ReceiverEstimate].
    pub fn solve_from(
        &self,
        initial: ReceiverEstimate,
        satellites: &[SatellitePosition],
        pseudoranges: &[f64],
    ) -> Result<Solution, Error> {
        if satellites.len() != pseudoranges.len() {
            return Err(Error::MatrixDimension {
                satellites: satellites.len(),
                pseudoranges: pseudoranges.len(),
            });
        }

        let size = satellites.len();
        if size < MIN_SATELLITES {
            return Err(Error::MatrixMinimalDimension);
        }

        let mut estimate = initial;
        let mut a = MatrixXx4::<f64>::zeros(size);
        let mut w = DVector::<f64>::zeros(size);
        let mut normal = Matrix4::<f64>::zeros();
        let mut covariance = Matrix4::<f64>::zeros();

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.opts.max_iterations.max(1) {
            self.linearize(&estimate, satellites, pseudoranges, &mut a, &mut w)?;

            let at = a.transpose();
            normal = &at * &a;
            covariance = checked_inverse(&normal, self.opts.max_condition_number)?;

            let u = &at * &w;
            let dx = -(covariance * u);

            estimate.update(&dx);
            iterations += 1;

            if !estimate.is_finite() {
                return Err(Error::NonFiniteState);
            }

            let norm = dx.norm();
            trace!("iter={} |dx|={:.6E} {}", iterations, norm, estimate);

            if norm < self.opts.convergence_threshold_m {
                converged = true;
                break;
            }
        }

        if converged {
            debug!("converged after {} iterations: {}", iterations, estimate);
        } else {
            warn!(
                "iteration limit ({}) reached without convergence: {}",
                iterations, estimate
            );
        }

        self.linearize(&estimate, satellites, pseudoranges, &mut a, &mut w)?;

        Ok(Solution {
            estimate,
            normal,
            covariance,
            iterations,
            converged,
            residuals: w,
        })
    }

    /// Forms design matrix and misclosure vector at this estimate.
    fn linearize(
        &self,
        estimate: &ReceiverEstimate,
        satellites: &[SatellitePosition],
        pseudoranges: &[f64],
        a: &mut MatrixXx4<f64>,
        w: &mut DVector<f64>,
    ) -> Result<(), Error> {
        for (i, (sat, pr)) in satellites.iter().zip(pseudoranges.iter()).enumerate() {
            let contribution = MatrixContribution::new(estimate, sat, *pr)?;
            a.set_row(i, &contribution.a);
            w[i] = contribution.w;
        }
        Ok(())
    }
}
