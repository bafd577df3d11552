use thiserror::Error;

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::{constants::MIN_SATELLITES, dop::DilutionOfPrecision, prelude::Constellation};

mod output;
pub use output::OutputFormat;

mod reference;
pub use reference::ReferencePoint;

/// Configuration Error
#[derive(Debug, Error)]
pub enum Error {
    #[error("at least one iteration is required")]
    NullIterations,
    #[error("convergence threshold must be a positive finite number")]
    InvalidConvergenceThreshold,
    #[error("maximal condition number must be larger than 1")]
    InvalidConditionNumber,
    #[error("timestamp tolerance must be positive and below 1 second")]
    InvalidTolerance,
    #[error("at least 4 satellites are required")]
    MinimalSatellites,
    #[error("empty observation code")]
    EmptyObservationCode,
    #[error("reference latitude must lie within [-90°, 90°]")]
    InvalidLatitude,
    #[error("uncertainty scaling must use positive finite values")]
    InvalidUncertainty,
    #[error("unknown output format \"{0}\"")]
    UnknownOutputFormat(String),
}

fn default_max_iterations() -> usize {
    100
}

fn default_convergence_threshold() -> f64 {
    1.0E-5
}

fn default_max_condition_number() -> f64 {
    1.0E12
}

fn default_tolerance() -> f64 {
    1.0E-3
}

fn default_min_satellites() -> usize {
    MIN_SATELLITES
}

fn default_constellation() -> Constellation {
    Constellation::GPS
}

fn default_observation_code() -> String {
    "C1".to_string()
}

fn default_horizontal_sigma() -> f64 {
    1.5
}

fn default_vertical_sigma() -> f64 {
    3.5
}

/// Pseudo range noise [m], per local axis, scaling the DOPs
/// into position uncertainties: HDOP for East and North, VDOP for Up.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct UncertaintyOpts {
    #[cfg_attr(feature = "serde", serde(default = "default_horizontal_sigma"))]
    pub east_m: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_horizontal_sigma"))]
    pub north_m: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_vertical_sigma"))]
    pub up_m: f64,
}

impl Default for UncertaintyOpts {
    fn default() -> Self {
        Self {
            east_m: default_horizontal_sigma(),
            north_m: default_horizontal_sigma(),
            up_m: default_vertical_sigma(),
        }
    }
}

impl UncertaintyOpts {
    /// Returns the (East, North, Up) uncertainties [m] for this DOP
    pub fn scale(&self, dop: &DilutionOfPrecision) -> (f64, f64, f64) {
        (
            dop.hdop * self.east_m,
            dop.hdop * self.north_m,
            dop.vdop * self.up_m,
        )
    }
}

/// Gauss-Newton iteration parameters
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct SolverOpts {
    /// Maximal number of iterations per epoch
    #[cfg_attr(feature = "serde", serde(default = "default_max_iterations"))]
    pub max_iterations: usize,
    /// Iteration stops once the correction norm drops below this value [m]
    #[cfg_attr(feature = "serde", serde(default = "default_convergence_threshold"))]
    pub convergence_threshold_m: f64,
    /// Normal matrices with a larger condition number are
    /// considered singular and the epoch is rejected.
    #[cfg_attr(feature = "serde", serde(default = "default_max_condition_number"))]
    pub max_condition_number: f64,
}

impl Default for SolverOpts {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            convergence_threshold_m: default_convergence_threshold(),
            max_condition_number: default_max_condition_number(),
        }
    }
}

/// Observation / catalog pairing parameters
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct MatchingOpts {
    /// Two timestamps closer than this [s] denote the same instant.
    /// Set to zero for strict equality.
    #[cfg_attr(feature = "serde", serde(default = "default_tolerance"))]
    pub tolerance_s: f64,
    /// Minimal number of satellites in common
    #[cfg_attr(feature = "serde", serde(default = "default_min_satellites"))]
    pub min_satellites: usize,
}

impl Default for MatchingOpts {
    fn default() -> Self {
        Self {
            tolerance_s: default_tolerance(),
            min_satellites: default_min_satellites(),
        }
    }
}

/// Selects the single observable we process
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct ObservationFilter {
    #[cfg_attr(feature = "serde", serde(default = "default_constellation"))]
    pub constellation: Constellation,
    /// Pseudo range observation code, like "C1"
    #[cfg_attr(feature = "serde", serde(default = "default_observation_code"))]
    pub code: String,
}

impl Default for ObservationFilter {
    fn default() -> Self {
        Self {
            constellation: default_constellation(),
            code: default_observation_code(),
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// Solver customization
    #[cfg_attr(feature = "serde", serde(default))]
    pub solver: SolverOpts,
    /// Epoch matching customization
    #[cfg_attr(feature = "serde", serde(default))]
    pub matching: MatchingOpts,
    /// Observable selection
    #[cfg_attr(feature = "serde", serde(default))]
    pub observation: ObservationFilter,
    /// Local frame used to express the DOPs
    #[cfg_attr(feature = "serde", serde(default))]
    pub reference: ReferencePoint,
    /// Known station coordinates, in ECEF [m].
    /// When defined, we report the ENU error of each solution.
    #[cfg_attr(feature = "serde", serde(default))]
    pub truth: Option<(f64, f64, f64)>,
    /// When defined, each solution reports its DOP scaled uncertainty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub uncertainty: Option<UncertaintyOpts>,
    /// Result file layout
    #[cfg_attr(feature = "serde", serde(default))]
    pub output: OutputFormat,
}

impl Config {
    /// Verifies this [Config] is usable.
    pub fn validate(&self) -> Result<(), Error> {
        if self.solver.max_iterations == 0 {
            return Err(Error::NullIterations);
        }
        let threshold = self.solver.convergence_threshold_m;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(Error::InvalidConvergenceThreshold);
        }
        if self.solver.max_condition_number.is_nan() || self.solver.max_condition_number <= 1.0 {
            return Err(Error::InvalidConditionNumber);
        }
        let tolerance = self.matching.tolerance_s;
        if !(0.0..1.0).contains(&tolerance) {
            return Err(Error::InvalidTolerance);
        }
        if self.matching.min_satellites < MIN_SATELLITES {
            return Err(Error::MinimalSatellites);
        }
        if self.observation.code.trim().is_empty() {
            return Err(Error::EmptyObservationCode);
        }
        if let Some(sigma) = &self.uncertainty {
            if [sigma.east_m, sigma.north_m, sigma.up_m]
                .iter()
                .any(|v| !v.is_finite() || *v <= 0.0)
            {
                return Err(Error::InvalidUncertainty);
            }
        }
        if let ReferencePoint::Fixed { latitude_ddeg, .. } = self.reference {
            if !(-90.0..=90.0).contains(&latitude_ddeg) {
                return Err(Error::InvalidLatitude);
            }
        }
        Ok(())
    }

    /// Returns [Config] with updated [OutputFormat]
    pub fn with_output(&self, output: OutputFormat) -> Self {
        let mut s = self.clone();
        s.output = output;
        s
    }

    /// Returns [Config] with updated [ReferencePoint]
    pub fn with_reference(&self, reference: ReferencePoint) -> Self {
        let mut s = self.clone();
        s.reference = reference;
        s
    }

    /// Returns [Config] reporting DOP scaled uncertainties
    pub fn with_uncertainty(&self, uncertainty: UncertaintyOpts) -> Self {
        let mut s = self.clone();
        s.uncertainty = Some(uncertainty);
        s
    }

    /// Returns [Config] with known station coordinates (ECEF [m])
    pub fn with_truth(&self, ecef_m: (f64, f64, f64)) -> Self {
        let mut s = self.clone();
        s.truth = Some(ecef_m);
        s
    }
}
