#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{position::Position, prelude::Vector3};

/// Origin of the local (North, East, Up) frame in which
/// the dilution of precision is expressed.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReferencePoint {
    /// Geodetic coordinates of the solution itself
    #[default]
    Estimate,
    /// Fixed station location
    Fixed {
        /// Latitude in decimal degrees
        latitude_ddeg: f64,
        /// Longitude in decimal degrees
        longitude_ddeg: f64,
    },
}

impl ReferencePoint {
    /// Returns (latitude, longitude) in radians, for this
    /// ECEF receiver estimate.
    pub(crate) fn lat_lon_rad(&self, estimate_ecef_m: &Vector3<f64>) -> (f64, f64) {
        match self {
            Self::Estimate => {
                let geodetic = Position::from_ecef(*estimate_ecef_m).geodetic();
                (geodetic[0], geodetic[1])
            },
            Self::Fixed {
                latitude_ddeg,
                longitude_ddeg,
            } => (latitude_ddeg.to_radians(), longitude_ddeg.to_radians()),
        }
    }
}

impl std::fmt::Display for ReferencePoint {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Estimate => write!(fmt, "estimate"),
            Self::Fixed {
                latitude_ddeg,
                longitude_ddeg,
            } => write!(fmt, "lat={:.6}°, lon={:.6}°", latitude_ddeg, longitude_ddeg),
        }
    }
}
