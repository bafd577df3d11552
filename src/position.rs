//! 3D Position coordinates
use crate::prelude::Vector3;
use map_3d::{ecef2geodetic, Ellipsoid};
use nalgebra::Matrix3;

/// Receiver or station [Position], used as origin of local frames.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Position {
    /// ECEF coordinates in meters
    pub(crate) ecef: Vector3<f64>,
    /// Geodetic coordinates in radians
    pub(crate) geodetic: Vector3<f64>,
}

impl Position {
    /// Builds new [Position] from ECEF coordinates expressed in meter.
    pub fn from_ecef(ecef: Vector3<f64>) -> Self {
        let (x, y, z) = (ecef[0], ecef[1], ecef[2]);
        let (lat, lon, h) = ecef2geodetic(x, y, z, Ellipsoid::WGS84);
        Self {
            ecef,
            geodetic: Vector3::new(lat, lon, h),
        }
    }
    /// Returns ECEF coordinates.
    pub fn ecef(&self) -> Vector3<f64> {
        self.ecef
    }
    /// Returns Geodetic coordinates
    /// - latitude [rad]
    /// - longitude [rad]
    /// - altitude above the ellipsoid [m]
    pub fn geodetic(&self) -> Vector3<f64> {
        self.geodetic
    }
    /// Expresses the ECEF coordinates `ecef` as an (East, North, Up) offset
    /// to this [Position], in meters.
    pub fn enu_offset(&self, ecef: &Vector3<f64>) -> (f64, f64, f64) {
        let r = ecef_to_neu(self.geodetic[0], self.geodetic[1]);
        let neu = r * (ecef - self.ecef);
        (neu[1], neu[0], neu[2])
    }
}

/// Rotation from ECEF axes to the local (North, East, Up) axes
/// at given latitude and longitude, in radians.
pub(crate) fn ecef_to_neu(lat_rad: f64, lon_rad: f64) -> Matrix3<f64> {
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_lon, cos_lon) = lon_rad.sin_cos();
    Matrix3::<f64>::new(
        -sin_lat * cos_lon,
        -sin_lat * sin_lon,
        cos_lat,
        -sin_lon,
        cos_lon,
        0.0_f64,
        cos_lat * cos_lon,
        cos_lat * sin_lon,
        sin_lat,
    )
}
