use nalgebra::Matrix4;

use crate::{position::ecef_to_neu, solver::checked_inverse, Error};

/// [DilutionOfPrecision] of one solution, expressed in the
/// local (North, East, Up) frame.
#[derive(Debug, Clone, Default, Copy, PartialEq)]
pub struct DilutionOfPrecision {
    /// North DOP
    pub ndop: f64,

    /// East DOP
    pub edop: f64,

    /// Vertical DOP
    pub vdop: f64,

    /// Temporal DOP
    pub tdop: f64,

    /// Horizontal DOP
    pub hdop: f64,

    /// Position DOP
    pub pdop: f64,

    /// Geometric DOP
    pub gdop: f64,
}

impl std::fmt::Display for DilutionOfPrecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hdop={:.3} vdop={:.3} pdop={:.3} gdop={:.3} tdop={:.3}",
            self.hdop, self.vdop, self.pdop, self.gdop, self.tdop
        )
    }
}

impl DilutionOfPrecision {
    /// Rotation from (x, y, z, t) ECEF to (n, e, u, t) local axes.
    /// The time component passes through.
    pub(crate) fn rotation(lat_rad: f64, lon_rad: f64) -> Matrix4<f64> {
        let mut r = Matrix4::<f64>::identity();
        r.fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&ecef_to_neu(lat_rad, lon_rad));
        r
    }

    /// Rotates the ECEF covariance into the local frame: QL = R Qx Rᵗ.
    pub fn q_local(q: &Matrix4<f64>, lat_rad: f64, lon_rad: f64) -> Matrix4<f64> {
        let r = Self::rotation(lat_rad, lon_rad);
        r * q * r.transpose()
    }

    /// Creates new [DilutionOfPrecision].
    ///
    /// ## Input
    /// - q: (AᵗA)⁻¹ covariance matrix, in ECEF frame
    /// - lat_rad, lon_rad: local frame origin
    pub fn from_covariance(q: &Matrix4<f64>, lat_rad: f64, lon_rad: f64) -> Result<Self, Error> {
        let q_l = Self::q_local(q, lat_rad, lon_rad);

        let diagonal = q_l.diagonal();
        if diagonal.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::InvalidCovariance);
        }

        let (ndop, edop, vdop, tdop) = (
            diagonal[0].sqrt(),
            diagonal[1].sqrt(),
            diagonal[2].sqrt(),
            diagonal[3].sqrt(),
        );

        let hdop = (ndop.powi(2) + edop.powi(2)).sqrt();
        let pdop = (hdop.powi(2) + vdop.powi(2)).sqrt();
        let gdop = (pdop.powi(2) + tdop.powi(2)).sqrt();

        Ok(Self {
            ndop,
            edop,
            vdop,
            tdop,
            hdop,
            pdop,
            gdop,
        })
    }

    /// Creates new [DilutionOfPrecision] from the normal matrix N = AᵗA,
    /// which is inverted first.
    pub fn from_normal_matrix(
        n: &Matrix4<f64>,
        lat_rad: f64,
        lon_rad: f64,
        max_condition_number: f64,
    ) -> Result<Self, Error> {
        let q = checked_inverse(n, max_condition_number)?;
        Self::from_covariance(&q, lat_rad, lon_rad)
    }
}
