mod cfg;
mod dop;
mod observation;

use log::LevelFilter;
use std::sync::Once;

use crate::{
    catalog::SatellitePosition,
    position::{ecef_to_neu, Position},
    prelude::Vector3,
};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}

/// Reference station, ECEF [m]
pub const STATION_ECEF_M: (f64, f64, f64) = (-1641890.118, -3664879.354, 4939969.421);

/// Typical range to a GPS satellite [m]
pub const SV_RANGE_M: f64 = 22_000_000.0;

pub fn station() -> Vector3<f64> {
    Vector3::new(STATION_ECEF_M.0, STATION_ECEF_M.1, STATION_ECEF_M.2)
}

/// Healthy geometry: (prn, azimuth°, elevation°)
pub const SKYVIEW: [(u8, f64, f64); 6] = [
    (2, 15.0, 65.0),
    (5, 95.0, 35.0),
    (12, 170.0, 50.0),
    (17, 250.0, 25.0),
    (24, 310.0, 40.0),
    (29, 200.0, 15.0),
];

/// Places satellites at `range_m` from `rx`, in the given
/// (prn, azimuth°, elevation°) directions.
pub fn satellites_in_view(
    rx: &Vector3<f64>,
    skyview: &[(u8, f64, f64)],
    range_m: f64,
) -> Vec<SatellitePosition> {
    let geodetic = Position::from_ecef(*rx).geodetic();
    let neu_to_ecef = ecef_to_neu(geodetic[0], geodetic[1]).transpose();

    skyview
        .iter()
        .map(|(prn, azim, elev)| {
            let (azim, elev) = (azim.to_radians(), elev.to_radians());
            let neu = Vector3::new(
                elev.cos() * azim.cos(),
                elev.cos() * azim.sin(),
                elev.sin(),
            );
            let sat = rx + neu_to_ecef * neu * range_m;
            SatellitePosition::new(*prn, (sat[0], sat[1], sat[2]), 0.0)
        })
        .collect()
}

/// Noise free pseudo ranges, for this receiver position and clock bias [m]
pub fn pseudoranges(
    rx: &Vector3<f64>,
    clock_bias_m: f64,
    satellites: &[SatellitePosition],
) -> Vec<f64> {
    satellites
        .iter()
        .map(|sat| (sat.position - rx).norm() - clock_bias_m + sat.correction_m)
        .collect()
}
