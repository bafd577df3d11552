use nalgebra::Matrix4;
use rand::{rngs::SmallRng, Rng, SeedableRng};

use crate::{
    cfg::SolverOpts,
    prelude::{DilutionOfPrecision, Error, Position, Solver},
    tests::{pseudoranges, satellites_in_view, station, SKYVIEW, SV_RANGE_M},
};

fn assert_dop_identities(dop: &DilutionOfPrecision) {
    let eps = 1.0E-9;
    assert!((dop.hdop.powi(2) - dop.ndop.powi(2) - dop.edop.powi(2)).abs() < eps);
    assert!((dop.pdop.powi(2) - dop.hdop.powi(2) - dop.vdop.powi(2)).abs() < eps);
    assert!((dop.gdop.powi(2) - dop.pdop.powi(2) - dop.tdop.powi(2)).abs() < eps);
    for value in [
        dop.ndop, dop.edop, dop.vdop, dop.tdop, dop.hdop, dop.pdop, dop.gdop,
    ] {
        assert!(value.is_finite() && value >= 0.0);
    }
}

#[test]
fn rotation_is_orthonormal() {
    for (lat, lon) in [(0.0_f64, 0.0_f64), (51.08, -114.13), (-33.9, 151.2), (90.0, 0.0)] {
        let r = DilutionOfPrecision::rotation(lat.to_radians(), lon.to_radians());
        let identity = r * r.transpose();
        assert!((identity - Matrix4::<f64>::identity()).norm() < 1.0E-12);
        assert_eq!(r[(3, 3)], 1.0);
        assert_eq!(r[(0, 3)], 0.0);
        assert_eq!(r[(3, 0)], 0.0);
    }
}

#[test]
fn equator_prime_meridian() {
    // at (0°, 0°): North = +z, East = +y, Up = +x
    let q = Matrix4::<f64>::from_diagonal(&nalgebra::Vector4::new(4.0, 9.0, 16.0, 25.0));
    let dop = DilutionOfPrecision::from_covariance(&q, 0.0, 0.0).unwrap();

    assert!((dop.ndop - 4.0).abs() < 1.0E-12);
    assert!((dop.edop - 3.0).abs() < 1.0E-12);
    assert!((dop.vdop - 2.0).abs() < 1.0E-12);
    assert!((dop.tdop - 5.0).abs() < 1.0E-12);
    assert!((dop.hdop - 5.0).abs() < 1.0E-12);
    assert!((dop.pdop - 29.0_f64.sqrt()).abs() < 1.0E-12);
    assert!((dop.gdop - 54.0_f64.sqrt()).abs() < 1.0E-12);
    assert_dop_identities(&dop);
}

#[test]
fn gdop_is_frame_independent() {
    let rx = station();
    let satellites = satellites_in_view(&rx, &SKYVIEW, SV_RANGE_M);
    let pr = pseudoranges(&rx, 0.0, &satellites);
    let solution = Solver::default().solve(&satellites, &pr).unwrap();

    let trace = solution.covariance.trace();

    for (lat, lon) in [(0.0_f64, 0.0_f64), (51.08, -114.13), (-60.0, 100.0)] {
        let dop = solution.dop(lat.to_radians(), lon.to_radians()).unwrap();
        assert!((dop.gdop.powi(2) - trace).abs() < 1.0E-9);
        assert!((dop.tdop.powi(2) - solution.covariance[(3, 3)]).abs() < 1.0E-12);
        assert_dop_identities(&dop);
    }
}

#[test]
fn normal_matrix_and_covariance_agree() {
    let rx = station();
    let satellites = satellites_in_view(&rx, &SKYVIEW, SV_RANGE_M);
    let pr = pseudoranges(&rx, 0.0, &satellites);
    let solution = Solver::default().solve(&satellites, &pr).unwrap();

    let geodetic = Position::from_ecef(rx).geodetic();
    let (lat, lon) = (geodetic[0], geodetic[1]);

    let reused = solution.dop(lat, lon).unwrap();
    let inverted = DilutionOfPrecision::from_normal_matrix(
        &solution.normal,
        lat,
        lon,
        SolverOpts::default().max_condition_number,
    )
    .unwrap();

    assert!((reused.gdop - inverted.gdop).abs() < 1.0E-9);
    assert!((reused.hdop - inverted.hdop).abs() < 1.0E-9);
    assert!((reused.vdop - inverted.vdop).abs() < 1.0E-9);
}

#[test]
fn singular_normal_matrix() {
    let singular = Matrix4::<f64>::from_diagonal(&nalgebra::Vector4::new(1.0, 1.0, 1.0, 0.0));
    assert!(matches!(
        DilutionOfPrecision::from_normal_matrix(&singular, 0.0, 0.0, 1.0E12),
        Err(Error::SingularGeometry(_))
    ));

    let ill_conditioned =
        Matrix4::<f64>::from_diagonal(&nalgebra::Vector4::new(1.0E8, 1.0, 1.0, 1.0E-6));
    assert!(matches!(
        DilutionOfPrecision::from_normal_matrix(&ill_conditioned, 0.0, 0.0, 1.0E12),
        Err(Error::SingularGeometry(_))
    ));

    let mut invalid = Matrix4::<f64>::identity();
    invalid[(1, 2)] = f64::NAN;
    assert!(matches!(
        DilutionOfPrecision::from_normal_matrix(&invalid, 0.0, 0.0, 1.0E12),
        Err(Error::NonFiniteState)
    ));
}

#[test]
fn invalid_covariance() {
    let q = Matrix4::<f64>::from_diagonal(&nalgebra::Vector4::new(1.0, -1.0, 1.0, 1.0));
    assert!(matches!(
        DilutionOfPrecision::from_covariance(&q, 0.0, 0.0),
        Err(Error::InvalidCovariance)
    ));
}

#[test]
fn randomized_identities() {
    let mut rng = SmallRng::seed_from_u64(465);
    let rx = station();

    for _ in 0..32 {
        let num_sv = rng.random_range(4..=12);
        let skyview = (0..num_sv)
            .map(|i| {
                let azim = 360.0 * i as f64 / num_sv as f64 + rng.random_range(0.0..15.0);
                (i as u8 + 1, azim, rng.random_range(10.0..85.0))
            })
            .collect::<Vec<_>>();

        let satellites = satellites_in_view(&rx, &skyview, SV_RANGE_M);
        let pr = pseudoranges(&rx, 100.0, &satellites);
        let solution = Solver::default().solve(&satellites, &pr).unwrap();

        let lat = rng.random_range(-90.0_f64..90.0).to_radians();
        let lon = rng.random_range(-180.0_f64..180.0).to_radians();
        let dop = solution.dop(lat, lon).unwrap();
        assert_dop_identities(&dop);
    }
}
