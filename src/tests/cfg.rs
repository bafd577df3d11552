use std::str::FromStr;

use rstest::*;

use crate::{
    cfg::Error,
    prelude::{
        Config, Constellation, MatchingOpts, ObservationFilter, OutputFormat, ReferencePoint,
        SolverOpts, UncertaintyOpts,
    },
};

#[test]
fn default_config() {
    let cfg = Config::default();
    assert!(cfg.validate().is_ok());

    assert_eq!(cfg.solver.max_iterations, 100);
    assert_eq!(cfg.solver.convergence_threshold_m, 1.0E-5);
    assert_eq!(cfg.matching.tolerance_s, 1.0E-3);
    assert_eq!(cfg.matching.min_satellites, 4);
    assert_eq!(cfg.observation.constellation, Constellation::GPS);
    assert_eq!(cfg.observation.code, "C1");
    assert_eq!(cfg.reference, ReferencePoint::Estimate);
    assert_eq!(cfg.output, OutputFormat::Dop);
    assert!(cfg.truth.is_none());
    assert!(cfg.uncertainty.is_none());

    let sigma = UncertaintyOpts::default();
    assert_eq!((sigma.east_m, sigma.north_m, sigma.up_m), (1.5, 1.5, 3.5));
}

#[test]
fn builders() {
    let cfg = Config::default()
        .with_output(OutputFormat::Full)
        .with_reference(ReferencePoint::Fixed {
            latitude_ddeg: 51.08,
            longitude_ddeg: -114.13,
        })
        .with_truth((1.0, 2.0, 3.0));

    assert_eq!(cfg.output, OutputFormat::Full);
    assert_eq!(cfg.truth, Some((1.0, 2.0, 3.0)));
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.reference.to_string(), "lat=51.080000°, lon=-114.130000°");
}

#[test]
fn invalid_configs() {
    let default = Config::default();

    let mut cfg = default.clone();
    cfg.solver = SolverOpts {
        max_iterations: 0,
        ..Default::default()
    };
    assert!(matches!(cfg.validate(), Err(Error::NullIterations)));

    for threshold in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let mut cfg = default.clone();
        cfg.solver.convergence_threshold_m = threshold;
        assert!(matches!(
            cfg.validate(),
            Err(Error::InvalidConvergenceThreshold)
        ));
    }

    let mut cfg = default.clone();
    cfg.solver.max_condition_number = 0.5;
    assert!(matches!(cfg.validate(), Err(Error::InvalidConditionNumber)));

    for tolerance in [-1.0E-3, 1.0, f64::NAN] {
        let mut cfg = default.clone();
        cfg.matching = MatchingOpts {
            tolerance_s: tolerance,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::InvalidTolerance)));
    }

    let mut cfg = default.clone();
    cfg.matching.min_satellites = 3;
    assert!(matches!(cfg.validate(), Err(Error::MinimalSatellites)));

    let mut cfg = default.clone();
    cfg.observation = ObservationFilter {
        constellation: Constellation::GPS,
        code: " ".to_string(),
    };
    assert!(matches!(cfg.validate(), Err(Error::EmptyObservationCode)));

    let cfg = default.with_reference(ReferencePoint::Fixed {
        latitude_ddeg: 91.0,
        longitude_ddeg: 0.0,
    });
    assert!(matches!(cfg.validate(), Err(Error::InvalidLatitude)));

    for up_m in [0.0, -3.5, f64::NAN] {
        let cfg = default.with_uncertainty(UncertaintyOpts {
            up_m,
            ..Default::default()
        });
        assert!(matches!(cfg.validate(), Err(Error::InvalidUncertainty)));
    }
    assert!(default
        .with_uncertainty(UncertaintyOpts::default())
        .validate()
        .is_ok());
}

#[rstest]
#[case("minimal", OutputFormat::Minimal)]
#[case("txt", OutputFormat::Minimal)]
#[case("DOP", OutputFormat::Dop)]
#[case("csv", OutputFormat::Dop)]
#[case(" full ", OutputFormat::Full)]
fn output_format_parsing(#[case] desc: &str, #[case] expected: OutputFormat) {
    let format = OutputFormat::from_str(desc).unwrap();
    assert_eq!(format, expected);
    assert_eq!(OutputFormat::from_str(&format.to_string()).unwrap(), format);
}

#[test]
fn unknown_output_format() {
    assert!(matches!(
        OutputFormat::from_str("xml"),
        Err(Error::UnknownOutputFormat(_))
    ));
}

#[cfg(feature = "serde")]
#[test]
fn json_config() {
    let cfg: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, Config::default());

    let cfg: Config = serde_json::from_str(
        r#"{
            "solver": {
                "max_iterations": 20
            },
            "matching": {
                "tolerance_s": 0.0
            },
            "reference": {
                "Fixed": {
                    "latitude_ddeg": 51.08,
                    "longitude_ddeg": -114.13
                }
            },
            "truth": [-1641890.118, -3664879.354, 4939969.421],
            "uncertainty": {
                "up_m": 4.0
            },
            "output": "Full"
        }"#,
    )
    .unwrap();

    assert_eq!(cfg.solver.max_iterations, 20);
    assert_eq!(cfg.solver.convergence_threshold_m, 1.0E-5);
    assert_eq!(cfg.matching.tolerance_s, 0.0);
    assert_eq!(cfg.matching.min_satellites, 4);
    assert_eq!(cfg.observation, ObservationFilter::default());
    assert_eq!(
        cfg.reference,
        ReferencePoint::Fixed {
            latitude_ddeg: 51.08,
            longitude_ddeg: -114.13
        }
    );
    assert_eq!(cfg.truth, Some((-1641890.118, -3664879.354, 4939969.421)));
    assert_eq!(
        cfg.uncertainty,
        Some(UncertaintyOpts {
            east_m: 1.5,
            north_m: 1.5,
            up_m: 4.0
        })
    );
    assert_eq!(cfg.output, OutputFormat::Full);
    assert!(cfg.validate().is_ok());
}
