use std::{io::Cursor, str::FromStr};

use crate::{
    cfg::ObservationFilter,
    prelude::{
        Constellation, Error, ObservationEpoch, ObservationSample, ObservationSource,
        ObservationTableReader, RawEpoch, RawObservation, RawSatObservations, SV,
    },
    tests::init_logger,
};

const OBSERVATIONS: &str = "345600.0 6
G02 C1 21000000.125
G02 L1 110000000.5
G05 C1 -
G05 P2 22000000.0
E11 C1 23000000.0
G12 C1 24000000.75

345630.0 1
G02 C1 21000030.0
";

#[test]
fn table_reader() {
    init_logger();
    let mut reader = ObservationTableReader::new(Cursor::new(OBSERVATIONS));

    let first = reader.next_epoch().unwrap().unwrap();
    assert_eq!(first.t, 345600.0);
    assert_eq!(first.satellites.len(), 4);

    let g02 = &first.satellites[0];
    assert_eq!(g02.sv, SV::new(Constellation::GPS, 2));
    assert_eq!(
        g02.observations,
        vec![
            RawObservation::new("C1", 21000000.125),
            RawObservation::new("L1", 110000000.5),
        ]
    );

    let g05 = &first.satellites[1];
    assert_eq!(g05.sv, SV::new(Constellation::GPS, 5));
    assert!(!g05.observations[0].present);
    assert!(g05.observations[1].present);

    assert_eq!(first.satellites[2].sv, SV::new(Constellation::Galileo, 11));

    let second = reader.next_epoch().unwrap().unwrap();
    assert_eq!(second.t, 345630.0);
    assert_eq!(second.satellites.len(), 1);

    assert!(reader.next_epoch().is_none());
    assert!(reader.next_epoch().is_none());
}

#[test]
fn truncated_stream() {
    let content = "100.0 1\nG02 C1 21000000.0\n130.0 2\nG02 C1 21000000.0\n";
    let mut reader = ObservationTableReader::new(Cursor::new(content));
    assert!(reader.next_epoch().unwrap().is_ok());
    match reader.next_epoch() {
        Some(Err(Error::ObservationParsing { line, .. })) => assert_eq!(line, 4),
        other => panic!("expecting parsing error, got {:?}", other),
    }
    assert!(reader.next_epoch().is_none(), "stream must stop after an error");
}

#[test]
fn malformed_stream() {
    for content in [
        "one 1\nG02 C1 1.0\n",
        "100.0 1\n?? C1 1.0\n",
        "100.0 1\nG02\n",
        "100.0 1\nG02 C1 abc\n",
    ] {
        let mut reader = ObservationTableReader::new(Cursor::new(content));
        assert!(
            matches!(
                reader.next_epoch(),
                Some(Err(Error::ObservationParsing { .. }))
            ),
            "{:?} should not parse",
            content
        );
    }
}

#[test]
fn missing_source() {
    match ObservationTableReader::from_file("/non/existing/obsdata.txt") {
        Err(Error::SourceOpen { path, .. }) => assert_eq!(path, "/non/existing/obsdata.txt"),
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("should not open"),
    }
}

#[test]
fn gps_c1_selection() {
    init_logger();
    let mut reader = ObservationTableReader::new(Cursor::new(OBSERVATIONS));
    let raw = reader.next_epoch().unwrap().unwrap();

    let epoch = ObservationEpoch::from_raw(&raw, &ObservationFilter::default());
    assert_eq!(epoch.t, 345600.0);
    assert_eq!(
        epoch.samples,
        vec![
            ObservationSample {
                prn: 2,
                pseudorange_m: 21000000.125,
            },
            ObservationSample {
                prn: 12,
                pseudorange_m: 24000000.75,
            },
        ]
    );
    assert_eq!(epoch.pseudorange(12), Some(24000000.75));
    assert_eq!(epoch.pseudorange(5), None, "missing observation");
    assert_eq!(epoch.pseudorange(11), None, "other constellation");

    let p2 = ObservationFilter {
        constellation: Constellation::GPS,
        code: "P2".to_string(),
    };
    let epoch = ObservationEpoch::from_raw(&raw, &p2);
    assert_eq!(epoch.len(), 1);
    assert_eq!(epoch.pseudorange(5), Some(22000000.0));

    let galileo = ObservationFilter {
        constellation: Constellation::Galileo,
        code: "C1".to_string(),
    };
    let epoch = ObservationEpoch::from_raw(&raw, &galileo);
    assert_eq!(epoch.pseudorange(11), Some(23000000.0));
}

#[test]
fn first_observation_wins() {
    init_logger();
    let raw = RawEpoch {
        t: 10.0,
        satellites: vec![
            RawSatObservations {
                sv: SV::from_str("G07").unwrap(),
                observations: vec![
                    RawObservation::new("C1", 20000000.0),
                    RawObservation::new("C1", 20000010.0),
                ],
            },
            RawSatObservations {
                sv: SV::from_str("G07").unwrap(),
                observations: vec![RawObservation::new("C1", 20000020.0)],
            },
            RawSatObservations {
                sv: SV::from_str("G08").unwrap(),
                observations: vec![RawObservation::new("C1", f64::NAN)],
            },
        ],
    };
    let epoch = ObservationEpoch::from_raw(&raw, &ObservationFilter::default());
    assert_eq!(epoch.len(), 1);
    assert_eq!(epoch.pseudorange(7), Some(20000000.0));
}

#[test]
fn iterator_source() {
    let mut source = vec![
        Ok(RawEpoch {
            t: 0.0,
            satellites: vec![],
        }),
        Err(Error::Read(std::io::Error::other("disconnected"))),
    ]
    .into_iter();
    assert!(source.next_epoch().unwrap().is_ok());
    assert!(matches!(source.next_epoch(), Some(Err(Error::Read(_)))));
    assert!(source.next_epoch().is_none());
}
