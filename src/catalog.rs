//! Satellite positions and pseudo range corrections, per epoch
use std::{
    collections::{btree_map::Entry, BTreeMap},
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use itertools::Itertools;
use log::{debug, warn};

use crate::{constants::TIMESTAMP_RESOLUTION_S, prelude::Vector3, Error};

/// [SatellitePosition] at a given epoch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatellitePosition {
    /// PRN number
    pub prn: u8,
    /// ECEF position [m]
    pub position: Vector3<f64>,
    /// Correction [m] to subtract from the raw pseudo range
    pub correction_m: f64,
}

impl SatellitePosition {
    /// Builds new [SatellitePosition] from ECEF coordinates [m]
    /// and pseudo range correction [m].
    pub fn new(prn: u8, ecef_m: (f64, f64, f64), correction_m: f64) -> Self {
        Self {
            prn,
            correction_m,
            position: Vector3::new(ecef_m.0, ecef_m.1, ecef_m.2),
        }
    }
}

/// All [SatellitePosition]s available at one timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteEpochSet {
    /// GPS seconds of week
    pub t: f64,
    /// Satellites, in table order. PRNs are unique.
    pub satellites: Vec<SatellitePosition>,
}

impl SatelliteEpochSet {
    /// Returns [SatellitePosition] for this PRN, if any.
    pub fn satellite(&self, prn: u8) -> Option<&SatellitePosition> {
        self.satellites.iter().find(|sat| sat.prn == prn)
    }
}

/// Millisecond quantized timestamp, used as lookup key.
pub(crate) fn quantize(t: f64) -> i64 {
    (t / TIMESTAMP_RESOLUTION_S).round() as i64
}

/// [SatelliteEpochCatalog] is loaded once and then only read,
/// while observation epochs are processed.
#[derive(Debug, Clone, Default)]
pub struct SatelliteEpochCatalog {
    epochs: BTreeMap<i64, SatelliteEpochSet>,
}

fn parse<T: FromStr>(item: Option<&str>, line: usize, name: &str) -> Result<T, Error> {
    let item = item.ok_or_else(|| Error::CatalogParsing {
        line,
        cause: format!("missing {} field", name),
    })?;
    item.parse::<T>().map_err(|_| Error::CatalogParsing {
        line,
        cause: format!("invalid {} \"{}\"", name, item),
    })
}

impl SatelliteEpochCatalog {
    /// Loads a satellite position table from file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let fd = File::open(path.as_ref()).map_err(Error::CatalogRead)?;
        Self::load(BufReader::new(fd))
    }

    /// Loads a satellite position table. Each epoch is described by a
    /// `<timestamp> <count>` header line, followed by `count` lines of
    /// `<prn> <x> <y> <z> <correction>`. Any malformed or missing record
    /// aborts the whole load.
    pub fn load<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut catalog = Self::default();
        let mut lines = reader
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line));

        loop {
            let (header_line, header) = match lines.next() {
                Some((n, Ok(content))) => (n, content),
                Some((_, Err(e))) => return Err(Error::CatalogRead(e)),
                None => break,
            };

            if header.trim().is_empty() {
                continue;
            }

            let mut items = header.split_whitespace();
            let t = parse::<f64>(items.next(), header_line, "timestamp")?;
            let count = parse::<usize>(items.next(), header_line, "satellite count")?;

            if !t.is_finite() {
                return Err(Error::CatalogParsing {
                    line: header_line,
                    cause: "non finite timestamp".to_string(),
                });
            }

            // announced count is not trusted until all records are read
            let mut satellites = Vec::<SatellitePosition>::new();

            for found in 0..count {
                let (line, content) = match lines.next() {
                    Some((n, Ok(content))) => (n, content),
                    Some((_, Err(e))) => return Err(Error::CatalogRead(e)),
                    None => {
                        return Err(Error::CatalogTruncated {
                            line: header_line,
                            expected: count,
                            found,
                        })
                    },
                };

                let mut items = content.split_whitespace();
                let prn = parse::<u8>(items.next(), line, "prn")?;
                let x = parse::<f64>(items.next(), line, "x coordinate")?;
                let y = parse::<f64>(items.next(), line, "y coordinate")?;
                let z = parse::<f64>(items.next(), line, "z coordinate")?;
                let correction = parse::<f64>(items.next(), line, "correction")?;

                if satellites.iter().any(|sat| sat.prn == prn) {
                    return Err(Error::DuplicateSatellite { line, prn });
                }

                satellites.push(SatellitePosition::new(prn, (x, y, z), correction));
            }

            catalog.insert(SatelliteEpochSet { t, satellites });
        }

        debug!(
            "loaded {} epochs ({} satellite positions)",
            catalog.len(),
            catalog.epochs.values().map(|set| set.satellites.len()).sum::<usize>()
        );
        Ok(catalog)
    }

    /// Builds a [SatelliteEpochCatalog] from already formed [SatelliteEpochSet]s.
    /// Sets with a non finite timestamp are dropped. Within one set,
    /// the first position of each PRN wins.
    pub fn from_epochs<I: IntoIterator<Item = SatelliteEpochSet>>(sets: I) -> Self {
        let mut catalog = Self::default();
        for set in sets {
            if !set.t.is_finite() {
                warn!("non finite satellite epoch is ignored");
                continue;
            }

            let total = set.satellites.len();

            let satellites = set
                .satellites
                .into_iter()
                .unique_by(|sat| sat.prn)
                .collect::<Vec<_>>();

            if satellites.len() != total {
                warn!(
                    "{:.3}: {} duplicate satellite positions are ignored",
                    set.t,
                    total - satellites.len()
                );
            }

            catalog.insert(SatelliteEpochSet {
                t: set.t,
                satellites,
            });
        }
        catalog
    }

    /// Stores new [SatelliteEpochSet]. The first set wins when
    /// two sets share the same (quantized) timestamp.
    fn insert(&mut self, set: SatelliteEpochSet) {
        match self.epochs.entry(quantize(set.t)) {
            Entry::Vacant(entry) => {
                entry.insert(set);
            },
            Entry::Occupied(_) => {
                warn!(
                    "{:.3}: duplicate satellite epoch (prn={}) is ignored",
                    set.t,
                    set.satellites.iter().map(|sat| sat.prn).join(",")
                );
            },
        }
    }

    /// Number of epochs in this catalog.
    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// Iterates epochs in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = &SatelliteEpochSet> + '_ {
        self.epochs.values()
    }

    /// Returns the [SatelliteEpochSet] closest to `t`, if one lies within `tolerance_s`.
    /// A null tolerance requires strict equality.
    pub fn lookup(&self, t: f64, tolerance_s: f64) -> Option<&SatelliteEpochSet> {
        if !t.is_finite() {
            return None;
        }
        let tolerance_s = tolerance_s.max(0.0);
        let (min, max) = (quantize(t - tolerance_s), quantize(t + tolerance_s));
        self.epochs
            .range(min..=max)
            .map(|(_, set)| set)
            .filter(|set| (set.t - t).abs() <= tolerance_s)
            .min_by(|a, b| (a.t - t).abs().total_cmp(&(b.t - t).abs()))
    }
}
