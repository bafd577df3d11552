//! Observation / satellite position pairing
use itertools::Itertools;
use log::{debug, trace};

use crate::{
    catalog::{SatelliteEpochCatalog, SatellitePosition},
    cfg::MatchingOpts,
    constants::MIN_SATELLITES,
    observation::ObservationEpoch,
    Error,
};

/// Satellites both observed and positioned at one epoch.
/// `satellites[i]` was observed with `pseudoranges[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedEpoch {
    /// Observation timestamp (GPS seconds of week)
    pub t: f64,
    /// Satellites, in catalog order
    pub satellites: Vec<SatellitePosition>,
    /// Raw pseudo ranges [m]
    pub pseudoranges: Vec<f64>,
}

impl MatchedEpoch {
    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }
}

/// [EpochMatcher] pairs observation epochs with the [SatelliteEpochCatalog].
pub struct EpochMatcher<'a> {
    catalog: &'a SatelliteEpochCatalog,
    opts: MatchingOpts,
}

impl<'a> EpochMatcher<'a> {
    pub fn new(catalog: &'a SatelliteEpochCatalog, opts: &MatchingOpts) -> Self {
        Self {
            catalog,
            opts: opts.clone(),
        }
    }

    /// Pairs this [ObservationEpoch] with the catalog entry sharing its timestamp.
    /// ## Returns
    /// - [Error::MatchMiss] when no catalog entry exists at this instant
    /// - [Error::InsufficientGeometry] when less than the required number
    ///   of satellites are both observed and positioned
    pub fn match_epoch(&self, epoch: &ObservationEpoch) -> Result<MatchedEpoch, Error> {
        let set = self
            .catalog
            .lookup(epoch.t, self.opts.tolerance_s)
            .ok_or(Error::MatchMiss(epoch.t))?;

        let (satellites, pseudoranges): (Vec<_>, Vec<_>) = set
            .satellites
            .iter()
            .filter_map(|sat| epoch.pseudorange(sat.prn).map(|pr| (*sat, pr)))
            .unzip();

        trace!(
            "{:.3}: matched prn={}",
            epoch.t,
            satellites.iter().map(|sat| sat.prn).join(",")
        );

        if satellites.len() < self.opts.min_satellites.max(MIN_SATELLITES) {
            debug!(
                "{:.3}: {} observed, {} positioned, {} in common",
                epoch.t,
                epoch.len(),
                set.satellites.len(),
                satellites.len()
            );
            return Err(Error::InsufficientGeometry {
                t: epoch.t,
                found: satellites.len(),
            });
        }

        Ok(MatchedEpoch {
            t: epoch.t,
            satellites,
            pseudoranges,
        })
    }
}
