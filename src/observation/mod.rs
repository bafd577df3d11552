//! Observation epochs, as streamed by the observation source
use log::{debug, warn};

use crate::{cfg::ObservationFilter, prelude::SV, Error};

mod table;
pub use table::ObservationTableReader;

/// One observation, as described by the source
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    /// Observation code, like "C1" or "L1"
    pub code: String,
    /// Observed value
    pub value: f64,
    /// False when the receiver did not produce this observation
    pub present: bool,
}

impl RawObservation {
    /// Builds a present [RawObservation]
    pub fn new(code: &str, value: f64) -> Self {
        Self {
            code: code.to_string(),
            value,
            present: true,
        }
    }

    /// Builds a missing [RawObservation]
    pub fn missing(code: &str) -> Self {
        Self {
            code: code.to_string(),
            value: 0.0,
            present: false,
        }
    }
}

/// All observations of one satellite at one epoch
#[derive(Debug, Clone, PartialEq)]
pub struct RawSatObservations {
    pub sv: SV,
    pub observations: Vec<RawObservation>,
}

/// One unfiltered epoch, as produced by an [ObservationSource]
#[derive(Debug, Clone, PartialEq)]
pub struct RawEpoch {
    /// GPS seconds of week
    pub t: f64,
    pub satellites: Vec<RawSatObservations>,
}

/// [ObservationSource] streams [RawEpoch]s in chronological order.
/// A returned error terminates the stream.
pub trait ObservationSource {
    /// Reads next epoch. Returns None once all data has been consumed.
    fn next_epoch(&mut self) -> Option<Result<RawEpoch, Error>>;
}

impl<I: Iterator<Item = Result<RawEpoch, Error>>> ObservationSource for I {
    fn next_epoch(&mut self) -> Option<Result<RawEpoch, Error>> {
        self.next()
    }
}

/// Pseudo range of one satellite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationSample {
    pub prn: u8,
    /// Raw pseudo range [m]
    pub pseudorange_m: f64,
}

/// Pseudo ranges observed at one epoch, restricted to one
/// constellation and one observation code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationEpoch {
    /// GPS seconds of week
    pub t: f64,
    /// At most one sample per PRN
    pub samples: Vec<ObservationSample>,
}

impl ObservationEpoch {
    /// Builds [ObservationEpoch] from its samples
    pub fn new(t: f64, samples: Vec<ObservationSample>) -> Self {
        Self { t, samples }
    }

    /// Retains the observations matching [ObservationFilter] from this [RawEpoch].
    pub fn from_raw(raw: &RawEpoch, filter: &ObservationFilter) -> Self {
        let mut samples = Vec::<ObservationSample>::with_capacity(raw.satellites.len());

        for sat in raw.satellites.iter() {
            if sat.sv.constellation != filter.constellation {
                continue;
            }

            for observation in sat.observations.iter() {
                if observation.code != filter.code || !observation.present {
                    continue;
                }

                if !observation.value.is_finite() {
                    debug!("{:.3}: {} non finite {}", raw.t, sat.sv, filter.code);
                    continue;
                }

                if samples.iter().any(|sample| sample.prn == sat.sv.prn) {
                    warn!(
                        "{:.3}: {} multiple {} observations, keeping first",
                        raw.t, sat.sv, filter.code
                    );
                    continue;
                }

                samples.push(ObservationSample {
                    prn: sat.sv.prn,
                    pseudorange_m: observation.value,
                });
            }
        }

        Self { t: raw.t, samples }
    }

    /// Returns pseudo range [m] observed for this PRN
    pub fn pseudorange(&self, prn: u8) -> Option<f64> {
        self.samples
            .iter()
            .find(|sample| sample.prn == prn)
            .map(|sample| sample.pseudorange_m)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
