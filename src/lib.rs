#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

// private modules
mod catalog;
mod cfg;
mod constants;
mod dop;
mod error;
mod matcher;
mod observation;
mod output;
mod position;
mod processor;
mod solver;
mod statistics;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::catalog::{SatelliteEpochCatalog, SatelliteEpochSet, SatellitePosition};
    pub use crate::cfg::{
        Config, Error as ConfigError, MatchingOpts, ObservationFilter, OutputFormat,
        ReferencePoint, SolverOpts, UncertaintyOpts,
    };
    pub use crate::dop::DilutionOfPrecision;
    pub use crate::error::Error;
    pub use crate::matcher::{EpochMatcher, MatchedEpoch};
    pub use crate::observation::{
        ObservationEpoch, ObservationSample, ObservationSource, ObservationTableReader,
        RawEpoch, RawObservation, RawSatObservations,
    };
    pub use crate::output::{EpochRecord, ResultSink, ResultWriter};
    pub use crate::position::Position;
    pub use crate::processor::{Processor, RunSummary};
    pub use crate::solver::{ReceiverEstimate, Solution, Solver};
    pub use crate::statistics::{AxisStatistics, ErrorStatistics};
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use nalgebra::{Matrix4, Vector3, Vector4};
}

// pub export
pub use error::Error;
