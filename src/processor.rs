//! Epoch processing loop
use log::{debug, error, info, warn};

use crate::{
    catalog::SatelliteEpochCatalog,
    cfg::Config,
    matcher::EpochMatcher,
    observation::{ObservationEpoch, ObservationSource},
    output::{EpochRecord, ResultSink},
    position::Position,
    prelude::Vector3,
    solver::Solver,
    statistics::ErrorStatistics,
    Error,
};

/// Session report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Epochs read from the observation source
    pub epochs: usize,
    /// Epochs written to the result sink
    pub solved: usize,
    /// Epochs without any selected observation
    pub empty: usize,
    /// Epochs without satellite positions
    pub missed: usize,
    /// Epochs with less than 4 usable satellites
    pub insufficient: usize,
    /// Epochs rejected due to singular geometry or invalid numerical state
    pub singular: usize,
    /// Epochs that did not converge within the iteration limit
    pub unconverged: usize,
    /// ENU error statistics, when station coordinates are known
    pub statistics: ErrorStatistics,
}

impl RunSummary {
    /// Epochs that were skipped
    pub fn skipped(&self) -> usize {
        self.empty + self.missed + self.insufficient + self.singular
    }

    fn reject(&mut self, e: &Error) {
        match e {
            Error::MatchMiss(_) => self.missed += 1,
            Error::InsufficientGeometry { .. } | Error::MatrixMinimalDimension => {
                self.insufficient += 1
            },
            _ => self.singular += 1,
        }
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} epochs: {} solved ({} unconverged), {} without observations, {} unmatched, {} with insufficient geometry, {} singular",
            self.epochs,
            self.solved,
            self.unconverged,
            self.empty,
            self.missed,
            self.insufficient,
            self.singular
        )
    }
}

/// [Processor] runs the complete match, solve, DOP and write sequence,
/// one epoch at a time, against a read only [SatelliteEpochCatalog].
pub struct Processor<'a> {
    cfg: Config,
    solver: Solver,
    matcher: EpochMatcher<'a>,
    truth: Option<Position>,
}

impl<'a> Processor<'a> {
    pub fn new(cfg: &Config, catalog: &'a SatelliteEpochCatalog) -> Self {
        let truth = cfg
            .truth
            .map(|(x, y, z)| Position::from_ecef(Vector3::new(x, y, z)));

        if let Some(truth) = &truth {
            let geodetic = truth.geodetic();
            info!(
                "station coordinates lat={:.6}°, lon={:.6}°, h={:.3}m",
                geodetic[0].to_degrees(),
                geodetic[1].to_degrees(),
                geodetic[2]
            );
        }

        Self {
            truth,
            cfg: cfg.clone(),
            solver: Solver::new(&cfg.solver),
            matcher: EpochMatcher::new(catalog, &cfg.matching),
        }
    }

    /// Resolves one [ObservationEpoch].
    /// Returned errors only concern this epoch.
    pub fn process_epoch(&self, epoch: &ObservationEpoch) -> Result<EpochRecord, Error> {
        let matched = self.matcher.match_epoch(epoch)?;

        let solution = self
            .solver
            .solve(&matched.satellites, &matched.pseudoranges)?;

        let (lat_rad, lon_rad) = self
            .cfg
            .reference
            .lat_lon_rad(&solution.estimate.position);

        let dop = solution.dop(lat_rad, lon_rad)?;

        let enu_error = self
            .truth
            .as_ref()
            .map(|truth| truth.enu_offset(&solution.estimate.position));

        let uncertainty = self.cfg.uncertainty.map(|sigma| sigma.scale(&dop));

        debug!(
            "{:.3}: {} ({} sv, {} iter, rms={:.3}m) {}",
            epoch.t,
            solution.estimate,
            solution.num_satellites(),
            solution.iterations,
            solution.residuals_rms(),
            dop
        );

        if !solution.converged {
            warn!("{:.3}: solution did not converge", epoch.t);
        }

        Ok(EpochRecord {
            t: epoch.t,
            estimate: solution.estimate,
            dop: Some(dop),
            num_satellites: solution.num_satellites(),
            converged: solution.converged,
            enu_error,
            uncertainty,
        })
    }

    /// Consumes the [ObservationSource] entirely, writing one record per solved epoch.
    /// Epochs that cannot be solved are skipped. A read or write error stops
    /// the processing: the records written so far are flushed and the error is returned.
    pub fn run<S: ObservationSource, K: ResultSink>(
        &self,
        source: &mut S,
        sink: &mut K,
    ) -> Result<RunSummary, Error> {
        let mut summary = RunSummary::default();

        while let Some(raw) = source.next_epoch() {
            let raw = match raw {
                Ok(raw) => raw,
                Err(e) => {
                    error!("{}", e);
                    sink.flush()?;
                    return Err(e);
                },
            };

            summary.epochs += 1;

            let epoch = ObservationEpoch::from_raw(&raw, &self.cfg.observation);
            if epoch.is_empty() {
                debug!(
                    "{:.3}: no {} {} observation",
                    raw.t, self.cfg.observation.constellation, self.cfg.observation.code
                );
                summary.empty += 1;
                continue;
            }

            match self.process_epoch(&epoch) {
                Ok(record) => {
                    if let Err(e) = sink.write_record(&record) {
                        error!("{}", e);
                        if let Err(flush) = sink.flush() {
                            error!("{}", flush);
                        }
                        return Err(e);
                    }
                    if let Some(enu) = record.enu_error {
                        summary.statistics.add(enu);
                    }
                    if !record.converged {
                        summary.unconverged += 1;
                    }
                    summary.solved += 1;
                },
                Err(e) if e.is_epoch_local() => {
                    match e {
                        Error::MatchMiss(_) => debug!("{}", e),
                        Error::InsufficientGeometry { .. } => warn!("{}", e),
                        _ => warn!("{:.3}: {}", epoch.t, e),
                    }
                    summary.reject(&e);
                },
                Err(e) => {
                    error!("{:.3}: {}", epoch.t, e);
                    sink.flush()?;
                    return Err(e);
                },
            }
        }

        sink.flush()?;
        info!("{}", summary);
        Ok(summary)
    }
}
