use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A satellite table record could not be decoded as the expected numeric tuple.
    #[error("satellite table, line {line}: {cause}")]
    CatalogParsing { line: usize, cause: String },

    /// The satellite table ended before the announced number of satellites was consumed.
    #[error("satellite table truncated at line {line}: expected {expected} satellites, found {found}")]
    CatalogTruncated {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Satellites must be uniquely identified within one catalog epoch.
    #[error("satellite table, line {line}: duplicate prn #{prn}")]
    DuplicateSatellite { line: usize, prn: u8 },

    #[error("failed to read satellite table: {0}")]
    CatalogRead(#[source] std::io::Error),

    /// Observation source cannot be opened.
    #[error("failed to open observation source \"{path}\": {source}")]
    SourceOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Output sink cannot be opened.
    #[error("failed to open output \"{path}\": {source}")]
    SinkOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while streaming observations.
    #[error("observation read error: {0}")]
    Read(#[source] std::io::Error),

    /// Malformed observation record while streaming observations.
    #[error("observation source, line {line}: {cause}")]
    ObservationParsing { line: usize, cause: String },

    #[error("output write error: {0}")]
    Write(#[source] std::io::Error),

    /// No catalog entry shares this observation timestamp.
    #[error("{0:.3}: no satellite positions for this epoch")]
    MatchMiss(f64),

    /// Less than 4 satellites are present in both catalog and observations.
    #[error("{t:.3}: not enough satellites ({found})")]
    InsufficientGeometry { t: f64, found: usize },

    /// The solver was presented with less than 4 satellites.
    #[error("not enough satellites to form the design matrix")]
    MatrixMinimalDimension,

    /// Satellites and pseudo ranges must be paired.
    #[error("internal error: {satellites} satellites for {pseudoranges} pseudo ranges")]
    MatrixDimension {
        satellites: usize,
        pseudoranges: usize,
    },

    /// Normal matrix is (nearly) singular: poor or degenerate satellite geometry.
    #[error("singular geometry (condition number {0:.3E})")]
    SingularGeometry(f64),

    #[error("failed to invert matrix")]
    MatrixInversion,

    /// Invalid input or degenerate geometry causing the iteration to diverge.
    #[error("converged to non finite state")]
    NonFiniteState,

    /// Covariance has negative or non finite diagonal terms.
    #[error("invalid covariance matrix")]
    InvalidCovariance,
}

impl Error {
    /// Returns true when this error only invalidates the ongoing epoch,
    /// false when processing should stop.
    pub fn is_epoch_local(&self) -> bool {
        matches!(
            self,
            Self::MatchMiss(_)
                | Self::InsufficientGeometry { .. }
                | Self::MatrixMinimalDimension
                | Self::SingularGeometry(_)
                | Self::MatrixInversion
                | Self::NonFiniteState
                | Self::InvalidCovariance
        )
    }

    /// Returns true for satellite table load failures.
    pub fn is_catalog_error(&self) -> bool {
        matches!(
            self,
            Self::CatalogParsing { .. }
                | Self::CatalogTruncated { .. }
                | Self::DuplicateSatellite { .. }
                | Self::CatalogRead(_)
        )
    }
}
