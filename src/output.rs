//! Result file production
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    cfg::OutputFormat, dop::DilutionOfPrecision, solver::ReceiverEstimate, Error,
};

/// Result of one solved epoch
#[derive(Debug, Clone, PartialEq)]
pub struct EpochRecord {
    /// GPS seconds of week
    pub t: f64,
    pub estimate: ReceiverEstimate,
    pub dop: Option<DilutionOfPrecision>,
    /// Number of satellites used
    pub num_satellites: usize,
    /// False when the iteration limit was reached first
    pub converged: bool,
    /// (East, North, Up) error to the known station coordinates [m]
    pub enu_error: Option<(f64, f64, f64)>,
    /// (East, North, Up) DOP scaled uncertainty [m]
    pub uncertainty: Option<(f64, f64, f64)>,
}

/// [ResultSink] persists one record per solved epoch.
pub trait ResultSink {
    fn write_record(&mut self, record: &EpochRecord) -> Result<(), Error>;
    fn flush(&mut self) -> Result<(), Error>;
}

/// [ResultWriter] formats [EpochRecord]s with fixed 6 decimal precision,
/// following the selected [OutputFormat].
pub struct ResultWriter<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl ResultWriter<BufWriter<File>> {
    /// Creates (or truncates) the result file.
    pub fn create<P: AsRef<Path>>(path: P, format: OutputFormat) -> Result<Self, Error> {
        let path = path.as_ref();
        let fd = File::create(path).map_err(|source| Error::SinkOpen {
            path: path.display().to_string(),
            source,
        })?;
        Self::new(BufWriter::new(fd), format)
    }
}

impl<W: Write> ResultWriter<W> {
    /// Builds new [ResultWriter], writing the header line
    /// right away, when the [OutputFormat] has one.
    pub fn new(mut writer: W, format: OutputFormat) -> Result<Self, Error> {
        if let Some(header) = format.header() {
            writeln!(writer, "{}", header).map_err(Error::Write)?;
        }
        Ok(Self { writer, format })
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn format_record(&self, record: &EpochRecord) -> String {
        let sep = self.format.separator();
        let position = record.estimate.position;

        let mut fields = vec![
            format!("{:.6}", record.t),
            format!("{:.6}", position[0]),
            format!("{:.6}", position[1]),
            format!("{:.6}", position[2]),
            format!("{:.6}", record.estimate.clock_bias_m),
        ];

        if self.format != OutputFormat::Minimal {
            match record.dop {
                Some(dop) => {
                    for value in [dop.hdop, dop.vdop, dop.pdop, dop.gdop] {
                        fields.push(format!("{:.6}", value));
                    }
                },
                None => fields.extend(std::iter::repeat(String::new()).take(4)),
            }
        }

        if self.format == OutputFormat::Full {
            fields.push(record.num_satellites.to_string());
            for enu in [record.enu_error, record.uncertainty] {
                match enu {
                    Some((e, n, u)) => {
                        for value in [e, n, u] {
                            fields.push(format!("{:.6}", value));
                        }
                    },
                    None => fields.extend(std::iter::repeat(String::new()).take(3)),
                }
            }
        }

        fields.join(&sep.to_string())
    }
}

impl<W: Write> ResultSink for ResultWriter<W> {
    fn write_record(&mut self, record: &EpochRecord) -> Result<(), Error> {
        let line = self.format_record(record);
        writeln!(self.writer, "{}", line).map_err(Error::Write)
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.writer.flush().map_err(Error::Write)
    }
}
