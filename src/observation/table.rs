use std::{
    fs::File,
    io::{BufRead, BufReader, Lines},
    path::Path,
    str::FromStr,
};

use crate::{
    observation::{RawEpoch, RawObservation, RawSatObservations},
    prelude::SV,
    Error,
};

/// [ObservationTableReader] streams [RawEpoch]s from a text table.
/// Each epoch is described by a `<timestamp> <count>` header line,
/// followed by `count` lines of `<sv> <code> <value>`, for example
/// `G05 C1 21000000.125`. A `-` value marks a missing observation.
pub struct ObservationTableReader<R: BufRead> {
    lines: Lines<R>,
    line: usize,
    done: bool,
}

impl ObservationTableReader<BufReader<File>> {
    /// Opens an observation table.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let fd = File::open(path).map_err(|source| Error::SourceOpen {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(BufReader::new(fd)))
    }
}

impl<R: BufRead> ObservationTableReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            line: 0,
            done: false,
            lines: reader.lines(),
        }
    }

    fn next_line(&mut self) -> Option<Result<String, Error>> {
        let content = self.lines.next()?;
        self.line += 1;
        Some(content.map_err(Error::Read))
    }

    fn parsing_error(&self, cause: String) -> Error {
        Error::ObservationParsing {
            line: self.line,
            cause,
        }
    }

    fn parse<T: FromStr>(&self, item: Option<&str>, name: &str) -> Result<T, Error> {
        let item = item.ok_or_else(|| self.parsing_error(format!("missing {}", name)))?;
        item.parse::<T>()
            .map_err(|_| self.parsing_error(format!("invalid {} \"{}\"", name, item)))
    }

    fn parse_epoch(&mut self, header: &str) -> Result<RawEpoch, Error> {
        let mut items = header.split_whitespace();
        let t = self.parse::<f64>(items.next(), "timestamp")?;
        let count = self.parse::<usize>(items.next(), "observation count")?;

        let mut satellites = Vec::<RawSatObservations>::new();

        for _ in 0..count {
            let content = match self.next_line() {
                Some(content) => content?,
                None => {
                    return Err(self.parsing_error(format!(
                        "unexpected end of data while reading {} observations",
                        count
                    )))
                },
            };

            let mut items = content.split_whitespace();
            let sv = self.parse::<SV>(items.next(), "satellite")?;
            let code = items
                .next()
                .ok_or_else(|| self.parsing_error("missing observation code".to_string()))?;

            let observation = match items.next() {
                Some("-") => RawObservation::missing(code),
                value => RawObservation::new(code, self.parse::<f64>(value, "observation")?),
            };

            match satellites.iter_mut().find(|sat| sat.sv == sv) {
                Some(sat) => sat.observations.push(observation),
                None => satellites.push(RawSatObservations {
                    sv,
                    observations: vec![observation],
                }),
            }
        }

        Ok(RawEpoch { t, satellites })
    }
}

impl<R: BufRead> Iterator for ObservationTableReader<R> {
    type Item = Result<RawEpoch, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let header = loop {
            match self.next_line() {
                Some(Ok(content)) if content.trim().is_empty() => continue,
                Some(Ok(content)) => break content,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                },
                None => {
                    self.done = true;
                    return None;
                },
            }
        };

        let epoch = self.parse_epoch(&header);
        if epoch.is_err() {
            self.done = true;
        }
        Some(epoch)
    }
}
