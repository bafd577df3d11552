use clap::{value_parser, Arg, ArgAction, ArgMatches, ColorChoice, Command};
use std::{fs::read_to_string, str::FromStr};

use gnss_lsq::prelude::{Config, OutputFormat, ReferencePoint, UncertaintyOpts};

use crate::Error;

pub struct Cli {
    /// Arguments passed by user
    matches: ArgMatches,
}

impl Cli {
    /// Build new command line interface
    pub fn new() -> Self {
        Self {
            matches: {
                Command::new("gnss-lsq")
                    .version(env!("CARGO_PKG_VERSION"))
                    .about("Static GPS receiver position, clock bias and DOP, by iterative least squares")
                    .color(ColorChoice::Always)
                    .arg_required_else_help(true)
                    .next_help_heading("Input / Output")
                    .arg(
                        Arg::new("satellites")
                            .short('s')
                            .long("satellites")
                            .value_name("FILENAME")
                            .required(true)
                            .help("Satellite positions and pseudo range corrections table.
Each epoch starts with a \"<t> <count>\" line, followed by <count> \"<prn> <x> <y> <z> <correction>\" lines (ECEF, meters)."),
                    )
                    .arg(
                        Arg::new("observations")
                            .short('o')
                            .long("observations")
                            .value_name("FILENAME")
                            .required(true)
                            .help("Receiver observations table.
Each epoch starts with a \"<t> <count>\" line, followed by <count> \"<sv> <code> <value>\" lines. Use '-' for missing values."),
                    )
                    .arg(
                        Arg::new("results")
                            .short('r')
                            .long("results")
                            .value_name("FILENAME")
                            .required(true)
                            .help("Result file, created or truncated."),
                    )
                    .arg(
                        Arg::new("format")
                            .short('f')
                            .long("format")
                            .value_name("minimal|dop|full")
                            .help("Result file layout. Default is \"dop\"."),
                    )
                    .next_help_heading("Configuration")
                    .arg(
                        Arg::new("config")
                            .short('c')
                            .long("cfg")
                            .value_name("FILENAME")
                            .help("Load configuration from JSON file. Command line options have precedence."),
                    )
                    .arg(
                        Arg::new("max-iter")
                            .long("max-iter")
                            .value_name("COUNT")
                            .value_parser(value_parser!(usize))
                            .help("Maximal number of iterations per epoch. Default is 100."),
                    )
                    .arg(
                        Arg::new("threshold")
                            .long("threshold")
                            .value_name("METERS")
                            .value_parser(value_parser!(f64))
                            .help("Convergence threshold on the correction norm. Default is 1E-5 m."),
                    )
                    .arg(
                        Arg::new("tolerance")
                            .long("tolerance")
                            .value_name("SECONDS")
                            .value_parser(value_parser!(f64))
                            .help("Timestamp matching tolerance. Use 0 for strict equality. Default is 1 ms."),
                    )
                    .arg(
                        Arg::new("code")
                            .long("code")
                            .value_name("CODE")
                            .help("GPS pseudo range observation code. Default is \"C1\"."),
                    )
                    .next_help_heading("Local frame")
                    .arg(
                        Arg::new("ref-lat")
                            .long("ref-lat")
                            .value_name("DDEG")
                            .value_parser(value_parser!(f64))
                            .allow_hyphen_values(true)
                            .requires("ref-lon")
                            .help("Express the DOPs at this fixed latitude (decimal degrees), instead of each solution."),
                    )
                    .arg(
                        Arg::new("ref-lon")
                            .long("ref-lon")
                            .value_name("DDEG")
                            .value_parser(value_parser!(f64))
                            .allow_hyphen_values(true)
                            .requires("ref-lat")
                            .help("Express the DOPs at this fixed longitude (decimal degrees), instead of each solution."),
                    )
                    .arg(
                        Arg::new("truth")
                            .short('t')
                            .long("truth")
                            .value_name("X,Y,Z")
                            .allow_hyphen_values(true)
                            .help("Known station coordinates (ECEF, meters).
Each solution is then compared to it and the error statistics are reported."),
                    )
                    .arg(
                        Arg::new("sigma")
                            .long("sigma")
                            .value_name("E,N,U")
                            .help("Pseudo range noise (meters) per local axis.
Reports the HDOP (East, North) and VDOP (Up) scaled uncertainty of each solution in the \"full\" format.
For example \"1.5,1.5,3.5\"."),
                    )
                    .arg(
                        Arg::new("quiet")
                            .short('q')
                            .long("quiet")
                            .action(ArgAction::SetTrue)
                            .help("Do not report the error statistics."),
                    )
                    .get_matches()
            },
        }
    }

    pub fn satellites(&self) -> &String {
        self.matches
            .get_one::<String>("satellites")
            .unwrap_or_else(|| panic!("satellites table is required"))
    }

    pub fn observations(&self) -> &String {
        self.matches
            .get_one::<String>("observations")
            .unwrap_or_else(|| panic!("observations table is required"))
    }

    pub fn results(&self) -> &String {
        self.matches
            .get_one::<String>("results")
            .unwrap_or_else(|| panic!("result file is required"))
    }

    pub fn quiet(&self) -> bool {
        self.matches.get_flag("quiet")
    }

    /// Parses a "a,b,c" triplet
    fn triplet(&self, name: &str) -> Result<Option<(f64, f64, f64)>, Error> {
        let Some(desc) = self.matches.get_one::<String>(name) else {
            return Ok(None);
        };

        let values = desc
            .split(',')
            .map(|item| item.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| Error::InvalidTriplet(desc.to_string()))?;

        match values.as_slice() {
            [a, b, c] => Ok(Some((*a, *b, *c))),
            _ => Err(Error::InvalidTriplet(desc.to_string())),
        }
    }

    /// Returns the [Config] to use: from the configuration file, if any,
    /// customized by the command line options.
    pub fn config(&self) -> Result<Config, Error> {
        let mut cfg = match self.matches.get_one::<String>("config") {
            Some(path) => {
                let content = read_to_string(path).map_err(Error::ConfigFile)?;
                serde_json::from_str::<Config>(&content)?
            },
            None => Config::default(),
        };

        if let Some(format) = self.matches.get_one::<String>("format") {
            cfg.output = OutputFormat::from_str(format)?;
        }
        if let Some(max_iter) = self.matches.get_one::<usize>("max-iter") {
            cfg.solver.max_iterations = *max_iter;
        }
        if let Some(threshold) = self.matches.get_one::<f64>("threshold") {
            cfg.solver.convergence_threshold_m = *threshold;
        }
        if let Some(tolerance) = self.matches.get_one::<f64>("tolerance") {
            cfg.matching.tolerance_s = *tolerance;
        }
        if let Some(code) = self.matches.get_one::<String>("code") {
            cfg.observation.code = code.to_string();
        }

        let latitude = self.matches.get_one::<f64>("ref-lat");
        let longitude = self.matches.get_one::<f64>("ref-lon");
        if let (Some(latitude_ddeg), Some(longitude_ddeg)) = (latitude, longitude) {
            cfg.reference = ReferencePoint::Fixed {
                latitude_ddeg: *latitude_ddeg,
                longitude_ddeg: *longitude_ddeg,
            };
        }

        if let Some(truth) = self.triplet("truth")? {
            cfg.truth = Some(truth);
        }

        if let Some((east_m, north_m, up_m)) = self.triplet("sigma")? {
            cfg.uncertainty = Some(UncertaintyOpts {
                east_m,
                north_m,
                up_m,
            });
        }

        cfg.validate()?;
        Ok(cfg)
    }
}
