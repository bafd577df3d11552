use crate::cfg::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result file layout
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OutputFormat {
    /// Space separated `t x y z cdt`, without header.
    Minimal,
    /// CSV with header, position, clock bias and DOPs.
    #[default]
    Dop,
    /// [OutputFormat::Dop] followed by the number of satellites,
    /// the ENU error to the known station coordinates
    /// and the DOP scaled ENU uncertainty.
    Full,
}

impl OutputFormat {
    /// Header line, if any
    pub(crate) fn header(&self) -> Option<&'static str> {
        match self {
            Self::Minimal => None,
            Self::Dop => Some("EpochTime,X,Y,Z,ClockBias,HDOP,VDOP,PDOP,GDOP"),
            Self::Full => Some(
                "EpochTime,X,Y,Z,ClockBias,HDOP,VDOP,PDOP,GDOP,NumSats,EastError,NorthError,UpError,EastUnc,NorthUnc,UpUnc",
            ),
        }
    }

    pub(crate) fn separator(&self) -> char {
        match self {
            Self::Minimal => ' ',
            _ => ',',
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Minimal => write!(fmt, "minimal"),
            Self::Dop => write!(fmt, "dop"),
            Self::Full => write!(fmt, "full"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minimal" | "txt" => Ok(Self::Minimal),
            "dop" | "csv" => Ok(Self::Dop),
            "full" => Ok(Self::Full),
            _ => Err(Error::UnknownOutputFormat(s.to_string())),
        }
    }
}
