//! Position error statistics
use std::fmt;

/// Running statistics of one error component
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisStatistics {
    count: usize,
    mean: f64,
    m2: f64,
    sum_squares: f64,
    max_abs: f64,
}

impl AxisStatistics {
    /// Accumulates new error sample [m]
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.sum_squares += value * value;
        self.max_abs = self.max_abs.max(value.abs());
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Largest absolute error [m]
    pub fn max_abs(&self) -> f64 {
        self.max_abs
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation [m]
    pub fn std_dev(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.m2 / self.count as f64).max(0.0).sqrt()
        }
    }

    /// Root mean square [m]
    pub fn rms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.sum_squares / self.count as f64).sqrt()
        }
    }
}

/// East, North and Up error statistics, over a complete session
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ErrorStatistics {
    pub east: AxisStatistics,
    pub north: AxisStatistics,
    pub up: AxisStatistics,
}

impl ErrorStatistics {
    /// Accumulates new ENU error [m]
    pub fn add(&mut self, enu: (f64, f64, f64)) {
        self.east.add(enu.0);
        self.north.add(enu.1);
        self.up.add(enu.2);
    }

    pub fn is_empty(&self) -> bool {
        self.east.count() == 0
    }
}

impl fmt::Display for ErrorStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<6} | {:>14} | {:>10} | {:>6} | {:>6}",
            "Axis", "Max Abs Error", "Mean Error", "STD", "RMS"
        )?;
        write!(f, "{}", "-".repeat(56))?;
        for (label, axis) in [("East", &self.east), ("North", &self.north), ("Up", &self.up)] {
            write!(
                f,
                "\n{:<6} | {:>14.3} | {:>10.3} | {:>6.3} | {:>6.3}",
                label,
                axis.max_abs(),
                axis.mean(),
                axis.std_dev(),
                axis.rms()
            )?;
        }
        Ok(())
    }
}
