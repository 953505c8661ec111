//! Utilities related to displaying things.

use std::fmt;

use num_format::Locale;
use num_format::ToFormattedString;
use tracing::info;

/// Utility struct for displays percentages. The first item in the struct is the
/// numerator and the second item in the struct is the denominator.
pub struct PercentageFormat(pub usize, pub usize);

impl fmt::Display for PercentageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.1 == 0 {
            f.write_str("N/A")
        } else {
            let (a, b) = (self.0 as f64, self.1 as f64);
            write!(f, "{:.2}%", a / b * 100.0)
        }
    }
}

/// Counts the files of a run against the number of candidates known up front
/// and reports progress every tenth of the way.
pub struct FileCounter {
    /// The number of files processed.
    count: usize,

    /// The number of files the run will process.
    total: usize,

    /// The number of files to log every.
    log_every: usize,
}

impl FileCounter {
    /// Creates a new `FileCounter` for a run of `total` files.
    pub fn new(total: usize) -> Self {
        FileCounter {
            count: 0,
            total,
            log_every: (total / 10).max(1),
        }
    }

    /// Gets the current number of files counted via a copy.
    pub fn get(&self) -> usize {
        self.count
    }

    /// The share of the run that has been processed.
    pub fn progress(&self) -> PercentageFormat {
        PercentageFormat(self.count, self.total)
    }

    /// Increments the counter and reports progress (if appropriate). The last
    /// file of the run is always reported.
    pub fn inc(&mut self) {
        self.count += 1;

        if self.count % self.log_every == 0 || self.count == self.total {
            info!(
                "  [*] Processed {} of {} files ({}).",
                self.count.to_formatted_string(&Locale::en),
                self.total.to_formatted_string(&Locale::en),
                self.progress()
            );
        }
    }
}
