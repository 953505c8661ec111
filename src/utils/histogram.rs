//! Labeled histogram used as the basis for every distribution reported by
//! DRAGEN (coverage depth, fragment length, read quality, and so on).
//!
//! # Overview
//!
//! DRAGEN writes its distributions as rows of `bucket,count`. Unlike a
//! zero-based counting histogram, the buckets are already decided by the
//! upstream tool: they may start anywhere, they may skip values, and the last
//! bucket is often open-ended (`1000+`). As such, this histogram stores the
//! buckets exactly as they were reported and only enforces two rules:
//!
//! 1. Bucket bounds must be strictly increasing in the order they are pushed.
//!    This is what makes two histograms of the same chart row-alignable, and a
//!    violation almost always indicates a corrupted or concatenated file.
//! 2. The total of all counts must fit in a `u64`. Every running sum derived
//!    from the histogram is then guaranteed not to overflow.
//!
//! # Usage
//!
//! ```
//! use dragen_qc::utils::histogram::Histogram;
//! let mut hist = Histogram::default();
//!
//! hist.push("0", 0, 5).unwrap();
//! hist.push("1", 1, 3).unwrap();
//! hist.push("2+", 2, 6).unwrap();
//!
//! assert_eq!(hist.len(), 3);
//! assert_eq!(hist.sum(), 14);
//! assert_eq!(hist.values(), [5, 3, 6]);
//! ```
//!
//! Pushing a bucket whose bound does not increase on the previous one is an
//! error, and the histogram is left untouched:
//!
//! ```
//! use dragen_qc::utils::histogram::{Histogram, PushError};
//! let mut hist = Histogram::default();
//!
//! hist.push("10", 10, 1).unwrap();
//! assert_eq!(hist.push("5", 5, 1).unwrap_err(), PushError::Order { previous: 10, bound: 5 });
//! assert_eq!(hist.push("20", 20, u64::MAX).unwrap_err(), PushError::Overflow { bound: 20 });
//! assert_eq!(hist.len(), 1);
//! ```
//!
//! Cumulative views are always recomputed from the per-bucket counts:
//!
//! ```
//! use dragen_qc::utils::histogram::Histogram;
//! let mut hist = Histogram::default();
//!
//! hist.push("0", 0, 5).unwrap();
//! hist.push("1", 1, 3).unwrap();
//! hist.push("2", 2, 6).unwrap();
//!
//! assert_eq!(hist.cumulative(), [5, 8, 14]);
//! ```

use serde::Deserialize;
use serde::Serialize;

/// A single bucket within a [`Histogram`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// The label exactly as it was reported (e.g., `1000+` or `145-152`).
    pub label: String,

    /// The numeric bound used for ordering the bucket.
    pub bound: u64,
}

/// An error that occurs when a bucket cannot be appended to a [`Histogram`].
#[derive(Debug, PartialEq, Eq)]
pub enum PushError {
    /// The bound does not strictly increase on the previous bucket.
    Order {
        /// The bound of the last bucket in the histogram.
        previous: u64,

        /// The offending bound.
        bound: u64,
    },

    /// Adding the count would overflow the total of the histogram.
    Overflow {
        /// The offending bound.
        bound: u64,
    },
}

/// Histogram of counts over labeled, strictly increasing buckets. For more in
/// depth information, please see the [module-level documentation].
///
/// [module-level documentation]: self
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    // Buckets in increasing order of their bound.
    buckets: Vec<Bucket>,
    // Count for each bucket, index-aligned with `buckets`.
    counts: Vec<u64>,
    // Sum of `counts`.
    total: u64,
}

impl Histogram {
    //==================//
    // Building buckets //
    //==================//

    /// Appends a bucket to the end of the histogram.
    pub fn push(
        &mut self,
        label: impl Into<String>,
        bound: u64,
        count: u64,
    ) -> Result<(), PushError> {
        if let Some(last) = self.buckets.last() {
            if bound <= last.bound {
                return Err(PushError::Order {
                    previous: last.bound,
                    bound,
                });
            }
        }

        let total = self
            .total
            .checked_add(count)
            .ok_or(PushError::Overflow { bound })?;

        self.buckets.push(Bucket {
            label: label.into(),
            bound,
        });
        self.counts.push(count);
        self.total = total;
        Ok(())
    }

    //================//
    // Getting values //
    //================//

    /// Number of buckets within the histogram.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether or not the histogram holds any buckets.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// The buckets of the histogram by ref.
    pub fn buckets(&self) -> &[Bucket] {
        self.buckets.as_ref()
    }

    /// Simply returns the counts in the distribution by ref.
    pub fn values(&self) -> &[u64] {
        self.counts.as_ref()
    }

    /// Iterates over `(bucket, count)` pairs in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (&Bucket, u64)> {
        self.buckets.iter().zip(self.counts.iter().copied())
    }

    /// Looks up the count for the bucket with the given bound.
    pub fn get(&self, bound: u64) -> Option<u64> {
        self.buckets
            .binary_search_by_key(&bound, |b| b.bound)
            .ok()
            .map(|i| self.counts[i])
    }

    //========================//
    // Numerical computations //
    //========================//

    /// Computes the sum of the counts within the distribution.
    pub fn sum(&self) -> u64 {
        self.total
    }

    /// Running sum from the lowest bucket upwards. The result is
    /// non-decreasing and its last value equals [`sum`][Histogram::sum].
    pub fn cumulative(&self) -> Vec<u64> {
        self.counts
            .iter()
            .scan(0u64, |acc, count| {
                *acc = acc.saturating_add(*count);
                Some(*acc)
            })
            .collect()
    }

    /// Computes the mean of the distribution, weighting each bucket by its
    /// bound. Open-ended buckets contribute their lower bound.
    pub fn mean(&self) -> Option<f64> {
        let total = self.sum();
        if total == 0 {
            return None;
        }

        let weighted: f64 = self
            .iter()
            .map(|(bucket, count)| bucket.bound as f64 * count as f64)
            .sum();

        Some(weighted / total as f64)
    }

    /// Computes the median bound of the distribution by walking up the
    /// buckets until half of the items have been collected.
    pub fn median(&self) -> Option<u64> {
        let total = self.sum();
        if total == 0 {
            return None;
        }

        let needed = total as f64 / 2.0;
        let mut collected = 0u64;

        for (bucket, count) in self.iter() {
            collected = collected.saturating_add(count);
            if collected as f64 >= needed {
                return Some(bucket.bound);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn histogram(pairs: &[(u64, u64)]) -> Histogram {
        let mut hist = Histogram::default();
        for (bound, count) in pairs {
            hist.push(bound.to_string(), *bound, *count).unwrap();
        }
        hist
    }

    #[test]
    pub fn test_push_rejects_non_increasing_bounds() {
        let mut hist = histogram(&[(1, 1), (2, 1)]);
        assert!(hist.push("2", 2, 1).is_err());
        assert!(hist.push("1", 1, 1).is_err());
        assert_eq!(hist.len(), 2);
    }

    #[test]
    pub fn test_get_by_bound() {
        let hist = histogram(&[(10, 4), (20, 5), (40, 6)]);
        assert_eq!(hist.get(20), Some(5));
        assert_eq!(hist.get(30), None);
    }

    #[test]
    pub fn test_cumulative_is_non_decreasing_and_ends_at_sum() {
        let hist = histogram(&[(0, 0), (1, 7), (2, 0), (3, 11), (9, 2)]);
        let cumulative = hist.cumulative();

        assert!(cumulative.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*cumulative.last().unwrap(), hist.sum());
    }

    #[test]
    pub fn test_push_rejects_a_total_that_overflows() {
        let mut hist = histogram(&[(0, u64::MAX / 2 + 10)]);
        assert_eq!(
            hist.push("1", 1, u64::MAX / 2 + 10).unwrap_err(),
            PushError::Overflow { bound: 1 }
        );
        assert_eq!(hist.len(), 1);
        assert_eq!(hist.sum(), u64::MAX / 2 + 10);
        assert_eq!(hist.cumulative(), [u64::MAX / 2 + 10]);
    }

    #[test]
    pub fn test_mean_and_median() {
        let hist = histogram(&[(25, 1), (50, 1), (75, 3), (100, 5)]);
        assert_eq!(hist.mean().unwrap(), 80.0);
        assert_eq!(hist.median().unwrap(), 75);
    }

    #[test]
    pub fn test_empty_histogram_has_no_statistics() {
        let hist = Histogram::default();
        assert!(hist.is_empty());
        assert!(hist.mean().is_none());
        assert!(hist.median().is_none());
        assert!(hist.cumulative().is_empty());
    }
}
