use serde::Serialize;

use crate::config::HOURS_PER_DAY;
use crate::metrics::aggregate::{fold, Aggregate};
use crate::types::Transaction;

/// Transaction count per hour of day, dense over 0..=23.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HourlyDistribution(pub [u64; HOURS_PER_DAY]);

impl HourlyDistribution {
    pub fn counts(&self) -> &[u64; HOURS_PER_DAY] {
        &self.0
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// Count of the busiest hour-of-day bucket (0 when empty).
    pub fn busiest(&self) -> u64 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// Median over all 24 buckets, quiet hours included.
    pub fn median(&self) -> f64 {
        let mut sorted = self.0;
        sorted.sort_unstable();
        let mid = HOURS_PER_DAY / 2;
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    }
}

impl Aggregate for HourlyDistribution {
    type Output = HourlyDistribution;

    fn observe(&mut self, tx: &Transaction) {
        self.0[tx.hour()] += 1;
    }

    fn merge(&mut self, later: Self) {
        for (bucket, n) in self.0.iter_mut().zip(later.0) {
            *bucket += n;
        }
    }

    fn finish(self) -> HourlyDistribution {
        self
    }
}

pub fn hourly_distribution(table: &[Transaction]) -> HourlyDistribution {
    fold(HourlyDistribution::default(), table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::tx;
    use rust_decimal_macros::dec;

    #[test]
    fn buckets_ignore_the_date() {
        let table = vec![
            tx("2024-03-01 14:00:00", dec!(1), "ZA", "EFT"),
            tx("2024-03-09 14:59:59", dec!(-1), "ZA", "EFT"),
            tx("2024-03-02 00:10:00", dec!(0), "ZA", "EFT"),
            tx("2024-03-02 23:00:00", dec!(4), "ZA", "EFT"),
        ];
        let h = hourly_distribution(&table);
        assert_eq!(h.counts().len(), 24);
        assert_eq!(h.counts()[14], 2);
        assert_eq!(h.counts()[0], 1);
        assert_eq!(h.counts()[23], 1);
        assert_eq!(h.total(), table.len() as u64);
        assert_eq!(h.busiest(), 2);
    }

    #[test]
    fn empty_table_gives_24_zeros() {
        let h = hourly_distribution(&[]);
        assert_eq!(h.counts(), &[0u64; 24]);
        assert_eq!(h.busiest(), 0);
        assert_eq!(h.median(), 0.0);
    }

    #[test]
    fn median_counts_quiet_hours() {
        let mut h = HourlyDistribution::default();
        h.0[14] = 5;
        assert_eq!(h.median(), 0.0);

        let mut busy = HourlyDistribution([2; 24]);
        busy.0[0] = 4;
        busy.0[1] = 6;
        assert_eq!(busy.median(), 2.0);

        let mut split = HourlyDistribution::default();
        for (i, bucket) in split.0.iter_mut().enumerate() {
            *bucket = i as u64;
        }
        assert_eq!(split.median(), 11.5);
    }

    #[test]
    fn serializes_as_plain_sequence() {
        let mut h = HourlyDistribution::default();
        h.0[3] = 7;
        let json = serde_json::to_value(h).unwrap();
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 24);
        assert_eq!(arr[3], 7);
    }
}
