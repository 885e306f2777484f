//! Fold/merge plumbing shared by every metric.
//!
//! Each metric is an [`Aggregate`]: it observes rows one at a time, can absorb a
//! partial built over a *later* slice of the same table, and finishes into a
//! plain result. Counts and Decimal sums are exact, so any split of the table
//! merged left to right yields the same output as a single pass.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::types::Transaction;

pub trait Aggregate {
    type Output;

    fn observe(&mut self, tx: &Transaction);

    /// Absorb a partial built over rows that come after the ones seen by `self`.
    fn merge(&mut self, later: Self);

    fn finish(self) -> Self::Output;
}

/// Single pass over `table`.
pub fn fold<A: Aggregate>(mut acc: A, table: &[Transaction]) -> A::Output {
    for tx in table {
        acc.observe(tx);
    }
    acc.finish()
}

/// Folds contiguous chunks of `table` on scoped threads, then merges the partials in
/// chunk order. `seed` must be an empty accumulator; each chunk starts from a clone.
pub fn fold_partitioned<A>(seed: A, table: &[Transaction], partitions: usize) -> A::Output
where
    A: Aggregate + Clone + Send,
{
    if partitions <= 1 || table.len() < 2 {
        return fold(seed, table);
    }
    let chunk_len = table.len().div_ceil(partitions);
    debug!(rows = table.len(), partitions, chunk_len, "partitioned fold");

    let partials: Vec<A> = std::thread::scope(|s| {
        let handles: Vec<_> = table
            .chunks(chunk_len)
            .map(|chunk| {
                let mut acc = seed.clone();
                s.spawn(move || {
                    for tx in chunk {
                        acc.observe(tx);
                    }
                    acc
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    let mut partials = partials.into_iter();
    let mut acc = partials.next().unwrap_or(seed);
    for later in partials {
        acc.merge(later);
    }
    acc.finish()
}

// ---------------------------------------------------------------------------
// Tally / Total
// ---------------------------------------------------------------------------

/// Running count and signed sum for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub count: u64,
    pub sum: Decimal,
}

impl Tally {
    #[inline]
    pub fn add(&mut self, amount: Decimal) {
        self.count += 1;
        self.sum += amount;
    }

    #[inline]
    pub fn merge(&mut self, other: Tally) {
        self.count += other.count;
        self.sum += other.sum;
    }

    /// Count plus magnitude of the net sum.
    pub fn total(&self) -> Total {
        Total {
            count: self.count,
            value: self.sum.abs(),
        }
    }
}

/// Reported side of a partition: how many rows, and the absolute value they moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Total {
    pub count: u64,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub value: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn tally_reports_absolute_net_value() {
        let mut t = Tally::default();
        t.add(dec!(-300));
        t.add(dec!(100));
        assert_eq!(t.total(), Total { count: 2, value: dec!(200) });
    }

    #[test]
    fn tally_merge_is_exact() {
        let mut a = Tally::default();
        a.add(dec!(0.1));
        let mut b = Tally::default();
        b.add(dec!(0.2));
        a.merge(b);
        assert_eq!(a.sum, dec!(0.3));
        assert_eq!(a.count, 2);
    }
}
