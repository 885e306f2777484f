//! Descriptive aggregates over a window of transactions.
//!
//! Every operation is a pure function of the slice it is given (already
//! filtered to the window) and tolerates an empty slice.

pub mod aggregate;
pub mod channel;
pub mod directional;
pub mod hourly;
pub mod split;

use serde::Serialize;

pub use aggregate::{fold, fold_partitioned, Aggregate, Tally, Total};
pub use channel::{channel_mix, ChannelMixAcc, ChannelRow};
pub use directional::{
    directional_totals, extremes, DirectionalAcc, DirectionalTotals, Extremes, ExtremesAcc,
};
pub use hourly::{hourly_distribution, HourlyDistribution};
pub use split::{domestic_split, DomesticSplit, DomesticSplitAcc};

use crate::types::Transaction;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsResult {
    pub totals: DirectionalTotals,
    pub hourly: HourlyDistribution,
    pub domestic_split: DomesticSplit,
    pub extremes: Extremes,
    pub channel_mix: Vec<ChannelRow>,
}

/// All five metrics folded side by side in one pass.
#[derive(Debug, Clone)]
pub struct MetricsAccumulator {
    totals: DirectionalAcc,
    hourly: HourlyDistribution,
    split: DomesticSplitAcc,
    extremes: ExtremesAcc,
    channels: ChannelMixAcc,
}

impl MetricsAccumulator {
    pub fn new(home: &str) -> Self {
        Self {
            totals: DirectionalAcc::default(),
            hourly: HourlyDistribution::default(),
            split: DomesticSplitAcc::new(home),
            extremes: ExtremesAcc::default(),
            channels: ChannelMixAcc::default(),
        }
    }
}

impl Aggregate for MetricsAccumulator {
    type Output = MetricsResult;

    fn observe(&mut self, tx: &Transaction) {
        self.totals.observe(tx);
        self.hourly.observe(tx);
        self.split.observe(tx);
        self.extremes.observe(tx);
        self.channels.observe(tx);
    }

    fn merge(&mut self, later: Self) {
        self.totals.merge(later.totals);
        self.hourly.merge(later.hourly);
        self.split.merge(later.split);
        self.extremes.merge(later.extremes);
        self.channels.merge(later.channels);
    }

    fn finish(self) -> MetricsResult {
        MetricsResult {
            totals: self.totals.finish(),
            hourly: self.hourly.finish(),
            domestic_split: self.split.finish(),
            extremes: self.extremes.finish(),
            channel_mix: self.channels.finish(),
        }
    }
}

pub fn compute_metrics(window: &[Transaction], home: &str) -> MetricsResult {
    fold(MetricsAccumulator::new(home), window)
}

/// Same result as [`compute_metrics`], folded over `partitions` chunks in parallel.
pub fn compute_metrics_partitioned(
    window: &[Transaction],
    home: &str,
    partitions: usize,
) -> MetricsResult {
    fold_partitioned(MetricsAccumulator::new(home), window, partitions)
}
