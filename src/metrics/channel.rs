use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::metrics::aggregate::{fold, Aggregate, Tally};
use crate::types::Transaction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelRow {
    pub channel: String,
    /// Magnitude of the channel's net signed amount.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub value: Decimal,
    pub count: u64,
}

/// Groups rows by channel, remembering the order channels were first seen.
#[derive(Debug, Clone, Default)]
pub struct ChannelMixAcc {
    /// channel → slot in `groups`
    index: HashMap<String, usize>,
    groups: Vec<(String, Tally)>,
}

impl ChannelMixAcc {
    fn slot(&mut self, channel: &str) -> &mut Tally {
        let i = match self.index.get(channel).copied() {
            Some(i) => i,
            None => {
                self.groups.push((channel.to_string(), Tally::default()));
                self.index.insert(channel.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        &mut self.groups[i].1
    }
}

impl Aggregate for ChannelMixAcc {
    type Output = Vec<ChannelRow>;

    fn observe(&mut self, tx: &Transaction) {
        self.slot(&tx.channel).add(tx.amount);
    }

    fn merge(&mut self, later: Self) {
        for (channel, tally) in later.groups {
            self.slot(&channel).merge(tally);
        }
    }

    fn finish(self) -> Vec<ChannelRow> {
        let mut rows: Vec<ChannelRow> = self
            .groups
            .into_iter()
            .map(|(channel, tally)| {
                let total = tally.total();
                ChannelRow {
                    channel,
                    value: total.value,
                    count: total.count,
                }
            })
            .collect();
        // Stable: equal values keep first-seen channel order.
        rows.sort_by(|a, b| b.value.cmp(&a.value));
        rows
    }
}

/// One row per channel, sorted by absolute net value descending.
pub fn channel_mix(table: &[Transaction]) -> Vec<ChannelRow> {
    fold(ChannelMixAcc::default(), table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::tx;
    use rust_decimal_macros::dec;

    fn row(channel: &str, value: Decimal, count: u64) -> ChannelRow {
        ChannelRow {
            channel: channel.to_string(),
            value,
            count,
        }
    }

    #[test]
    fn ranks_by_absolute_net_value() {
        let table = vec![
            tx("2024-03-01 09:00:00", dec!(-200), "ZA", "ATM"),
            tx("2024-03-01 09:05:00", dec!(600), "ZA", "EFT"),
            tx("2024-03-01 09:10:00", dec!(-100), "ZA", "ATM"),
            tx("2024-03-01 09:20:00", dec!(400), "ZA", "EFT"),
            tx("2024-03-01 09:30:00", dec!(-200), "ZA", "ATM"),
        ];
        assert_eq!(
            channel_mix(&table),
            vec![row("EFT", dec!(1000), 2), row("ATM", dec!(500), 3)]
        );
    }

    #[test]
    fn ties_keep_encounter_order() {
        let table = vec![
            tx("2024-03-01 09:00:00", dec!(10), "ZA", "BRANCH"),
            tx("2024-03-01 09:00:00", dec!(-10), "ZA", "ATM"),
            tx("2024-03-01 09:00:00", dec!(99), "ZA", "EFT"),
        ];
        let names: Vec<String> = channel_mix(&table).into_iter().map(|r| r.channel).collect();
        assert_eq!(names, vec!["EFT", "BRANCH", "ATM"]);
    }

    #[test]
    fn netting_channel_reports_zero_but_keeps_count() {
        let table = vec![
            tx("2024-03-01 09:00:00", dec!(50), "ZA", "EFT"),
            tx("2024-03-01 09:00:00", dec!(-50), "ZA", "EFT"),
        ];
        assert_eq!(channel_mix(&table), vec![row("EFT", dec!(0), 2)]);
    }

    #[test]
    fn rows_are_unique_and_counts_cover_table() {
        let table = vec![
            tx("2024-03-01 09:00:00", dec!(1), "ZA", "EFT"),
            tx("2024-03-01 09:00:00", dec!(2), "ZA", "ATM"),
            tx("2024-03-01 09:00:00", dec!(3), "ZA", "EFT"),
            tx("2024-03-01 09:00:00", dec!(0), "ZA", "POS"),
        ];
        let mix = channel_mix(&table);
        assert_eq!(mix.len(), 3);
        assert_eq!(mix.iter().map(|r| r.count).sum::<u64>(), table.len() as u64);
        assert!(channel_mix(&[]).is_empty());
    }

    #[test]
    fn merge_preserves_global_encounter_order() {
        let left = [
            tx("2024-03-01 09:00:00", dec!(5), "ZA", "ATM"),
            tx("2024-03-01 09:00:00", dec!(5), "ZA", "EFT"),
        ];
        let right = [
            tx("2024-03-01 09:00:00", dec!(5), "ZA", "POS"),
            tx("2024-03-01 09:00:00", dec!(5), "ZA", "ATM"),
        ];
        let mut acc = ChannelMixAcc::default();
        left.iter().for_each(|t| acc.observe(t));
        let mut later = ChannelMixAcc::default();
        right.iter().for_each(|t| later.observe(t));
        acc.merge(later);
        let mix = acc.finish();
        let names: Vec<&str> = mix.iter().map(|r| r.channel.as_str()).collect();
        assert_eq!(names, vec!["ATM", "EFT", "POS"]);
        assert_eq!(mix[0].count, 2);
    }
}
