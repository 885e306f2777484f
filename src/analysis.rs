use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::AnalysisSettings;
use crate::error::Result;
use crate::metrics::{compute_metrics, compute_metrics_partitioned, MetricsResult};
use crate::payload::to_payload;
use crate::spotlight::{evaluate, Spotlights};
use crate::types::{Transaction, Window};

/// Everything computed for one window selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub window: Window,
    pub home_country: String,
    pub transaction_count: usize,
    pub metrics: MetricsResult,
    pub spotlights: Spotlights,
}

impl AnalysisReport {
    /// The report as a plain JSON value, via the payload boundary.
    pub fn to_payload(&self) -> Result<Value> {
        Ok(to_payload(self)?)
    }
}

/// Metrics over the rows inside `window`; spotlights against the whole `table` as history.
pub fn analyze(table: &[Transaction], window: Window, settings: &AnalysisSettings) -> AnalysisReport {
    let selected = window.select(table);
    let home = settings.home_country.as_str();

    let metrics = if settings.metric_partitions > 1 {
        compute_metrics_partitioned(&selected, home, settings.metric_partitions)
    } else {
        compute_metrics(&selected, home)
    };
    let spotlights = evaluate(&selected, table);

    debug!(
        rows = table.len(),
        selected = selected.len(),
        burst = spotlights.burst.flag,
        imbalance = spotlights.imbalance.flag,
        "analysis complete"
    );

    AnalysisReport {
        window,
        home_country: settings.home_country.clone(),
        transaction_count: selected.len(),
        metrics,
        spotlights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Total;
    use crate::types::test_support::{ts, tx};
    use rust_decimal_macros::dec;

    fn full_day() -> Window {
        Window::new(ts("2024-03-01 00:00:00"), ts("2024-03-01 23:59:59")).unwrap()
    }

    #[test]
    fn deposits_and_small_withdrawal_all_domestic() {
        let table = vec![
            tx("2024-03-01 09:00:00", dec!(100), "ZA", "EFT"),
            tx("2024-03-01 10:00:00", dec!(200), "ZA", "EFT"),
            tx("2024-03-01 11:00:00", dec!(300), "ZA", "BRANCH"),
            tx("2024-03-01 12:00:00", dec!(-50), "ZA", "ATM"),
        ];
        let report = analyze(&table, full_day(), &AnalysisSettings::default());
        let m = &report.metrics;
        assert_eq!(m.totals.deposits, Total { count: 3, value: dec!(600) });
        assert_eq!(m.totals.withdrawals, Total { count: 1, value: dec!(50) });
        assert_eq!(m.domestic_split.domestic, Total { count: 4, value: dec!(550) });
        assert_eq!(m.domestic_split.international, Total::default());
        assert!(!report.spotlights.imbalance.flag);

        let json = report.to_payload().unwrap();
        assert_eq!(json["metrics"]["domestic_split"]["international"]["value"], 0.0);
        assert_eq!(json["metrics"]["totals"]["deposits"]["value"], 600.0);
    }

    #[test]
    fn rows_outside_window_feed_history_only() {
        let table = vec![
            tx("2024-02-20 14:00:00", dec!(5), "ZA", "EFT"),
            tx("2024-03-01 14:00:00", dec!(-10), "GB", "SWIFT"),
            tx("2024-03-02 08:00:00", dec!(999), "ZA", "EFT"),
        ];
        let report = analyze(&table, full_day(), &AnalysisSettings::default());
        assert_eq!(report.transaction_count, 1);
        assert_eq!(report.metrics.hourly.counts()[14], 1);
        assert_eq!(report.metrics.domestic_split.international.count, 1);
        assert!(report.spotlights.imbalance.flag);
        assert_eq!(report.spotlights.imbalance.score, f64::INFINITY);

        let json = report.to_payload().unwrap();
        assert_eq!(json["spotlights"]["imbalance"]["score"], "Infinity");
        assert_eq!(json["window"]["start"], "2024-03-01T00:00:00");
    }

    #[test]
    fn five_rows_in_one_hour_trip_burst() {
        let table: Vec<Transaction> = (0..5)
            .map(|i| tx(&format!("2024-03-01 14:0{i}:00"), dec!(20), "ZA", "POS"))
            .collect();
        let report = analyze(&table, full_day(), &AnalysisSettings::default());
        let hourly = report.metrics.hourly.counts();
        assert_eq!(hourly[14], 5);
        assert_eq!(hourly.iter().sum::<u64>(), 5);
        assert_eq!(report.spotlights.burst.score, 5.0);
        assert!(report.spotlights.burst.flag);
    }

    #[test]
    fn partitioned_settings_change_nothing_observable() {
        let table: Vec<Transaction> = (0..40)
            .map(|i| {
                let amount = if i % 3 == 0 { dec!(-70) } else { dec!(45.5) };
                let country = if i % 4 == 0 { "US" } else { "ZA" };
                tx(&format!("2024-03-01 {:02}:00:00", i % 24), amount, country, "EFT")
            })
            .collect();
        let single = analyze(&table, full_day(), &AnalysisSettings::default());
        let parallel = analyze(
            &table,
            full_day(),
            &AnalysisSettings {
                metric_partitions: 6,
                ..AnalysisSettings::default()
            },
        );
        assert_eq!(single, parallel);
    }

    #[test]
    fn empty_window_still_reports() {
        let table = vec![tx("2024-01-01 10:00:00", dec!(10), "ZA", "EFT")];
        let report = analyze(&table, full_day(), &AnalysisSettings::default());
        assert_eq!(report.transaction_count, 0);
        assert_eq!(report.spotlights.burst.score, 0.0);
        assert!(report.spotlights.imbalance.flag);
        assert!(report.to_payload().is_ok());
    }
}
