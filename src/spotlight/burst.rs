use tracing::debug;

use crate::config::{spotlight_thresholds::BURST_RATIO, HISTORY_LOOKBACK_DAYS};
use crate::metrics::hourly_distribution;
use crate::spotlight::{trailing_history, Spotlight};
use crate::types::Transaction;

/// Busiest hour-of-day bucket in the window vs. the median hourly bucket over the
/// trailing history ending at the window's latest timestamp.
///
/// The denominator is floored at 1 so sparse history cannot blow the ratio up.
/// An empty window has no anchor and scores 0.
pub fn burst(window: &[Transaction], history: &[Transaction]) -> Spotlight {
    let Some(anchor) = window.iter().map(|t| t.timestamp).max() else {
        return Spotlight { flag: false, score: 0.0 };
    };

    let win_max = hourly_distribution(window).busiest();
    let baseline = trailing_history(history, anchor, HISTORY_LOOKBACK_DAYS);
    let hist_med = hourly_distribution(&baseline).median();

    let score = win_max as f64 / hist_med.max(1.0);
    debug!(
        win_max,
        hist_med,
        baseline_rows = baseline.len(),
        score,
        "burst spotlight"
    );
    Spotlight {
        flag: score > BURST_RATIO,
        score,
    }
}
