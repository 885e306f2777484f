use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::spotlight_thresholds::IMBALANCE_RATIO;
use crate::metrics::directional_totals;
use crate::spotlight::Spotlight;
use crate::types::Transaction;

/// Withdrawn value over deposited value within the window.
///
/// With no deposits the window cannot be judged balanced: flagged, score +inf.
pub fn imbalance(window: &[Transaction]) -> Spotlight {
    let totals = directional_totals(window);
    let dep = totals.deposits.value;
    let wd = totals.withdrawals.value;

    if dep.is_zero() {
        debug!(%wd, "imbalance spotlight: no deposits in window");
        return Spotlight {
            flag: true,
            score: f64::INFINITY,
        };
    }

    let score = ratio(wd, dep);
    debug!(%dep, %wd, score, "imbalance spotlight");
    Spotlight {
        flag: score > IMBALANCE_RATIO,
        score,
    }
}

/// `num / den` for a non-zero `den`; overflow past Decimal range saturates to +inf.
fn ratio(num: Decimal, den: Decimal) -> f64 {
    num.checked_div(den)
        .and_then(|r| r.to_f64())
        .unwrap_or(f64::INFINITY)
}
