//! Rule-based anomaly flags comparing a window against its trailing history.

pub mod burst;
pub mod imbalance;

use chrono::{Duration, NaiveDateTime};
use serde::{Serialize, Serializer};

pub use burst::burst;
pub use imbalance::imbalance;

use crate::types::Transaction;

/// One named rule outcome. `score` is +inf when the rule's denominator is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spotlight {
    pub flag: bool,
    #[serde(serialize_with = "serialize_score")]
    pub score: f64,
}

/// Finite scores stay numbers; infinities become the strings `"Infinity"` / `"-Infinity"`.
/// NaN is passed through untouched so the payload boundary rejects it.
fn serialize_score<S: Serializer>(score: &f64, s: S) -> Result<S::Ok, S::Error> {
    if score.is_infinite() {
        s.serialize_str(if *score > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        s.serialize_f64(*score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spotlights {
    pub burst: Spotlight,
    pub imbalance: Spotlight,
}

impl Spotlights {
    pub fn any_flagged(&self) -> bool {
        self.burst.flag || self.imbalance.flag
    }
}

/// History rows with `anchor - lookback_days <= timestamp <= anchor`, input order kept.
/// The lower bound clamps to the earliest representable instant.
pub fn trailing_history(
    history: &[Transaction],
    anchor: NaiveDateTime,
    lookback_days: i64,
) -> Vec<Transaction> {
    let from = anchor
        .checked_sub_signed(Duration::days(lookback_days))
        .unwrap_or(NaiveDateTime::MIN);
    history
        .iter()
        .filter(|t| t.timestamp >= from && t.timestamp <= anchor)
        .cloned()
        .collect()
}

pub fn evaluate(window: &[Transaction], history: &[Transaction]) -> Spotlights {
    Spotlights {
        burst: burst(window, history),
        imbalance: imbalance(window),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::{ts, tx};
    use rust_decimal_macros::dec;

    #[test]
    fn trailing_history_is_inclusive_and_ignores_future_rows() {
        let history = vec![
            tx("2023-12-01 12:00:00", dec!(1), "ZA", "EFT"),
            tx("2023-12-02 12:00:00", dec!(2), "ZA", "EFT"),
            tx("2024-02-29 12:00:00", dec!(3), "ZA", "EFT"),
            tx("2024-03-01 12:00:00", dec!(4), "ZA", "EFT"),
            tx("2024-03-01 12:00:01", dec!(5), "ZA", "EFT"),
        ];
        let picked = trailing_history(&history, ts("2024-03-01 12:00:00"), 90);
        let amounts: Vec<_> = picked.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![dec!(2), dec!(3), dec!(4)]);
    }

    #[test]
    fn trailing_history_clamps_at_earliest_instant() {
        let first = Transaction {
            timestamp: NaiveDateTime::MIN,
            ..tx("2024-03-01 12:00:00", dec!(7), "ZA", "EFT")
        };
        let anchor = NaiveDateTime::MIN + Duration::days(1);
        let picked = trailing_history(&[first.clone()], anchor, 90);
        assert_eq!(picked, vec![first.clone()]);

        let spots = evaluate(&[first.clone()], &[first]);
        assert_eq!(spots.burst.score, 1.0);
    }

    #[test]
    fn infinite_score_serializes_as_string() {
        let s = Spotlight { flag: true, score: f64::INFINITY };
        let json = serde_json::to_value(s).unwrap();
        assert_eq!(json["score"], "Infinity");
        assert_eq!(json["flag"], true);

        let finite = Spotlight { flag: false, score: 0.5 };
        assert_eq!(serde_json::to_value(finite).unwrap()["score"], 0.5);
    }

    #[test]
    fn evaluate_runs_both_rules() {
        let window = vec![tx("2024-03-01 09:00:00", dec!(-10), "ZA", "ATM")];
        let spots = evaluate(&window, &window);
        assert!(spots.imbalance.flag);
        assert!(spots.any_flagged());
        assert_eq!(spots.burst.score, 1.0);
    }
}
