use serde::Serialize;

use crate::metrics::aggregate::{fold, Aggregate, Tally, Total};
use crate::types::Transaction;

// ---------------------------------------------------------------------------
// Directional totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DirectionalTotals {
    pub deposits: Total,
    /// Value is the magnitude of the summed withdrawals.
    pub withdrawals: Total,
}

#[derive(Debug, Clone, Default)]
pub struct DirectionalAcc {
    deposits: Tally,
    withdrawals: Tally,
}

impl Aggregate for DirectionalAcc {
    type Output = DirectionalTotals;

    fn observe(&mut self, tx: &Transaction) {
        if tx.is_deposit() {
            self.deposits.add(tx.amount);
        } else if tx.is_withdrawal() {
            self.withdrawals.add(tx.amount);
        }
    }

    fn merge(&mut self, later: Self) {
        self.deposits.merge(later.deposits);
        self.withdrawals.merge(later.withdrawals);
    }

    fn finish(self) -> DirectionalTotals {
        DirectionalTotals {
            deposits: self.deposits.total(),
            withdrawals: self.withdrawals.total(),
        }
    }
}

/// Deposit and withdrawal counts and values. Zero amounts count towards neither.
pub fn directional_totals(table: &[Transaction]) -> DirectionalTotals {
    fold(DirectionalAcc::default(), table)
}

// ---------------------------------------------------------------------------
// Extremes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extremes {
    pub largest_deposit: Option<Transaction>,
    pub largest_withdrawal: Option<Transaction>,
}

#[derive(Debug, Clone, Default)]
pub struct ExtremesAcc {
    largest_deposit: Option<Transaction>,
    largest_withdrawal: Option<Transaction>,
}

/// Replace `slot` only when `candidate` strictly beats it, so the earliest row wins ties.
fn keep_first<F>(slot: &mut Option<Transaction>, candidate: &Transaction, beats: F)
where
    F: Fn(&Transaction, &Transaction) -> bool,
{
    if slot.as_ref().map_or(true, |current| beats(candidate, current)) {
        *slot = Some(candidate.clone());
    }
}

fn higher(a: &Transaction, b: &Transaction) -> bool {
    a.amount > b.amount
}

fn lower(a: &Transaction, b: &Transaction) -> bool {
    a.amount < b.amount
}

impl Aggregate for ExtremesAcc {
    type Output = Extremes;

    fn observe(&mut self, tx: &Transaction) {
        if tx.is_deposit() {
            keep_first(&mut self.largest_deposit, tx, higher);
        } else if tx.is_withdrawal() {
            keep_first(&mut self.largest_withdrawal, tx, lower);
        }
    }

    fn merge(&mut self, later: Self) {
        if let Some(dep) = later.largest_deposit {
            keep_first(&mut self.largest_deposit, &dep, higher);
        }
        if let Some(wd) = later.largest_withdrawal {
            keep_first(&mut self.largest_withdrawal, &wd, lower);
        }
    }

    fn finish(self) -> Extremes {
        Extremes {
            largest_deposit: self.largest_deposit,
            largest_withdrawal: self.largest_withdrawal,
        }
    }
}

/// Largest single inflow and largest-magnitude single outflow; first occurrence on ties.
pub fn extremes(table: &[Transaction]) -> Extremes {
    fold(ExtremesAcc::default(), table)
}
