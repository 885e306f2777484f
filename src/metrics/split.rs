use serde::Serialize;

use crate::metrics::aggregate::{fold, Aggregate, Tally, Total};
use crate::types::Transaction;

/// Strict partition on `counterparty_country_code == home`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DomesticSplit {
    pub domestic: Total,
    pub international: Total,
}

#[derive(Debug, Clone)]
pub struct DomesticSplitAcc {
    home: String,
    domestic: Tally,
    international: Tally,
}

impl DomesticSplitAcc {
    pub fn new(home: &str) -> Self {
        Self {
            home: home.to_string(),
            domestic: Tally::default(),
            international: Tally::default(),
        }
    }
}

impl Aggregate for DomesticSplitAcc {
    type Output = DomesticSplit;

    fn observe(&mut self, tx: &Transaction) {
        if tx.is_domestic(&self.home) {
            self.domestic.add(tx.amount);
        } else {
            self.international.add(tx.amount);
        }
    }

    fn merge(&mut self, later: Self) {
        self.domestic.merge(later.domestic);
        self.international.merge(later.international);
    }

    fn finish(self) -> DomesticSplit {
        DomesticSplit {
            domestic: self.domestic.total(),
            international: self.international.total(),
        }
    }
}

/// Count and absolute net value on each side; an empty side reports zeros.
pub fn domestic_split(table: &[Transaction], home: &str) -> DomesticSplit {
    fold(DomesticSplitAcc::new(home), table)
}
