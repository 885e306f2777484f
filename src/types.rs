use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, Result};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub(crate) fn deserialize_timestamp<'de, D>(d: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp {s:?}")))
}

/// One ledger row. Positive `amount` is a deposit, negative a withdrawal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(alias = "tx_datetime", deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    pub counterparty_country_code: String,
    pub channel: String,
}

impl Transaction {
    #[inline]
    pub fn is_deposit(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    #[inline]
    pub fn is_withdrawal(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Hour-of-day bucket, 0..=23, ignoring the date.
    #[inline]
    pub fn hour(&self) -> usize {
        self.timestamp.hour() as usize
    }

    #[inline]
    pub fn is_domestic(&self, home: &str) -> bool {
        self.counterparty_country_code == home
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` time range selecting the rows under analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(AppError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whole-day window: midnight of `first_day` through 23:59:59 of `last_day`.
    pub fn from_dates(first_day: NaiveDate, last_day: NaiveDate) -> Result<Self> {
        let start = first_day.and_time(NaiveTime::MIN);
        let end = last_day
            .and_hms_opt(23, 59, 59)
            .ok_or(AppError::DateOutOfRange(last_day))?;
        Self::new(start, end)
    }

    /// Whole-day window covering every row of `table`. None for an empty table.
    pub fn spanning(table: &[Transaction]) -> Option<Self> {
        let first = table.iter().map(|t| t.timestamp).min()?;
        let last = table.iter().map(|t| t.timestamp).max()?;
        Self::from_dates(first.date(), last.date()).ok()
    }

    #[inline]
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// Rows falling inside the window, in input order.
    pub fn select(&self, table: &[Transaction]) -> Vec<Transaction> {
        table
            .iter()
            .filter(|t| self.contains(t.timestamp))
            .cloned()
            .collect()
    }
}
