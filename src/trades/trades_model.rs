//! Canonical trade data model.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::brokers::Broker;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Option contract type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "CALL",
            OptionType::Put => "PUT",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes of a derivative trade, present only when the row encodes one.
///
/// `dte` is the number of whole days from the trade date to expiry. It is
/// signed: a contract that already expired at trade time yields a negative
/// value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDetails {
    pub option_type: OptionType,
    pub strike_price: Decimal,
    pub expiry_date: NaiveDate,
    pub dte: i64,
}

/// Normalized trade record, independent of source broker formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTrade {
    /// Uppercase, non-empty ticker. May have been replaced by the symbol
    /// resolver; `original_symbol` always holds the pre-resolution value.
    pub symbol: String,
    pub original_symbol: String,
    /// Always positive.
    pub quantity: Decimal,
    /// Never negative.
    pub price: Decimal,
    pub side: TradeSide,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub description: Option<String>,
    pub commission: Option<Decimal>,
    /// Net proceeds / amount column when the broker exports one.
    pub amount: Option<Decimal>,
    pub option: Option<OptionDetails>,
}

impl CanonicalTrade {
    pub fn is_option(&self) -> bool {
        self.option.is_some()
    }

    /// Whether the symbol resolver replaced the broker's raw symbol.
    pub fn is_enhanced(&self) -> bool {
        self.symbol != self.original_symbol
    }
}

/// One CSV data row as read from the file: column name to string value,
/// in file column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Returns the trimmed value for a column, or `None` when the column is
    /// absent or blank. Broker exports routinely leave cells empty; callers
    /// treat blank and missing the same way.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Returns the first non-empty value among the given column names.
    pub fn first_of(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.get(name))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A data row that failed normalization. The pipeline never drops a row
/// silently: every input row becomes either a `CanonicalTrade` or a
/// `RowError`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// 0-indexed position among the file's data rows.
    pub row_index: usize,
    pub raw_row: RawRow,
    pub reason: String,
}

/// Outcome of one upload: ordered trades plus the per-row error log.
///
/// Created fresh per upload and never mutated after the pipeline finishes.
/// Invariant: `total_rows == trades.len() + errors.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub broker: Broker,
    pub total_rows: usize,
    pub trades: Vec<CanonicalTrade>,
    pub errors: Vec<RowError>,
    pub enhanced_count: usize,
}
