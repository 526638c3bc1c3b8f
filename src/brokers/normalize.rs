//! Shared normalization helpers used by every broker variant.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use crate::trades::{RawRow, TradeSide};

/// Why a single row could not be normalized. Rendered into the row's
/// human-readable error reason; never aborts the batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("required column '{0}' is missing or empty")]
    MissingField(&'static str),

    #[error("could not parse quantity '{0}'")]
    InvalidQuantity(String),

    #[error("quantity must be positive, got '{0}'")]
    NonPositiveQuantity(String),

    #[error("could not parse price '{0}'")]
    InvalidPrice(String),

    #[error("price must not be negative, got '{0}'")]
    NegativePrice(String),

    #[error("unrecognized side/action token '{0}'")]
    UnrecognizedAction(String),

    #[error("could not parse date '{0}'")]
    InvalidDate(String),

    #[error("not a trade row: {0}")]
    NotATrade(String),
}

/// Action/side tokens shared by most broker vocabularies. Per-broker tables
/// extend this list; lookups are exact matches on the uppercased token.
pub(super) const BASE_SIDE_TOKENS: &[(&str, TradeSide)] = &[
    ("BUY", TradeSide::Buy),
    ("BOUGHT", TradeSide::Buy),
    ("YOU BOUGHT", TradeSide::Buy),
    ("PURCHASE", TradeSide::Buy),
    ("PURCHASED", TradeSide::Buy),
    ("BTO", TradeSide::Buy),
    ("BTC", TradeSide::Buy),
    ("BUY TO OPEN", TradeSide::Buy),
    ("BUY TO CLOSE", TradeSide::Buy),
    ("SELL", TradeSide::Sell),
    ("SOLD", TradeSide::Sell),
    ("YOU SOLD", TradeSide::Sell),
    ("SALE", TradeSide::Sell),
    ("STO", TradeSide::Sell),
    ("STC", TradeSide::Sell),
    ("SELL TO OPEN", TradeSide::Sell),
    ("SELL TO CLOSE", TradeSide::Sell),
];

/// Action tokens that mark a row as a non-trade transaction (dividends,
/// interest, transfers, fees). These become per-row errors with a named
/// reason rather than being silently dropped, so that every input row is
/// accounted for in the pipeline result.
pub(super) const NON_TRADE_TOKENS: &[&str] = &[
    "DIV",
    "DIVIDEND",
    "CDIV",
    "INT",
    "INTEREST",
    "ACH",
    "RTP",
    "ADJ",
    "ADJUSTMENT",
    "JOURNAL",
    "REINVEST",
    "REINVESTMENT",
    "FEE",
    "WIRE",
    "ATM",
    "CHECK",
    "DISTRIBUTION",
    "ELECTRONIC FUNDS TRANSFER",
];

/// Looks up a side token in a fixed table, case-insensitively.
pub(super) fn side_from_token(
    token: &str,
    table: &[(&str, TradeSide)],
) -> Option<TradeSide> {
    let normalized = token.trim().to_uppercase();
    table
        .iter()
        .find(|(t, _)| *t == normalized)
        .map(|(_, side)| *side)
}

/// Returns the non-trade token when the action marks a non-trade row.
pub(super) fn non_trade_token(action: &str) -> Option<&'static str> {
    let normalized = action.trim().to_uppercase();
    NON_TRADE_TOKENS
        .iter()
        .find(|t| **t == normalized)
        .copied()
}

/// Parses a decimal cell, stripping currency symbols, thousands separators,
/// and whitespace. Parenthesized values are negative (accounting style).
pub(super) fn clean_decimal(raw: &str) -> Option<Decimal> {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.starts_with('(') && cleaned.ends_with(')') && cleaned.len() > 2 {
        cleaned = format!("-{}", &cleaned[1..cleaned.len() - 1]);
    }
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Reads and validates the quantity column. Zero or negative quantities are
/// errors, never coerced: brokers that sign-encode sells still carry an
/// explicit action token, and a signless coercion would hide bad data.
pub(super) fn parse_quantity(row: &RawRow, column: &'static str) -> Result<Decimal, NormalizeError> {
    let raw = row.get(column).ok_or(NormalizeError::MissingField(column))?;
    let qty = clean_decimal(raw).ok_or_else(|| NormalizeError::InvalidQuantity(raw.to_string()))?;
    if qty <= Decimal::ZERO {
        return Err(NormalizeError::NonPositiveQuantity(raw.to_string()));
    }
    Ok(qty)
}

/// Reads and validates the price column. Zero is allowed (expirations,
/// worthless closes); negative is not.
pub(super) fn parse_price(row: &RawRow, column: &'static str) -> Result<Decimal, NormalizeError> {
    let raw = row.get(column).ok_or(NormalizeError::MissingField(column))?;
    let price = clean_decimal(raw).ok_or_else(|| NormalizeError::InvalidPrice(raw.to_string()))?;
    if price < Decimal::ZERO {
        return Err(NormalizeError::NegativePrice(raw.to_string()));
    }
    Ok(price)
}

/// Reads an optional decimal column (commission, net amount).
pub(super) fn optional_decimal(row: &RawRow, column: &str) -> Option<Decimal> {
    row.get(column).and_then(clean_decimal)
}

/// Tries each date format in order against the trimmed cell.
pub(super) fn parse_date(raw: &str, formats: &[&str]) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Like [`parse_date`], for formats that carry a time-of-day component.
pub(super) fn parse_datetime(raw: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}

/// Tries time-of-day formats against the trimmed cell.
pub(super) fn parse_time(raw: &str, formats: &[&str]) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    formats
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
}

/// Uppercases a symbol and strips all interior whitespace.
pub(super) fn clean_symbol(raw: &str) -> String {
    raw.split_whitespace().collect::<String>().to_uppercase()
}
