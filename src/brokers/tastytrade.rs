//! tastytrade transaction history layout.
//!
//! Actions come underscored ("BUY_TO_OPEN"), dates as ISO timestamps with a
//! UTC offset, and option legs in dedicated columns. The Symbol cell for an
//! option leg is the full contract string; the underlying is its first token.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::brokers::normalize::{
    self, non_trade_token, optional_decimal, parse_price, parse_quantity, side_from_token,
    NormalizeError, BASE_SIDE_TOKENS,
};
use crate::brokers::options;
use crate::trades::{CanonicalTrade, OptionDetails, RawRow};

pub(super) const REQUIRED_COLUMNS: &[&str] =
    &["Date", "Action", "Symbol", "Quantity", "Average Price"];

const EXPIRY_FORMATS: &[&str] = &["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"];

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S%z")
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| normalize::parse_datetime(raw, &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]))
}

fn option_from_columns(row: &RawRow, trade_date: NaiveDate) -> Option<OptionDetails> {
    let option_type = options::parse_option_type(row.get("Call or Put")?)?;
    let strike = Decimal::from_str(row.get("Strike Price")?).ok()?;
    let expiry = normalize::parse_date(row.get("Expiration Date")?, EXPIRY_FORMATS)?;
    Some(OptionDetails {
        option_type,
        strike_price: strike,
        expiry_date: expiry,
        dte: options::days_to_expiry(trade_date, expiry),
    })
}

pub(super) fn parse_row(row: &RawRow, _row_index: usize) -> Result<CanonicalTrade, NormalizeError> {
    let action = row
        .get("Action")
        .ok_or(NormalizeError::MissingField("Action"))?;
    if let Some(token) = non_trade_token(action) {
        return Err(NormalizeError::NotATrade(token.to_string()));
    }
    // "BUY_TO_OPEN" and friends normalize to the spaced base tokens.
    let spaced = action.replace('_', " ");
    let side = side_from_token(&spaced, BASE_SIDE_TOKENS)
        .ok_or_else(|| NormalizeError::UnrecognizedAction(action.to_string()))?;

    let quantity = parse_quantity(row, "Quantity")?;
    let price = parse_price(row, "Average Price")?;

    let raw_date = row.get("Date").ok_or(NormalizeError::MissingField("Date"))?;
    let (date, time) = match parse_timestamp(raw_date) {
        Some(dt) => (dt.date(), Some(dt.time())),
        None => (
            normalize::parse_date(raw_date, &["%Y-%m-%d", "%m/%d/%Y"])
                .ok_or_else(|| NormalizeError::InvalidDate(raw_date.to_string()))?,
            None,
        ),
    };

    let raw_symbol = row
        .get("Symbol")
        .ok_or(NormalizeError::MissingField("Symbol"))?;
    let option = option_from_columns(row, date);
    let symbol = if option.is_some() {
        // "SOFI  240719P00008000" or "SOFI 7/19/24 P 8": first token is
        // the underlying either way.
        row.get("Underlying Symbol")
            .map(normalize::clean_symbol)
            .or_else(|| {
                raw_symbol
                    .split_whitespace()
                    .next()
                    .map(normalize::clean_symbol)
            })
            .filter(|s| !s.is_empty())
            .ok_or(NormalizeError::MissingField("Symbol"))?
    } else {
        let cleaned = normalize::clean_symbol(raw_symbol);
        if cleaned.is_empty() {
            return Err(NormalizeError::MissingField("Symbol"));
        }
        cleaned
    };

    Ok(CanonicalTrade {
        original_symbol: symbol.clone(),
        symbol,
        quantity,
        price,
        side,
        date,
        time,
        description: row.get("Description").map(str::to_string),
        commission: optional_decimal(row, "Commissions")
            .or_else(|| optional_decimal(row, "Commission")),
        amount: optional_decimal(row, "Value"),
        option,
    })
}
