//! Fidelity export layout.
//!
//! Fidelity's `Action` cell is frequently a sentence ("YOU BOUGHT PROSHARES
//! ULTRA ..."), so side mapping falls back to phrase containment after the
//! exact token table. Option contracts are encoded in the Description column.

use log::debug;

use crate::brokers::normalize::{
    self, non_trade_token, optional_decimal, parse_price, parse_quantity, side_from_token,
    NormalizeError, BASE_SIDE_TOKENS,
};
use crate::brokers::options;
use crate::trades::{CanonicalTrade, RawRow, TradeSide};

pub(super) const REQUIRED_COLUMNS: &[&str] =
    &["Run Date", "Action", "Symbol", "Quantity", "Price ($)"];

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%m/%d/%y"];

/// Ordered phrase table for sentence-style actions. Checked only after the
/// exact token table misses; first containment wins.
const SIDE_PHRASES: &[(&str, TradeSide)] = &[
    ("YOU BOUGHT", TradeSide::Buy),
    ("YOU SOLD", TradeSide::Sell),
    ("BOUGHT", TradeSide::Buy),
    ("SOLD", TradeSide::Sell),
    ("PURCHASE", TradeSide::Buy),
    ("REDEMPTION", TradeSide::Sell),
];

fn side_from_action(action: &str) -> Option<TradeSide> {
    if let Some(side) = side_from_token(action, BASE_SIDE_TOKENS) {
        return Some(side);
    }
    let upper = action.to_uppercase();
    SIDE_PHRASES
        .iter()
        .find(|(phrase, _)| upper.contains(phrase))
        .map(|(_, side)| *side)
}

pub(super) fn parse_row(row: &RawRow, row_index: usize) -> Result<CanonicalTrade, NormalizeError> {
    let action = row
        .get("Action")
        .ok_or(NormalizeError::MissingField("Action"))?;
    if let Some(token) = non_trade_token(action) {
        return Err(NormalizeError::NotATrade(token.to_string()));
    }
    let side = side_from_action(action)
        .ok_or_else(|| NormalizeError::UnrecognizedAction(action.to_string()))?;

    let symbol = row
        .get("Symbol")
        .map(normalize::clean_symbol)
        .filter(|s| !s.is_empty())
        .ok_or(NormalizeError::MissingField("Symbol"))?;

    let quantity = parse_quantity(row, "Quantity")?;
    let price = parse_price(row, "Price ($)")?;

    let raw_date = row
        .get("Run Date")
        .ok_or(NormalizeError::MissingField("Run Date"))?;
    let date = normalize::parse_date(raw_date, DATE_FORMATS)
        .ok_or_else(|| NormalizeError::InvalidDate(raw_date.to_string()))?;

    let description = row.get("Description").map(str::to_string);
    let option = description
        .as_deref()
        .and_then(|desc| options::from_description(desc, date))
        .map(|(underlying, details)| {
            debug!(
                "row {}: option trade detected {} {} {} exp {}",
                row_index, underlying, details.option_type, details.strike_price,
                details.expiry_date
            );
            details
        });

    Ok(CanonicalTrade {
        original_symbol: symbol.clone(),
        symbol,
        quantity,
        price,
        side,
        date,
        time: None,
        description,
        commission: optional_decimal(row, "Commission ($)"),
        amount: optional_decimal(row, "Amount ($)"),
        option,
    })
}
