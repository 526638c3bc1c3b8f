//! Robinhood activity export layout.
//!
//! The `Trans Code` column mixes trades with cash events (CDIV, ACH, RTP),
//! so the non-trade filter runs before side mapping. Option expirations
//! ("OEXP") close the position and are treated as sells at price zero.

use rust_decimal::Decimal;

use crate::brokers::normalize::{
    self, non_trade_token, optional_decimal, parse_price, parse_quantity, side_from_token,
    NormalizeError, BASE_SIDE_TOKENS,
};
use crate::brokers::options;
use crate::trades::{CanonicalTrade, RawRow, TradeSide};

pub(super) const REQUIRED_COLUMNS: &[&str] =
    &["Activity Date", "Trans Code", "Instrument", "Quantity", "Price"];

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

const SIDE_TOKENS: &[(&str, TradeSide)] = &[
    ("OEXP", TradeSide::Sell),
    ("OPTION EXPIRATION", TradeSide::Sell),
    ("OASGN", TradeSide::Sell),
];

fn side_from_trans_code(code: &str) -> Option<TradeSide> {
    side_from_token(code, BASE_SIDE_TOKENS).or_else(|| side_from_token(code, SIDE_TOKENS))
}

/// Expiration and assignment rows close the position without a fill price;
/// Robinhood leaves the Price cell blank on them.
fn is_position_close(code: &str) -> bool {
    side_from_token(code, SIDE_TOKENS).is_some()
}

pub(super) fn parse_row(row: &RawRow, _row_index: usize) -> Result<CanonicalTrade, NormalizeError> {
    let code = row
        .get("Trans Code")
        .ok_or(NormalizeError::MissingField("Trans Code"))?;
    if let Some(token) = non_trade_token(code) {
        return Err(NormalizeError::NotATrade(token.to_string()));
    }
    let side = side_from_trans_code(code)
        .ok_or_else(|| NormalizeError::UnrecognizedAction(code.to_string()))?;

    let symbol = row
        .get("Instrument")
        .map(normalize::clean_symbol)
        .filter(|s| !s.is_empty())
        .ok_or(NormalizeError::MissingField("Instrument"))?;

    let quantity = parse_quantity(row, "Quantity")?;
    let price = if is_position_close(code) && row.get("Price").is_none() {
        Decimal::ZERO
    } else {
        parse_price(row, "Price")?
    };

    let raw_date = row
        .get("Activity Date")
        .ok_or(NormalizeError::MissingField("Activity Date"))?;
    let date = normalize::parse_date(raw_date, DATE_FORMATS)
        .ok_or_else(|| NormalizeError::InvalidDate(raw_date.to_string()))?;

    let description = row.get("Description").map(str::to_string);
    let option = description
        .as_deref()
        .and_then(|desc| options::from_description(desc, date))
        .map(|(_, details)| details);

    Ok(CanonicalTrade {
        original_symbol: symbol.clone(),
        symbol,
        quantity,
        price,
        side,
        date,
        time: None,
        description,
        commission: None,
        amount: optional_decimal(row, "Amount"),
        option,
    })
}
