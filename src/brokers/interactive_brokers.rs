//! Interactive Brokers flex-query export layout.
//!
//! IB exports carry contract-style identifiers (conids, class-suffixed
//! symbols) rather than plain tickers, which is why this broker is gated
//! into symbol enhancement. Options arrive either in dedicated columns
//! (`Put/Call`, `Strike`, `Expiry`) or packed into the Description cell.

use log::debug;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::brokers::normalize::{
    self, non_trade_token, optional_decimal, parse_price, parse_quantity, side_from_token,
    NormalizeError, BASE_SIDE_TOKENS,
};
use crate::brokers::options;
use crate::trades::{CanonicalTrade, OptionDetails, RawRow};

pub(super) const REQUIRED_COLUMNS: &[&str] =
    &["TradeDate", "Buy/Sell", "Symbol", "Quantity", "TradePrice"];

const DATE_FORMATS: &[&str] = &["%Y%m%d", "%Y-%m-%d", "%m/%d/%Y"];
const EXPIRY_FORMATS: &[&str] = &["%Y%m%d", "%Y-%m-%d", "%m/%d/%Y"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H%M%S"];

/// Builds option details from IB's dedicated columns, when all three are
/// present and parseable.
fn option_from_columns(
    row: &RawRow,
    trade_date: chrono::NaiveDate,
) -> Option<(Option<String>, OptionDetails)> {
    let option_type = options::parse_option_type(row.get("Put/Call")?)?;
    let strike = Decimal::from_str(row.get("Strike")?).ok()?;
    let expiry = normalize::parse_date(row.get("Expiry")?, EXPIRY_FORMATS)?;
    let underlying = row
        .get("UnderlyingSymbol")
        .map(normalize::clean_symbol)
        .filter(|s| !s.is_empty());
    Some((
        underlying,
        OptionDetails {
            option_type,
            strike_price: strike,
            expiry_date: expiry,
            dte: options::days_to_expiry(trade_date, expiry),
        },
    ))
}

pub(super) fn parse_row(row: &RawRow, row_index: usize) -> Result<CanonicalTrade, NormalizeError> {
    let action = row
        .get("Buy/Sell")
        .ok_or(NormalizeError::MissingField("Buy/Sell"))?;
    if let Some(token) = non_trade_token(action) {
        return Err(NormalizeError::NotATrade(token.to_string()));
    }
    let side = side_from_token(action, BASE_SIDE_TOKENS)
        .ok_or_else(|| NormalizeError::UnrecognizedAction(action.to_string()))?;

    let raw_symbol = row
        .get("Symbol")
        .ok_or(NormalizeError::MissingField("Symbol"))?;

    let quantity = parse_quantity(row, "Quantity")?;
    let price = parse_price(row, "TradePrice")?;

    let raw_date = row
        .get("TradeDate")
        .ok_or(NormalizeError::MissingField("TradeDate"))?;
    let date = normalize::parse_date(raw_date, DATE_FORMATS)
        .ok_or_else(|| NormalizeError::InvalidDate(raw_date.to_string()))?;

    let time = row
        .get("TradeTime")
        .and_then(|raw| normalize::parse_time(raw, TIME_FORMATS));

    let description = row.get("Description").map(str::to_string);

    // Options: dedicated columns first, then the packed description form,
    // then the symbol cell itself (flex queries sometimes put the contract
    // string in Symbol).
    let (mut symbol, option) = if let Some((underlying, details)) = option_from_columns(row, date)
    {
        // Without an UnderlyingSymbol column the Symbol cell may hold the
        // packed contract string; recover the underlying from it rather
        // than squashing the whole string into one token.
        let underlying = underlying
            .or_else(|| options::from_ib_description(raw_symbol, date).map(|(u, _)| u))
            .unwrap_or_else(|| normalize::clean_symbol(raw_symbol));
        (underlying, Some(details))
    } else if let Some((underlying, details)) = description
        .as_deref()
        .and_then(|desc| options::from_ib_description(desc, date))
    {
        (underlying, Some(details))
    } else if let Some((underlying, details)) = options::from_ib_description(raw_symbol, date) {
        (underlying, Some(details))
    } else {
        (normalize::clean_symbol(raw_symbol), None)
    };

    if option.is_some() {
        debug!("row {}: option contract on {}", row_index, symbol);
    }

    // IB appends the listing class after a period ("BRK.B" stays, but
    // "VOD.LSE" drops the exchange). Only strip when the suffix is longer
    // than a share class letter. Digits are kept so conids survive for
    // the symbol resolver.
    if let Some((base, suffix)) = symbol.split_once('.') {
        if suffix.len() > 1 && !base.is_empty() {
            symbol = base.to_string();
        }
    }

    if symbol.is_empty() {
        return Err(NormalizeError::MissingField("Symbol"));
    }

    Ok(CanonicalTrade {
        original_symbol: symbol.clone(),
        symbol,
        quantity,
        price,
        side,
        date,
        time,
        description,
        commission: optional_decimal(row, "IBCommission")
            .or_else(|| optional_decimal(row, "Commission")),
        amount: optional_decimal(row, "Proceeds"),
        option,
    })
}
