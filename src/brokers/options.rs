//! Option-trade detection heuristics.
//!
//! Brokers encode option contracts either in dedicated columns or embedded
//! in the symbol/description text. The recognizers here cover the textual
//! formats; column-driven brokers assemble [`OptionDetails`] directly.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::trades::{OptionDetails, OptionType};

lazy_static! {
    /// Fidelity/Robinhood description style: "GOOG 6/9/2023 Call $123.00"
    static ref DESC_OPTION_RE: Regex =
        Regex::new(r"(?i)\b([A-Z]{1,6})\s+(\d{1,2}/\d{1,2}/\d{4})\s+(CALL|PUT)\s+\$?(\d+(?:\.\d+)?)")
            .expect("Invalid regex pattern");

    /// Schwab symbol style: "OEX 12/19/2009 495.00 C"
    static ref OCC_SYMBOL_RE: Regex =
        Regex::new(r"^([A-Z]{1,6})\s+(\d{1,2}/\d{1,2}/\d{4})\s+(\d+(?:\.\d+)?)\s+([CP])$")
            .expect("Invalid regex pattern");

    /// Interactive Brokers description style: "SPX 15MAR24 5140 P"
    static ref IB_DESC_RE: Regex =
        Regex::new(r"(?i)^([A-Z]{1,6})\s+(\d{1,2}[A-Z]{3}\d{2})\s+(\d+(?:\.\d+)?)\s+([CP])$")
            .expect("Invalid regex pattern");
}

/// Days from trade date to expiry, in whole days. Signed: already-expired
/// contracts yield a negative value, deliberately not clamped.
pub(super) fn days_to_expiry(trade_date: NaiveDate, expiry_date: NaiveDate) -> i64 {
    (expiry_date - trade_date).num_days()
}

fn option_type_from(token: &str) -> Option<OptionType> {
    match token.trim().to_uppercase().as_str() {
        "C" | "CALL" => Some(OptionType::Call),
        "P" | "PUT" => Some(OptionType::Put),
        _ => None,
    }
}

/// Parses a Put/Call indicator cell (IB `Put/Call`, tastytrade `Call or Put`).
pub(super) fn parse_option_type(token: &str) -> Option<OptionType> {
    option_type_from(token)
}

fn details(
    option_type: OptionType,
    strike: Decimal,
    expiry_date: NaiveDate,
    trade_date: NaiveDate,
) -> OptionDetails {
    OptionDetails {
        option_type,
        strike_price: strike,
        expiry_date,
        dte: days_to_expiry(trade_date, expiry_date),
    }
}

/// Recognizes "SYM M/D/YYYY Call|Put $STRIKE" descriptions. Returns the
/// underlying symbol alongside the contract details.
pub(super) fn from_description(
    description: &str,
    trade_date: NaiveDate,
) -> Option<(String, OptionDetails)> {
    let caps = DESC_OPTION_RE.captures(description)?;
    let expiry = NaiveDate::parse_from_str(&caps[2], "%m/%d/%Y").ok()?;
    let option_type = option_type_from(&caps[3])?;
    let strike = Decimal::from_str(&caps[4]).ok()?;
    Some((
        caps[1].to_uppercase(),
        details(option_type, strike, expiry, trade_date),
    ))
}

/// Recognizes Schwab's "SYM M/D/YYYY STRIKE C|P" option symbols.
pub(super) fn from_occ_symbol(
    symbol: &str,
    trade_date: NaiveDate,
) -> Option<(String, OptionDetails)> {
    let caps = OCC_SYMBOL_RE.captures(symbol.trim())?;
    let expiry = NaiveDate::parse_from_str(&caps[2], "%m/%d/%Y").ok()?;
    let strike = Decimal::from_str(&caps[3]).ok()?;
    let option_type = option_type_from(&caps[4])?;
    Some((
        caps[1].to_string(),
        details(option_type, strike, expiry, trade_date),
    ))
}

/// Recognizes Interactive Brokers' "SYM 15MAR24 5140 P" descriptions.
pub(super) fn from_ib_description(
    description: &str,
    trade_date: NaiveDate,
) -> Option<(String, OptionDetails)> {
    let caps = IB_DESC_RE.captures(description.trim())?;
    let expiry = NaiveDate::parse_from_str(&caps[2], "%d%b%y").ok()?;
    let strike = Decimal::from_str(&caps[3]).ok()?;
    let option_type = option_type_from(&caps[4])?;
    Some((
        caps[1].to_uppercase(),
        details(option_type, strike, expiry, trade_date),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_description_call() {
        let (underlying, opt) =
            from_description("GOOG 6/9/2023 Call $123.00", date(2023, 6, 1)).unwrap();
        assert_eq!(underlying, "GOOG");
        assert_eq!(opt.option_type, OptionType::Call);
        assert_eq!(opt.strike_price, dec!(123.00));
        assert_eq!(opt.expiry_date, date(2023, 6, 9));
        assert_eq!(opt.dte, 8);
    }

    #[test]
    fn test_from_description_put_without_dollar_sign() {
        let (_, opt) = from_description("XOM 7/19/2024 Put 80", date(2024, 7, 1)).unwrap();
        assert_eq!(opt.option_type, OptionType::Put);
        assert_eq!(opt.strike_price, dec!(80));
    }

    #[test]
    fn test_from_description_plain_equity() {
        assert!(from_description("APPLE INC COM", date(2024, 1, 1)).is_none());
    }

    #[test]
    fn test_from_occ_symbol() {
        let (underlying, opt) =
            from_occ_symbol("OEX 12/19/2009 495.00 C", date(2009, 12, 1)).unwrap();
        assert_eq!(underlying, "OEX");
        assert_eq!(opt.option_type, OptionType::Call);
        assert_eq!(opt.strike_price, dec!(495.00));
        assert_eq!(opt.dte, 18);
    }

    #[test]
    fn test_from_ib_description() {
        let (underlying, opt) = from_ib_description("SPX 15MAR24 5140 P", date(2024, 3, 1)).unwrap();
        assert_eq!(underlying, "SPX");
        assert_eq!(opt.option_type, OptionType::Put);
        assert_eq!(opt.strike_price, dec!(5140));
        assert_eq!(opt.expiry_date, date(2024, 3, 15));
        assert_eq!(opt.dte, 14);
    }

    #[test]
    fn test_dte_negative_when_already_expired() {
        assert_eq!(days_to_expiry(date(2024, 3, 20), date(2024, 3, 15)), -5);
    }
}
