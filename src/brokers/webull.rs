//! Webull order export layout.
//!
//! Webull exports orders rather than executions, so only rows whose Status
//! is "Filled" are trades. The fill timestamp carries a trailing timezone
//! token ("03/21/2025 09:31:05 EDT") that chrono's naive parsers reject.

use crate::brokers::normalize::{
    self, optional_decimal, parse_price, parse_quantity, side_from_token, NormalizeError,
    BASE_SIDE_TOKENS,
};
use crate::trades::{CanonicalTrade, RawRow};

pub(super) const REQUIRED_COLUMNS: &[&str] =
    &["Symbol", "Side", "Status", "Filled", "Avg Price", "Filled Time"];

const DATETIME_FORMATS: &[&str] = &["%m/%d/%Y %H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

/// Drops a trailing alphabetic timezone abbreviation, if any.
fn strip_tz(raw: &str) -> &str {
    match raw.trim().rsplit_once(' ') {
        Some((head, tail)) if tail.chars().all(|c| c.is_ascii_alphabetic()) => head,
        _ => raw.trim(),
    }
}

pub(super) fn parse_row(row: &RawRow, _row_index: usize) -> Result<CanonicalTrade, NormalizeError> {
    let status = row
        .get("Status")
        .ok_or(NormalizeError::MissingField("Status"))?;
    if !status.eq_ignore_ascii_case("filled") {
        return Err(NormalizeError::NotATrade(format!("order status {status}")));
    }

    let action = row.get("Side").ok_or(NormalizeError::MissingField("Side"))?;
    let side = side_from_token(action, BASE_SIDE_TOKENS)
        .ok_or_else(|| NormalizeError::UnrecognizedAction(action.to_string()))?;

    let symbol = row
        .get("Symbol")
        .map(normalize::clean_symbol)
        .filter(|s| !s.is_empty())
        .ok_or(NormalizeError::MissingField("Symbol"))?;

    let quantity = parse_quantity(row, "Filled")?;
    let price = parse_price(row, "Avg Price")?;

    let raw_time = row
        .get("Filled Time")
        .ok_or(NormalizeError::MissingField("Filled Time"))?;
    let stripped = strip_tz(raw_time);
    let (date, time) = match normalize::parse_datetime(stripped, DATETIME_FORMATS) {
        Some(dt) => (dt.date(), Some(dt.time())),
        None => (
            normalize::parse_date(stripped, DATE_FORMATS)
                .ok_or_else(|| NormalizeError::InvalidDate(raw_time.to_string()))?,
            None,
        ),
    };

    Ok(CanonicalTrade {
        original_symbol: symbol.clone(),
        symbol,
        quantity,
        price,
        side,
        date,
        time,
        description: row.get("Name").map(str::to_string),
        commission: None,
        amount: optional_decimal(row, "Amount"),
        option: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trades::TradeSide;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    fn filled_row() -> RawRow {
        RawRow::from_pairs([
            ("Symbol", "NVDA"),
            ("Side", "Buy"),
            ("Status", "Filled"),
            ("Filled", "3"),
            ("Avg Price", "875.20"),
            ("Filled Time", "03/21/2025 09:31:05 EDT"),
        ])
    }

    #[test]
    fn test_filled_order_with_timezone_suffix() {
        let trade = parse_row(&filled_row(), 0).unwrap();
        assert_eq!(trade.symbol, "NVDA");
        assert_eq!(trade.side, TradeSide::Buy);
        assert_eq!(trade.quantity, dec!(3));
        assert_eq!(trade.date, NaiveDate::from_ymd_opt(2025, 3, 21).unwrap());
        assert_eq!(trade.time, Some(NaiveTime::from_hms_opt(9, 31, 5).unwrap()));
    }

    #[test]
    fn test_unfilled_order_is_non_trade() {
        let row = RawRow::from_pairs([
            ("Symbol", "NVDA"),
            ("Side", "Buy"),
            ("Status", "Cancelled"),
            ("Filled", "0"),
            ("Avg Price", ""),
            ("Filled Time", ""),
        ]);
        assert_eq!(
            parse_row(&row, 0),
            Err(NormalizeError::NotATrade("order status Cancelled".to_string()))
        );
    }

    #[test]
    fn test_timestamp_without_timezone() {
        let row = RawRow::from_pairs([
            ("Symbol", "NVDA"),
            ("Side", "Sell"),
            ("Status", "filled"),
            ("Filled", "3"),
            ("Avg Price", "880.00"),
            ("Filled Time", "2025-03-21 15:59:59"),
        ]);
        let trade = parse_row(&row, 0).unwrap();
        assert_eq!(trade.side, TradeSide::Sell);
        assert_eq!(trade.time, Some(NaiveTime::from_hms_opt(15, 59, 59).unwrap()));
    }
}
