//! TradingView paper/broker trade-list export layout.

use crate::brokers::normalize::{
    self, non_trade_token, optional_decimal, parse_price, parse_quantity, side_from_token,
    NormalizeError, BASE_SIDE_TOKENS,
};
use crate::trades::{CanonicalTrade, RawRow};

pub(super) const REQUIRED_COLUMNS: &[&str] = &["Date", "Action", "Symbol", "Quantity", "Price"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

pub(super) fn parse_row(row: &RawRow, _row_index: usize) -> Result<CanonicalTrade, NormalizeError> {
    let action = row
        .get("Action")
        .ok_or(NormalizeError::MissingField("Action"))?;
    if let Some(token) = non_trade_token(action) {
        return Err(NormalizeError::NotATrade(token.to_string()));
    }
    let side = side_from_token(action, BASE_SIDE_TOKENS)
        .ok_or_else(|| NormalizeError::UnrecognizedAction(action.to_string()))?;

    // TradingView prefixes the exchange ("NASDAQ:AAPL"); the ticker is the
    // part after the colon.
    let raw_symbol = row
        .get("Symbol")
        .ok_or(NormalizeError::MissingField("Symbol"))?;
    let symbol = normalize::clean_symbol(
        raw_symbol
            .rsplit_once(':')
            .map(|(_, ticker)| ticker)
            .unwrap_or(raw_symbol),
    );
    if symbol.is_empty() {
        return Err(NormalizeError::MissingField("Symbol"));
    }

    let quantity = parse_quantity(row, "Quantity")?;
    let price = parse_price(row, "Price")?;

    let raw_date = row.get("Date").ok_or(NormalizeError::MissingField("Date"))?;
    let (date, time) = match normalize::parse_datetime(raw_date, DATETIME_FORMATS) {
        Some(dt) => (dt.date(), Some(dt.time())),
        None => (
            normalize::parse_date(raw_date, DATE_FORMATS)
                .ok_or_else(|| NormalizeError::InvalidDate(raw_date.to_string()))?,
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
        description: row.get("Type").map(str::to_string),
        commission: optional_decimal(row, "Fee"),
        amount: optional_decimal(row, "Value"),
        option: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trades::TradeSide;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    #[test]
    fn test_datetime_split_into_date_and_time() {
        let row = RawRow::from_pairs([
            ("Date", "2025-03-21 14:05"),
            ("Action", "Buy"),
            ("Symbol", "NASDAQ:AAPL"),
            ("Quantity", "10"),
            ("Price", "190.50"),
            ("Type", "Market"),
            ("Fee", "1.00"),
            ("Value", "1905.00"),
        ]);
        let trade = parse_row(&row, 0).unwrap();
        assert_eq!(trade.date, NaiveDate::from_ymd_opt(2025, 3, 21).unwrap());
        assert_eq!(trade.time, Some(NaiveTime::from_hms_opt(14, 5, 0).unwrap()));
        assert_eq!(trade.symbol, "AAPL");
        assert_eq!(trade.description.as_deref(), Some("Market"));
        assert_eq!(trade.commission, Some(dec!(1.00)));
        assert_eq!(trade.amount, Some(dec!(1905.00)));
    }

    #[test]
    fn test_plain_symbol_and_date_only() {
        let row = RawRow::from_pairs([
            ("Date", "2025-03-21"),
            ("Action", "Sell"),
            ("Symbol", "TSLA"),
            ("Quantity", "2"),
            ("Price", "180"),
        ]);
        let trade = parse_row(&row, 0).unwrap();
        assert_eq!(trade.symbol, "TSLA");
        assert_eq!(trade.side, TradeSide::Sell);
        assert_eq!(trade.time, None);
    }
}
