//! Charles Schwab transaction export layout.
//!
//! Schwab's Date cell sometimes reads "12/19/2009 as of 12/18/2009" for
//! settlement adjustments; the leading date wins. Option positions put the
//! whole contract in the Symbol column ("OEX 12/19/2009 495.00 C").

use crate::brokers::normalize::{
    self, non_trade_token, optional_decimal, parse_price, parse_quantity, side_from_token,
    NormalizeError, BASE_SIDE_TOKENS,
};
use crate::brokers::options;
use crate::trades::{CanonicalTrade, RawRow};

pub(super) const REQUIRED_COLUMNS: &[&str] = &["Date", "Action", "Symbol", "Quantity", "Price"];

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

pub(super) fn parse_row(row: &RawRow, _row_index: usize) -> Result<CanonicalTrade, NormalizeError> {
    let action = row
        .get("Action")
        .ok_or(NormalizeError::MissingField("Action"))?;
    if let Some(token) = non_trade_token(action) {
        return Err(NormalizeError::NotATrade(token.to_string()));
    }
    let side = side_from_token(action, BASE_SIDE_TOKENS)
        .ok_or_else(|| NormalizeError::UnrecognizedAction(action.to_string()))?;

    let quantity = parse_quantity(row, "Quantity")?;
    let price = parse_price(row, "Price")?;

    let raw_date = row.get("Date").ok_or(NormalizeError::MissingField("Date"))?;
    let date_part = raw_date
        .split(" as of ")
        .next()
        .unwrap_or(raw_date);
    let date = normalize::parse_date(date_part, DATE_FORMATS)
        .ok_or_else(|| NormalizeError::InvalidDate(raw_date.to_string()))?;

    let raw_symbol = row
        .get("Symbol")
        .ok_or(NormalizeError::MissingField("Symbol"))?;
    let (symbol, option) = match options::from_occ_symbol(raw_symbol, date) {
        Some((underlying, details)) => (underlying, Some(details)),
        None => (normalize::clean_symbol(raw_symbol), None),
    };
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
        time: None,
        description: row.get("Description").map(str::to_string),
        commission: optional_decimal(row, "Fees & Comm"),
        amount: optional_decimal(row, "Amount"),
        option,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trades::{OptionType, TradeSide};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_equity_buy() {
        let row = RawRow::from_pairs([
            ("Date", "03/21/2025"),
            ("Action", "Buy"),
            ("Symbol", "SCHD"),
            ("Quantity", "25"),
            ("Price", "78.12"),
            ("Fees & Comm", "$0.00"),
            ("Amount", "($1,953.00)"),
        ]);
        let trade = parse_row(&row, 0).unwrap();
        assert_eq!(trade.side, TradeSide::Buy);
        assert_eq!(trade.symbol, "SCHD");
        assert_eq!(trade.amount, Some(dec!(-1953.00)));
    }

    #[test]
    fn test_as_of_date_takes_leading_date() {
        let row = RawRow::from_pairs([
            ("Date", "12/19/2009 as of 12/18/2009"),
            ("Action", "Sell to Close"),
            ("Symbol", "MSFT"),
            ("Quantity", "10"),
            ("Price", "30.00"),
        ]);
        let trade = parse_row(&row, 0).unwrap();
        assert_eq!(trade.date, NaiveDate::from_ymd_opt(2009, 12, 19).unwrap());
        assert_eq!(trade.side, TradeSide::Sell);
    }

    #[test]
    fn test_option_symbol_parsed_to_underlying() {
        let row = RawRow::from_pairs([
            ("Date", "12/01/2009"),
            ("Action", "Buy to Open"),
            ("Symbol", "OEX 12/19/2009 495.00 C"),
            ("Quantity", "1"),
            ("Price", "3.20"),
        ]);
        let trade = parse_row(&row, 0).unwrap();
        assert_eq!(trade.symbol, "OEX");
        let opt = trade.option.unwrap();
        assert_eq!(opt.option_type, OptionType::Call);
        assert_eq!(opt.strike_price, dec!(495.00));
    }

    #[test]
    fn test_journal_row_is_non_trade() {
        let row = RawRow::from_pairs([
            ("Date", "03/21/2025"),
            ("Action", "Journal"),
            ("Symbol", ""),
            ("Quantity", "1"),
            ("Price", "1"),
        ]);
        assert_eq!(
            parse_row(&row, 0),
            Err(NormalizeError::NotATrade("JOURNAL".to_string()))
        );
    }
}
