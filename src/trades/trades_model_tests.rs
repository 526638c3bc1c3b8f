use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::{CanonicalTrade, OptionDetails, OptionType, RawRow, TradeSide};

fn sample_trade() -> CanonicalTrade {
    CanonicalTrade {
        symbol: "AAPL".to_string(),
        original_symbol: "AAPL".to_string(),
        quantity: dec!(10),
        price: dec!(190.50),
        side: TradeSide::Buy,
        date: NaiveDate::from_ymd_opt(2025, 3, 21).unwrap(),
        time: None,
        description: None,
        commission: None,
        amount: None,
        option: None,
    }
}

#[test]
fn test_raw_row_get_trims_and_blanks_are_none() {
    let row = RawRow::from_pairs([("Symbol", "  AAPL  "), ("Price", ""), ("Side", "Buy")]);
    assert_eq!(row.get("Symbol"), Some("AAPL"));
    assert_eq!(row.get("Price"), None);
    assert_eq!(row.get("Missing"), None);
}

#[test]
fn test_raw_row_preserves_column_order() {
    let row = RawRow::from_pairs([("B", "2"), ("A", "1"), ("C", "3")]);
    let names: Vec<&str> = row.column_names().collect();
    assert_eq!(names, vec!["B", "A", "C"]);
}

#[test]
fn test_raw_row_first_of_skips_blanks() {
    let row = RawRow::from_pairs([("Commission", ""), ("Fees & Comm", "0.65")]);
    assert_eq!(row.first_of(&["Commission", "Fees & Comm"]), Some("0.65"));
}

#[test]
fn test_side_serializes_screaming_snake() {
    assert_eq!(serde_json::to_string(&TradeSide::Buy).unwrap(), "\"BUY\"");
    assert_eq!(
        serde_json::from_str::<TradeSide>("\"SELL\"").unwrap(),
        TradeSide::Sell
    );
}

#[test]
fn test_is_enhanced_tracks_symbol_rewrite() {
    let mut trade = sample_trade();
    assert!(!trade.is_enhanced());
    trade.original_symbol = "37833100".to_string();
    assert!(trade.is_enhanced());
}

#[test]
fn test_is_option() {
    let mut trade = sample_trade();
    assert!(!trade.is_option());
    trade.option = Some(OptionDetails {
        option_type: OptionType::Call,
        strike_price: dec!(200),
        expiry_date: NaiveDate::from_ymd_opt(2025, 4, 17).unwrap(),
        dte: 27,
    });
    assert!(trade.is_option());
}

#[test]
fn test_trade_json_shape_is_camel_case() {
    let json = serde_json::to_value(sample_trade()).unwrap();
    assert!(json.get("originalSymbol").is_some());
    assert_eq!(json["side"], "BUY");
    assert_eq!(json["date"], "2025-03-21");
}
