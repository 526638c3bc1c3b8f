//! Generic `Symbol,Quantity,Price,Side[,Date]` layout.
//!
//! Used for hand-made files and brokers without a dedicated variant. The
//! Date column is optional; rows without one take the processing date.

use chrono::NaiveDate;
use log::debug;

use crate::brokers::normalize::{
    self, parse_price, parse_quantity, side_from_token, NormalizeError, BASE_SIDE_TOKENS,
};
use crate::trades::{CanonicalTrade, RawRow};

pub(super) const REQUIRED_COLUMNS: &[&str] = &["Symbol", "Quantity", "Price", "Side"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y"];

pub(super) fn parse_row(
    row: &RawRow,
    row_index: usize,
    processing_date: NaiveDate,
) -> Result<CanonicalTrade, NormalizeError> {
    let symbol = row
        .get("Symbol")
        .map(normalize::clean_symbol)
        .filter(|s| !s.is_empty())
        .ok_or(NormalizeError::MissingField("Symbol"))?;

    let action = row.get("Side").ok_or(NormalizeError::MissingField("Side"))?;
    let side = side_from_token(action, BASE_SIDE_TOKENS)
        .ok_or_else(|| NormalizeError::UnrecognizedAction(action.to_string()))?;

    let quantity = parse_quantity(row, "Quantity")?;
    let price = parse_price(row, "Price")?;

    let date = match row.get("Date") {
        Some(raw) => normalize::parse_date(raw, DATE_FORMATS)
            .ok_or_else(|| NormalizeError::InvalidDate(raw.to_string()))?,
        None => {
            debug!("row {}: no date column, using processing date", row_index);
            processing_date
        }
    };

    Ok(CanonicalTrade {
        original_symbol: symbol.clone(),
        symbol,
        quantity,
        price,
        side,
        date,
        time: None,
        description: None,
        commission: None,
        amount: None,
        option: None,
    })
}
