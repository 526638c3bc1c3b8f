//! Downloadable processing summary.
//!
//! The summary is a few header lines followed by a CSV body of the
//! normalized trades. Output is byte-deterministic for a given
//! [`PipelineResult`], so repeated downloads of the same result compare
//! equal.

use crate::import::ImportError;
use crate::trades::PipelineResult;

const COLUMNS: &[&str] = &[
    "Symbol",
    "OriginalSymbol",
    "Quantity",
    "Price",
    "Side",
    "Date",
    "Time",
    "Description",
    "IsOption",
    "OptionType",
    "StrikePrice",
    "ExpiryDate",
    "Dte",
];

/// Renders the pipeline result as a summary document.
pub fn render_summary(result: &PipelineResult) -> Result<String, ImportError> {
    let mut out = String::new();
    out.push_str(&format!("Broker: {}\n", result.broker));
    out.push_str(&format!("Total rows: {}\n", result.total_rows));
    out.push_str(&format!("Trades processed: {}\n", result.trades.len()));
    out.push_str(&format!("Rows with errors: {}\n", result.errors.len()));
    if result.broker.uses_enhancement() || result.enhanced_count > 0 {
        out.push_str(&format!("Symbols enhanced: {}\n", result.enhanced_count));
    }
    out.push('\n');

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(COLUMNS)
        .map_err(|e| ImportError::Csv(e.to_string()))?;

    for trade in &result.trades {
        let (option_type, strike, expiry, dte) = match &trade.option {
            Some(opt) => (
                opt.option_type.as_str().to_string(),
                opt.strike_price.to_string(),
                opt.expiry_date.to_string(),
                opt.dte.to_string(),
            ),
            None => (String::new(), String::new(), String::new(), String::new()),
        };
        let record: Vec<String> = vec![
            trade.symbol.clone(),
            trade.original_symbol.clone(),
            trade.quantity.to_string(),
            trade.price.to_string(),
            trade.side.as_str().to_string(),
            trade.date.to_string(),
            trade
                .time
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_default(),
            trade.description.clone().unwrap_or_default(),
            trade.is_option().to_string(),
            option_type,
            strike,
            expiry,
            dte,
        ];
        writer
            .write_record(&record)
            .map_err(|e| ImportError::Csv(e.to_string()))?;
    }

    let body = writer
        .into_inner()
        .map_err(|e| ImportError::Csv(e.to_string()))?;
    out.push_str(&String::from_utf8(body).map_err(|e| ImportError::Csv(e.to_string()))?);
    Ok(out)
}
