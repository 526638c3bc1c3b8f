//! The closed set of supported brokers and per-broker dispatch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::brokers::normalize::NormalizeError;
use crate::brokers::{
    default_layout, fidelity, interactive_brokers, robinhood, schwab, tastytrade, tradingview,
    webull,
};
use crate::import::ImportError;
use crate::trades::{CanonicalTrade, RawRow};

/// Source institution whose CSV export format must be recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Broker {
    /// Generic `Symbol,Quantity,Price,Side[,Date]` layout.
    Default,
    Fidelity,
    InteractiveBrokers,
    Robinhood,
    #[serde(rename = "charles-schwab")]
    Schwab,
    Tastytrade,
    Tradingview,
    Webull,
}

impl Broker {
    pub const ALL: [Broker; 8] = [
        Broker::Default,
        Broker::Fidelity,
        Broker::InteractiveBrokers,
        Broker::Robinhood,
        Broker::Schwab,
        Broker::Tastytrade,
        Broker::Tradingview,
        Broker::Webull,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Broker::Default => "default",
            Broker::Fidelity => "fidelity",
            Broker::InteractiveBrokers => "interactive-brokers",
            Broker::Robinhood => "robinhood",
            Broker::Schwab => "charles-schwab",
            Broker::Tastytrade => "tastytrade",
            Broker::Tradingview => "tradingview",
            Broker::Webull => "webull",
        }
    }

    /// Columns that must be present in the header for the upload to be
    /// accepted. A header missing any of these fails the whole upload.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Broker::Default => default_layout::REQUIRED_COLUMNS,
            Broker::Fidelity => fidelity::REQUIRED_COLUMNS,
            Broker::InteractiveBrokers => interactive_brokers::REQUIRED_COLUMNS,
            Broker::Robinhood => robinhood::REQUIRED_COLUMNS,
            Broker::Schwab => schwab::REQUIRED_COLUMNS,
            Broker::Tastytrade => tastytrade::REQUIRED_COLUMNS,
            Broker::Tradingview => tradingview::REQUIRED_COLUMNS,
            Broker::Webull => webull::REQUIRED_COLUMNS,
        }
    }

    /// Whether the symbol resolver may rewrite non-standard symbols for this
    /// broker. These exports are the ones that carry CUSIPs, conids, and
    /// other contract-style identifiers instead of plain tickers.
    pub fn uses_enhancement(&self) -> bool {
        matches!(
            self,
            Broker::Fidelity | Broker::InteractiveBrokers | Broker::Robinhood
        )
    }

    /// Normalizes one raw CSV row into a canonical trade.
    ///
    /// `processing_date` is the date the pipeline runs; layouts with an
    /// optional date column fall back to it.
    pub fn parse_row(
        &self,
        row: &RawRow,
        row_index: usize,
        processing_date: NaiveDate,
    ) -> Result<CanonicalTrade, NormalizeError> {
        match self {
            Broker::Default => default_layout::parse_row(row, row_index, processing_date),
            Broker::Fidelity => fidelity::parse_row(row, row_index),
            Broker::InteractiveBrokers => interactive_brokers::parse_row(row, row_index),
            Broker::Robinhood => robinhood::parse_row(row, row_index),
            Broker::Schwab => schwab::parse_row(row, row_index),
            Broker::Tastytrade => tastytrade::parse_row(row, row_index),
            Broker::Tradingview => tradingview::parse_row(row, row_index),
            Broker::Webull => webull::parse_row(row, row_index),
        }
    }
}

impl fmt::Display for Broker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Broker {
    type Err = ImportError;

    /// Accepts canonical slugs plus the aliases users actually type
    /// ("ib", "schwab", "tasty-trade", ...). "td" and "td-ameritrade" map to
    /// Fidelity, which took over those accounts' export format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.trim().to_lowercase().replace([' ', '_'], "-");
        match slug.as_str() {
            "default" => Ok(Broker::Default),
            "fidelity" | "td" | "td-ameritrade" => Ok(Broker::Fidelity),
            "interactive-brokers" | "ib" | "ibkr" => Ok(Broker::InteractiveBrokers),
            "robinhood" | "robin-hood" => Ok(Broker::Robinhood),
            "charles-schwab" | "schwab" => Ok(Broker::Schwab),
            "tastytrade" | "tasty-trade" => Ok(Broker::Tastytrade),
            "tradingview" | "trading-view" => Ok(Broker::Tradingview),
            "webull" => Ok(Broker::Webull),
            _ => Err(ImportError::UnsupportedBroker(s.to_string())),
        }
    }
}
