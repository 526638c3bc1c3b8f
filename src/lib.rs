//! Tradebook Core - broker CSV trade normalization.
//!
//! This crate ingests broker-specific CSV exports of stock trades and
//! normalizes their heterogeneous column layouts, date formats, and
//! side/action vocabularies into a single canonical trade schema. It is
//! storage-agnostic: persistence and the HTTP surface are external
//! collaborators behind narrow trait seams.

pub mod brokers;
pub mod enhancer;
pub mod errors;
pub mod import;
pub mod trades;

pub use brokers::Broker;
pub use enhancer::{GeminiLookup, LookupError, Resolution, SymbolLookup, SymbolResolver};
pub use errors::{Error, Result};
pub use import::{render_summary, ImportError, ImportService, TradeStore};
pub use trades::{
    CanonicalTrade, OptionDetails, OptionType, PipelineResult, RawRow, RowError, TradeSide,
};
