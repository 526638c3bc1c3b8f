//! Trade domain models.

mod trades_model;

#[cfg(test)]
mod trades_model_tests;

pub use trades_model::{
    CanonicalTrade, OptionDetails, OptionType, PipelineResult, RawRow, RowError, TradeSide,
};
