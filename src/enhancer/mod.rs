//! Symbol enhancement.
//!
//! Some broker exports identify instruments by CUSIP, conid, or exchange
//! prefix instead of a plain ticker. This module resolves those via an
//! AI lookup over the trade's description. Resolution is best-effort:
//! failures are logged and the raw symbol is kept.

mod lookup;
mod resolver;

pub use lookup::{GeminiLookup, LookupError, SymbolLookup};
pub use resolver::{Resolution, SymbolResolver};
