//! CSV upload processing pipeline.

mod import_service;
mod import_traits;
mod summary;


pub use import_service::{ImportError, ImportService};
pub use import_traits::TradeStore;
pub use summary::render_summary;
