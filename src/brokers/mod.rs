//! Broker-specific row normalizers.
//!
//! Each supported broker is one variant of the closed [`Broker`] enum; its
//! row normalizer lives in a submodule. Adding a broker means adding one
//! variant and one submodule, never touching a central conditional chain.

mod broker_model;
mod default_layout;
mod fidelity;
mod interactive_brokers;
mod normalize;
mod options;
mod robinhood;
mod schwab;
mod tastytrade;
mod tradingview;
mod webull;

pub use broker_model::Broker;
pub use normalize::NormalizeError;
