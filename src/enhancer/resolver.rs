//! Decides when a symbol needs resolving and applies the lookup result.

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::brokers::Broker;
use crate::enhancer::lookup::SymbolLookup;

/// Outcome of resolving one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The symbol to carry forward; the input when resolution did not apply.
    pub symbol: String,
    /// Whether the lookup replaced the input symbol.
    pub enhanced: bool,
}

impl Resolution {
    fn unchanged(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            enhanced: false,
        }
    }
}

/// A symbol that is all letters and at most five of them is already a
/// plausible US ticker; anything with digits, a colon, or extra length is a
/// CUSIP, conid, or exchange-prefixed form worth resolving.
fn looks_nonstandard(symbol: &str) -> bool {
    symbol.chars().any(|c| c.is_ascii_digit()) || symbol.contains(':') || symbol.len() > 5
}

/// Accepts only what could be a real ticker, so a chatty or hallucinated
/// lookup answer never replaces the raw symbol.
fn is_plausible_ticker(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.len() <= 5
        && candidate.chars().all(|c| c.is_ascii_uppercase())
}

/// Best-effort symbol resolver. Lookup failures keep the raw symbol; they
/// never fail the row or the batch.
///
/// Resolutions are cached per (symbol, description) pair, so an export with
/// fifty fills of the same contract asks the lookup once.
pub struct SymbolResolver {
    lookup: Option<Arc<dyn SymbolLookup>>,
    cache: Mutex<HashMap<(String, String), Resolution>>,
}

impl SymbolResolver {
    pub fn new(lookup: Arc<dyn SymbolLookup>) -> Self {
        Self {
            lookup: Some(lookup),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// A resolver that never rewrites anything.
    pub fn disabled() -> Self {
        Self {
            lookup: None,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.lookup.is_some()
    }

    /// Resolves one symbol. Only brokers gated into enhancement are eligible,
    /// and only when the symbol looks nonstandard and a description exists to
    /// ask about.
    pub async fn resolve(
        &self,
        broker: &Broker,
        symbol: &str,
        description: Option<&str>,
    ) -> Resolution {
        if !broker.uses_enhancement() || !looks_nonstandard(symbol) {
            return Resolution::unchanged(symbol);
        }
        let (lookup, description) = match (&self.lookup, description) {
            (Some(lookup), Some(desc)) if !desc.trim().is_empty() => (lookup, desc),
            _ => return Resolution::unchanged(symbol),
        };

        let key = (symbol.to_string(), description.to_string());
        if let Some(cached) = self.cache.lock().await.get(&key) {
            return cached.clone();
        }

        let resolution = match lookup.lookup(description).await {
            Ok(candidate) => {
                let candidate = candidate.trim().to_uppercase();
                if is_plausible_ticker(&candidate) && candidate != symbol {
                    debug!("resolved '{}' to '{}'", symbol, candidate);
                    Resolution {
                        symbol: candidate,
                        enhanced: true,
                    }
                } else {
                    debug!("lookup answer '{}' rejected for '{}'", candidate, symbol);
                    Resolution::unchanged(symbol)
                }
            }
            Err(e) => {
                warn!("symbol lookup failed for '{}': {}", symbol, e);
                Resolution::unchanged(symbol)
            }
        };
        self.cache.lock().await.insert(key, resolution.clone());
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhancer::lookup::LookupError;
    use async_trait::async_trait;

    struct FixedLookup(&'static str);

    #[async_trait]
    impl SymbolLookup for FixedLookup {
        async fn lookup(&self, _description: &str) -> Result<String, LookupError> {
            Ok(self.0.to_string())
        }
    }

    struct CountingLookup {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl SymbolLookup for CountingLookup {
        async fn lookup(&self, _description: &str) -> Result<String, LookupError> {
            self.calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok("AAPL".to_string())
        }
    }

    struct FailingLookup;

    #[async_trait]
    impl SymbolLookup for FailingLookup {
        async fn lookup(&self, _description: &str) -> Result<String, LookupError> {
            Err(LookupError::Request("connection refused".to_string()))
        }
    }

    #[test]
    fn test_looks_nonstandard() {
        assert!(looks_nonstandard("37833100"));
        assert!(looks_nonstandard("NASDAQ:AAPL"));
        assert!(looks_nonstandard("GOOGLE"));
        assert!(!looks_nonstandard("AAPL"));
        assert!(!looks_nonstandard("F"));
    }

    #[test]
    fn test_is_plausible_ticker() {
        assert!(is_plausible_ticker("AAPL"));
        assert!(is_plausible_ticker("F"));
        assert!(!is_plausible_ticker(""));
        assert!(!is_plausible_ticker("TOOLONG"));
        assert!(!is_plausible_ticker("BRK.B"));
        assert!(!is_plausible_ticker("AAPL IS THE TICKER"));
    }

    #[tokio::test]
    async fn test_resolves_cusip_with_description() {
        let resolver = SymbolResolver::new(Arc::new(FixedLookup("AAPL")));
        let res = resolver
            .resolve(&Broker::Fidelity, "37833100", Some("APPLE INC COM"))
            .await;
        assert_eq!(res.symbol, "AAPL");
        assert!(res.enhanced);
    }

    #[tokio::test]
    async fn test_standard_symbol_skips_lookup() {
        let resolver = SymbolResolver::new(Arc::new(FixedLookup("MSFT")));
        let res = resolver
            .resolve(&Broker::Fidelity, "AAPL", Some("APPLE INC COM"))
            .await;
        assert_eq!(res.symbol, "AAPL");
        assert!(!res.enhanced);
    }

    #[tokio::test]
    async fn test_non_enhancement_broker_never_resolves() {
        let resolver = SymbolResolver::new(Arc::new(FixedLookup("AAPL")));
        let res = resolver
            .resolve(&Broker::Schwab, "37833100", Some("APPLE INC COM"))
            .await;
        assert_eq!(res.symbol, "37833100");
        assert!(!res.enhanced);
    }

    #[tokio::test]
    async fn test_missing_description_keeps_raw_symbol() {
        let resolver = SymbolResolver::new(Arc::new(FixedLookup("AAPL")));
        let res = resolver.resolve(&Broker::Fidelity, "37833100", None).await;
        assert_eq!(res.symbol, "37833100");
        assert!(!res.enhanced);
    }

    #[tokio::test]
    async fn test_lookup_failure_keeps_raw_symbol() {
        let resolver = SymbolResolver::new(Arc::new(FailingLookup));
        let res = resolver
            .resolve(&Broker::Robinhood, "37833100", Some("APPLE INC COM"))
            .await;
        assert_eq!(res.symbol, "37833100");
        assert!(!res.enhanced);
    }

    #[tokio::test]
    async fn test_implausible_answer_rejected() {
        let resolver = SymbolResolver::new(Arc::new(FixedLookup("the ticker is AAPL")));
        let res = resolver
            .resolve(&Broker::Fidelity, "37833100", Some("APPLE INC COM"))
            .await;
        assert_eq!(res.symbol, "37833100");
        assert!(!res.enhanced);
    }

    #[tokio::test]
    async fn test_repeated_symbol_hits_lookup_once() {
        let lookup = Arc::new(CountingLookup {
            calls: std::sync::atomic::AtomicUsize::new(0),
        });
        let resolver = SymbolResolver::new(lookup.clone());
        for _ in 0..50 {
            let res = resolver
                .resolve(&Broker::Fidelity, "37833100", Some("APPLE INC COM"))
                .await;
            assert_eq!(res.symbol, "AAPL");
            assert!(res.enhanced);
        }
        assert_eq!(lookup.calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        // A different pair is its own cache entry.
        resolver
            .resolve(&Broker::Fidelity, "594918104", Some("MICROSOFT CORP"))
            .await;
        assert_eq!(lookup.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_disabled_resolver_is_inert() {
        let resolver = SymbolResolver::disabled();
        assert!(!resolver.is_enabled());
        let res = resolver
            .resolve(&Broker::Fidelity, "37833100", Some("APPLE INC COM"))
            .await;
        assert_eq!(res.symbol, "37833100");
        assert!(!res.enhanced);
    }
}
