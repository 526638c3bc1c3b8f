use async_trait::async_trait;

use crate::trades::CanonicalTrade;

/// Persistence seam for processed trades. The pipeline itself never touches
/// storage; callers hand results to an implementation of this trait.
#[async_trait]
pub trait TradeStore: Send + Sync {
    async fn save_trades(&self, user_id: &str, trades: &[CanonicalTrade]) -> crate::Result<()>;
}
