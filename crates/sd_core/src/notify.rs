use async_trait::async_trait;

use crate::types::{DigestSummary, User};
use crate::Result;

/// Delivery seam for the daily digest. Mail transport lives outside this
/// repo; implementations only get the recipient and the computed summary.
#[async_trait]
pub trait DigestNotifier: Send + Sync {
    async fn send_digest(&self, user: &User, summary: &DigestSummary) -> Result<()>;
}

/// Notifier that writes the digest to the log instead of sending it.
pub struct LogNotifier;

#[async_trait]
impl DigestNotifier for LogNotifier {
    async fn send_digest(&self, user: &User, summary: &DigestSummary) -> Result<()> {
        tracing::info!(
            recipient = %user.email,
            negative_count = summary.negative_count,
            negative = format!("{:.3}", summary.negative_percentage),
            positive = format!("{:.3}", summary.positive_percentage),
            neutral = format!("{:.3}", summary.neutral_percentage),
            "digest ready"
        );
        Ok(())
    }
}
