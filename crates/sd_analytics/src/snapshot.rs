use chrono::{DateTime, Utc};
use sd_core::{DailySnapshot, NewsStore, Result, SnapshotEntry, SnapshotStore};
use tracing::info;

use crate::distribution::tonality_distribution;

/// Run one aggregation pass and persist the result as the snapshot for
/// `now`'s calendar day.
///
/// `now` is the date stamped on the snapshot, injected by the caller so the
/// job stays deterministic under test. The store upserts by calendar day,
/// which makes retries and overlapping scheduler triggers converge on a
/// single snapshot per day. A failed distribution (empty article set)
/// writes nothing.
pub async fn persist_daily_snapshot(
    news: &dyn NewsStore,
    snapshots: &dyn SnapshotStore,
    now: DateTime<Utc>,
) -> Result<DailySnapshot> {
    let shares = tonality_distribution(news).await?;

    let snapshot = DailySnapshot {
        date: now,
        tonality: shares
            .iter()
            .map(|share| SnapshotEntry {
                name: share.tonality.as_str().to_string(),
                percentage: share.percentage,
            })
            .collect(),
    };
    snapshots.upsert_snapshot(&snapshot).await?;
    info!(day = %now.date_naive(), entries = snapshot.tonality.len(), "daily snapshot persisted");
    Ok(snapshot)
}
