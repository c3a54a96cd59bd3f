use chrono::{DateTime, Utc};
use sd_core::{Result, SnapshotStore, WeeklySeries};
use tracing::debug;

use crate::window::previous_week;

/// Rebuild the previous week's chart series from persisted snapshots.
///
/// Snapshots are read in ascending date order; each snapshot contributes
/// one value per tonality entry it actually carries, so the three series
/// can end up with different lengths. Entries with names outside the known
/// set are dropped. An empty window yields three empty series.
pub async fn weekly_series(
    snapshots: &dyn SnapshotStore,
    reference: DateTime<Utc>,
) -> Result<WeeklySeries> {
    let window = previous_week(reference);
    let days = snapshots.snapshots_in_range(window.start, window.end).await?;
    debug!(
        start = %window.start,
        end = %window.end,
        snapshots = days.len(),
        "reconstructing weekly series"
    );

    let mut series = WeeklySeries::default();
    for day in &days {
        for entry in &day.tonality {
            let bucket = match entry.name.as_str() {
                "positive" => &mut series.positive,
                "negative" => &mut series.negative,
                "neutral" => &mut series.neutral,
                _ => continue,
            };
            bucket.push(format!("{:.3}", entry.percentage));
        }
    }
    Ok(series)
}
