pub mod distribution;
pub mod series;
pub mod snapshot;
pub mod window;

pub use distribution::{
    department_distribution, digest_summary, distribution_from_counts, tonality_distribution,
};
pub use series::weekly_series;
pub use snapshot::persist_daily_snapshot;
pub use window::{previous_week, WeekWindow};
