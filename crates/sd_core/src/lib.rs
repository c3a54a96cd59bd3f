pub mod error;
pub mod notify;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use notify::{DigestNotifier, LogNotifier};
pub use storage::{DashboardStore, NewsStore, SnapshotStore, UserStore};
pub use types::{
    ChartSeries, DailySnapshot, DepartmentCount, DigestSummary, NewsArticle, SnapshotEntry,
    Tonality, TonalityShare, User, WeeklySeries,
};
