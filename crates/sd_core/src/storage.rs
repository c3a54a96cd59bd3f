use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{DailySnapshot, NewsArticle, User};
use crate::Result;

#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Store one ingested article
    async fn insert_article(&self, article: &NewsArticle) -> Result<()>;

    /// Fetch every article currently in the store
    async fn all_articles(&self) -> Result<Vec<NewsArticle>>;

    /// Group-and-count by tonality, in order of first appearance
    async fn count_by_tonality(&self) -> Result<Vec<(String, u64)>>;

    /// Group-and-count by department, no order guarantee
    async fn count_by_department(&self) -> Result<Vec<(String, u64)>>;
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Insert a daily snapshot, replacing any existing snapshot for the
    /// same calendar day of `snapshot.date`
    async fn upsert_snapshot(&self, snapshot: &DailySnapshot) -> Result<()>;

    /// Snapshots whose date falls within `[from, to]`, ascending by date
    async fn snapshots_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DailySnapshot>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<()>;

    /// Look up by username or email, whichever matches
    async fn find_by_identity(&self, identity: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn set_refresh_token(&self, id: &str, token: Option<&str>) -> Result<()>;

    async fn set_password_hash(&self, id: &str, hash: &str) -> Result<()>;

    async fn update_account(&self, id: &str, full_name: &str, email: &str) -> Result<User>;

    /// Every registered user, used as the digest recipient list
    async fn all_users(&self) -> Result<Vec<User>>;
}

/// Everything the web layer and the jobs need from one backend.
pub trait DashboardStore: NewsStore + SnapshotStore + UserStore {}

impl<T: NewsStore + SnapshotStore + UserStore> DashboardStore for T {}
