use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sd_core::{
    DailySnapshot, Error, NewsArticle, NewsStore, Result, SnapshotStore, User, UserStore,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::StorageBackend;

/// Plain in-process store. All collections are Vecs; group-and-count walks
/// the articles linearly so groups come out in first-appearance order,
/// which the distribution contract relies on.
#[derive(Default)]
pub struct MemoryStore {
    articles: Vec<NewsArticle>,
    snapshots: Vec<DailySnapshot>,
    users: Vec<User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn count_grouped_by<F>(&self, key: F) -> Vec<(String, u64)>
    where
        F: Fn(&NewsArticle) -> &str,
    {
        let mut counts: Vec<(String, u64)> = Vec::new();
        for article in &self.articles {
            let name = key(article);
            match counts.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, count)) => *count += 1,
                None => counts.push((name.to_string(), 1)),
            }
        }
        counts
    }

    fn upsert_snapshot(&mut self, snapshot: &DailySnapshot) {
        let day = snapshot.date.date_naive();
        match self
            .snapshots
            .iter_mut()
            .find(|existing| existing.date.date_naive() == day)
        {
            Some(existing) => *existing = snapshot.clone(),
            None => self.snapshots.push(snapshot.clone()),
        }
    }

    fn snapshots_in_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<DailySnapshot> {
        let mut days: Vec<DailySnapshot> = self
            .snapshots
            .iter()
            .filter(|s| s.date >= from && s.date <= to)
            .cloned()
            .collect();
        days.sort_by_key(|s| s.date);
        days
    }
}

pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub async fn new() -> Result<Self> {
        Ok(Self {
            store: Arc::new(RwLock::new(MemoryStore::new())),
        })
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn new() -> Result<Self>
    where
        Self: Sized,
    {
        MemoryStorage::new().await
    }
}

#[async_trait]
impl NewsStore for MemoryStorage {
    async fn insert_article(&self, article: &NewsArticle) -> Result<()> {
        let mut store = self.store.write().await;
        store.articles.push(article.clone());
        Ok(())
    }

    async fn all_articles(&self) -> Result<Vec<NewsArticle>> {
        let store = self.store.read().await;
        Ok(store.articles.clone())
    }

    async fn count_by_tonality(&self) -> Result<Vec<(String, u64)>> {
        let store = self.store.read().await;
        Ok(store.count_grouped_by(|article| article.tonality.as_str()))
    }

    async fn count_by_department(&self) -> Result<Vec<(String, u64)>> {
        let store = self.store.read().await;
        Ok(store.count_grouped_by(|article| article.department.as_str()))
    }
}

#[async_trait]
impl SnapshotStore for MemoryStorage {
    async fn upsert_snapshot(&self, snapshot: &DailySnapshot) -> Result<()> {
        let mut store = self.store.write().await;
        store.upsert_snapshot(snapshot);
        Ok(())
    }

    async fn snapshots_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DailySnapshot>> {
        let store = self.store.read().await;
        Ok(store.snapshots_in_range(from, to))
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut store = self.store.write().await;
        store.users.push(user.clone());
        Ok(())
    }

    async fn find_by_identity(&self, identity: &str) -> Result<Option<User>> {
        let store = self.store.read().await;
        Ok(store
            .users
            .iter()
            .find(|u| u.username == identity || u.email == identity)
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.iter().find(|u| u.id == id).cloned())
    }

    async fn set_refresh_token(&self, id: &str, token: Option<&str>) -> Result<()> {
        let mut store = self.store.write().await;
        let user = store
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::NotFound(format!("user {id}")))?;
        user.refresh_token = token.map(str::to_string);
        Ok(())
    }

    async fn set_password_hash(&self, id: &str, hash: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let user = store
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::NotFound(format!("user {id}")))?;
        user.password_hash = hash.to_string();
        Ok(())
    }

    async fn update_account(&self, id: &str, full_name: &str, email: &str) -> Result<User> {
        let mut store = self.store.write().await;
        let user = store
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::NotFound(format!("user {id}")))?;
        user.full_name = full_name.to_string();
        user.email = email.to_string();
        Ok(user.clone())
    }

    async fn all_users(&self) -> Result<Vec<User>> {
        let store = self.store.read().await;
        Ok(store.users.clone())
    }
}
