use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sd_core::{
    DailySnapshot, Error, NewsArticle, NewsStore, Result, SnapshotEntry, SnapshotStore, Tonality,
    User, UserStore,
};
use sqlx::{sqlite::SqlitePool, Row};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::StorageBackend;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS news (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        link TEXT NOT NULL,
        img TEXT NOT NULL,
        language TEXT NOT NULL,
        department TEXT NOT NULL,
        source TEXT NOT NULL,
        publication_date TEXT NOT NULL,
        tonality TEXT NOT NULL,
        score REAL NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS daily_snapshots (
        day TEXT PRIMARY KEY,
        date TEXT NOT NULL,
        date_ms INTEGER NOT NULL,
        tonality TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL,
        full_name TEXT NOT NULL,
        department TEXT NOT NULL,
        avatar TEXT,
        password_hash TEXT NOT NULL,
        refresh_token TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    // Add future migrations here
];

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

#[async_trait]
impl StorageBackend for SqliteStorage {
    fn get_error_message() -> &'static str {
        "SQLite database should be available at ./dashboard.db"
    }

    async fn new() -> Result<Self> {
        let db_path = PathBuf::from("dashboard.db");
        Self::new_with_path(&db_path).await
    }
}

fn db_error(context: &str, err: sqlx::Error) -> Error {
    Error::Storage(format!("{context}: {err}"))
}

impl SqliteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path.display()))
            .await
            .map_err(|e| db_error("failed to connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| db_error(&format!("failed to run migration {i}"), e))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &PathBuf {
        &self.db_path
    }
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("invalid stored date {raw}: {e}")))
}

fn article_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<NewsArticle> {
    let tonality: String = row
        .try_get("tonality")
        .map_err(|e| db_error("failed to read column", e))?;
    let publication_date: String = row
        .try_get("publication_date")
        .map_err(|e| db_error("failed to read column", e))?;
    let get = |column: &str| -> Result<String> {
        row.try_get(column)
            .map_err(|e| db_error("failed to read column", e))
    };

    Ok(NewsArticle {
        title: get("title")?,
        content: get("content")?,
        link: get("link")?,
        img: get("img")?,
        language: get("language")?,
        department: get("department")?,
        source: get("source")?,
        publication_date: parse_date(&publication_date)?,
        tonality: tonality.parse::<Tonality>()?,
        score: row
            .try_get("score")
            .map_err(|e| db_error("failed to read column", e))?,
    })
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let get = |column: &str| -> Result<String> {
        row.try_get(column)
            .map_err(|e| db_error("failed to read column", e))
    };
    let created_at: String = get("created_at")?;

    Ok(User {
        id: get("id")?,
        username: get("username")?,
        email: get("email")?,
        full_name: get("full_name")?,
        department: get("department")?,
        avatar: row
            .try_get("avatar")
            .map_err(|e| db_error("failed to read column", e))?,
        password_hash: get("password_hash")?,
        refresh_token: row
            .try_get("refresh_token")
            .map_err(|e| db_error("failed to read column", e))?,
        created_at: parse_date(&created_at)?,
    })
}

#[async_trait]
impl NewsStore for SqliteStorage {
    async fn insert_article(&self, article: &NewsArticle) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO news
            (title, content, link, img, language, department, source, publication_date, tonality, score)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.link)
        .bind(&article.img)
        .bind(&article.language)
        .bind(&article.department)
        .bind(&article.source)
        .bind(article.publication_date.to_rfc3339())
        .bind(article.tonality.as_str())
        .bind(article.score)
        .execute(&*self.pool)
        .await
        .map_err(|e| db_error("failed to store article", e))?;

        Ok(())
    }

    async fn all_articles(&self) -> Result<Vec<NewsArticle>> {
        let rows = sqlx::query("SELECT * FROM news ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("failed to fetch articles", e))?;

        rows.iter().map(article_from_row).collect()
    }

    async fn count_by_tonality(&self) -> Result<Vec<(String, u64)>> {
        // MIN(id) keeps groups in order of first appearance
        self.count_grouped_by("tonality").await
    }

    async fn count_by_department(&self) -> Result<Vec<(String, u64)>> {
        self.count_grouped_by("department").await
    }
}

impl SqliteStorage {
    async fn count_grouped_by(&self, column: &str) -> Result<Vec<(String, u64)>> {
        let query = format!(
            "SELECT {column} AS name, COUNT(*) AS count FROM news GROUP BY {column} ORDER BY MIN(id)"
        );
        let rows = sqlx::query(&query)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("failed to count groups", e))?;

        rows.iter()
            .map(|row| {
                let name: String = row
                    .try_get("name")
                    .map_err(|e| db_error("failed to read column", e))?;
                let count: i64 = row
                    .try_get("count")
                    .map_err(|e| db_error("failed to read column", e))?;
                Ok((name, count as u64))
            })
            .collect()
    }
}

#[async_trait]
impl SnapshotStore for SqliteStorage {
    async fn upsert_snapshot(&self, snapshot: &DailySnapshot) -> Result<()> {
        let tonality = serde_json::to_string(&snapshot.tonality)?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO daily_snapshots (day, date, date_ms, tonality)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(snapshot.date.date_naive().to_string())
        .bind(snapshot.date.to_rfc3339())
        .bind(snapshot.date.timestamp_millis())
        .bind(tonality)
        .execute(&*self.pool)
        .await
        .map_err(|e| db_error("failed to store snapshot", e))?;

        Ok(())
    }

    async fn snapshots_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DailySnapshot>> {
        let rows = sqlx::query(
            r#"
            SELECT date, tonality FROM daily_snapshots
            WHERE date_ms >= ? AND date_ms <= ?
            ORDER BY date_ms ASC
            "#,
        )
        .bind(from.timestamp_millis())
        .bind(to.timestamp_millis())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| db_error("failed to fetch snapshots", e))?;

        rows.iter()
            .map(|row| {
                let date: String = row
                    .try_get("date")
                    .map_err(|e| db_error("failed to read column", e))?;
                let tonality: String = row
                    .try_get("tonality")
                    .map_err(|e| db_error("failed to read column", e))?;
                let tonality: Vec<SnapshotEntry> = serde_json::from_str(&tonality)?;
                Ok(DailySnapshot {
                    date: parse_date(&date)?,
                    tonality,
                })
            })
            .collect()
    }
}

#[async_trait]
impl UserStore for SqliteStorage {
    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users
            (id, username, email, full_name, department, avatar, password_hash, refresh_token, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.department)
        .bind(user.avatar.as_deref())
        .bind(&user.password_hash)
        .bind(user.refresh_token.as_deref())
        .bind(user.created_at.to_rfc3339())
        .execute(&*self.pool)
        .await
        .map_err(|e| db_error("failed to store user", e))?;

        Ok(())
    }

    async fn find_by_identity(&self, identity: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ? OR email = ?")
            .bind(identity)
            .bind(identity)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| db_error("failed to fetch user", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| db_error("failed to fetch user", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn set_refresh_token(&self, id: &str, token: Option<&str>) -> Result<()> {
        let result = sqlx::query("UPDATE users SET refresh_token = ? WHERE id = ?")
            .bind(token)
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| db_error("failed to update refresh token", e))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("user {id}")));
        }
        Ok(())
    }

    async fn set_password_hash(&self, id: &str, hash: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(hash)
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| db_error("failed to update password", e))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("user {id}")));
        }
        Ok(())
    }

    async fn update_account(&self, id: &str, full_name: &str, email: &str) -> Result<User> {
        sqlx::query("UPDATE users SET full_name = ?, email = ? WHERE id = ?")
            .bind(full_name)
            .bind(email)
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| db_error("failed to update account", e))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {id}")))
    }

    async fn all_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_error("failed to fetch users", e))?;

        rows.iter().map(user_from_row).collect()
    }
}
