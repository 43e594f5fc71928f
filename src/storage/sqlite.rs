use crate::models::{ClickEvent, Link, NewClickEvent, NewLink};
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

const LINK_COLUMNS: &str =
    "id, owner_id, original_url, short_code, created_at, expires_at, click_count";

const CLICK_COLUMNS: &str =
    "id, link_id, clicked_at, ip_address, browser, os, device, country, referrer";

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS links (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id TEXT NOT NULL,
                original_url TEXT NOT NULL,
                short_code TEXT NOT NULL UNIQUE,
                created_at INTEGER NOT NULL,
                expires_at INTEGER,
                click_count INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_links_owner ON links(owner_id)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clicks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                link_id INTEGER NOT NULL REFERENCES links(id) ON DELETE CASCADE,
                clicked_at INTEGER NOT NULL,
                ip_address TEXT,
                browser TEXT NOT NULL,
                os TEXT NOT NULL,
                device TEXT NOT NULL,
                country TEXT NOT NULL DEFAULT 'Unknown',
                referrer TEXT NOT NULL DEFAULT 'Direct'
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_clicks_link ON clicks(link_id)")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn create_link(&self, link: NewLink) -> StorageResult<Link> {
        let created = sqlx::query_as::<_, Link>(&format!(
            r#"
            INSERT INTO links (owner_id, original_url, short_code, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(short_code) DO NOTHING
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(&link.owner_id)
        .bind(&link.original_url)
        .bind(&link.short_code)
        .bind(link.created_at)
        .bind(link.expires_at)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        created.ok_or(StorageError::Conflict)
    }

    async fn get_link_by_code(&self, short_code: &str) -> Result<Option<Link>> {
        let link = sqlx::query_as::<_, Link>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE short_code = ?"
        ))
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn get_link_for_owner(&self, id: i64, owner_id: &str) -> Result<Option<Link>> {
        let link = sqlx::query_as::<_, Link>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE id = ? AND owner_id = ?"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn list_links(&self, owner_id: &str) -> Result<Vec<Link>> {
        let links = sqlx::query_as::<_, Link>(&format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            WHERE owner_id = ?
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(links)
    }

    async fn record_click(&self, click: NewClickEvent) -> Result<ClickEvent> {
        let event = sqlx::query_as::<_, ClickEvent>(&format!(
            r#"
            INSERT INTO clicks (link_id, clicked_at, ip_address, browser, os, device, country, referrer)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {CLICK_COLUMNS}
            "#
        ))
        .bind(click.link_id)
        .bind(click.timestamp)
        .bind(&click.ip_address)
        .bind(&click.browser)
        .bind(&click.os)
        .bind(&click.device)
        .bind(&click.country)
        .bind(&click.referrer)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(event)
    }

    async fn increment_clicks(&self, link_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET click_count = click_count + 1
            WHERE id = ?
            "#,
        )
        .bind(link_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_clicks(&self, link_id: i64) -> Result<Vec<ClickEvent>> {
        let clicks = sqlx::query_as::<_, ClickEvent>(&format!(
            r#"
            SELECT {CLICK_COLUMNS}
            FROM clicks
            WHERE link_id = ?
            ORDER BY clicked_at ASC, id ASC
            "#
        ))
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(clicks)
    }

    async fn delete_link(&self, id: i64, owner_id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        // The first statement must write: a deferred transaction that has
        // already read cannot be upgraded to a writer while redirects hold
        // the write lock, and SQLite fails it without waiting.
        sqlx::query(
            r#"
            DELETE FROM clicks
            WHERE link_id IN (SELECT id FROM links WHERE id = ? AND owner_id = ?)
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM links WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
