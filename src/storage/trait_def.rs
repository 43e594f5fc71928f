use crate::models::{ClickEvent, Link, NewClickEvent, NewLink};
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("short code already exists")]
    Conflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables and indices)
    async fn init(&self) -> Result<()>;

    /// Insert a link. Fails with `Conflict` when the short code is taken.
    async fn create_link(&self, link: NewLink) -> StorageResult<Link>;

    /// Get a link by short code
    async fn get_link_by_code(&self, short_code: &str) -> Result<Option<Link>>;

    /// Get a link by id, only if it belongs to `owner_id`
    async fn get_link_for_owner(&self, id: i64, owner_id: &str) -> Result<Option<Link>>;

    /// List an owner's links, newest first
    async fn list_links(&self, owner_id: &str) -> Result<Vec<Link>>;

    /// Append a click event
    async fn record_click(&self, click: NewClickEvent) -> Result<ClickEvent>;

    /// Atomically add one to the link's click counter.
    /// Returns false when no such link exists.
    async fn increment_clicks(&self, link_id: i64) -> Result<bool>;

    /// All click events of a link, oldest first
    async fn list_clicks(&self, link_id: i64) -> Result<Vec<ClickEvent>>;

    /// Delete an owned link together with its click events.
    /// Returns false when the link does not exist or is owned by someone else.
    async fn delete_link(&self, id: i64, owner_id: &str) -> Result<bool>;
}
