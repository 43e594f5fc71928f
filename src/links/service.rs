use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::analytics::{build_report, AnalyticsReport};
use crate::error::{ServiceError, ServiceResult};
use crate::links::short_code::{generate_short_code, is_valid_alias, is_valid_target_url};
use crate::models::{CreateLinkRequest, Link, NewLink};
use crate::storage::{Storage, StorageError};

/// Attempts at finding a free generated code before giving up
const MAX_GENERATION_ATTEMPTS: usize = 5;

/// Owner-facing link management: create, list, delete and analytics.
///
/// Every operation is scoped to the owner id resolved by the auth layer.
#[derive(Clone)]
pub struct LinkService {
    storage: Arc<dyn Storage>,
    short_code_max_length: usize,
}

impl LinkService {
    pub fn new(storage: Arc<dyn Storage>, short_code_max_length: usize) -> Self {
        Self {
            storage,
            short_code_max_length,
        }
    }

    pub async fn create(&self, owner_id: &str, request: CreateLinkRequest) -> ServiceResult<Link> {
        self.create_link(
            owner_id,
            &request.original_url,
            request.custom_alias.as_deref(),
            request.expiration_date,
        )
        .await
    }

    pub async fn create_link(
        &self,
        owner_id: &str,
        original_url: &str,
        custom_alias: Option<&str>,
        expiration_date: Option<DateTime<Utc>>,
    ) -> ServiceResult<Link> {
        let original_url = original_url.trim();
        if !is_valid_target_url(original_url) {
            return Err(ServiceError::InvalidUrl);
        }

        let expires_at = expiration_date.map(|ts| ts.timestamp_millis());
        // An empty alias means none; anything else is used verbatim
        let custom_alias = custom_alias.filter(|alias| !alias.is_empty());

        let link = match custom_alias {
            Some(alias) => self.create_with_alias(owner_id, original_url, alias, expires_at).await?,
            None => self.create_with_generated_code(owner_id, original_url, expires_at).await?,
        };

        info!(
            link_id = link.id,
            short_code = %link.short_code,
            owner_id = %owner_id,
            "link created"
        );

        Ok(link)
    }

    async fn create_with_alias(
        &self,
        owner_id: &str,
        original_url: &str,
        alias: &str,
        expires_at: Option<i64>,
    ) -> ServiceResult<Link> {
        if !is_valid_alias(alias, self.short_code_max_length) {
            return Err(ServiceError::InvalidAlias);
        }

        if self.storage.get_link_by_code(alias).await?.is_some() {
            return Err(ServiceError::AliasTaken);
        }

        // The unique constraint settles races between concurrent creators
        match self
            .storage
            .create_link(new_link(owner_id, original_url, alias, expires_at))
            .await
        {
            Ok(link) => Ok(link),
            Err(StorageError::Conflict) => Err(ServiceError::AliasTaken),
            Err(StorageError::Other(e)) => Err(ServiceError::Storage(e)),
        }
    }

    async fn create_with_generated_code(
        &self,
        owner_id: &str,
        original_url: &str,
        expires_at: Option<i64>,
    ) -> ServiceResult<Link> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let code = generate_short_code();
            match self
                .storage
                .create_link(new_link(owner_id, original_url, &code, expires_at))
                .await
            {
                Ok(link) => return Ok(link),
                Err(StorageError::Conflict) => {
                    warn!(short_code = %code, attempt, "generated short code collided, retrying");
                }
                Err(StorageError::Other(e)) => return Err(ServiceError::Storage(e)),
            }
        }

        Err(ServiceError::Storage(anyhow::anyhow!(
            "no free short code after {MAX_GENERATION_ATTEMPTS} attempts"
        )))
    }

    /// The owner's links, newest first
    pub async fn list(&self, owner_id: &str) -> ServiceResult<Vec<Link>> {
        Ok(self.storage.list_links(owner_id).await?)
    }

    /// Delete an owned link and all of its click events
    pub async fn delete(&self, owner_id: &str, link_id: i64) -> ServiceResult<()> {
        if !self.storage.delete_link(link_id, owner_id).await? {
            return Err(ServiceError::NotFound);
        }

        info!(link_id, owner_id = %owner_id, "link deleted");
        Ok(())
    }

    /// Analytics report for an owned link
    pub async fn report(&self, owner_id: &str, link_id: i64) -> ServiceResult<AnalyticsReport> {
        let link = self
            .storage
            .get_link_for_owner(link_id, owner_id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let clicks = self.storage.list_clicks(link.id).await?;

        Ok(build_report(link, &clicks))
    }
}

fn new_link(owner_id: &str, original_url: &str, short_code: &str, expires_at: Option<i64>) -> NewLink {
    NewLink {
        owner_id: owner_id.to_string(),
        original_url: original_url.to_string(),
        short_code: short_code.to_string(),
        created_at: Utc::now().timestamp_millis(),
        expires_at,
    }
}
