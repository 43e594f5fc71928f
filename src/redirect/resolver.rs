use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, warn};

use crate::analytics::classify;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{NewClickEvent, DIRECT_REFERRER, UNKNOWN_COUNTRY};
use crate::storage::Storage;

/// Request metadata captured for a click. Every field may be absent.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub referrer: Option<String>,
}

/// Resolves short codes to their targets and records the click.
#[derive(Clone)]
pub struct RedirectResolver {
    storage: Arc<dyn Storage>,
}

impl RedirectResolver {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Resolve `short_code` at the current time. Returns the target URL.
    pub async fn resolve(&self, short_code: &str, context: &RequestContext) -> ServiceResult<String> {
        self.resolve_at(short_code, context, Utc::now().timestamp_millis()).await
    }

    /// Resolve `short_code` as of `now` (Unix milliseconds).
    ///
    /// On success exactly one click event is appended and the link's counter
    /// is incremented once. The two writes are issued independently: if one
    /// fails the other is not rolled back, and the caller gets a storage error.
    pub async fn resolve_at(
        &self,
        short_code: &str,
        context: &RequestContext,
        now: i64,
    ) -> ServiceResult<String> {
        let link = self
            .storage
            .get_link_by_code(short_code)
            .await?
            .ok_or(ServiceError::NotFound)?;

        if link.is_expired_at(now) {
            debug!(short_code = %short_code, link_id = link.id, "rejecting expired link");
            return Err(ServiceError::Expired);
        }

        let client = classify(context.user_agent.as_deref());
        let referrer = context
            .referrer
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DIRECT_REFERRER)
            .to_string();

        let click = NewClickEvent {
            link_id: link.id,
            timestamp: now,
            ip_address: context.ip_address.clone(),
            browser: client.browser,
            os: client.os,
            device: client.device,
            country: UNKNOWN_COUNTRY.to_string(),
            referrer,
        };

        let (recorded, incremented) = tokio::join!(
            self.storage.record_click(click),
            self.storage.increment_clicks(link.id),
        );

        let mut failure = None;

        if let Err(err) = recorded {
            error!(short_code = %short_code, link_id = link.id, error = ?err, "failed to record click event");
            failure = Some(err);
        }

        match incremented {
            Ok(true) => {}
            Ok(false) => {
                warn!(short_code = %short_code, link_id = link.id, "link removed while resolving");
                return Err(ServiceError::NotFound);
            }
            Err(err) => {
                error!(short_code = %short_code, link_id = link.id, error = ?err, "failed to increment click count");
                failure = Some(err);
            }
        }

        if let Some(err) = failure {
            return Err(ServiceError::Storage(err));
        }

        Ok(link.original_url)
    }
}
