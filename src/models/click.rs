use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Referrer recorded when the request carries no `Referer` header
pub const DIRECT_REFERRER: &str = "Direct";

/// Country recorded for every click; geolocation is not performed
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// One recorded visit through a short code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub id: i64,
    pub link_id: i64,
    #[sqlx(rename = "clicked_at")]
    pub timestamp: i64,
    pub ip_address: Option<String>,
    pub browser: String,
    pub os: String,
    pub device: String,
    pub country: String,
    pub referrer: String,
}

#[derive(Debug, Clone)]
pub struct NewClickEvent {
    pub link_id: i64,
    pub timestamp: i64,
    pub ip_address: Option<String>,
    pub browser: String,
    pub os: String,
    pub device: String,
    pub country: String,
    pub referrer: String,
}
