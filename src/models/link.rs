use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A short code bound to a target URL and its owner.
///
/// Timestamps are Unix milliseconds (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: i64,
    pub owner_id: String,
    pub original_url: String,
    pub short_code: String,
    pub created_at: i64,
    pub expires_at: Option<i64>,
    pub click_count: i64,
}

impl Link {
    /// A link is expired once `expires_at` lies strictly before `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at < now)
    }
}

/// Fields the storage layer needs to insert a link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub owner_id: String,
    pub original_url: String,
    pub short_code: String,
    pub created_at: i64,
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateLinkRequest {
    /// Missing or non-string values deserialize to an empty string and fail
    /// URL validation as `InvalidUrl`
    #[serde(default, deserialize_with = "deserialize_url_field")]
    pub original_url: String,
    #[serde(default)]
    pub custom_alias: Option<String>,
    #[serde(default, deserialize_with = "deserialize_expiration")]
    pub expiration_date: Option<DateTime<Utc>>,
}

/// Parse an expiration instant from an RFC 3339 timestamp or a bare
/// `YYYY-MM-DD` date (midnight UTC).
pub fn parse_expiration(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_url_field<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

fn deserialize_expiration<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_expiration(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid expirationDate '{s}'"))),
    }
}
