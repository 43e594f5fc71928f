//! Data models for analytics reports

use serde::{Deserialize, Serialize};

use crate::models::Link;

/// Clicks recorded on one calendar day (UTC)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateClicks {
    /// `YYYY-MM-DD`
    pub date: String,
    pub clicks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCount {
    pub device: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserCount {
    pub browser: String,
    pub count: u64,
}

/// Everything the analytics endpoint returns for one link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub url: Link,
    pub clicks_over_time: Vec<DateClicks>,
    pub device_breakdown: Vec<DeviceCount>,
    pub browser_breakdown: Vec<BrowserCount>,
    /// The link's stored counter, not a recount of the click log
    pub total_clicks: i64,
}
