//! Click analytics
//!
//! User-agent classification and client IP extraction feed the click
//! records written on every redirect; the aggregator turns a link's click
//! log into the report served by the analytics endpoint.

pub mod aggregator;
pub mod ip_extractor;
pub mod models;
pub mod user_agent;

pub use aggregator::build_report;
pub use ip_extractor::extract_client_ip;
pub use models::{AnalyticsReport, BrowserCount, DateClicks, DeviceCount};
pub use user_agent::{classify, ClientInfo};
